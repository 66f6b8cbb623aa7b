//! Primitive types used in the Kafka protocol

use std::fmt;
use std::str;

use bytes::{Buf, BufMut, Bytes};

use crate::codec::{decode_len, ensure_remaining, len_to_i32, Decodable, Encodable};
use crate::error::{DecodeError, EncodeError};

// --- Integers ---

// Signed big-endian integers are the only numeric wire types; unsigned,
// boolean and floating point types have no impls.
macro_rules! impl_codec_for_int {
    ($($t:ty),*) => {
        $(
            impl Encodable for $t {
                fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
                    buf.put_slice(&self.to_be_bytes());
                    Ok(())
                }

                fn encoded_len(&self) -> usize {
                    std::mem::size_of::<$t>()
                }
            }

            impl Decodable for $t {
                fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
                    let mut bytes = [0u8; std::mem::size_of::<$t>()];
                    ensure_remaining(buf, bytes.len())?;
                    buf.copy_to_slice(&mut bytes);
                    Ok(<$t>::from_be_bytes(bytes))
                }
            }
        )*
    };
}

impl_codec_for_int!(i8, i16, i32, i64);

// --- String helpers shared with the dynamic schema codec ---

pub(crate) fn put_str(s: &str, buf: &mut impl BufMut) -> Result<(), EncodeError> {
    let len = i16::try_from(s.len()).map_err(|_| EncodeError::StringTooLong(s.len()))?;
    len.encode(buf)?;
    buf.put_slice(s.as_bytes());
    Ok(())
}

pub(crate) fn get_string(buf: &mut impl Buf) -> Result<String, DecodeError> {
    let len = i16::decode(buf)?;
    let len = usize::try_from(len).map_err(|_| DecodeError::InvalidLength {
        kind: "string",
        len: len.into(),
    })?;
    ensure_remaining(buf, len)?;
    let mut bytes = vec![0; len];
    buf.copy_to_slice(&mut bytes);
    let s = str::from_utf8(&bytes)?;
    Ok(s.to_owned())
}

pub(crate) fn put_nullable_bytes(
    bytes: Option<&[u8]>,
    buf: &mut impl BufMut,
) -> Result<(), EncodeError> {
    match bytes {
        Some(bytes) => {
            len_to_i32("bytes", bytes.len())?.encode(buf)?;
            buf.put_slice(bytes);
        }
        None => (-1i32).encode(buf)?,
    }
    Ok(())
}

pub(crate) fn get_nullable_bytes(buf: &mut impl Buf) -> Result<Option<Bytes>, DecodeError> {
    let len = i32::decode(buf)?;
    if len == -1 {
        return Ok(None);
    }
    let len = usize::try_from(len).map_err(|_| DecodeError::InvalidLength {
        kind: "bytes",
        len: len.into(),
    })?;
    ensure_remaining(buf, len)?;
    Ok(Some(buf.copy_to_bytes(len)))
}

// --- KafkaString ---

/// A UTF-8 string with an Int16 byte-length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KafkaString(pub String);

impl Encodable for KafkaString {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        put_str(&self.0, buf)
    }

    fn encoded_len(&self) -> usize {
        2 + self.0.len()
    }
}

impl Decodable for KafkaString {
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        get_string(buf).map(KafkaString)
    }
}

impl From<&str> for KafkaString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for KafkaString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for KafkaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl KafkaString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

// --- KafkaArray ---

/// A sequence with an Int32 element-count prefix. There is no null variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KafkaArray<T>(pub Vec<T>);

impl<T: Encodable> Encodable for KafkaArray<T> {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        len_to_i32("sequence", self.0.len())?.encode(buf)?;
        for item in &self.0 {
            item.encode(buf)?;
        }
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        4 + self.0.iter().map(Encodable::encoded_len).sum::<usize>()
    }
}

impl<T: Decodable> Decodable for KafkaArray<T> {
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        let len = decode_len("sequence", buf)?;
        // Every element takes at least one byte, so the count can't
        // legitimately exceed what is left.
        let mut items = Vec::with_capacity(len.min(buf.remaining()));
        for _ in 0..len {
            items.push(T::decode(buf)?);
        }
        Ok(KafkaArray(items))
    }
}

impl<T> From<Vec<T>> for KafkaArray<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> FromIterator<T> for KafkaArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> KafkaArray<T> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }
}

// --- NullableBytes ---

/// An opaque byte blob with an Int32 length prefix.
///
/// `None` is the null blob and encodes as the length `-1` with no payload,
/// which is distinct from an empty blob (length `0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NullableBytes(pub Option<Bytes>);

impl NullableBytes {
    pub fn null() -> Self {
        Self(None)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.0.as_deref()
    }
}

impl Encodable for NullableBytes {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        put_nullable_bytes(self.as_bytes(), buf)
    }

    fn encoded_len(&self) -> usize {
        4 + self.0.as_ref().map_or(0, Bytes::len)
    }
}

impl Decodable for NullableBytes {
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        get_nullable_bytes(buf).map(Self)
    }
}

impl From<&str> for NullableBytes {
    fn from(s: &str) -> Self {
        Self(Some(Bytes::copy_from_slice(s.as_bytes())))
    }
}

impl From<&[u8]> for NullableBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(Some(Bytes::copy_from_slice(bytes)))
    }
}

impl From<Vec<u8>> for NullableBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Some(Bytes::from(bytes)))
    }
}

impl From<Bytes> for NullableBytes {
    fn from(bytes: Bytes) -> Self {
        Self(Some(bytes))
    }
}

impl From<Option<Bytes>> for NullableBytes {
    fn from(bytes: Option<Bytes>) -> Self {
        Self(bytes)
    }
}
