//! Traits for encoding and decoding Kafka protocol messages

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{DecodeError, EncodeError};

/// A type that can be encoded into a buffer.
///
/// Only the protocol's wire types and structures built from them implement
/// this trait, so a message containing a `bool`, an unsigned integer or a
/// float is rejected when it is compiled rather than when it is sent.
pub trait Encodable {
    /// Encode a value into a buffer.
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError>;

    /// Number of bytes `encode` writes.
    fn encoded_len(&self) -> usize;
}

/// A type that can be decoded from a buffer.
///
/// Decoding treats `buf` as a forward-only cursor: every read is checked
/// against `remaining()` first and fails with
/// [`DecodeError::InsufficientData`] instead of panicking.
pub trait Decodable: Sized {
    /// Decode a value from a buffer.
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError>;
}

/// Fail unless `buf` still holds `needed` bytes.
pub(crate) fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), DecodeError> {
    let remaining = buf.remaining();
    if remaining < needed {
        return Err(DecodeError::InsufficientData { needed, remaining });
    }
    Ok(())
}

/// Convert a host length into the Int32 the wire carries.
pub(crate) fn len_to_i32(kind: &'static str, len: usize) -> Result<i32, EncodeError> {
    i32::try_from(len).map_err(|_| EncodeError::LengthOverflow { kind, len })
}

/// Read an Int32 length/count prefix that may not be negative.
pub(crate) fn decode_len(kind: &'static str, buf: &mut impl Buf) -> Result<usize, DecodeError> {
    let len = i32::decode(buf)?;
    usize::try_from(len).map_err(|_| DecodeError::InvalidLength {
        kind,
        len: len.into(),
    })
}

/// Encode `value` into a fresh buffer.
pub fn encode_to_bytes<T: Encodable>(value: &T) -> Result<Bytes, EncodeError> {
    let mut buf = BytesMut::with_capacity(value.encoded_len());
    value.encode(&mut buf)?;
    Ok(buf.freeze())
}

/// Decode a `T` from the front of `bytes`, returning it with the number of
/// bytes consumed.
pub fn decode_from_slice<T: Decodable>(bytes: &[u8]) -> Result<(T, usize), DecodeError> {
    let mut cursor = bytes;
    let value = T::decode(&mut cursor)?;
    Ok((value, bytes.len() - cursor.len()))
}

/// Decode a `T` that must occupy exactly `bytes`.
pub fn decode_exact<T: Decodable>(bytes: &[u8]) -> Result<T, DecodeError> {
    let (value, consumed) = decode_from_slice(bytes)?;
    match bytes.len() - consumed {
        0 => Ok(value),
        extra => Err(DecodeError::TrailingBytes(extra)),
    }
}
