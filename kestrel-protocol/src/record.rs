//! Checksummed key/value records and the batches that carry them
//!
//! Serialized record layout:
//!
//! ```text
//! crc: int32 | magic: int8 | attributes: int8 | key: bytes | value: bytes
//! ```
//!
//! The CRC32 (IEEE) covers everything after itself. A batch is the plain
//! concatenation of `offset: int64 | size: int32 | record` entries; it has no
//! count prefix, so its length is carried by whoever embeds it.

use bytes::{Buf, BufMut, BytesMut};
use crc32fast::Hasher;

use crate::codec::{
    decode_exact, decode_len, ensure_remaining, len_to_i32, Decodable, Encodable,
};
use crate::error::{DecodeError, EncodeError};
use crate::primitives::NullableBytes;
use crate::schema::{Schema, WireSchema};

/// Record format version written when none is configured.
pub const DEFAULT_MAGIC: i8 = 1;

/// Bytes of a serialized record besides its key and value: crc, magic, attributes.
pub const RECORD_OVERHEAD: usize = 6;

/// Bytes of a batch entry besides its record: offset and size.
pub const ENTRY_OVERHEAD: usize = 12;

/// A single key/value log record.
///
/// The checksum is computed once, when the record is built, and the record
/// can't be mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    crc: i32,
    magic: i8,
    attributes: i8,
    key: NullableBytes,
    value: NullableBytes,
}

impl Record {
    /// Build a record in the default format.
    pub fn new(key: impl Into<NullableBytes>, value: impl Into<NullableBytes>) -> Self {
        Self::with_magic(DEFAULT_MAGIC, key, value)
    }

    /// Build a record with an explicit format version.
    pub fn with_magic(
        magic: i8,
        key: impl Into<NullableBytes>,
        value: impl Into<NullableBytes>,
    ) -> Self {
        let key = key.into();
        let value = value.into();
        let attributes = 0;
        Self {
            crc: checksum(magic, attributes, &key, &value),
            magic,
            attributes,
            key,
            value,
        }
    }

    pub fn crc(&self) -> i32 {
        self.crc
    }

    pub fn magic(&self) -> i8 {
        self.magic
    }

    pub fn attributes(&self) -> i8 {
        self.attributes
    }

    pub fn key(&self) -> &NullableBytes {
        &self.key
    }

    pub fn value(&self) -> &NullableBytes {
        &self.value
    }

    /// Serialized length, checksum included.
    pub fn size(&self) -> usize {
        RECORD_OVERHEAD + self.key.encoded_len() + self.value.encoded_len()
    }
}

fn checksum(magic: i8, attributes: i8, key: &NullableBytes, value: &NullableBytes) -> i32 {
    let mut hasher = Hasher::new();
    hasher.update(&[magic as u8, attributes as u8]);
    for blob in [key, value] {
        let len = blob.as_bytes().map_or(-1, |bytes| bytes.len() as i32);
        hasher.update(&len.to_be_bytes());
        if let Some(bytes) = blob.as_bytes() {
            hasher.update(bytes);
        }
    }
    hasher.finalize() as i32
}

impl Encodable for Record {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        self.crc.encode(buf)?;
        self.magic.encode(buf)?;
        self.attributes.encode(buf)?;
        self.key.encode(buf)?;
        self.value.encode(buf)?;
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.size()
    }
}

impl Decodable for Record {
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        let crc = i32::decode(buf)?;
        let magic = i8::decode(buf)?;
        let attributes = i8::decode(buf)?;
        let key = NullableBytes::decode(buf)?;
        let value = NullableBytes::decode(buf)?;

        let actual = checksum(magic, attributes, &key, &value);
        if actual != crc {
            return Err(DecodeError::CorruptRecord {
                expected: crc,
                actual,
            });
        }

        Ok(Self {
            crc,
            magic,
            attributes,
            key,
            value,
        })
    }
}

impl WireSchema for Record {
    fn schema() -> Schema {
        Schema::structure([
            ("crc", Schema::Int32),
            ("magic", Schema::Int8),
            ("attributes", Schema::Int8),
            ("key", Schema::Bytes),
            ("value", Schema::Bytes),
        ])
    }
}

/// A record together with its log offset.
///
/// The size field is always derived from the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBatchElement {
    offset: i64,
    record: Record,
}

impl RecordBatchElement {
    pub fn new(offset: i64, record: Record) -> Self {
        Self { offset, record }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.record.size()
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }
}

impl Encodable for RecordBatchElement {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        self.offset.encode(buf)?;
        len_to_i32("record", self.size())?.encode(buf)?;
        self.record.encode(buf)
    }

    fn encoded_len(&self) -> usize {
        ENTRY_OVERHEAD + self.size()
    }
}

impl Decodable for RecordBatchElement {
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        let offset = i64::decode(buf)?;
        let size = decode_len("record", buf)?;
        ensure_remaining(buf, size)?;
        let record = decode_exact(&buf.copy_to_bytes(size))?;
        Ok(Self { offset, record })
    }
}

/// An ordered run of records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordBatch {
    elements: Vec<RecordBatchElement>,
}

impl RecordBatch {
    pub fn new(elements: Vec<RecordBatchElement>) -> Self {
        Self { elements }
    }

    /// Batch for producing: the broker assigns offsets, so every entry is sent with 0.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        records
            .into_iter()
            .map(|record| RecordBatchElement::new(0, record))
            .collect()
    }

    pub fn push(&mut self, element: RecordBatchElement) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[RecordBatchElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn into_elements(self) -> Vec<RecordBatchElement> {
        self.elements
    }

    /// Decode a batch occupying exactly the next `len` bytes of `buf`.
    pub fn decode_bounded(buf: &mut impl Buf, len: usize) -> Result<Self, DecodeError> {
        ensure_remaining(buf, len)?;
        let mut region = buf.copy_to_bytes(len);
        let mut elements = Vec::new();
        while region.has_remaining() {
            elements.push(RecordBatchElement::decode(&mut region)?);
        }
        Ok(Self { elements })
    }

    /// Serialize into a standalone buffer.
    pub fn to_bytes(&self) -> Result<BytesMut, EncodeError> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf)?;
        Ok(buf)
    }
}

impl Encodable for RecordBatch {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        for element in &self.elements {
            element.encode(buf)?;
        }
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.elements.iter().map(Encodable::encoded_len).sum()
    }
}

impl FromIterator<RecordBatchElement> for RecordBatch {
    fn from_iter<I: IntoIterator<Item = RecordBatchElement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<K: Into<NullableBytes>, V: Into<NullableBytes>> FromIterator<(K, V)> for RecordBatch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_records(iter.into_iter().map(|(key, value)| Record::new(key, value)))
    }
}
