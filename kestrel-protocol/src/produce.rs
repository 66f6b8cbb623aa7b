//! Produce API (key 0), request versions 0 through 2
//!
//! Versions 0-2 share one request layout. Later response versions only
//! append fields, so responses decode for any version: fields a version
//! doesn't carry come back as `None`.

use bytes::{Buf, BufMut};
use kestrel_common::ErrorCode;

use crate::codec::{decode_len, len_to_i32, Decodable, Encodable};
use crate::error::{DecodeError, EncodeError};
use crate::messages::{ApiRequest, ResponseBody};
use crate::primitives::{KafkaArray, KafkaString};
use crate::record::RecordBatch;
use crate::schema::{Schema, WireSchema};
use crate::ApiKey;

/// How many replicas must acknowledge a write before the broker responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i16)]
pub enum RequiredAcks {
    /// Every in-sync replica
    All = -1,
    /// No acknowledgement; the broker sends no response
    None = 0,
    /// The partition leader only
    #[default]
    Leader = 1,
}

impl RequiredAcks {
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            -1 => Some(Self::All),
            0 => Some(Self::None),
            1 => Some(Self::Leader),
            _ => None,
        }
    }
}

impl Encodable for RequiredAcks {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        (*self as i16).encode(buf)
    }

    fn encoded_len(&self) -> usize {
        2
    }
}

impl Decodable for RequiredAcks {
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        let value = i16::decode(buf)?;
        Self::from_i16(value).ok_or(DecodeError::InvalidLength {
            kind: "required acks",
            len: value.into(),
        })
    }
}

/// Produce Request (v0-v2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceRequest {
    pub acks: RequiredAcks,
    pub timeout_ms: i32,
    pub topics: KafkaArray<TopicProduceData>,
}

/// Records for one topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicProduceData {
    pub topic: KafkaString,
    pub partitions: KafkaArray<PartitionProduceData>,
}

/// Records for one partition.
///
/// On the wire the batch is preceded by its byte length, which is always
/// computed from the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionProduceData {
    pub partition: i32,
    pub records: RecordBatch,
}

impl ProduceRequest {
    /// A request carrying one batch for one topic-partition.
    pub fn single(
        topic: impl Into<KafkaString>,
        partition: i32,
        records: RecordBatch,
        acks: RequiredAcks,
        timeout_ms: i32,
    ) -> Self {
        Self {
            acks,
            timeout_ms,
            topics: KafkaArray(vec![TopicProduceData {
                topic: topic.into(),
                partitions: KafkaArray(vec![PartitionProduceData::new(partition, records)]),
            }]),
        }
    }
}

impl PartitionProduceData {
    pub fn new(partition: i32, records: RecordBatch) -> Self {
        Self { partition, records }
    }

    /// Value of the batch length field.
    pub fn record_batch_bytes(&self) -> usize {
        self.records.encoded_len()
    }
}

impl Encodable for ProduceRequest {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        self.acks.encode(buf)?;
        self.timeout_ms.encode(buf)?;
        self.topics.encode(buf)?;
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        2 + 4 + self.topics.encoded_len()
    }
}

impl Decodable for ProduceRequest {
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        let acks = RequiredAcks::decode(buf)?;
        let timeout_ms = i32::decode(buf)?;
        let topics = KafkaArray::<TopicProduceData>::decode(buf)?;
        Ok(Self {
            acks,
            timeout_ms,
            topics,
        })
    }
}

impl ApiRequest for ProduceRequest {
    const API_KEY: ApiKey = ApiKey::Produce;
    const MAX_VERSION: i16 = 2;

    type Response = ProduceResponse;
}

impl WireSchema for ProduceRequest {
    fn schema() -> Schema {
        Schema::structure([
            ("acks", Schema::Int16),
            ("timeout_ms", Schema::Int32),
            ("topics", KafkaArray::<TopicProduceData>::schema()),
        ])
    }
}

impl Encodable for TopicProduceData {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        self.topic.encode(buf)?;
        self.partitions.encode(buf)?;
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.topic.encoded_len() + self.partitions.encoded_len()
    }
}

impl Decodable for TopicProduceData {
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        let topic = KafkaString::decode(buf)?;
        let partitions = KafkaArray::<PartitionProduceData>::decode(buf)?;
        Ok(Self { topic, partitions })
    }
}

impl WireSchema for TopicProduceData {
    fn schema() -> Schema {
        Schema::structure([
            ("topic", Schema::String),
            ("partitions", KafkaArray::<PartitionProduceData>::schema()),
        ])
    }
}

impl Encodable for PartitionProduceData {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        self.partition.encode(buf)?;
        len_to_i32("record batch", self.record_batch_bytes())?.encode(buf)?;
        self.records.encode(buf)?;
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        4 + 4 + self.record_batch_bytes()
    }
}

impl Decodable for PartitionProduceData {
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        let partition = i32::decode(buf)?;
        let record_batch_bytes = decode_len("record batch", buf)?;
        let records = RecordBatch::decode_bounded(buf, record_batch_bytes)?;
        Ok(Self { partition, records })
    }
}

impl WireSchema for PartitionProduceData {
    fn schema() -> Schema {
        // The length-prefixed batch has the same layout as a bytes blob.
        Schema::structure([("partition", Schema::Int32), ("records", Schema::Bytes)])
    }
}

/// Produce Response (v0-v5)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProduceResponse {
    pub topics: KafkaArray<TopicProduceResponse>,
    /// Present from v1
    pub throttle_time_ms: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopicProduceResponse {
    pub topic: KafkaString,
    pub partitions: Vec<PartitionProduceResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartitionProduceResponse {
    pub partition: i32,
    /// Raw broker error code; see [`PartitionProduceResponse::error`]
    pub error_code: i16,
    pub base_offset: i64,
    /// Present from v2
    pub log_append_time: Option<i64>,
    /// Present from v5
    pub log_start_offset: Option<i64>,
}

impl PartitionProduceResponse {
    /// The named broker error, if the code is one this crate knows.
    pub fn error(&self) -> Option<ErrorCode> {
        ErrorCode::from_i16(self.error_code)
    }

    fn decode_versioned(buf: &mut impl Buf, version: i16) -> Result<Self, DecodeError> {
        let partition = i32::decode(buf)?;
        let error_code = i16::decode(buf)?;
        let base_offset = i64::decode(buf)?;
        let log_append_time = decode_since(buf, version, 2)?;
        let log_start_offset = decode_since(buf, version, 5)?;
        Ok(Self {
            partition,
            error_code,
            base_offset,
            log_append_time,
            log_start_offset,
        })
    }

    fn encode_fields(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        self.partition.encode(buf)?;
        self.error_code.encode(buf)?;
        self.base_offset.encode(buf)?;
        encode_present(&self.log_append_time, buf)?;
        encode_present(&self.log_start_offset, buf)
    }

    fn fields_len(&self) -> usize {
        4 + 2 + 8 + optional_len(&self.log_append_time) + optional_len(&self.log_start_offset)
    }
}

fn decode_since<T: Decodable>(
    buf: &mut impl Buf,
    version: i16,
    since: i16,
) -> Result<Option<T>, DecodeError> {
    if version < since {
        return Ok(None);
    }
    T::decode(buf).map(Some)
}

fn encode_present<T: Encodable>(field: &Option<T>, buf: &mut impl BufMut) -> Result<(), EncodeError> {
    match field {
        Some(value) => value.encode(buf),
        None => Ok(()),
    }
}

fn optional_len<T: Encodable>(field: &Option<T>) -> usize {
    field.as_ref().map_or(0, Encodable::encoded_len)
}

impl ResponseBody for ProduceResponse {
    fn decode_body(buf: &mut impl Buf, api_version: i16) -> Result<Self, DecodeError> {
        let topic_count = decode_len("sequence", buf)?;
        let mut topics = Vec::with_capacity(topic_count.min(buf.remaining()));
        for _ in 0..topic_count {
            let topic = KafkaString::decode(buf)?;
            let partition_count = decode_len("sequence", buf)?;
            let mut partitions = Vec::with_capacity(partition_count.min(buf.remaining()));
            for _ in 0..partition_count {
                partitions.push(PartitionProduceResponse::decode_versioned(buf, api_version)?);
            }
            topics.push(TopicProduceResponse { topic, partitions });
        }
        let throttle_time_ms = decode_since(buf, api_version, 1)?;
        Ok(Self {
            topics: KafkaArray(topics),
            throttle_time_ms,
        })
    }

    fn body_schema(api_version: i16) -> Schema {
        let mut partition = vec![
            ("partition", Schema::Int32),
            ("error_code", Schema::Int16),
            ("base_offset", Schema::Int64),
        ];
        if api_version >= 2 {
            partition.push(("log_append_time", Schema::Int64));
        }
        if api_version >= 5 {
            partition.push(("log_start_offset", Schema::Int64));
        }
        let topic = Schema::structure([
            ("topic", Schema::String),
            ("partitions", Schema::sequence(Schema::structure(partition))),
        ]);
        let mut body = vec![("topics", Schema::sequence(topic))];
        if api_version >= 1 {
            body.push(("throttle_time_ms", Schema::Int32));
        }
        Schema::structure(body)
    }
}

// Lets tests and fake brokers write responses; optional fields are written
// when present, so the caller picks the version by what it fills in.
impl Encodable for ProduceResponse {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        self.topics.encode(buf)?;
        encode_present(&self.throttle_time_ms, buf)
    }

    fn encoded_len(&self) -> usize {
        self.topics.encoded_len() + optional_len(&self.throttle_time_ms)
    }
}

impl Encodable for TopicProduceResponse {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        self.topic.encode(buf)?;
        len_to_i32("sequence", self.partitions.len())?.encode(buf)?;
        for partition in &self.partitions {
            partition.encode_fields(buf)?;
        }
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.topic.encoded_len()
            + 4
            + self
                .partitions
                .iter()
                .map(PartitionProduceResponse::fields_len)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_to_bytes;
    use crate::record::Record;
    use bytes::BytesMut;

    fn v0_body() -> Vec<u8> {
        let mut buf = BytesMut::new();
        1i32.encode(&mut buf).unwrap();
        KafkaString::from("hello").encode(&mut buf).unwrap();
        1i32.encode(&mut buf).unwrap();
        0i32.encode(&mut buf).unwrap(); // partition
        3i16.encode(&mut buf).unwrap(); // error code
        41i64.encode(&mut buf).unwrap(); // base offset
        buf.to_vec()
    }

    #[test]
    fn test_response_v0() {
        let bytes = v0_body();
        let mut read = &bytes[..];
        let response = ProduceResponse::decode_body(&mut read, 0).unwrap();
        assert!(read.is_empty());
        assert_eq!(response.throttle_time_ms, None);

        let partition = &response.topics.0[0].partitions[0];
        assert_eq!(response.topics.0[0].topic.as_str(), "hello");
        assert_eq!(partition.base_offset, 41);
        assert_eq!(partition.error(), Some(ErrorCode::UnknownTopicOrPartition));
        assert_eq!(partition.log_append_time, None);
    }

    #[test]
    fn test_response_v1_reads_throttle_time() {
        let mut bytes = v0_body();
        bytes.extend_from_slice(&250i32.to_be_bytes());

        let mut read = &bytes[..];
        let response = ProduceResponse::decode_body(&mut read, 1).unwrap();
        assert!(read.is_empty());
        assert_eq!(response.throttle_time_ms, Some(250));
    }

    #[test]
    fn test_response_v5_round_trip() {
        let response = ProduceResponse {
            topics: KafkaArray(vec![TopicProduceResponse {
                topic: "events".into(),
                partitions: vec![PartitionProduceResponse {
                    partition: 2,
                    error_code: 0,
                    base_offset: 100,
                    log_append_time: Some(-1),
                    log_start_offset: Some(0),
                }],
            }]),
            throttle_time_ms: Some(0),
        };
        let bytes = encode_to_bytes(&response).unwrap();
        assert_eq!(bytes.len(), response.encoded_len());

        let mut read = bytes.clone();
        let decoded = ProduceResponse::decode_body(&mut read, 5).unwrap();
        assert_eq!(decoded, response);

        let dynamic = ProduceResponse::body_schema(5)
            .decode(&mut bytes.clone())
            .unwrap();
        let partitions = dynamic.field("topics").unwrap().as_sequence().unwrap()[0]
            .field("partitions")
            .unwrap()
            .as_sequence()
            .unwrap();
        assert_eq!(
            partitions[0].field("log_start_offset").unwrap().as_i64(),
            Some(0)
        );
    }

    #[test]
    fn test_response_truncated_for_version() {
        // a v0 body read as v2 is missing log_append_time
        let bytes = v0_body();
        let err = ProduceResponse::decode_body(&mut &bytes[..], 2).unwrap_err();
        assert!(matches!(err, DecodeError::InsufficientData { .. }));
    }

    #[test]
    fn test_batch_length_is_derived() {
        let records = RecordBatch::from_records([Record::new("key", "value")]);
        let data = PartitionProduceData::new(0, records);
        assert_eq!(data.record_batch_bytes(), 12 + 22);

        let bytes = encode_to_bytes(&data).unwrap();
        assert_eq!(&bytes[4..8], &34i32.to_be_bytes());
        assert_eq!(bytes.len(), data.encoded_len());
    }

    #[test]
    fn test_acks_values() {
        assert_eq!(RequiredAcks::All as i16, -1);
        assert_eq!(RequiredAcks::from_i16(1), Some(RequiredAcks::Leader));
        assert_eq!(RequiredAcks::from_i16(2), None);
    }

    #[test]
    fn test_version_range() {
        assert!(ProduceRequest::check_version(2).is_ok());
        assert!(matches!(
            ProduceRequest::check_version(3),
            Err(EncodeError::UnsupportedVersion { version: 3, .. })
        ));
    }
}
