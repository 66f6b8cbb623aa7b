//! Kafka wire protocol: primitive codec, record envelope, request and
//! response messages and length-prefixed framing.

pub mod api_keys;
pub mod codec;
pub mod error;
pub mod frame;
pub mod messages;
pub mod primitives;
pub mod produce;
pub mod record;
pub mod schema;


pub use api_keys::ApiKey;
pub use codec::{decode_exact, decode_from_slice, encode_to_bytes, Decodable, Encodable};
pub use error::{DecodeError, EncodeError, UnsupportedType};
pub use frame::{encode_frame, split_frame, LENGTH_PREFIX};
pub use messages::{ApiRequest, Request, RequestHeader, Response, ResponseBody, ResponseHeader};
pub use primitives::{KafkaArray, KafkaString, NullableBytes};
pub use produce::{
    PartitionProduceData, PartitionProduceResponse, ProduceRequest, ProduceResponse,
    RequiredAcks, TopicProduceData, TopicProduceResponse,
};
pub use record::{Record, RecordBatch, RecordBatchElement};
pub use schema::{PrimitiveKind, Schema, WireSchema, WireType, WireValue};
