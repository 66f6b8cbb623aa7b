//! Request and response envelopes shared by every API

use bytes::{Buf, BufMut};

use crate::codec::{Decodable, Encodable};
use crate::error::{DecodeError, EncodeError};
use crate::primitives::KafkaString;
use crate::schema::{Field, Schema, WireSchema};
use crate::ApiKey;

/// A Kafka protocol request header
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RequestHeader {
    /// The API key of this request
    pub api_key: ApiKey,
    /// The API version of this request
    pub api_version: i16,
    /// The correlation ID of this request
    pub correlation_id: i32,
    /// The client ID string
    pub client_id: KafkaString,
}

impl Encodable for RequestHeader {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        self.api_key.encode(buf)?;
        self.api_version.encode(buf)?;
        self.correlation_id.encode(buf)?;
        self.client_id.encode(buf)?;
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        2 + 2 + 4 + self.client_id.encoded_len()
    }
}

impl Decodable for RequestHeader {
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        let api_key = ApiKey::decode(buf)?;
        let api_version = i16::decode(buf)?;
        let correlation_id = i32::decode(buf)?;
        let client_id = KafkaString::decode(buf)?;

        Ok(Self {
            api_key,
            api_version,
            correlation_id,
            client_id,
        })
    }
}

impl WireSchema for RequestHeader {
    fn schema() -> Schema {
        Schema::structure([
            ("api_key", ApiKey::schema()),
            ("api_version", Schema::Int16),
            ("correlation_id", Schema::Int32),
            ("client_id", Schema::String),
        ])
    }
}

/// A Kafka protocol response header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResponseHeader {
    /// The correlation ID echoed from the request
    pub correlation_id: i32,
}

impl Encodable for ResponseHeader {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        self.correlation_id.encode(buf)
    }

    fn encoded_len(&self) -> usize {
        4
    }
}

impl Decodable for ResponseHeader {
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        let correlation_id = i32::decode(buf)?;
        Ok(Self { correlation_id })
    }
}

impl WireSchema for ResponseHeader {
    fn schema() -> Schema {
        Schema::structure([("correlation_id", Schema::Int32)])
    }
}

/// A request body for one broker API.
pub trait ApiRequest: Encodable {
    const API_KEY: ApiKey;
    /// Lowest version whose request layout this type writes.
    const MIN_VERSION: i16 = 0;
    /// Highest version whose request layout this type writes.
    const MAX_VERSION: i16;

    type Response: ResponseBody;

    /// Fail unless `version` is within `MIN_VERSION..=MAX_VERSION`.
    fn check_version(version: i16) -> Result<(), EncodeError> {
        if (Self::MIN_VERSION..=Self::MAX_VERSION).contains(&version) {
            return Ok(());
        }
        Err(EncodeError::UnsupportedVersion {
            api_key: Self::API_KEY,
            version,
            min: Self::MIN_VERSION,
            max: Self::MAX_VERSION,
        })
    }
}

/// A response body whose layout depends on the request's API version.
pub trait ResponseBody: Sized {
    fn decode_body(buf: &mut impl Buf, api_version: i16) -> Result<Self, DecodeError>;

    fn body_schema(api_version: i16) -> Schema;
}

/// Header plus body, as written on the wire after the length prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<B> {
    pub header: RequestHeader,
    pub body: B,
}

impl<B: ApiRequest> Request<B> {
    pub fn new(
        api_version: i16,
        correlation_id: i32,
        client_id: impl Into<KafkaString>,
        body: B,
    ) -> Result<Self, EncodeError> {
        B::check_version(api_version)?;
        Ok(Self {
            header: RequestHeader {
                api_key: B::API_KEY,
                api_version,
                correlation_id,
                client_id: client_id.into(),
            },
            body,
        })
    }
}

impl<B: Encodable> Encodable for Request<B> {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        self.header.encode(buf)?;
        self.body.encode(buf)
    }

    fn encoded_len(&self) -> usize {
        self.header.encoded_len() + self.body.encoded_len()
    }
}

impl<B: Decodable> Decodable for Request<B> {
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        let header = RequestHeader::decode(buf)?;
        let body = B::decode(buf)?;
        Ok(Self { header, body })
    }
}

impl<B: WireSchema> WireSchema for Request<B> {
    fn schema() -> Schema {
        with_body(RequestHeader::schema(), B::schema())
    }
}

/// Response header plus the decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<B> {
    pub header: ResponseHeader,
    pub body: B,
}

impl<B: ResponseBody> Response<B> {
    /// Decode a response to a request sent with `api_version`.
    pub fn decode(buf: &mut impl Buf, api_version: i16) -> Result<Self, DecodeError> {
        let header = ResponseHeader::decode(buf)?;
        let body = B::decode_body(buf, api_version)?;
        Ok(Self { header, body })
    }

    pub fn schema(api_version: i16) -> Schema {
        with_body(ResponseHeader::schema(), B::body_schema(api_version))
    }
}

impl<B: Encodable> Encodable for Response<B> {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        self.header.encode(buf)?;
        self.body.encode(buf)
    }

    fn encoded_len(&self) -> usize {
        self.header.encoded_len() + self.body.encoded_len()
    }
}

fn with_body(header: Schema, body: Schema) -> Schema {
    match header {
        Schema::Struct(mut fields) => {
            fields.push(Field::new("body", body));
            Schema::Struct(fields)
        }
        other => Schema::structure([("header", other), ("body", body)]),
    }
}
