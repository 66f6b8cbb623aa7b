//! Synchronous single-connection Kafka client
//!
//! ```no_run
//! use kestrel_client::{Client, ClientConfig};
//! use kestrel_protocol::RequiredAcks;
//!
//! # fn main() -> kestrel_client::Result<()> {
//! let mut client = Client::connect("localhost", 9092, ClientConfig::default())?;
//! let batch = client.record_batch([("key", "value")]);
//! let response = client.produce("hello", batch, RequiredAcks::Leader)?;
//! println!("{:?}", response.body);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod transport;

use std::io::{Read, Write};
use std::net::TcpStream;

use kestrel_protocol::frame::{decode_frame_body, encode_frame};
use kestrel_protocol::{
    ApiRequest, KafkaString, NullableBytes, ProduceRequest, ProduceResponse, Record,
    RecordBatch, Request, RequiredAcks, Response,
};
use tracing::{debug, info, warn};

pub use config::ClientConfig;
pub use error::{Error, Result, TransportError};
pub use transport::{ConnectionState, Transport};

/// A client bound to one broker connection.
///
/// Calls block until the full response has been read. Use one client per
/// thread; requests on a client are never pipelined.
#[derive(Debug)]
pub struct Client<S = TcpStream> {
    transport: Transport<S>,
    correlation_id: i32,
    client_id: KafkaString,
    config: ClientConfig,
}

impl Client<TcpStream> {
    /// Connect to a broker at `host:port`.
    pub fn connect(host: &str, port: u16, config: ClientConfig) -> Result<Self> {
        let addr = format!("{host}:{port}");
        let stream = TcpStream::connect((host, port)).map_err(|source| {
            TransportError::ConnectFailed {
                addr: addr.clone(),
                source,
            }
        })?;
        stream
            .set_read_timeout(config.read_timeout())
            .map_err(|source| TransportError::Io {
                operation: "set read timeout",
                source,
            })?;
        stream
            .set_nodelay(true)
            .map_err(|source| TransportError::Io {
                operation: "set nodelay",
                source,
            })?;

        info!(%addr, client_id = %config.client_id, "connected to broker");
        Ok(Self::with_stream(stream, config))
    }
}

impl<S: Read + Write> Client<S> {
    /// Wrap an already open connection.
    pub fn with_stream(stream: S, config: ClientConfig) -> Self {
        Self {
            transport: Transport::new(stream, config.read_chunk_size, config.max_frame_size),
            correlation_id: 0,
            client_id: KafkaString::from(config.client_id.as_str()),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &Transport<S> {
        &self.transport
    }

    /// Take the next correlation id. Wraps from `i32::MAX` to `i32::MIN`.
    fn next_correlation_id(&mut self) -> i32 {
        let id = self.correlation_id;
        self.correlation_id = self.correlation_id.wrapping_add(1);
        id
    }

    /// Send one request and wait for its response.
    pub fn send_request<R: ApiRequest>(
        &mut self,
        api_version: i16,
        body: R,
    ) -> Result<Response<R::Response>> {
        let correlation_id = self.next_correlation_id();
        let request = Request::new(api_version, correlation_id, self.client_id.clone(), body)?;
        let frame = encode_frame(&request)?;
        debug!(
            api_key = ?R::API_KEY,
            api_version,
            correlation_id,
            len = frame.len(),
            "sending request"
        );

        self.transport.send(&frame)?;
        let response = self.transport.receive(|body| {
            decode_frame_body(body, |buf| Response::<R::Response>::decode(buf, api_version))
        })?;

        if response.header.correlation_id != correlation_id {
            warn!(
                expected = correlation_id,
                received = response.header.correlation_id,
                "response correlation id does not match request"
            );
        }
        debug!(correlation_id, "received response");
        Ok(response)
    }

    /// Produce `records` to partition 0 of `topic`.
    pub fn produce(
        &mut self,
        topic: &str,
        records: RecordBatch,
        acks: RequiredAcks,
    ) -> Result<Response<ProduceResponse>> {
        self.produce_to(topic, 0, records, acks)
    }

    pub fn produce_to(
        &mut self,
        topic: &str,
        partition: i32,
        records: RecordBatch,
        acks: RequiredAcks,
    ) -> Result<Response<ProduceResponse>> {
        let request =
            ProduceRequest::single(topic, partition, records, acks, self.config.timeout_ms);
        self.send_request(self.config.produce_api_version, request)
    }

    /// Build a batch from key/value pairs in the configured record format.
    pub fn record_batch<K, V>(&self, pairs: impl IntoIterator<Item = (K, V)>) -> RecordBatch
    where
        K: Into<NullableBytes>,
        V: Into<NullableBytes>,
    {
        let magic = self.config.record_magic;
        RecordBatch::from_records(
            pairs
                .into_iter()
                .map(|(key, value)| Record::with_magic(magic, key, value)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use kestrel_protocol::codec::Encodable;
    use kestrel_protocol::{DecodeError, KafkaArray, ResponseHeader};
    use std::io::{self, Cursor};

    /// Replays canned response bytes and records everything written.
    struct Canned {
        input: Cursor<Vec<u8>>,
        written: Vec<u8>,
    }

    impl Read for Canned {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Canned {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn produce_response_frame(correlation_id: i32) -> Vec<u8> {
        let response = Response {
            header: ResponseHeader { correlation_id },
            body: ProduceResponse {
                topics: KafkaArray(vec![]),
                throttle_time_ms: None,
            },
        };
        encode_frame(&response).unwrap().to_vec()
    }

    fn client_with(input: Vec<u8>) -> Client<Canned> {
        let stream = Canned {
            input: Cursor::new(input),
            written: Vec::new(),
        };
        Client::with_stream(stream, ClientConfig::default().with_client_id("a12"))
    }

    #[test]
    fn test_correlation_id_wraps() {
        let mut client = client_with(vec![]);
        client.correlation_id = i32::MAX;
        assert_eq!(client.next_correlation_id(), i32::MAX);
        assert_eq!(client.next_correlation_id(), i32::MIN);
        assert_eq!(client.next_correlation_id(), i32::MIN + 1);
    }

    #[test]
    fn test_produce_writes_one_frame() {
        let mut client = client_with(produce_response_frame(0));
        let batch = client.record_batch([("key", "value")]);
        let response = client.produce("hello", batch, RequiredAcks::Leader).unwrap();
        assert_eq!(response.header.correlation_id, 0);

        let written = &client.transport().get_ref().written;
        let declared = i32::from_be_bytes([written[0], written[1], written[2], written[3]]);
        assert_eq!(declared as usize, written.len() - 4);
        // api key 0, version 0, correlation id 0, client id "a12"
        assert_eq!(&written[4..17], &[0, 0, 0, 0, 0, 0, 0, 0, 0, 3, b'a', b'1', b'2']);
    }

    #[test]
    fn test_mismatched_correlation_id_is_returned() {
        let mut client = client_with(produce_response_frame(42));
        let batch = client.record_batch([("k", "v")]);
        let response = client.produce("t", batch, RequiredAcks::None).unwrap();
        assert_eq!(response.header.correlation_id, 42);
    }

    #[test]
    fn test_record_batch_uses_configured_magic() {
        let stream = Canned {
            input: Cursor::new(vec![]),
            written: Vec::new(),
        };
        let client = Client::with_stream(stream, ClientConfig::default().with_record_magic(0));
        let batch = client.record_batch([("k", "v")]);
        assert_eq!(batch.elements()[0].record().magic(), 0);
    }

    #[test]
    fn test_unsupported_version_sends_nothing() {
        let mut client = client_with(vec![]);
        client.config.produce_api_version = 3;
        let batch = client.record_batch([("k", "v")]);

        let err = client.produce("t", batch, RequiredAcks::All).unwrap_err();
        assert!(matches!(err, Error::Encode(_)));
        assert!(client.transport().get_ref().written.is_empty());
    }

    #[test]
    fn test_trailing_response_bytes_rejected() {
        let mut body = BytesMut::new();
        7i32.encode(&mut body).unwrap(); // correlation id
        0i32.encode(&mut body).unwrap(); // no topics
        0i16.encode(&mut body).unwrap(); // junk
        let mut input = (body.len() as i32).to_be_bytes().to_vec();
        input.extend_from_slice(&body);

        let mut client = client_with(input);
        let batch = client.record_batch([("k", "v")]);
        let err = client.produce("t", batch, RequiredAcks::Leader).unwrap_err();
        assert!(matches!(err, Error::Decode(DecodeError::TrailingBytes(2))));
    }
}
