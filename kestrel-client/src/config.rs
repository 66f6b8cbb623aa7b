//! Client settings

use std::time::Duration;

use kestrel_common::DEFAULT_CLIENT_ID;
use kestrel_protocol::record::DEFAULT_MAGIC;

/// Settings for one [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Sent in every request header
    pub client_id: String,
    /// Produce timeout sent to the broker, also used as the socket read timeout
    pub timeout_ms: i32,
    /// Produce request version, 0 through 2
    pub produce_api_version: i16,
    /// Record format version for batches built by the client
    pub record_magic: i8,
    /// Largest single read from the connection
    pub read_chunk_size: usize,
    /// Responses declaring a larger body are rejected
    pub max_frame_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            timeout_ms: 500,
            produce_api_version: 0,
            record_magic: DEFAULT_MAGIC,
            read_chunk_size: 65535,
            max_frame_size: 100 * 1024 * 1024,
        }
    }
}

impl ClientConfig {
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: i32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_produce_api_version(mut self, version: i16) -> Self {
        self.produce_api_version = version;
        self
    }

    pub fn with_record_magic(mut self, magic: i8) -> Self {
        self.record_magic = magic;
        self
    }

    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Socket read timeout; `None` when the configured timeout is not positive.
    pub fn read_timeout(&self) -> Option<Duration> {
        u64::try_from(self.timeout_ms)
            .ok()
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.client_id, "kestrel");
        assert_eq!(config.timeout_ms, 500);
        assert_eq!(config.record_magic, 1);
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::default()
            .with_client_id("a12")
            .with_timeout_ms(0)
            .with_produce_api_version(2);
        assert_eq!(config.client_id, "a12");
        assert_eq!(config.produce_api_version, 2);
        assert_eq!(config.read_timeout(), None);
    }
}
