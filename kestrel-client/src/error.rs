//! Error types for the client

use std::io;

use kestrel_protocol::{DecodeError, EncodeError};
use thiserror::Error;

/// Failures of the byte stream underneath the protocol.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Could not open the connection
    #[error("failed to connect to {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// A write made no progress while bytes remained
    #[error("write made no progress with {remaining} of {total} bytes unsent")]
    WriteFailed { remaining: usize, total: usize },

    /// The connection reported an error while reading or writing
    #[error("read failed: {0}")]
    ReadFailed(#[source] io::Error),

    /// I/O error outside the read path
    #[error("{operation} failed: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// The peer closed the connection, or an earlier failure left it unusable
    #[error("connection closed")]
    ConnectionClosed,

    /// No response arrived within the configured timeout
    #[error("timed out waiting for a response")]
    TimedOut,
}

/// Any failure of a client call
#[derive(Error, Debug)]
pub enum Error {
    #[error("encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("decoding error: {0}")]
    Decode(#[from] DecodeError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversions() {
        let err: Error = TransportError::WriteFailed {
            remaining: 3,
            total: 10,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "transport error: write made no progress with 3 of 10 bytes unsent"
        );

        let err: Error = DecodeError::TrailingBytes(2).into();
        assert!(matches!(err, Error::Decode(DecodeError::TrailingBytes(2))));
    }
}
