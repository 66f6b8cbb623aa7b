//! Encoding and decoding failures

use thiserror::Error;

use crate::api_keys::ApiKey;
use crate::schema::{PrimitiveKind, WireType};

/// A primitive kind outside the protocol's wire types was named in a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported wire type: {0}")]
pub struct UnsupportedType(pub PrimitiveKind);

/// Errors raised while turning a value into wire bytes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The schema uses a primitive the protocol cannot represent
    #[error(transparent)]
    UnsupportedType(#[from] UnsupportedType),

    /// UTF-8 length does not fit the Int16 length prefix
    #[error("string of {0} bytes exceeds the maximum of {max}", max = i16::MAX)]
    StringTooLong(usize),

    /// A blob, sequence or frame is longer than an Int32 can describe
    #[error("{kind} of length {len} exceeds the Int32 length prefix")]
    LengthOverflow { kind: &'static str, len: usize },

    /// A dynamic value does not have the shape its schema requires
    #[error("expected a value of type {expected}, found {found}")]
    TypeMismatch { expected: WireType, found: WireType },

    /// A dynamic struct value does not list the schema's fields in order
    #[error("expected struct field `{expected}`, found `{found}`")]
    FieldMismatch { expected: String, found: String },

    /// The requested API version has a layout this crate does not implement
    #[error("{api_key:?} version {version} is not supported (supported {min}..={max})")]
    UnsupportedVersion {
        api_key: ApiKey,
        version: i16,
        min: i16,
        max: i16,
    },
}

/// Errors raised while reading values back out of wire bytes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer ended before the current field did
    #[error("insufficient data: needed {needed} bytes, {remaining} remaining")]
    InsufficientData { needed: usize, remaining: usize },

    /// A string field holds malformed UTF-8
    #[error("invalid UTF-8 in string field: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    /// A length or count prefix is negative where no null is allowed, or too large
    #[error("invalid {kind} length: {len}")]
    InvalidLength { kind: &'static str, len: i64 },

    /// The schema uses a primitive the protocol cannot represent
    #[error(transparent)]
    UnsupportedType(#[from] UnsupportedType),

    /// An API key outside the known enumeration
    #[error("unknown API key: {0}")]
    UnknownApiKey(i16),

    /// A record's stored checksum disagrees with its contents
    #[error("corrupt record: stored checksum {expected:#010x}, computed {actual:#010x}")]
    CorruptRecord { expected: i32, actual: i32 },

    /// A length-bounded region had bytes left after its contents were decoded
    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EncodeError::StringTooLong(40_000);
        assert_eq!(
            err.to_string(),
            "string of 40000 bytes exceeds the maximum of 32767"
        );

        let err = DecodeError::InsufficientData {
            needed: 4,
            remaining: 1,
        };
        assert!(err.to_string().contains("needed 4 bytes"));

        let err: EncodeError = UnsupportedType(PrimitiveKind::Bool).into();
        assert_eq!(err.to_string(), "unsupported wire type: boolean");
    }
}
