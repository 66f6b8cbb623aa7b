//! Common types and utilities shared by the kestrel crates

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error_code;
pub mod logging;

/// Re-export commonly used items
pub use error_code::ErrorCode;
pub use logging::init_logging;

/// Client identifier sent in request headers when none is configured
pub const DEFAULT_CLIENT_ID: &str = "kestrel";
