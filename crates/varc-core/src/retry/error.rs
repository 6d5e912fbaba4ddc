//! Fetch error type for retry classification.

use std::fmt;

/// Error returned by a single byte-range fetch.
/// Typed so the retry policy can classify it before it is converted to anyhow.
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection reset, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Socket-level I/O failure from a non-curl transport.
    Io(std::io::Error),
    /// Transfer completed but the body length did not match the requested
    /// range (e.g. server closed early). Enables retry instead of silent corruption.
    LengthMismatch { expected: u64, received: u64 },
    /// Response was well-formed HTTP but violated the service protocol
    /// (e.g. an unparseable body). Not retried.
    Protocol(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::Io(e) => write!(f, "io: {}", e),
            FetchError::LengthMismatch { expected, received } => {
                write!(f, "length mismatch: expected {} bytes, got {}", expected, received)
            }
            FetchError::Protocol(msg) => write!(f, "protocol: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Io(e) => Some(e),
            FetchError::Http(_)
            | FetchError::LengthMismatch { .. }
            | FetchError::Protocol(_) => None,
        }
    }
}
