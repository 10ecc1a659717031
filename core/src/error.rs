//! Error types for the request executor.
//!
//! # Design
//! Every failure reaches the caller unchanged. Transport failures keep the
//! transport's own error as their source so callers can downcast it; decode
//! failures keep the decoder's error. `EmptyResponse` is the only error the
//! executor synthesizes itself.

use std::error::Error as StdError;
use std::fmt;

/// Errors returned by `PendingCall::execute`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The transport could not complete the round-trip.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The transport reported neither a response nor an error.
    #[error("empty response")]
    EmptyResponse,

    /// A `application/json` body could not be decoded into the target.
    #[error("json decoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A `text/csv` body could not be parsed into rows.
    #[error("csv decoding failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure reported by a `Transport`.
///
/// Wraps the transport's own error without altering it; `get_ref` and
/// `source` hand it back.
pub struct TransportError {
    inner: Box<dyn StdError + Send + Sync>,
}

impl TransportError {
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self {
            inner: error.into(),
        }
    }

    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner
    }

    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync> {
        self.inner
    }
}

impl fmt::Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.inner)
    }
}

impl From<ureq::Error> for TransportError {
    fn from(error: ureq::Error) -> Self {
        Self::new(error)
    }
}

impl From<std::io::Error> for TransportError {
    fn from(error: std::io::Error) -> Self {
        Self::new(error)
    }
}

/// Configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
#[error("invalid client configuration: {0}")]
pub struct ConfigError(#[from] Box<figment::Error>);

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        Self(Box::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn transport_error_keeps_original() {
        let err = TransportError::new(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(err.to_string(), "refused");
        let io_err = err.get_ref().downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::ConnectionRefused);
    }

    #[test]
    fn api_error_transport_is_transparent() {
        let err: ApiError = TransportError::new("dns lookup failed").into();
        assert_eq!(err.to_string(), "dns lookup failed");
        assert!(err.source().is_some());
    }

    #[test]
    fn empty_response_message() {
        assert_eq!(ApiError::EmptyResponse.to_string(), "empty response");
    }
}
