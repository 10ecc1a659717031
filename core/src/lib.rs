//! Blocking request executor for the email-service REST API.
//!
//! # Overview
//! A higher-level API client builds an `HttpRequest`, hands it to a
//! `RequestExecutor` together with any extra headers, and gets back the
//! decoded body: the `Data` of a JSON envelope plus its `Count`/`Total`
//! counters, or string rows for a CSV export.
//!
//! # Design
//! - `RequestExecutor` owns the API credentials and a replaceable
//!   `Transport`; `UreqTransport` is the default.
//! - Per-call state is an owned `PendingCall` that `execute` consumes, so
//!   calls sharing one executor never observe each other's headers.
//! - Decoding is chosen by the exact first `Content-Type` value:
//!   `application/json`, `text/csv`, anything else stays undecoded.
//! - No retries, backoff or status interpretation; every failure is returned
//!   to the caller as an `ApiError`.

pub mod config;
pub mod credentials;
pub mod decode;
pub mod error;
pub mod executor;
pub mod http;
pub mod transport;

pub use config::ClientConfig;
pub use credentials::Credentials;
pub use decode::{ContentKind, Decoded};
pub use error::{ApiError, ConfigError, TransportError};
pub use executor::{CallOutcome, PendingCall, RequestExecutor};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
