//! Request executor: merges headers, dispatches through the configured
//! transport and decodes the response body by content type.
//!
//! # Design
//! `RequestExecutor` holds the credentials and a lock-guarded transport slot.
//! Per-call state lives in a `PendingCall` value created by
//! `prepare_request` and consumed by `execute`, so nothing carries over from
//! one call to the next and concurrent callers never share pending state.
//! The transport is read once when `execute` starts; `configure` only affects
//! calls that start after it returns.

use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::decode::{decode_csv_rows, decode_json_envelope, ContentKind, Decoded};
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::transport::{Transport, UreqTransport};

/// Result of a completed call.
///
/// `count` and `total` come from a JSON envelope and are zero otherwise.
/// `status` is reported as received and not interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome<T> {
    pub status: u16,
    pub count: i64,
    pub total: i64,
    pub data: Decoded<T>,
}

/// Executes prepared requests against the email API.
pub struct RequestExecutor {
    credentials: Credentials,
    transport: RwLock<Arc<dyn Transport>>,
}

impl RequestExecutor {
    /// Executor using a default `UreqTransport`.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_transport(credentials, UreqTransport::new())
    }

    pub fn with_transport(credentials: Credentials, transport: impl Transport + 'static) -> Self {
        Self {
            credentials,
            transport: RwLock::new(Arc::new(transport)),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(
            config.credentials(),
            UreqTransport::with_timeout(config.timeout()),
        )
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn api_key_public(&self) -> &str {
        self.credentials.public_key()
    }

    pub fn api_key_private(&self) -> &str {
        self.credentials.private_key()
    }

    /// Replace the transport used by calls that start from now on.
    pub fn configure(&self, transport: impl Transport + 'static) {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        *self
            .transport
            .write()
            .unwrap_or_else(PoisonError::into_inner) = transport;
    }

    /// Handle to the transport currently configured.
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(
            &self
                .transport
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Stamp this executor's Basic credentials onto `request`.
    pub fn authorize(&self, request: &mut HttpRequest) {
        self.credentials.authorize(request);
    }

    /// Begin a call for `request`. Chain `with_headers` and `decode_into`,
    /// then `execute`.
    pub fn prepare_request(&self, request: HttpRequest) -> PendingCall<'_, ()> {
        PendingCall {
            executor: self,
            request,
            headers: Vec::new(),
            decode: false,
            target: PhantomData,
        }
    }

    /// One-shot call that leaves the body undecoded.
    pub fn execute(
        &self,
        request: HttpRequest,
        headers: &[(String, String)],
    ) -> Result<CallOutcome<()>, ApiError> {
        self.prepare_request(request)
            .with_headers(headers.iter().cloned())
            .execute()
    }

    /// One-shot call decoding a JSON envelope's `Data` into `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
        headers: &[(String, String)],
    ) -> Result<CallOutcome<T>, ApiError> {
        self.prepare_request(request)
            .with_headers(headers.iter().cloned())
            .decode_into::<T>()
            .execute()
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// A request waiting to be executed, with its extra headers and decode target.
#[must_use = "a pending call does nothing until `execute` is called"]
pub struct PendingCall<'a, T> {
    executor: &'a RequestExecutor,
    request: HttpRequest,
    headers: Vec<(String, String)>,
    decode: bool,
    target: PhantomData<fn() -> T>,
}

impl<'a, T> PendingCall<'a, T> {
    /// Headers to merge into the request. Replaces any set given earlier.
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Decode the response into `U`: a JSON envelope's `Data`, or rows for CSV.
    pub fn decode_into<U: DeserializeOwned>(self) -> PendingCall<'a, U> {
        PendingCall {
            executor: self.executor,
            request: self.request,
            headers: self.headers,
            decode: true,
            target: PhantomData,
        }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }
}

impl<T: DeserializeOwned> PendingCall<'_, T> {
    /// Run the call. Blocks until the transport returns.
    pub fn execute(self) -> Result<CallOutcome<T>, ApiError> {
        let PendingCall {
            executor,
            mut request,
            headers,
            decode,
            ..
        } = self;

        request.merge_headers(&headers);
        let transport = executor.transport();

        debug!(
            method = request.method.as_str(),
            url = %request.url,
            headers = request.headers.len(),
            "dispatching request"
        );

        let response = match transport.send(&request) {
            Ok(Some(response)) => response,
            Ok(None) => {
                warn!(url = %request.url, "transport returned no response");
                return Err(ApiError::EmptyResponse);
            }
            Err(err) => {
                warn!(url = %request.url, error = %err, "transport failed");
                return Err(err.into());
            }
        };

        let kind = ContentKind::classify(response.content_type());
        let mut outcome = CallOutcome {
            status: response.status,
            count: 0,
            total: 0,
            data: Decoded::Undecoded,
        };

        if decode {
            let decoded = match kind {
                ContentKind::Json => decode_json_envelope::<T>(&response.body).map(
                    |(count, total, data)| {
                        outcome.count = count;
                        outcome.total = total;
                        Decoded::Json(data)
                    },
                ),
                ContentKind::Csv => decode_csv_rows(&response.body).map(Decoded::Rows),
                ContentKind::Other => Ok(Decoded::Undecoded),
            };
            outcome.data = decoded.inspect_err(|err| {
                warn!(url = %request.url, error = %err, "response decoding failed");
            })?;
        }

        debug!(
            status = outcome.status,
            content_type = response.content_type().unwrap_or(""),
            count = outcome.count,
            total = outcome.total,
            "request completed"
        );
        Ok(outcome)
    }
}
