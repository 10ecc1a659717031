//! Pluggable transports that perform the actual HTTP round-trip.
//!
//! # Design
//! `Transport::send` returns `Ok(None)` when the round-trip finished without
//! producing a response; the executor reports that as `EmptyResponse`.
//! Closures with the same signature implement the trait, which is how tests
//! fake the network.

use std::time::Duration;

use tracing::warn;
use ureq::http::{HeaderName, HeaderValue};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes an `HttpRequest` and returns what came back.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<Option<HttpResponse>, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<Option<HttpResponse>, TransportError> + Send + Sync,
{
    fn send(&self, request: &HttpRequest) -> Result<Option<HttpResponse>, TransportError> {
        self(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// Status codes are returned as data; only connection-level failures become
/// `TransportError`s.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// `None` leaves ureq's default (no global timeout).
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<Option<HttpResponse>, TransportError> {
        let url = request.url.as_str();
        let headers = request.headers.as_slice();

        let mut response = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => apply_headers(self.agent.get(url), headers).call(),
            (HttpMethod::Delete, _) => apply_headers(self.agent.delete(url), headers).call(),
            (HttpMethod::Post, Some(body)) => {
                apply_headers(self.agent.post(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => apply_headers(self.agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                apply_headers(self.agent.put(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => apply_headers(self.agent.put(url), headers).send_empty(),
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| header_pair(name, value))
            .collect();
        // Read everything: exports can exceed ureq's default body limit.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        Ok(Some(HttpResponse {
            status,
            headers,
            body,
        }))
    }
}

/// Header values with bytes outside visible ASCII are kept, with invalid
/// UTF-8 replaced, so a header like `Content-Type` is never silently lost.
fn header_pair(name: &HeaderName, value: &HeaderValue) -> (String, String) {
    let value = match value.to_str() {
        Ok(v) => v.to_string(),
        Err(_) => {
            warn!(header = name.as_str(), "response header value is not visible ASCII");
            String::from_utf8_lossy(value.as_bytes()).into_owned()
        }
    };
    (name.as_str().to_string(), value)
}

fn apply_headers<B>(
    builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    headers
        .iter()
        .fold(builder, |b, (name, value)| b.header(name.as_str(), value.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_is_a_transport() {
        let transport = |req: &HttpRequest| -> Result<Option<HttpResponse>, TransportError> {
            Ok(Some(HttpResponse::new(200, req.url.clone())))
        };
        let resp = transport
            .send(&HttpRequest::get("http://localhost/x"))
            .unwrap()
            .unwrap();
        assert_eq!(resp.body, b"http://localhost/x");
    }

    #[test]
    fn header_pair_keeps_visible_ascii() {
        let (name, value) = header_pair(
            &HeaderName::from_static("content-type"),
            &HeaderValue::from_static("text/csv"),
        );
        assert_eq!((name.as_str(), value.as_str()), ("content-type", "text/csv"));
    }

    #[test]
    fn header_pair_keeps_non_ascii_value() {
        let value = HeaderValue::from_bytes(b"attachment; filename=\"r\xe9sum\xe9.pdf\"").unwrap();
        let (name, value) = header_pair(&HeaderName::from_static("content-disposition"), &value);
        assert_eq!(name, "content-disposition");
        assert_eq!(value, "attachment; filename=\"r\u{fffd}sum\u{fffd}.pdf\"");
    }

    #[test]
    fn connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = UreqTransport::new()
            .send(&HttpRequest::get(format!("http://{addr}/v3/REST/contact")))
            .unwrap_err();
        assert!(err.get_ref().downcast_ref::<ureq::Error>().is_some());
    }
}
