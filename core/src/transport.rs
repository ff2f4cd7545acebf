//! The network hop between `build_request` and `parse_response`.
//!
//! # Design
//! `Transport` is the only seam that performs I/O. `UreqTransport` builds a
//! fresh agent for every request and disables ureq's status-code-as-error
//! behavior, so 4xx/5xx bodies (SOAP faults in particular) come back as data.
//! No timeout is configured; ureq's defaults apply. The body is read in
//! full, without ureq's default size cap.

use ureq::Agent;

use crate::error::SoapError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes an `HttpRequest` as an HTTP POST and returns the full response.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, SoapError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, SoapError> {
        (**self).send(request)
    }
}

/// Blocking transport backed by `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, SoapError> {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();

        let mut builder = agent.post(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder
            .send(request.body.as_bytes())
            .map_err(|e| SoapError::TransportError(e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(|e| SoapError::TransportError(e.to_string()))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
