//! Stateless SOAP request builder, response parser and call driver.
//!
//! # Design
//! `SoapClient` holds only its transport and carries no state between calls.
//! A call is `build_request` (serialize payload, wrap it, attach headers),
//! one `Transport::send`, then `parse_response` (unwrap the envelope, detect
//! faults). Serialization failures therefore happen before any I/O.
//!
//! HTTP 500 is the only status treated as a fault signal. A 404 or 401 that
//! still carries a well-formed envelope is returned as `Ok`, and callers
//! that care must inspect the envelope themselves.

use serde::Serialize;
use tracing::{debug, trace};

use crate::envelope::SoapEnvelope;
use crate::error::SoapError;
use crate::fault::SoapFault;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

const CONTENT_TYPE: &str = "text/xml; charset=utf-8";
const FAULT_STATUS: u16 = 500;

/// A request payload: any XML-serializable value that names its SOAP action.
///
/// The payload is serialized with quick-xml's serde support, so the root
/// element is the type name unless overridden with `#[serde(rename = ...)]`.
pub trait SoapRequest: Serialize {
    /// Value sent verbatim in the `SOAPAction` header. May be empty.
    fn soap_action(&self) -> &str;
}

/// Client for invoking SOAP 1.1 operations over HTTP.
#[derive(Debug, Clone, Default)]
pub struct SoapClient<T = UreqTransport> {
    transport: T,
}

impl SoapClient {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Transport> SoapClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Wrap `payload` in an envelope and describe the POST to `url`.
    ///
    /// The URL is not validated here; a malformed one fails in the transport.
    pub fn build_request<P>(&self, payload: &P, url: &str) -> Result<HttpRequest, SoapError>
    where
        P: SoapRequest,
    {
        let content = quick_xml::se::to_string(payload)
            .map_err(|e| SoapError::SerializationError(e.to_string()))?;
        let body = SoapEnvelope::with_content(content).to_xml()?;

        Ok(HttpRequest {
            url: url.to_string(),
            headers: vec![
                ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
                ("SOAPAction".to_string(), payload.soap_action().to_string()),
            ],
            body,
        })
    }

    /// Unwrap the response envelope, turning a 500 into a fault error.
    pub fn parse_response(&self, response: HttpResponse) -> Result<SoapEnvelope, SoapError> {
        let envelope = SoapEnvelope::from_xml(&response.body)?;

        if response.status == FAULT_STATUS {
            return match SoapFault::from_xml(&envelope.body.content) {
                Ok(fault) => Err(SoapError::FaultError(fault)),
                Err(_) => Err(SoapError::TransportError(response.status_line())),
            };
        }

        Ok(envelope)
    }

    /// Invoke the operation described by `payload` at `url`.
    pub fn call<P>(&self, payload: &P, url: &str) -> Result<SoapEnvelope, SoapError>
    where
        P: SoapRequest,
    {
        let request = self.build_request(payload, url)?;
        debug!(
            url,
            action = payload.soap_action(),
            bytes = request.body.len(),
            "sending SOAP request"
        );
        trace!(body = %request.body, "SOAP request envelope");

        let response = self.transport.send(&request)?;
        debug!(status = response.status, "received SOAP response");
        trace!(body = %response.body, "SOAP response envelope");

        self.parse_response(response)
    }
}

/// Invoke `payload` at `url` with a default client.
pub fn call_service<P>(payload: &P, url: &str) -> Result<SoapEnvelope, SoapError>
where
    P: SoapRequest,
{
    SoapClient::new().call(payload, url)
}
