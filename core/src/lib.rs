//! Minimal SOAP 1.1 client core.
//!
//! # Overview
//! Wraps a caller-supplied payload in a SOAP envelope, POSTs it with the
//! `Content-Type` and `SOAPAction` headers SOAP 1.1 endpoints expect, and
//! unwraps the response envelope, surfacing SOAP faults as errors.
//!
//! # Design
//! - `SoapClient` is stateless. Every call builds its own envelope, request
//!   and HTTP agent, so clients can be shared across threads freely.
//! - Each call is split into `build_request` (produces an `HttpRequest`) and
//!   `parse_response` (consumes an `HttpResponse`), with the network hop in
//!   between delegated to a `Transport`.
//! - The body of an envelope is opaque inner XML. The client never looks
//!   inside a payload beyond serializing it.
//! - Only HTTP 500 is treated as a fault signal. Every other status with a
//!   well-formed envelope is returned as success and left to the caller.

pub mod client;
pub mod envelope;
pub mod error;
pub mod fault;
pub mod http;
pub mod transport;

pub use client::{call_service, SoapClient, SoapRequest};
pub use envelope::{SoapBody, SoapEnvelope, SOAP_ENVELOPE_NAMESPACE, XSD_NAMESPACE, XSI_NAMESPACE};
pub use error::SoapError;
pub use fault::SoapFault;
pub use http::{HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
