//! Error types for the SOAP client.
//!
//! # Design
//! One variant per terminal failure of a call. `TransportError` displays only
//! the text it carries, so a 500 response with an unreadable fault surfaces as
//! the bare HTTP status line. `FaultError` keeps the whole parsed fault but
//! displays just its fault string.

use thiserror::Error;

use crate::fault::SoapFault;

/// Errors returned by `SoapClient` operations.
#[derive(Debug, Error)]
pub enum SoapError {
    /// The payload or the envelope could not be converted to XML. Raised
    /// before any network I/O happens.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request could not be delivered, the response body could not be
    /// read, or a 500 response carried no readable fault.
    #[error("{0}")]
    TransportError(String),

    /// The response body is not a well-formed SOAP envelope.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The server answered 500 with a well-formed SOAP fault.
    #[error("{}", .0.message)]
    FaultError(SoapFault),
}

impl SoapError {
    /// The parsed fault, when the server reported one.
    pub fn fault(&self) -> Option<&SoapFault> {
        match self {
            SoapError::FaultError(fault) => Some(fault),
            _ => None,
        }
    }
}
