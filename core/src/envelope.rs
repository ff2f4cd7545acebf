//! SOAP 1.1 envelope codec.
//!
//! # Design
//! The envelope always declares the same three namespaces and is never
//! configurable. The body is carried as opaque inner XML: it is written out
//! verbatim and read back verbatim, without being parsed into a tree. Reading
//! resolves namespaces so that `Envelope` and `Body` are recognised under any
//! prefix (or the default namespace) as long as they are bound to the SOAP
//! envelope URI.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use quick_xml::Writer;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::SoapError;

pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
pub const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

const ENVELOPE_TAG: &str = "soap:Envelope";
const BODY_TAG: &str = "soap:Body";

/// Body of a SOAP envelope, holding raw inner XML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapBody {
    pub content: String,
}

/// A SOAP 1.1 envelope around a single body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapEnvelope {
    pub body: SoapBody,
}

impl SoapEnvelope {
    /// An envelope with an empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// An envelope whose body holds `content` as-is.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            body: SoapBody {
                content: content.into(),
            },
        }
    }

    /// The `xmlns:*` declarations written on every envelope, in order.
    pub fn namespaces() -> [(&'static str, &'static str); 3] {
        [
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xmlns:xsd", XSD_NAMESPACE),
            ("xmlns:soap", SOAP_ENVELOPE_NAMESPACE),
        ]
    }

    /// Serialize the envelope. The body content is inserted without escaping.
    pub fn to_xml(&self) -> Result<String, SoapError> {
        let mut writer = Writer::new(Vec::with_capacity(256 + self.body.content.len()));

        emit(
            &mut writer,
            Event::Start(BytesStart::new(ENVELOPE_TAG).with_attributes(Self::namespaces())),
        )?;
        emit(&mut writer, Event::Start(BytesStart::new(BODY_TAG)))?;
        emit(&mut writer, Event::Text(BytesText::from_escaped(self.body.content.as_str())))?;
        emit(&mut writer, Event::End(BytesEnd::new(BODY_TAG)))?;
        emit(&mut writer, Event::End(BytesEnd::new(ENVELOPE_TAG)))?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| SoapError::SerializationError(e.to_string()))
    }

    /// Parse an envelope, capturing the raw inner XML of its `Body`.
    ///
    /// A missing `Body` yields an empty body rather than an error. Anything
    /// after the closing `Envelope` tag is ignored.
    pub fn from_xml(xml: &str) -> Result<Self, SoapError> {
        let mut reader = NsReader::from_str(xml);

        loop {
            let (ns, event) = reader.read_resolved_event().map_err(malformed)?;
            let in_soap_ns = is_soap_namespace(&ns);
            match event {
                Event::Start(e) => {
                    check_root(in_soap_ns, &e)?;
                    let content = read_envelope_children(&mut reader)?;
                    trace!(len = content.len(), "parsed SOAP envelope");
                    return Ok(Self::with_content(content));
                }
                Event::Empty(e) => {
                    check_root(in_soap_ns, &e)?;
                    return Ok(Self::new());
                }
                Event::Eof => {
                    return Err(SoapError::DeserializationError(
                        "missing Envelope element".to_string(),
                    ))
                }
                _ => {}
            }
        }
    }

    /// Decode the body content into a caller-defined type.
    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T, SoapError> {
        quick_xml::de::from_str(&self.body.content)
            .map_err(|e| SoapError::DeserializationError(e.to_string()))
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), SoapError> {
    writer
        .write_event(event)
        .map_err(|e| SoapError::SerializationError(e.to_string()))
}

fn malformed(err: quick_xml::Error) -> SoapError {
    SoapError::DeserializationError(err.to_string())
}

fn is_soap_namespace(ns: &ResolveResult<'_>) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SOAP_ENVELOPE_NAMESPACE.as_bytes())
}

fn check_root(in_soap_ns: bool, start: &BytesStart<'_>) -> Result<(), SoapError> {
    if in_soap_ns && start.local_name().as_ref() == b"Envelope" {
        return Ok(());
    }
    Err(SoapError::DeserializationError(format!(
        "expected SOAP Envelope element, found <{}>",
        String::from_utf8_lossy(start.name().as_ref())
    )))
}

/// Walk the children of an open `Envelope` up to its closing tag and return
/// the inner XML of the first SOAP `Body`.
fn read_envelope_children(reader: &mut NsReader<&[u8]>) -> Result<String, SoapError> {
    let mut body: Option<String> = None;

    loop {
        let (ns, event) = reader.read_resolved_event().map_err(malformed)?;
        let in_soap_ns = is_soap_namespace(&ns);
        let is_body = |e: &BytesStart<'_>| in_soap_ns && e.local_name().as_ref() == b"Body";
        match event {
            Event::Start(e) => {
                let wanted = body.is_none() && is_body(&e);
                let end = e.to_end().into_owned();
                if wanted {
                    let inner = reader.read_text(end.name()).map_err(malformed)?;
                    body = Some(inner.into_owned());
                } else {
                    reader.read_to_end(end.name()).map_err(malformed)?;
                }
            }
            Event::Empty(e) => {
                if body.is_none() && is_body(&e) {
                    body = Some(String::new());
                }
            }
            Event::End(_) => return Ok(body.unwrap_or_default()),
            Event::Eof => {
                return Err(SoapError::DeserializationError(
                    "unexpected end of document inside Envelope".to_string(),
                ))
            }
            _ => {}
        }
    }
}
