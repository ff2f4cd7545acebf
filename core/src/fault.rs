//! SOAP 1.1 fault parsing.
//!
//! A fault is read from the raw inner XML of a response body. The `Fault`
//! element may carry any prefix; its `faultcode`, `faultstring` and `detail`
//! children are unqualified.

use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::SoapError;

/// An application-level failure reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapFault {
    /// Machine-readable code, e.g. `soap:Server`.
    pub code: String,
    /// Human-readable message from `faultstring`.
    pub message: String,
    /// Raw inner XML of `detail`, if the element was present.
    pub detail: Option<String>,
}

impl SoapFault {
    /// Parse body content whose first element is a `Fault`.
    pub fn from_xml(content: &str) -> Result<Self, SoapError> {
        let mut reader = Reader::from_str(content);

        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(e) if e.local_name().as_ref() == b"Fault" => {
                    return read_fault_fields(&mut reader);
                }
                Event::Empty(e) if e.local_name().as_ref() == b"Fault" => return Ok(Self::default()),
                Event::Start(e) | Event::Empty(e) => {
                    return Err(SoapError::DeserializationError(format!(
                        "expected Fault element, found <{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    )))
                }
                Event::Eof => {
                    return Err(SoapError::DeserializationError("missing Fault element".to_string()))
                }
                _ => {}
            }
        }
    }
}

fn malformed(err: quick_xml::Error) -> SoapError {
    SoapError::DeserializationError(err.to_string())
}

fn unescaped(raw: &[u8]) -> Result<String, SoapError> {
    let raw = std::str::from_utf8(raw).map_err(|e| SoapError::DeserializationError(e.to_string()))?;
    unescape(raw)
        .map(|text| text.into_owned())
        .map_err(|e| SoapError::DeserializationError(e.to_string()))
}

/// Character data of the element just opened, up to its closing tag. Text,
/// CDATA sections and entity references are decoded; nested markup is skipped.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, SoapError> {
    let mut text = String::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Text(t) => text.push_str(&unescaped(&t)?),
            Event::CData(c) => {
                let data = std::str::from_utf8(&c).map_err(|e| SoapError::DeserializationError(e.to_string()))?;
                text.push_str(data);
            }
            Event::GeneralRef(r) => {
                let name = String::from_utf8_lossy(&r);
                text.push_str(&unescaped(format!("&{name};").as_bytes())?);
            }
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(text),
            Event::End(_) => depth -= 1,
            Event::Eof => {
                return Err(SoapError::DeserializationError(
                    "unexpected end of document inside Fault".to_string(),
                ))
            }
            _ => {}
        }
    }
}

fn read_fault_fields(reader: &mut Reader<&[u8]>) -> Result<SoapFault, SoapError> {
    let mut fault = SoapFault::default();

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"faultcode" => fault.code = read_text_content(reader)?,
                b"faultstring" => fault.message = read_text_content(reader)?,
                b"detail" => {
                    let end = e.to_end().into_owned();
                    let raw = reader.read_text(end.name()).map_err(malformed)?;
                    fault.detail = Some(raw.into_owned());
                }
                _ => {
                    let end = e.to_end().into_owned();
                    reader.read_to_end(end.name()).map_err(malformed)?;
                }
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"detail" {
                    fault.detail = Some(String::new());
                }
            }
            Event::End(_) => return Ok(fault),
            Event::Eof => {
                return Err(SoapError::DeserializationError(
                    "unexpected end of document inside Fault".to_string(),
                ))
            }
            _ => {}
        }
    }
}
