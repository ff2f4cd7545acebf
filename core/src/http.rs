//! HTTP transport types exchanged between the client and a `Transport`.
//!
//! # Design
//! Requests and responses are plain data. `SoapClient` builds an
//! `HttpRequest` and parses an `HttpResponse`; the transport in between is the
//! only place that touches the network, which keeps envelope handling
//! deterministic and lets tests substitute a recording transport.

/// A SOAP request described as plain data. The method is always POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` after executing an `HttpRequest`, then passed to
/// `SoapClient::parse_response`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase accompanying the status code, e.g. `Internal Server Error`.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// The status line as `"<code> <reason>"`, or just the code when no
    /// reason phrase is known.
    pub fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }
}
