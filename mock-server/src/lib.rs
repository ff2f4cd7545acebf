use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use quick_xml::{escape::escape, events::Event, Reader};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub const ADD_ACTION: &str = "http://tempuri.org/Add";
pub const DIVIDE_ACTION: &str = "http://tempuri.org/Divide";

const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// A POST as received by the server, exposed through `GET /requests`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub path: String,
    pub soap_action: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

pub type Journal = Arc<RwLock<Vec<RecordedRequest>>>;

pub fn app() -> Router {
    let journal: Journal = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/calculator", post(calculator))
        .route("/broken", post(broken))
        .route("/gone", post(gone))
        .route("/requests", get(list_requests))
        .with_state(journal)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock SOAP server listening");
    }
    axum::serve(listener, app()).await
}

/// Wrap `body` in a SOAP 1.1 envelope.
pub fn envelope(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\
         <soap:Body>{body}</soap:Body></soap:Envelope>"
    )
}

fn fault(code: &str, message: &str) -> String {
    envelope(&format!(
        "<soap:Fault><faultcode>{}</faultcode><faultstring>{}</faultstring><detail/></soap:Fault>",
        escape(code),
        escape(message)
    ))
}

fn xml(status: StatusCode, body: String) -> impl IntoResponse {
    (status, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

async fn record(journal: &Journal, path: &str, headers: &HeaderMap, body: &str) -> Option<String> {
    let soap_action = header_value(headers, "soapaction");
    debug!(path, action = ?soap_action, "recorded SOAP request");
    journal.write().await.push(RecordedRequest {
        path: path.to_string(),
        soap_action: soap_action.clone(),
        content_type: header_value(headers, "content-type"),
        body: body.to_string(),
    });
    soap_action
}

async fn calculator(
    State(journal): State<Journal>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let action = record(&journal, "/calculator", &headers, &body).await.unwrap_or_default();

    let Some((a, b)) = parse_operands(&body) else {
        return xml(
            StatusCode::INTERNAL_SERVER_ERROR,
            fault("soap:Client", "Malformed request"),
        );
    };

    match action.as_str() {
        ADD_ACTION => match a.checked_add(b) {
            Some(sum) => xml(
                StatusCode::OK,
                envelope(&format!("<AddResponse><AddResult>{sum}</AddResult></AddResponse>")),
            ),
            None => xml(
                StatusCode::INTERNAL_SERVER_ERROR,
                fault("soap:Client", "Integer overflow"),
            ),
        },
        DIVIDE_ACTION => match a.checked_div(b) {
            Some(quotient) => xml(
                StatusCode::OK,
                envelope(&format!(
                    "<DivideResponse><DivideResult>{quotient}</DivideResult></DivideResponse>"
                )),
            ),
            None => xml(
                StatusCode::INTERNAL_SERVER_ERROR,
                fault("soap:Server", "Division by zero"),
            ),
        },
        other => xml(
            StatusCode::INTERNAL_SERVER_ERROR,
            fault("soap:Client", &format!("Unknown SOAPAction: {other}")),
        ),
    }
}

/// Answers 500 with an envelope whose body is not a fault.
async fn broken(State(journal): State<Journal>, headers: HeaderMap, body: String) -> impl IntoResponse {
    record(&journal, "/broken", &headers, &body).await;
    xml(
        StatusCode::INTERNAL_SERVER_ERROR,
        envelope("<Oops>the server fell over</Oops>"),
    )
}

/// Answers 404 with a well-formed envelope.
async fn gone(State(journal): State<Journal>, headers: HeaderMap, body: String) -> impl IntoResponse {
    record(&journal, "/gone", &headers, &body).await;
    xml(
        StatusCode::NOT_FOUND,
        envelope("<ServiceMoved><Location>http://example.invalid/v2</Location></ServiceMoved>"),
    )
}

async fn list_requests(State(journal): State<Journal>) -> Json<Vec<RecordedRequest>> {
    Json(journal.read().await.clone())
}

/// Extract the integer `a` and `b` elements from anywhere in a request.
pub fn parse_operands(xml: &str) -> Option<(i64, i64)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut current: Vec<u8> = Vec::new();
    let (mut a, mut b) = (None, None);
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => current = e.local_name().as_ref().to_vec(),
            Event::End(_) => current.clear(),
            Event::Text(t) => {
                let value = std::str::from_utf8(&t).ok()?.parse::<i64>().ok();
                match current.as_slice() {
                    b"a" => a = value,
                    b"b" => b = value,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Some((a?, b?))
}
