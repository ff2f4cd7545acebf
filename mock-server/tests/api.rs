use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, envelope, RecordedRequest, ADD_ACTION, DIVIDE_ACTION};
use tower::ServiceExt;

async fn body_string(response: axum::response::Response) -> String {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn soap_request(uri: &str, action: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "text/xml; charset=utf-8")
        .header("SOAPAction", action)
        .body(envelope(body))
        .unwrap()
}

// --- calculator ---

#[tokio::test]
async fn add_returns_200_with_result() {
    let resp = app()
        .oneshot(soap_request("/calculator", ADD_ACTION, "<Add><a>2</a><b>3</b></Add>"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "text/xml; charset=utf-8"
    );
    let body = body_string(resp).await;
    assert!(body.contains("<AddResponse><AddResult>5</AddResult></AddResponse>"));
}

#[tokio::test]
async fn divide_returns_quotient() {
    let resp = app()
        .oneshot(soap_request("/calculator", DIVIDE_ACTION, "<Divide><a>9</a><b>3</b></Divide>"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("<DivideResult>3</DivideResult>"));
}

#[tokio::test]
async fn divide_by_zero_returns_fault() {
    let resp = app()
        .oneshot(soap_request("/calculator", DIVIDE_ACTION, "<Divide><a>1</a><b>0</b></Divide>"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(resp).await;
    assert!(body.contains("<faultcode>soap:Server</faultcode>"));
    assert!(body.contains("<faultstring>Division by zero</faultstring>"));
}

#[tokio::test]
async fn unknown_action_returns_client_fault() {
    let resp = app()
        .oneshot(soap_request("/calculator", "urn:Multiply", "<Multiply><a>1</a><b>2</b></Multiply>"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(resp).await;
    assert!(body.contains("<faultcode>soap:Client</faultcode>"));
    assert!(body.contains("Unknown SOAPAction: urn:Multiply"));
}

#[tokio::test]
async fn add_overflow_returns_client_fault() {
    let max = i64::MAX;
    let resp = app()
        .oneshot(soap_request("/calculator", ADD_ACTION, &format!("<Add><a>{max}</a><b>1</b></Add>")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(resp).await;
    assert!(body.contains("<faultcode>soap:Client</faultcode>"));
    assert!(body.contains("<faultstring>Integer overflow</faultstring>"));
}

#[tokio::test]
async fn unknown_action_with_markup_is_escaped() {
    let resp = app()
        .oneshot(soap_request("/calculator", "urn:x<y>&z", "<X><a>1</a><b>2</b></X>"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(resp).await;
    assert!(body.contains("<faultstring>Unknown SOAPAction: urn:x&lt;y&gt;&amp;z</faultstring>"));
}

#[tokio::test]
async fn malformed_operands_return_client_fault() {
    let resp = app()
        .oneshot(soap_request("/calculator", ADD_ACTION, "<Add><a>x</a></Add>"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(resp).await.contains("Malformed request"));
}

#[tokio::test]
async fn get_on_calculator_is_rejected() {
    let resp = app()
        .oneshot(Request::builder().uri("/calculator").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// --- canned failures ---

#[tokio::test]
async fn broken_returns_500_without_fault() {
    let resp = app()
        .oneshot(soap_request("/broken", ADD_ACTION, "<Add/>"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(resp).await;
    assert!(body.contains("<Oops>"));
    assert!(!body.contains("Fault"));
}

#[tokio::test]
async fn gone_returns_404_with_envelope() {
    let resp = app()
        .oneshot(soap_request("/gone", ADD_ACTION, "<Add/>"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_string(resp).await.contains("<soap:Body><ServiceMoved>"));
}

// --- journal ---

#[tokio::test]
async fn journal_records_headers_and_body() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(soap_request("/calculator", ADD_ACTION, "<Add><a>1</a><b>1</b></Add>"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(soap_request("/gone", "", "<Ping/>"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(Request::builder().uri("/requests").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let journal: Vec<RecordedRequest> = serde_json::from_str(&body_string(resp).await).unwrap();

    assert_eq!(journal.len(), 2);
    assert_eq!(journal[0].path, "/calculator");
    assert_eq!(journal[0].soap_action.as_deref(), Some(ADD_ACTION));
    assert_eq!(journal[0].content_type.as_deref(), Some("text/xml; charset=utf-8"));
    assert_eq!(journal[0].body, envelope("<Add><a>1</a><b>1</b></Add>"));
    assert_eq!(journal[1].path, "/gone");
    assert_eq!(journal[1].soap_action.as_deref(), Some(""));
}
