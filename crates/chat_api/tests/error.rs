use reqwest::StatusCode;

use chat_api::ChatApiError;

#[test]
fn status_error_displays_code_and_raw_body() {
    let error = ChatApiError::Status(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string());
    assert_eq!(error.to_string(), "500 - boom");
}

#[test]
fn status_body_is_not_parsed_even_when_json() {
    let body = r#"{"detail":"agent crashed"}"#;
    let error = ChatApiError::Status(StatusCode::BAD_GATEWAY, body.to_string());
    assert_eq!(error.to_string(), r#"502 - {"detail":"agent crashed"}"#);
}

#[test]
fn empty_status_body_stays_empty() {
    let error = ChatApiError::Status(StatusCode::SERVICE_UNAVAILABLE, String::new());
    assert_eq!(error.to_string(), "503 - ");
}
