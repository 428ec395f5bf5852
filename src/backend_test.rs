use super::*;
use crate::test_helpers::{MockTransport, login_body, ok_json, status};
use crate::transport::RequestBody;
use serde_json::json;

// =============================================================================
// error_detail
// =============================================================================

#[test]
fn detail_string_is_returned() {
    assert_eq!(error_detail(r#"{"detail":"Incorrect email or password"}"#).as_deref(), Some("Incorrect email or password"));
}

#[test]
fn detail_structured_is_json_text() {
    let detail = error_detail(r#"{"detail":[{"loc":["body","username"],"msg":"field required"}]}"#).unwrap();
    assert!(detail.contains("field required"));
}

#[test]
fn detail_missing_or_empty_is_none() {
    assert_eq!(error_detail("{}"), None);
    assert_eq!(error_detail(r#"{"detail":""}"#), None);
    assert_eq!(error_detail(r#"{"detail":null}"#), None);
    assert_eq!(error_detail("<html>502</html>"), None);
}

// =============================================================================
// parse_login_response
// =============================================================================

#[test]
fn login_success_parses_tokens() {
    let parsed = parse_login_response(&ApiResponse::new(200, login_body("a", "r").to_string())).unwrap();
    assert_eq!(parsed.access_token, "a");
    assert_eq!(parsed.refresh_token, "r");
    assert_eq!(parsed.user_id, "u-1");
    assert_eq!(parsed.email, "ada@example.com");
}

#[test]
fn login_rejection_carries_detail() {
    let err = parse_login_response(&ApiResponse::new(401, r#"{"detail":"Incorrect email or password"}"#)).unwrap_err();
    match err {
        SessionError::CredentialsRejected { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect email or password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn login_rejection_without_detail_uses_fallback() {
    let err = parse_login_response(&ApiResponse::new(500, "Internal Server Error")).unwrap_err();
    assert_eq!(err.to_string(), "Login failed");
}

#[test]
fn login_success_missing_field_is_parse_error() {
    let err = parse_login_response(&ApiResponse::new(200, r#"{"access_token":"a"}"#)).unwrap_err();
    assert!(matches!(err, SessionError::Parse(_)));
}

// =============================================================================
// parse_refresh_response
// =============================================================================

#[test]
fn refresh_without_rotation() {
    let parsed = parse_refresh_response(&ApiResponse::new(200, r#"{"access_token":"a2","token_type":"bearer"}"#)).unwrap();
    assert_eq!(parsed.access_token, "a2");
    assert_eq!(parsed.refresh_token, None);
}

#[test]
fn refresh_with_rotation() {
    let parsed = parse_refresh_response(&ApiResponse::new(200, r#"{"access_token":"a2","refresh_token":"r2"}"#)).unwrap();
    assert_eq!(parsed.refresh_token.as_deref(), Some("r2"));
}

#[test]
fn refresh_non_success_is_rejected() {
    let err = parse_refresh_response(&ApiResponse::new(401, "{}")).unwrap_err();
    assert_eq!(err, RefreshFailure::Rejected { status: 401 });
}

#[test]
fn refresh_malformed_body() {
    assert!(matches!(
        parse_refresh_response(&ApiResponse::new(200, "not json")),
        Err(RefreshFailure::Malformed(_))
    ));
    assert!(matches!(
        parse_refresh_response(&ApiResponse::new(200, r#"{"access_token":""}"#)),
        Err(RefreshFailure::Malformed(_))
    ));
}

// =============================================================================
// Backend over a mock transport
// =============================================================================

#[tokio::test]
async fn login_sends_form_credentials_without_bearer() {
    let transport = Arc::new(MockTransport::new(|_, _| ok_json(login_body("a", "r"))));
    let backend = Backend::new(transport.clone());

    backend.login("ada@example.com", "hunter2").await.unwrap();

    let calls = transport.calls_to("/auth/login");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].bearer, None);
    assert_eq!(
        calls[0].request.body,
        RequestBody::Form(vec![
            ("username".into(), "ada@example.com".into()),
            ("password".into(), "hunter2".into()),
        ])
    );
}

#[tokio::test]
async fn logout_sends_refresh_token_with_bearer() {
    let transport = Arc::new(MockTransport::new(|_, _| ok_json(json!({ "message": "Logged out successfully" }))));
    let backend = Backend::new(transport.clone());

    backend.logout("a", "r").await.unwrap();

    let calls = transport.calls_to("/auth/logout");
    assert_eq!(calls[0].bearer.as_deref(), Some("a"));
    assert_eq!(calls[0].request.body, RequestBody::Json(json!({ "refresh_token": "r" })));
}

#[tokio::test]
async fn logout_non_success_is_error() {
    let transport = Arc::new(MockTransport::new(|_, _| status(500, json!({ "detail": "Logout failed" }))));
    let err = Backend::new(transport).logout("a", "r").await.unwrap_err();
    assert!(matches!(err, SessionError::Api { status: 500, .. }));
}

#[tokio::test]
async fn refresh_transport_failure_is_terminal() {
    let transport = Arc::new(MockTransport::new(|_, _| Err(crate::error::TransportError::Request("down".into()))));
    let err = Backend::new(transport).refresh("r").await.unwrap_err();
    assert!(matches!(err, RefreshFailure::Transport(_)));
}

#[tokio::test]
async fn register_sends_defaults() {
    let transport = Arc::new(MockTransport::new(|_, _| {
        status(201, json!({ "message": "User registered successfully", "user_id": "u-9", "email": "new@example.com" }))
    }));
    let backend = Backend::new(transport.clone());
    let registration = Registration {
        email: "new@example.com".into(),
        password: "pw".into(),
        confirm_password: "pw".into(),
        full_name: Some("New Person".into()),
        skills: vec!["rust".into(), "welding".into()],
    };

    let user = backend.register(&registration).await.unwrap();
    assert_eq!(user, RegisteredUser { user_id: "u-9".into(), email: "new@example.com".into() });

    let calls = transport.calls_to("/auth/register");
    let RequestBody::Json(body) = &calls[0].request.body else {
        panic!("expected JSON body");
    };
    assert_eq!(body["full_name"], "New Person");
    assert_eq!(body["skills"], json!(["rust", "welding"]));
    assert_eq!(body["interests"], json!([]));
    assert_eq!(body["experience"], "Entry Level");
    assert!(body.get("confirm_password").is_none());
}

#[tokio::test]
async fn register_rejection_carries_detail() {
    let transport = Arc::new(MockTransport::new(|_, _| status(400, json!({ "detail": "Email already registered" }))));
    let err = Backend::new(transport).register(&Registration::default()).await.unwrap_err();
    assert!(matches!(err, SessionError::RegistrationRejected { status: 400, ref message } if message == "Email already registered"));
}
