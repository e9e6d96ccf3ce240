use serde_json::json;
use storefront_core::{CanonicalPayload, RequestSigner, SessionPhase, TokenStorage};
use storefront_adapters::DigestRequestSigner;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{TestApp, mint_jwt, path as api_path, secret};

#[tokio::test]
async fn login_persists_the_session_and_returns_to_the_requested_page() {
    let app = TestApp::spawn().await;
    let token = mint_jwt("alice@example.com", "ADMINISTRATOR");
    Mock::given(method("POST"))
        .and(path(api_path("/auth/login")))
        .and(body_partial_json(json!({"username": "alice", "password": "Passw0rd"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "welcome",
            "token": token
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let navigator = app.client.navigator();
    navigator.visit("/products/new");

    let phase = app
        .client
        .session()
        .login("alice", secret("Passw0rd"))
        .await
        .unwrap();

    assert_eq!(phase, SessionPhase::Authenticated);
    assert_eq!(navigator.after_login(), "/products/new");

    let state = app.client.session().state();
    let identity = state.identity().unwrap();
    assert_eq!(identity.display_name(), "alice");
    assert_eq!(identity.trusted_role(), Some(storefront_core::Role::Administrator));

    let restored = app.reopen();
    assert_eq!(restored.session().state().phase(), SessionPhase::Authenticated);
    assert_eq!(
        restored.session().state().identity().unwrap().display_name(),
        "alice"
    );
}

#[tokio::test]
async fn second_factor_flow_completes_with_the_challenge_token() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/login")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "codigo": 0,
            "mensaje": "OTP enviado",
            "requiereOtp": true,
            "tempToken": "challenge-123"
        })))
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/verify-second-factor")))
        .and(body_partial_json(json!({
            "code": "654321",
            "challengeToken": "challenge-123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "token": mint_jwt("42", "NORMAL_USER")
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let session = app.client.session();
    let phase = session.login("bob", secret("Passw0rd")).await.unwrap();
    assert_eq!(phase, SessionPhase::PendingSecondFactor);
    assert!(app.storage().load().unwrap().is_none());

    let phase = session.verify_second_factor("654321").await.unwrap();

    assert_eq!(phase, SessionPhase::Authenticated);
    assert_eq!(session.state().identity().unwrap().display_name(), "bob");
    assert!(app.storage().load().unwrap().is_some());
}

#[tokio::test]
async fn rejected_login_stays_anonymous() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/login")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "bad credentials"
        })))
        .mount(&app.server)
        .await;

    let result = app.client.session().login("alice", secret("wrong")).await;

    assert!(matches!(
        result,
        Err(storefront_application::LoginError::Authentication(_))
    ));
    assert_eq!(app.client.session().state().phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn logout_clears_the_persisted_token() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/login")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "token": mint_jwt("alice", "NORMAL_USER")
        })))
        .mount(&app.server)
        .await;

    app.client
        .session()
        .login("alice", secret("Passw0rd"))
        .await
        .unwrap();
    app.client.session().logout();
    app.client.session().logout();

    assert_eq!(app.client.session().state().phase(), SessionPhase::Anonymous);
    assert!(app.storage().load().unwrap().is_none());
    assert_eq!(app.reopen().session().state().phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn configured_key_signs_the_login_payload() {
    let app = TestApp::spawn_with_key(Some("shared-signing-key")).await;
    let expected = DigestRequestSigner::new(secret("shared-signing-key"))
        .unwrap()
        .sign(&CanonicalPayload::new(["alice", "Passw0rd"]))
        .unwrap();
    Mock::given(method("POST"))
        .and(path(api_path("/auth/login")))
        .and(body_json(json!({
            "username": "alice",
            "password": "Passw0rd",
            "signature": expected.as_str()
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "token": mint_jwt("alice", "NORMAL_USER")
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let phase = app
        .client
        .session()
        .login("alice", secret("Passw0rd"))
        .await
        .unwrap();

    assert_eq!(phase, SessionPhase::Authenticated);
}

#[tokio::test]
async fn recovery_requests_never_touch_the_session() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/forgot-password")))
        .and(body_json(json!({"email": "alice@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "Check your inbox"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let message = app
        .client
        .recovery()
        .forgot_password("alice@example.com")
        .await
        .unwrap();

    assert_eq!(message, "Check your inbox");
    assert_eq!(app.client.session().state().phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn boot_discards_an_unreadable_token_file() {
    let app = TestApp::spawn().await;
    std::fs::create_dir_all(app.token_path.parent().unwrap()).unwrap();
    std::fs::write(&app.token_path, [0xff, 0xfe, b'x', b'.', b'y']).unwrap();

    let client = app.reopen();

    assert_eq!(client.session().state().phase(), SessionPhase::Anonymous);
    assert!(client.session().bearer().is_none());
    assert!(!app.token_path.exists());
}
