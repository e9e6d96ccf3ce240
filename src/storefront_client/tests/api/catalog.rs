use serde_json::json;
use storefront_application::CatalogError;
use storefront_core::{Category, ProductDraft, SessionPhase, TokenStorage};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{TestApp, mint_jwt, path as api_path, secret};

async fn logged_in(role: &str) -> (TestApp, String) {
    let app = TestApp::spawn().await;
    let token = mint_jwt("alice", role);
    Mock::given(method("POST"))
        .and(path(api_path("/auth/login")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "token": token
        })))
        .mount(&app.server)
        .await;
    app.client
        .session()
        .login("alice", secret("Passw0rd"))
        .await
        .unwrap();
    (app, token)
}

#[tokio::test]
async fn listing_sends_the_bearer_and_updates_the_view() {
    let (app, token) = logged_in("NORMAL_USER").await;
    Mock::given(method("POST"))
        .and(path(api_path("/products/list")))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .and(body_partial_json(json!({"search": "drum", "page": 0, "pageSize": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "codigo": 0,
            "productos": [
                {"nombre": "Snare drum", "precio": 150.0, "cantidad": 2, "categoria": "Instrumentos de percusión"}
            ],
            "totalPaginas": 1,
            "totalElementos": 1
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let query = app.client.query(Some("drum".to_string()), 0);
    let page = app.client.browser().fetch(query).await.unwrap();

    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].category, Some(Category::Percussion));
    let view = app.client.browser().view();
    assert!(!view.loading);
    assert_eq!(view.page, Some(page));
}

#[tokio::test]
async fn rejected_bearer_resets_the_session_once() {
    let (app, _) = logged_in("ADMINISTRATOR").await;
    Mock::given(method("POST"))
        .and(path(api_path("/products/delete")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "token expired"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let result = app.client.catalog().delete("Snare drum").await;

    assert!(matches!(result, Err(CatalogError::Authorization(_))));
    assert_eq!(app.client.session().state().phase(), SessionPhase::Anonymous);
    assert!(app.storage().load().unwrap().is_none());
    assert_eq!(
        app.client.navigator().after_authorization_failure(),
        storefront_core::LOGIN_PATH
    );

    let again = app.client.catalog().delete("Snare drum").await;
    assert!(matches!(again, Err(CatalogError::NotAuthenticated)));
}

#[tokio::test]
async fn invalid_drafts_never_reach_the_backend() {
    let (app, _) = logged_in("ADMINISTRATOR").await;
    Mock::given(method("POST"))
        .and(path(api_path("/products/create")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.server)
        .await;

    let draft = ProductDraft {
        name: String::new(),
        price: -1.0,
        ..ProductDraft::default()
    };
    let result = app.client.catalog().create(&draft).await;

    let Err(CatalogError::Validation(errors)) = result else {
        panic!("expected validation errors");
    };
    assert!(errors.get("name").is_some());
    assert!(errors.get("price").is_some());
}

#[tokio::test]
async fn backend_rejection_keeps_the_session() {
    let (app, _) = logged_in("ADMINISTRATOR").await;
    Mock::given(method("POST"))
        .and(path(api_path("/products/create")))
        .and(body_partial_json(json!({
            "name": "Theremin",
            "category": "Instrumentos electrónicos"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 7,
            "message": "Product already exists"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let draft = ProductDraft {
        name: "Theremin".to_string(),
        description: None,
        price: 499.0,
        quantity: 1,
        category: Some(Category::Electronic),
    };
    let result = app.client.catalog().create(&draft).await;

    assert!(matches!(result, Err(CatalogError::Rejected(message)) if message == "Product already exists"));
    assert_eq!(
        app.client.session().state().phase(),
        SessionPhase::Authenticated
    );
}
