use std::path::PathBuf;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::json;
use storefront_adapters::{
    ApiSettings, CatalogSettings, FileTokenStorage, SessionSettings, Settings, SigningSettings,
};
use storefront_client::StorefrontClient;
use wiremock::MockServer;

pub const API_PREFIX: &str = "/API/v1";

pub struct TestApp {
    pub server: MockServer,
    pub token_path: PathBuf,
    pub client: StorefrontClient,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_key(None).await
    }

    pub async fn spawn_with_key(key: Option<&str>) -> Self {
        let server = MockServer::start().await;
        let token_path = std::env::temp_dir()
            .join(format!("storefront-api-{}", uuid::Uuid::new_v4()))
            .join("session.token");
        let client = build_client(&server, &token_path, key);
        Self {
            server,
            token_path,
            client,
        }
    }

    /// A second client sharing this one's backend and token file.
    pub fn reopen(&self) -> StorefrontClient {
        build_client(&self.server, &self.token_path, None)
    }

    pub fn storage(&self) -> FileTokenStorage {
        FileTokenStorage::new(&self.token_path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(dir) = self.token_path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

fn build_client(server: &MockServer, token_path: &PathBuf, key: Option<&str>) -> StorefrontClient {
    let settings = Settings {
        api: ApiSettings {
            base_url: format!("{}{API_PREFIX}", server.uri()),
            json_timeout_ms: 500,
            upload_timeout_ms: 1_000,
        },
        session: SessionSettings {
            token_path: Some(token_path.clone()),
        },
        signing: SigningSettings {
            key: key.map(|k| secrecy::Secret::new(k.to_string())),
        },
        catalog: CatalogSettings {
            debounce_ms: 0,
            page_size: 10,
        },
    };
    StorefrontClient::from_settings(&settings).expect("failed to build client")
}

pub fn mint_jwt(subject: &str, role: &str) -> String {
    let exp = (Utc::now() + chrono::Duration::minutes(10)).timestamp();
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({"sub": subject, "role": role, "exp": exp}),
        &EncodingKey::from_secret(b"backend-only-secret"),
    )
    .expect("failed to encode jwt")
}

pub fn path(endpoint: &str) -> String {
    format!("{API_PREFIX}{endpoint}")
}

pub fn secret(value: &str) -> secrecy::Secret<String> {
    secrecy::Secret::new(value.to_string())
}
