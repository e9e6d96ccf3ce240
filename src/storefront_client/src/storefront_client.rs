use std::sync::Arc;

use reqwest::Client as HttpClient;
use storefront_adapters::{
    DigestRequestSigner, FileTokenStorage, FixedRequestSigner, InMemoryTokenStorage,
    JwtTokenDecoder, RequestTimeouts, RestApiClient, Settings, config::ConfigError,
};
use storefront_application::{
    CatalogClient, ProductBrowser, RecoverAccountUseCase, RegisterUseCase, SessionStore,
};
use storefront_core::{ApiError, ProductQuery, RequestSigner, SignerError, TokenStorage};
use thiserror::Error;

use crate::navigator::Navigator;

pub type SharedSigner = Arc<dyn RequestSigner>;
pub type Sessions = SessionStore<JwtTokenDecoder, RestApiClient, SharedSigner>;
pub type Catalog = CatalogClient<RestApiClient, SharedSigner>;
pub type Browser = ProductBrowser<RestApiClient, SharedSigner>;
pub type Registrar = RegisterUseCase<RestApiClient, SharedSigner>;
pub type Recovery = RecoverAccountUseCase<RestApiClient>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to load settings: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid API configuration: {0}")]
    Api(#[from] ApiError),
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid signing configuration: {0}")]
    Signing(#[from] SignerError),
}

/// Everything a storefront front end needs, wired against one backend.
///
/// Construction restores any persisted session, so the first state observed
/// is already past boot.
pub struct StorefrontClient {
    session: Sessions,
    catalog: Arc<Catalog>,
    browser: Browser,
    registration: Registrar,
    recovery: Recovery,
    navigator: Navigator,
    page_size: u32,
}

impl StorefrontClient {
    /// Load settings from the environment and build a client.
    pub fn load() -> Result<Self, ClientError> {
        let settings = Settings::load()?;
        Self::from_settings(&settings)
    }

    /// Persist the session to `session.token_path` when set, otherwise keep
    /// it in memory.
    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        let storage: Arc<dyn TokenStorage> = match &settings.session.token_path {
            Some(path) => Arc::new(FileTokenStorage::new(path)),
            None => Arc::new(InMemoryTokenStorage::new()),
        };
        Self::build(settings, storage)
    }

    #[tracing::instrument(name = "StorefrontClient::build", skip_all, fields(base_url = %settings.api.base_url))]
    pub fn build(settings: &Settings, storage: Arc<dyn TokenStorage>) -> Result<Self, ClientError> {
        let http_client = HttpClient::builder()
            .connect_timeout(settings.api.json_timeout())
            .build()?;
        let api = RestApiClient::new(
            &settings.api.base_url,
            RequestTimeouts {
                json: settings.api.json_timeout(),
                upload: settings.api.upload_timeout(),
            },
            http_client,
        )?;

        let signer: SharedSigner = match &settings.signing.key {
            Some(key) => Arc::new(DigestRequestSigner::new(key.clone())?),
            None => {
                tracing::warn!("No signing key configured, requests carry a fixed signature");
                Arc::new(FixedRequestSigner::default())
            }
        };

        let session = SessionStore::new(
            JwtTokenDecoder::new(),
            api.clone(),
            signer.clone(),
            storage,
        );
        let phase = session.restore();
        tracing::info!(?phase, "Session restored");

        let catalog = Arc::new(CatalogClient::new(
            api.clone(),
            signer.clone(),
            session.link(),
        ));
        let browser = ProductBrowser::new(catalog.clone(), settings.catalog.debounce());
        let navigator = Navigator::new(session.link());

        Ok(Self {
            registration: RegisterUseCase::new(api.clone(), signer),
            recovery: RecoverAccountUseCase::new(api),
            session,
            catalog,
            browser,
            navigator,
            page_size: settings.catalog.page_size,
        })
    }

    pub fn session(&self) -> &Sessions {
        &self.session
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub fn registration(&self) -> &Registrar {
        &self.registration
    }

    pub fn recovery(&self) -> &Recovery {
        &self.recovery
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Listing query with the configured page size.
    pub fn query(&self, search: Option<String>, page: u32) -> ProductQuery {
        ProductQuery::new(search, page, self.page_size)
    }
}
