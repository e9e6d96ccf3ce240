use storefront_core::{
    Acknowledgement, ApiError, BearerToken, CanonicalPayload, CatalogApi, Product, ProductDraft,
    ProductListing, ProductLookup, ProductPage, ProductQuery, ProductUpdate, RequestSigner,
    SignerError, ValidProduct, ValidationErrors,
};

use crate::{session_gateway::enforce_authorization_policy, session_link::SessionLink};

/// Error types for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("Not logged in")]
    NotAuthenticated,
    /// The session has been reset; the user must log in again.
    #[error("Not authorized: {0}")]
    Authorization(String),
    /// Backend answered with a non-zero code.
    #[error("{0}")]
    Rejected(String),
    #[error("Failed to sign request: {0}")]
    Signing(#[from] SignerError),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Request superseded by a newer one")]
    Superseded,
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl CatalogError {
    /// Network and timeout failures are worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Network(_) | CatalogError::Timeout)
    }
}

/// Product CRUD over the catalog endpoints.
///
/// Drafts are validated before anything is sent, and every call carries the
/// session's bearer token. Rejected bearers reset the session.
pub struct CatalogClient<C, S>
where
    C: CatalogApi,
    S: RequestSigner,
{
    api: C,
    signer: S,
    link: SessionLink,
}

impl<C, S> CatalogClient<C, S>
where
    C: CatalogApi,
    S: RequestSigner,
{
    pub fn new(api: C, signer: S, link: SessionLink) -> Self {
        Self { api, signer, link }
    }

    #[tracing::instrument(name = "CatalogClient::create", skip_all, fields(name = %draft.name))]
    pub async fn create(&self, draft: &ProductDraft) -> Result<String, CatalogError> {
        let product = draft.validate()?;
        let bearer = self.bearer()?;
        let signature = self.signer.sign(&CanonicalPayload::new(product_fields(
            None, &product,
        )))?;

        let reply = self.api.create_product(&bearer, &product, &signature).await;
        self.acknowledged(&bearer, reply)
    }

    #[tracing::instrument(name = "CatalogClient::update", skip_all, fields(name = %update.original_name))]
    pub async fn update(&self, update: &ProductUpdate) -> Result<String, CatalogError> {
        let original_name = required_name(&update.original_name)?;
        let product = update.draft.validate()?;
        let bearer = self.bearer()?;
        let signature = self.signer.sign(&CanonicalPayload::new(product_fields(
            Some(original_name),
            &product,
        )))?;

        let reply = self
            .api
            .update_product(&bearer, original_name, &product, &signature)
            .await;
        self.acknowledged(&bearer, reply)
    }

    #[tracing::instrument(name = "CatalogClient::delete", skip(self))]
    pub async fn delete(&self, name: &str) -> Result<String, CatalogError> {
        let name = required_name(name)?;
        let bearer = self.bearer()?;
        let signature = self.signer.sign(&CanonicalPayload::new([name]))?;

        let reply = self.api.delete_product(&bearer, name, &signature).await;
        self.acknowledged(&bearer, reply)
    }

    #[tracing::instrument(name = "CatalogClient::get", skip(self))]
    pub async fn get(&self, name: &str) -> Result<Product, CatalogError> {
        let name = required_name(name)?;
        let bearer = self.bearer()?;

        match self.api.get_product(&bearer, name).await {
            Ok(ProductLookup::Found(product)) => Ok(product),
            Ok(ProductLookup::Rejected { message }) => Err(CatalogError::Rejected(message)),
            Err(e) => Err(self.api_failure(&bearer, e)),
        }
    }

    #[tracing::instrument(name = "CatalogClient::list", skip(self))]
    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage, CatalogError> {
        let bearer = self.bearer()?;
        let page = query.page.to_string();
        let page_size = query.page_size.to_string();
        let signature = self.signer.sign(&CanonicalPayload::new([
            query.search.as_deref().unwrap_or_default(),
            page.as_str(),
            page_size.as_str(),
        ]))?;

        match self.api.list_products(&bearer, query, &signature).await {
            Ok(ProductListing::Page(page)) => Ok(page),
            Ok(ProductListing::Rejected { message }) => Err(CatalogError::Rejected(message)),
            Err(e) => Err(self.api_failure(&bearer, e)),
        }
    }

    fn bearer(&self) -> Result<BearerToken, CatalogError> {
        self.link.bearer().ok_or(CatalogError::NotAuthenticated)
    }

    fn acknowledged(
        &self,
        bearer: &BearerToken,
        reply: Result<Acknowledgement, ApiError>,
    ) -> Result<String, CatalogError> {
        match reply {
            Ok(Acknowledgement::Accepted { message }) => Ok(message),
            Ok(Acknowledgement::Rejected { message }) => Err(CatalogError::Rejected(message)),
            Err(e) => Err(self.api_failure(bearer, e)),
        }
    }

    fn api_failure(&self, bearer: &BearerToken, error: ApiError) -> CatalogError {
        if enforce_authorization_policy(&self.link, bearer, &error) {
            return match error {
                ApiError::Unauthorized(message) | ApiError::Forbidden(message) => {
                    CatalogError::Authorization(message)
                }
                other => CatalogError::Authorization(other.to_string()),
            };
        }
        tracing::warn!(error = %error, "Catalog request failed");
        match error {
            ApiError::Timeout => CatalogError::Timeout,
            ApiError::Network(message) => CatalogError::Network(message),
            other => CatalogError::Unexpected(other.to_string()),
        }
    }
}

fn required_name(name: &str) -> Result<&str, CatalogError> {
    let name = name.trim();
    if name.is_empty() {
        let mut errors = ValidationErrors::default();
        errors.add("name", "Name is required");
        return Err(errors.into());
    }
    Ok(name)
}

/// `[original|]name|description|price|quantity|category`
fn product_fields(original_name: Option<&str>, product: &ValidProduct) -> Vec<String> {
    original_name
        .map(str::to_string)
        .into_iter()
        .chain([
            product.name().to_string(),
            product.description().unwrap_or_default().to_string(),
            product.price().to_string(),
            product.quantity().to_string(),
            product.category().wire_name().to_string(),
        ])
        .collect()
}
