use async_trait::async_trait;

use crate::domain::{
    credentials::BearerToken,
    product::{Product, ProductPage, ProductQuery, ValidProduct},
};
use crate::ports::{
    auth_api::{Acknowledgement, ApiError},
    request_signer::Signature,
};

/// Outcome of `POST /products/list`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductListing {
    Page(ProductPage),
    Rejected { message: String },
}

/// Outcome of a single-product lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductLookup {
    Found(Product),
    Rejected { message: String },
}

/// Product endpoints. Every call is bearer-authenticated.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn create_product(
        &self,
        bearer: &BearerToken,
        product: &ValidProduct,
        signature: &Signature,
    ) -> Result<Acknowledgement, ApiError>;

    async fn update_product(
        &self,
        bearer: &BearerToken,
        original_name: &str,
        product: &ValidProduct,
        signature: &Signature,
    ) -> Result<Acknowledgement, ApiError>;

    async fn delete_product(
        &self,
        bearer: &BearerToken,
        name: &str,
        signature: &Signature,
    ) -> Result<Acknowledgement, ApiError>;

    async fn get_product(&self, bearer: &BearerToken, name: &str)
    -> Result<ProductLookup, ApiError>;

    async fn list_products(
        &self,
        bearer: &BearerToken,
        query: &ProductQuery,
        signature: &Signature,
    ) -> Result<ProductListing, ApiError>;
}
