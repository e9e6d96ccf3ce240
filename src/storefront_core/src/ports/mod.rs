pub mod auth_api;
pub mod catalog_api;
pub mod request_signer;
pub mod token_storage;
