pub mod catalog;
pub mod session_gateway;
pub mod session_link;
pub mod session_store;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use catalog::{
    catalog_client::{CatalogClient, CatalogError},
    product_browser::{DEFAULT_DEBOUNCE, ListingTicket, ListingView, ProductBrowser},
};
pub use session_gateway::{
    LoginError, LoginOutcome, SessionGateway, VerifyError, enforce_authorization_policy,
};
pub use session_link::SessionLink;
pub use session_store::SessionStore;
pub use use_cases::{
    recover_account::{RecoverAccountUseCase, RecoveryError},
    register::{RegisterError, RegisterUseCase},
};
