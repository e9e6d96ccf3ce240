pub mod config;
pub mod http;
pub mod persistence;
pub mod signing;
pub mod token;

pub use config::{
    ApiSettings, CatalogSettings, SessionSettings, Settings, SigningSettings,
};
pub use http::{RequestTimeouts, RestApiClient};
pub use persistence::{FileTokenStorage, InMemoryTokenStorage};
pub use signing::{DigestRequestSigner, FixedRequestSigner};
pub use token::JwtTokenDecoder;
