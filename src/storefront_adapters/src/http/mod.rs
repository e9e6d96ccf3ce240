pub mod rest_api_client;
pub mod wire;

pub use rest_api_client::{RequestTimeouts, RestApiClient};
