pub mod error_boundary;
pub mod navigator;
pub mod storefront_client;
pub mod telemetry;

pub use error_boundary::{BoundaryOutcome, ErrorBoundary, Fallback};
pub use navigator::{Navigator, redirect_path};
pub use storefront_client::{
    Browser, Catalog, ClientError, Recovery, Registrar, Sessions, SharedSigner, StorefrontClient,
};
pub use telemetry::{TelemetryError, init_tracing};
