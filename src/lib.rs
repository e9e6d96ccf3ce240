//! # Storefront - Catalog Client Library
//!
//! This is a facade crate that re-exports all public APIs from the storefront client components.
//! Use this crate to get the session model, route guard and catalog client in one place.
//!
//! ## Usage
//!
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! storefront = { path = "../storefront" }
//! ```
//!
//! ## Structure
//!
//! - **Core domain types**: `SessionState`, `Identity`, `Role`, `ProductDraft`, etc.
//! - **Routing**: `RouteTable`, `decide`, `GuardDecision`
//! - **Ports**: `AuthApi`, `CatalogApi`, `TokenStorage`, `RequestSigner`, `TokenDecoder`
//! - **Application**: `SessionStore`, `CatalogClient`, `ProductBrowser`, `RegisterUseCase`, etc.
//! - **Adapters**: `RestApiClient`, `JwtTokenDecoder`, `FileTokenStorage`, `Settings`, etc.
//! - **Client**: `StorefrontClient` - The main entry point

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use storefront_core::*;
}

// Re-export most commonly used core types at the root level
pub use storefront_core::{
    BearerToken, Category, Identity, IdentityPatch, Product, ProductDraft, ProductPage,
    ProductQuery, ProductUpdate, Role, SessionPhase, SessionState, ValidationErrors,
};

// ============================================================================
// Route Guard
// ============================================================================

/// Route table and guard decisions
pub mod routing {
    pub use storefront_core::{
        DASHBOARD_PATH, GuardDecision, LOGIN_PATH, NOT_FOUND_PATH, Navigation, PathKind,
        RouteAccess, RouteMatch, RouteTable, UNAUTHORIZED_PATH, decide,
    };
}

pub use routing::{GuardDecision, Navigation, RouteTable, decide};

// ============================================================================
// Ports
// ============================================================================

/// Collaborator trait definitions
pub mod ports {
    pub use storefront_core::{
        ApiError, AuthApi, CatalogApi, RequestSigner, TokenDecoder, TokenStorage,
        TokenStorageError,
    };
}

pub use ports::{ApiError, AuthApi, CatalogApi, RequestSigner, TokenDecoder, TokenStorage};

// ============================================================================
// Application Layer
// ============================================================================

/// Session store, catalog client and use cases
pub mod application {
    pub use storefront_application::*;
}

pub use storefront_application::{
    CatalogClient, CatalogError, LoginError, ProductBrowser, RecoverAccountUseCase,
    RegisterUseCase, SessionLink, SessionStore, VerifyError,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Backend client
    pub mod http {
        pub use storefront_adapters::http::*;
    }

    /// Token persistence
    pub mod persistence {
        pub use storefront_adapters::persistence::*;
    }

    /// Request signing
    pub mod signing {
        pub use storefront_adapters::signing::*;
    }

    /// Token decoding
    pub mod token {
        pub use storefront_adapters::token::*;
    }

    /// Configuration
    pub mod config {
        pub use storefront_adapters::config::*;
    }
}

pub use storefront_adapters::{
    FileTokenStorage, InMemoryTokenStorage, JwtTokenDecoder, RestApiClient, Settings,
};

// ============================================================================
// Storefront Client (Main Entry Point)
// ============================================================================

/// Main storefront client
pub use storefront_client::{
    BoundaryOutcome, ClientError, ErrorBoundary, Fallback, Navigator, StorefrontClient,
    init_tracing, redirect_path,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};
