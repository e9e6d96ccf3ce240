pub mod domain;
pub mod ports;
pub mod routing;
pub mod strategies;

// Re-export commonly used types for convenience
pub use domain::{
    credentials::{
        BearerToken, ChallengeToken, CredentialsError, EmailAddress, Password, SecondFactorCode,
        Username,
    },
    identity::{Identity, IdentityPatch},
    product::{
        Category, MAX_PRODUCT_NAME_LEN, Product, ProductDraft, ProductPage, ProductQuery,
        ProductUpdate, ValidProduct, ValidationErrors,
    },
    registration::Registration,
    role::{Role, RoleSource},
    session_state::{SessionPhase, SessionState},
};

pub use ports::{
    auth_api::{Acknowledgement, ApiError, AuthApi, LoginReply, VerifyReply},
    catalog_api::{CatalogApi, ProductListing, ProductLookup},
    request_signer::{CanonicalPayload, RequestSigner, Signature, SignerError},
    token_storage::{TokenStorage, TokenStorageError},
};

pub use routing::{
    guard::{GuardDecision, PathKind, decide},
    route_table::{
        DASHBOARD_PATH, LOGIN_PATH, NOT_FOUND_PATH, Navigation, RouteAccess, RouteMatch,
        RouteTable, UNAUTHORIZED_PATH,
    },
};

pub use strategies::token_decoder::{MalformedTokenError, TokenDecoder, derive_display_name};
