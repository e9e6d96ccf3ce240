pub mod env {
    /// Prefix of environment overrides, e.g. `STOREFRONT__API__BASE_URL`.
    pub const ENV_PREFIX: &str = "STOREFRONT";
    pub const ENV_SEPARATOR: &str = "__";
    pub const API_BASE_URL_ENV_VAR: &str = "STOREFRONT__API__BASE_URL";
    pub const SIGNING_KEY_ENV_VAR: &str = "STOREFRONT__SIGNING__KEY";
    pub const TOKEN_PATH_ENV_VAR: &str = "STOREFRONT__SESSION__TOKEN_PATH";
}

/// Base name of the optional settings file (`storefront.json`).
pub const SETTINGS_FILE: &str = "storefront";

pub mod prod {
    use std::time::Duration;

    pub const API_BASE_URL: &str = "http://localhost:8035/API/v1";

    pub mod api_client {
        use std::time::Duration;

        pub const JSON_TIMEOUT: Duration = Duration::from_secs(10);
        pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);
    }

    pub const LISTING_DEBOUNCE: Duration = Duration::from_millis(300);
    pub const PAGE_SIZE: u32 = 10;
}
