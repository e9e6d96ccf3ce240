use std::{path::PathBuf, time::Duration};

use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

use crate::config::constants::{SETTINGS_FILE, env, prod};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub signing: SigningSettings,
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub json_timeout_ms: u64,
    pub upload_timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSettings {
    /// File holding the bearer token. Sessions stay in memory when unset.
    pub token_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SigningSettings {
    /// HMAC key. Requests carry a fixed development signature when unset.
    pub key: Option<Secret<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub debounce_ms: u64,
    pub page_size: u32,
}

impl Settings {
    /// Defaults, then `storefront.json` if present, then `STOREFRONT__*`
    /// variables (a `.env` file is honoured).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::build(Some(SETTINGS_FILE))
    }

    pub fn build(file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("api.base_url", prod::API_BASE_URL)?
            .set_default(
                "api.json_timeout_ms",
                millis(prod::api_client::JSON_TIMEOUT),
            )?
            .set_default(
                "api.upload_timeout_ms",
                millis(prod::api_client::UPLOAD_TIMEOUT),
            )?
            .set_default("catalog.debounce_ms", millis(prod::LISTING_DEBOUNCE))?
            .set_default("catalog.page_size", i64::from(prod::PAGE_SIZE))?;

        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(env::ENV_PREFIX)
                    .prefix_separator(env::ENV_SEPARATOR)
                    .separator(env::ENV_SEPARATOR),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Message("api.base_url must not be empty".into()));
        }
        if self.catalog.page_size == 0 {
            return Err(ConfigError::Message("catalog.page_size must be positive".into()));
        }
        Ok(self)
    }
}

impl ApiSettings {
    pub fn json_timeout(&self) -> Duration {
        Duration::from_millis(self.json_timeout_ms)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_millis(self.upload_timeout_ms)
    }
}

impl CatalogSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(
            [
                env::API_BASE_URL_ENV_VAR,
                env::SIGNING_KEY_ENV_VAR,
                env::TOKEN_PATH_ENV_VAR,
            ],
            || {
                let settings = Settings::build(None).unwrap();
                assert_eq!(settings.api.base_url, prod::API_BASE_URL);
                assert_eq!(settings.api.json_timeout(), Duration::from_secs(10));
                assert_eq!(settings.api.upload_timeout(), Duration::from_secs(30));
                assert_eq!(settings.catalog.debounce(), Duration::from_millis(300));
                assert!(settings.signing.key.is_none());
                assert!(settings.session.token_path.is_none());
            },
        );
    }

    #[test]
    fn test_environment_overrides() {
        temp_env::with_vars(
            [
                (env::API_BASE_URL_ENV_VAR, Some("https://shop.example.com/api")),
                (env::SIGNING_KEY_ENV_VAR, Some("hunter2")),
                (env::TOKEN_PATH_ENV_VAR, Some("/tmp/storefront/token")),
                ("STOREFRONT__CATALOG__PAGE_SIZE", Some("25")),
            ],
            || {
                let settings = Settings::build(None).unwrap();
                assert_eq!(settings.api.base_url, "https://shop.example.com/api");
                assert_eq!(
                    settings.signing.key.as_ref().map(|k| k.expose_secret().as_str()),
                    Some("hunter2")
                );
                assert_eq!(
                    settings.session.token_path,
                    Some(PathBuf::from("/tmp/storefront/token"))
                );
                assert_eq!(settings.catalog.page_size, 25);
            },
        );
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        temp_env::with_var("STOREFRONT__CATALOG__PAGE_SIZE", Some("0"), || {
            assert!(Settings::build(None).is_err());
        });
    }
}
