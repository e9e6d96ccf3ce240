pub mod constants;
pub mod settings;

pub use ::config::ConfigError;
pub use constants::*;
pub use settings::{ApiSettings, CatalogSettings, SessionSettings, Settings, SigningSettings};
