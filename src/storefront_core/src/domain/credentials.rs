use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Username is required")]
    MissingUsername,
    #[error("Password is required")]
    MissingPassword,
    #[error("Password must be at least 8 characters with an uppercase letter, a lowercase letter and a digit")]
    WeakPassword,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Verification code must be 6 digits")]
    InvalidSecondFactorCode,
    #[error("Token is empty")]
    EmptyToken,
}

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Login name as typed by the user, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> Result<Self, CredentialsError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CredentialsError::MissingUsername);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Password for a login attempt. Only emptiness is checked here; strength
/// rules apply to new passwords via [`Password::parse_new`].
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn parse_new(secret: Secret<String>) -> Result<Self, CredentialsError> {
        let password = Self::try_from(secret)?;
        if !is_strong(password.0.expose_secret()) {
            return Err(CredentialsError::WeakPassword);
        }
        Ok(password)
    }
}

impl TryFrom<Secret<String>> for Password {
    type Error = CredentialsError;

    fn try_from(secret: Secret<String>) -> Result<Self, Self::Error> {
        let trimmed = secret.expose_secret().trim();
        if trimmed.is_empty() {
            return Err(CredentialsError::MissingPassword);
        }
        Ok(Self(Secret::new(trimmed.to_string())))
    }
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

fn is_strong(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> Result<Self, CredentialsError> {
        let trimmed = raw.trim();
        if !EMAIL_REGEX.is_match(trimmed) {
            return Err(CredentialsError::InvalidEmail);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Six digit one-time code from the second-factor channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondFactorCode(String);

impl SecondFactorCode {
    pub fn parse(raw: &str) -> Result<Self, CredentialsError> {
        let trimmed = raw.trim();
        if trimmed.len() != 6 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(CredentialsError::InvalidSecondFactorCode);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! secret_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(Secret<String>);

        impl $name {
            pub fn parse(raw: impl Into<String>) -> Result<Self, CredentialsError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(CredentialsError::EmptyToken);
                }
                Ok(Self(Secret::new(raw)))
            }

            pub fn expose(&self) -> &str {
                self.0.expose_secret()
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.0.expose_secret() == other.0.expose_secret()
            }
        }

        impl Eq for $name {}
    };
}

secret_token!(
    /// Credential token issued by the backend and sent as `Authorization: Bearer`.
    BearerToken
);

secret_token!(
    /// Short-lived token tying a second-factor code to a login attempt.
    ChallengeToken
);
