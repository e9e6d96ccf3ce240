use thiserror::Error;

use crate::domain::{credentials::BearerToken, identity::Identity};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Malformed token: {reason}")]
pub struct MalformedTokenError {
    reason: String,
}

impl MalformedTokenError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Turns a bearer credential into an [`Identity`] without any I/O.
///
/// Signatures are not verified. The backend checks them on every call, so
/// the decoded claims are only good for deciding what to show.
pub trait TokenDecoder: Send + Sync {
    fn decode(
        &self,
        token: &BearerToken,
        display_name_override: Option<&str>,
    ) -> Result<Identity, MalformedTokenError>;
}

/// Display name for a subject: the override when given, otherwise the local
/// part of an email-like subject, otherwise the subject itself.
pub fn derive_display_name(subject: &str, display_name_override: Option<&str>) -> String {
    if let Some(name) = display_name_override.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    match subject.split_once('@') {
        Some((local, _)) if !local.is_empty() => local.to_string(),
        _ => subject.to_string(),
    }
}
