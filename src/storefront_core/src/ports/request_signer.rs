use std::sync::Arc;

use thiserror::Error;

/// Pipe-delimited canonical string a signature is computed over,
/// framed as `||field1|field2|...||`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPayload(String);

impl CanonicalPayload {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = fields
            .into_iter()
            .map(|field| field.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("|");
        Self(format!("||{joined}||"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque integrity value attached to a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(String);

impl Signature {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("Signing key is missing")]
    MissingKey,
    #[error("Failed to sign request: {0}")]
    Failed(String),
}

/// The signing collaborator. Callers build the payload; the scheme is opaque.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, payload: &CanonicalPayload) -> Result<Signature, SignerError>;
}

impl<T: RequestSigner + ?Sized> RequestSigner for Arc<T> {
    fn sign(&self, payload: &CanonicalPayload) -> Result<Signature, SignerError> {
        (**self).sign(payload)
    }
}
