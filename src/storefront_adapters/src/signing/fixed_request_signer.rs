use storefront_core::{CanonicalPayload, RequestSigner, Signature, SignerError};

/// Development signer that attaches the same value to every request.
#[derive(Debug, Clone)]
pub struct FixedRequestSigner {
    signature: String,
}

impl FixedRequestSigner {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
        }
    }
}

impl Default for FixedRequestSigner {
    fn default() -> Self {
        Self::new("unsigned")
    }
}

impl RequestSigner for FixedRequestSigner {
    fn sign(&self, _payload: &CanonicalPayload) -> Result<Signature, SignerError> {
        Ok(Signature::new(self.signature.clone()))
    }
}
