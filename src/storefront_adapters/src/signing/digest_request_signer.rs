use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use storefront_core::{CanonicalPayload, RequestSigner, Signature, SignerError};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 over the canonical payload, hex encoded.
#[derive(Clone)]
pub struct DigestRequestSigner {
    key: Secret<String>,
}

impl DigestRequestSigner {
    pub fn new(key: Secret<String>) -> Result<Self, SignerError> {
        if key.expose_secret().is_empty() {
            return Err(SignerError::MissingKey);
        }
        Ok(Self { key })
    }

    fn mac(&self, message: &[u8]) -> Result<[u8; 32], SignerError> {
        let mac = HmacSha256::new_from_slice(self.key.expose_secret().as_bytes())
            .map_err(|e| SignerError::Failed(e.to_string()))?;
        Ok(mac.chain_update(message).finalize().into_bytes().into())
    }
}

impl RequestSigner for DigestRequestSigner {
    fn sign(&self, payload: &CanonicalPayload) -> Result<Signature, SignerError> {
        let mac = self.mac(payload.as_str().as_bytes())?;
        Ok(Signature::new(hex::encode(mac)))
    }
}
