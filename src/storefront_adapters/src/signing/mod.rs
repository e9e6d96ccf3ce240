pub mod digest_request_signer;
pub mod fixed_request_signer;

pub use digest_request_signer::DigestRequestSigner;
pub use fixed_request_signer::FixedRequestSigner;
