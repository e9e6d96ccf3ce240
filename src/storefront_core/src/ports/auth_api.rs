use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    credentials::{BearerToken, ChallengeToken, EmailAddress, Password, SecondFactorCode, Username},
    registration::Registration,
};
use crate::ports::request_signer::Signature;

/// Transport-level failure talking to the backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True when the backend refused the presented credentials.
    pub fn is_authorization(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::Forbidden(_))
    }
}

/// Outcome of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginReply {
    Token(BearerToken),
    SecondFactorRequired(ChallengeToken),
    Rejected { message: String },
}

/// Outcome of `POST /auth/verify-second-factor`.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyReply {
    Token(BearerToken),
    InvalidCode { message: String },
    ChallengeExpired { message: String },
}

/// Outcome of endpoints that only answer with a code and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    Accepted { message: String },
    Rejected { message: String },
}

impl Acknowledgement {
    pub fn message(&self) -> &str {
        match self {
            Acknowledgement::Accepted { message } | Acknowledgement::Rejected { message } => {
                message
            }
        }
    }
}

// AuthApi port trait
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(
        &self,
        username: &Username,
        password: &Password,
        signature: &Signature,
    ) -> Result<LoginReply, ApiError>;

    async fn verify_second_factor(
        &self,
        code: &SecondFactorCode,
        challenge: &ChallengeToken,
        signature: &Signature,
    ) -> Result<VerifyReply, ApiError>;

    async fn register(
        &self,
        registration: &Registration,
        signature: &Signature,
    ) -> Result<Acknowledgement, ApiError>;

    async fn forgot_username(&self, email: &EmailAddress) -> Result<Acknowledgement, ApiError>;

    async fn forgot_password(&self, email: &EmailAddress) -> Result<Acknowledgement, ApiError>;

    async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &Password,
    ) -> Result<Acknowledgement, ApiError>;
}
