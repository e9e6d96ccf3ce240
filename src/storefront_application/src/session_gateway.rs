use secrecy::ExposeSecret;
use storefront_core::{
    ApiError, AuthApi, BearerToken, CanonicalPayload, ChallengeToken, CredentialsError, LoginReply,
    MalformedTokenError, Password, RequestSigner, SecondFactorCode, SignerError, Username,
    VerifyReply,
};

use crate::session_link::SessionLink;

/// What the backend said to a credential check.
#[derive(Debug, PartialEq)]
pub enum LoginOutcome {
    Authenticated(BearerToken),
    SecondFactorRequired(ChallengeToken),
}

/// Error types for the login flow
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("{0}")]
    Validation(#[from] CredentialsError),
    #[error("A login or verification is already in progress")]
    Busy,
    /// Backend message, verbatim.
    #[error("{0}")]
    Authentication(String),
    #[error("Received an unusable token: {0}")]
    MalformedToken(#[from] MalformedTokenError),
    #[error("Failed to sign request: {0}")]
    Signing(#[from] SignerError),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Session ended while logging in")]
    Superseded,
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Error types for second-factor verification
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("{0}")]
    Validation(#[from] CredentialsError),
    #[error("No second-factor challenge is pending")]
    NoPendingChallenge,
    #[error("A login or verification is already in progress")]
    Busy,
    #[error("{0}")]
    InvalidCode(String),
    /// The challenge is dead; a fresh login is required.
    #[error("{0}")]
    ChallengeExpired(String),
    #[error("Received an unusable token: {0}")]
    MalformedToken(#[from] MalformedTokenError),
    #[error("Failed to sign request: {0}")]
    Signing(#[from] SignerError),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Session ended while verifying")]
    Superseded,
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Boundary between session intents and the authentication endpoints.
///
/// Login and verification 401s are credential failures. On bearer
/// authenticated calls a 401/403 resets the session through
/// [`enforce_authorization_policy`].
pub struct SessionGateway<A, S>
where
    A: AuthApi,
    S: RequestSigner,
{
    api: A,
    signer: S,
    link: SessionLink,
}

impl<A, S> SessionGateway<A, S>
where
    A: AuthApi,
    S: RequestSigner,
{
    pub fn new(api: A, signer: S, link: SessionLink) -> Self {
        Self { api, signer, link }
    }

    #[tracing::instrument(name = "SessionGateway::login", skip(self, password))]
    pub async fn login(
        &self,
        username: &Username,
        password: &Password,
    ) -> Result<LoginOutcome, LoginError> {
        let payload = CanonicalPayload::new([
            username.as_str(),
            password.as_ref().expose_secret().as_str(),
        ]);
        let signature = self.signer.sign(&payload)?;

        match self.api.login(username, password, &signature).await {
            Ok(LoginReply::Token(token)) => Ok(LoginOutcome::Authenticated(token)),
            Ok(LoginReply::SecondFactorRequired(challenge)) => {
                Ok(LoginOutcome::SecondFactorRequired(challenge))
            }
            Ok(LoginReply::Rejected { message }) => Err(LoginError::Authentication(message)),
            Err(ApiError::Unauthorized(message) | ApiError::Forbidden(message)) => {
                Err(LoginError::Authentication(message))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(name = "SessionGateway::verify_second_factor", skip_all)]
    pub async fn verify_second_factor(
        &self,
        code: &SecondFactorCode,
        challenge: &ChallengeToken,
    ) -> Result<BearerToken, VerifyError> {
        let payload = CanonicalPayload::new([code.as_str(), challenge.expose()]);
        let signature = self.signer.sign(&payload)?;

        match self
            .api
            .verify_second_factor(code, challenge, &signature)
            .await
        {
            Ok(VerifyReply::Token(token)) => Ok(token),
            Ok(VerifyReply::InvalidCode { message }) => Err(VerifyError::InvalidCode(message)),
            Ok(VerifyReply::ChallengeExpired { message }) => {
                Err(VerifyError::ChallengeExpired(message))
            }
            Err(ApiError::Unauthorized(message) | ApiError::Forbidden(message)) => {
                Err(VerifyError::InvalidCode(message))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Local only.
    pub fn logout(&self) {
        self.link.invalidate();
    }
}

/// Apply the unauthorized/forbidden policy to a bearer-authenticated call.
///
/// Resets the session at most once for this response and never retries.
/// Returns `true` when `error` is an authorization failure.
pub fn enforce_authorization_policy(
    link: &SessionLink,
    bearer: &BearerToken,
    error: &ApiError,
) -> bool {
    if !error.is_authorization() {
        return false;
    }
    if !link.reset_after_rejection(bearer) {
        tracing::debug!("Bearer already replaced, skipping reset");
    }
    true
}

impl From<ApiError> for LoginError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Timeout => LoginError::Timeout,
            ApiError::Network(message) => LoginError::Network(message),
            ApiError::Unauthorized(message) | ApiError::Forbidden(message) => {
                LoginError::Authentication(message)
            }
            other => LoginError::Unexpected(other.to_string()),
        }
    }
}

impl From<ApiError> for VerifyError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Timeout => VerifyError::Timeout,
            ApiError::Network(message) => VerifyError::Network(message),
            ApiError::Unauthorized(message) | ApiError::Forbidden(message) => {
                VerifyError::InvalidCode(message)
            }
            other => VerifyError::Unexpected(other.to_string()),
        }
    }
}
