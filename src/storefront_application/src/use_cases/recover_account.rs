use secrecy::Secret;
use storefront_core::{
    Acknowledgement, ApiError, AuthApi, CredentialsError, EmailAddress, Password,
};

/// Error types for account recovery
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("{0}")]
    Validation(#[from] CredentialsError),
    #[error("Reset link is missing its token")]
    MissingResetToken,
    #[error("{0}")]
    Rejected(String),
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),
}

/// Recover account use case - forgotten username, forgotten password and
/// password reset. Fire-and-forget: none of these touch the session.
pub struct RecoverAccountUseCase<A>
where
    A: AuthApi,
{
    api: A,
}

impl<A> RecoverAccountUseCase<A>
where
    A: AuthApi,
{
    pub fn new(api: A) -> Self {
        Self { api }
    }

    #[tracing::instrument(name = "RecoverAccountUseCase::forgot_username", skip(self))]
    pub async fn forgot_username(&self, email: &str) -> Result<String, RecoveryError> {
        let email = EmailAddress::parse(email)?;
        let reply = self.api.forgot_username(&email).await;
        settle(reply)
    }

    #[tracing::instrument(name = "RecoverAccountUseCase::forgot_password", skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<String, RecoveryError> {
        let email = EmailAddress::parse(email)?;
        let reply = self.api.forgot_password(&email).await;
        settle(reply)
    }

    #[tracing::instrument(name = "RecoverAccountUseCase::reset_password", skip_all)]
    pub async fn reset_password(
        &self,
        reset_token: &str,
        new_password: Secret<String>,
    ) -> Result<String, RecoveryError> {
        let reset_token = reset_token.trim();
        if reset_token.is_empty() {
            return Err(RecoveryError::MissingResetToken);
        }
        let new_password = Password::parse_new(new_password)?;
        let reply = self.api.reset_password(reset_token, &new_password).await;
        settle(reply)
    }
}

fn settle(reply: Result<Acknowledgement, ApiError>) -> Result<String, RecoveryError> {
    match reply {
        Ok(Acknowledgement::Accepted { message }) => Ok(message),
        Ok(Acknowledgement::Rejected { message }) => {
            tracing::info!(%message, "Recovery request rejected");
            Err(RecoveryError::Rejected(message))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Recovery request failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockAuthApi;

    #[tokio::test]
    async fn test_forgot_username() {
        let use_case = RecoverAccountUseCase::new(MockAuthApi::default());
        assert_eq!(
            use_case.forgot_username("bob@example.com").await.unwrap(),
            "sent"
        );
        assert!(matches!(
            use_case.forgot_username("bob").await,
            Err(RecoveryError::Validation(CredentialsError::InvalidEmail))
        ));
    }

    #[tokio::test]
    async fn test_forgot_password_surfaces_transport_errors() {
        let use_case = RecoverAccountUseCase::new(MockAuthApi::default());
        assert!(matches!(
            use_case.forgot_password("bob@example.com").await,
            Err(RecoveryError::Api(ApiError::Timeout))
        ));
    }

    #[tokio::test]
    async fn test_reset_password() {
        let use_case = RecoverAccountUseCase::new(MockAuthApi::default());
        assert!(matches!(
            use_case
                .reset_password(" ", Secret::new("Passw0rd".to_string()))
                .await,
            Err(RecoveryError::MissingResetToken)
        ));
        assert!(matches!(
            use_case
                .reset_password("tok", Secret::new("Passw0rd".to_string()))
                .await,
            Err(RecoveryError::Rejected(ref m)) if m == "reset link expired"
        ));
    }
}
