use secrecy::{ExposeSecret, Secret};
use storefront_core::{
    Acknowledgement, ApiError, AuthApi, CanonicalPayload, Registration, RequestSigner, Role,
    SignerError, ValidationErrors,
};

/// Error types for registration
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    Rejected(String),
    #[error("Failed to sign request: {0}")]
    Signing(#[from] SignerError),
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),
}

/// Register use case - creates an account, never touches the session
pub struct RegisterUseCase<A, S>
where
    A: AuthApi,
    S: RequestSigner,
{
    api: A,
    signer: S,
}

impl<A, S> RegisterUseCase<A, S>
where
    A: AuthApi,
    S: RequestSigner,
{
    pub fn new(api: A, signer: S) -> Self {
        Self { api, signer }
    }

    /// Execute the register use case
    ///
    /// # Returns
    /// The backend's confirmation message, or RegisterError
    #[tracing::instrument(
        name = "RegisterUseCase::execute",
        skip(self, password, password_confirmation)
    )]
    pub async fn execute(
        &self,
        username: &str,
        email: &str,
        password: Secret<String>,
        password_confirmation: Secret<String>,
        role: Role,
    ) -> Result<String, RegisterError> {
        let registration =
            Registration::parse(username, email, password, password_confirmation, role)?;

        let signature = self.signer.sign(&CanonicalPayload::new([
            registration.username.as_str(),
            registration.email.as_str(),
            registration.password.as_ref().expose_secret().as_str(),
            registration.role.as_str(),
        ]))?;

        match self.api.register(&registration, &signature).await? {
            Acknowledgement::Accepted { message } => {
                tracing::info!("Account registered");
                Ok(message)
            }
            Acknowledgement::Rejected { message } => Err(RegisterError::Rejected(message)),
        }
    }
}
