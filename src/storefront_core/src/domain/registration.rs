use secrecy::Secret;

use crate::domain::{
    credentials::{CredentialsError, EmailAddress, Password, Username},
    product::ValidationErrors,
    role::Role,
};

/// A validated account registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
    pub role: Role,
}

impl Registration {
    /// Validate a registration form, collecting one message per field.
    pub fn parse(
        username: &str,
        email: &str,
        password: Secret<String>,
        password_confirmation: Secret<String>,
        role: Role,
    ) -> Result<Self, ValidationErrors> {
        use secrecy::ExposeSecret;

        let mut errors = ValidationErrors::default();

        let username = Username::parse(username)
            .map_err(|e| errors.add("username", e.to_string()))
            .ok();
        let email = EmailAddress::parse(email)
            .map_err(|e| errors.add("email", e.to_string()))
            .ok();

        let passwords_match =
            password.expose_secret().trim() == password_confirmation.expose_secret().trim();
        let password = Password::parse_new(password)
            .map_err(|e| errors.add("password", e.to_string()))
            .ok();
        if !passwords_match {
            errors.add("password_confirmation", "Passwords must match");
        }

        match (username, email, password) {
            (Some(username), Some(email), Some(password)) if errors.is_empty() => Ok(Self {
                username,
                email,
                password,
                role,
            }),
            _ => Err(errors),
        }
    }
}

impl From<CredentialsError> for ValidationErrors {
    fn from(error: CredentialsError) -> Self {
        let field = match error {
            CredentialsError::MissingUsername => "username",
            CredentialsError::MissingPassword | CredentialsError::WeakPassword => "password",
            CredentialsError::InvalidEmail => "email",
            CredentialsError::InvalidSecondFactorCode => "code",
            CredentialsError::EmptyToken => "token",
        };
        let mut errors = ValidationErrors::default();
        errors.add(field, error.to_string());
        errors
    }
}
