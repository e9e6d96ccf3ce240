use chrono::{DateTime, Utc};

use crate::domain::role::{Role, RoleSource};

/// The logged-in user as derived from a credential token.
///
/// Only a `TokenDecoder` builds identities; the session store owns the one in
/// use. The role can only change by decoding a fresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    subject_id: String,
    display_name: String,
    email: String,
    role: Role,
    role_source: RoleSource,
    expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn new(
        subject_id: String,
        display_name: String,
        email: String,
        role: Role,
        role_source: RoleSource,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            subject_id,
            display_name,
            email,
            role,
            role_source,
            expires_at,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Empty when the token carried no email claim.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn role_source(&self) -> RoleSource {
        self.role_source
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// The role, but only if the token actually claimed it.
    pub fn trusted_role(&self) -> Option<Role> {
        match self.role_source {
            RoleSource::Claimed => Some(self.role),
            RoleSource::Defaulted => None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    /// Shallow-merge cosmetic profile fields.
    pub fn apply(&mut self, patch: IdentityPatch) {
        if let Some(display_name) = patch.display_name {
            self.display_name = display_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
    }
}

/// Cosmetic profile update. Deliberately has no role field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityPatch {
    pub display_name: Option<String>,
    pub email: Option<String>,
}
