use serde::{Deserialize, Serialize};

/// The closed set of roles the storefront understands.
///
/// Roles only drive which screens are offered. The backend authorizes every
/// mutating call on its own, so nothing here is a security boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Administrator,
    NormalUser,
}

/// Where the role on an identity came from.
///
/// A `Defaulted` role was substituted because the token carried no usable
/// role claim. It never satisfies a role requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleSource {
    Claimed,
    Defaulted,
}

impl Role {
    /// Role substituted when a token carries no recognised role claim.
    pub const LEAST_PRIVILEGED: Role = Role::NormalUser;

    pub const ALL: [Role; 2] = [Role::Administrator, Role::NormalUser];

    /// Parse a role claim, accepting every spelling the backend has issued.
    ///
    /// Matching ignores case and surrounding whitespace. Unknown values yield
    /// `None`; callers must never guess an elevated role.
    pub fn from_claim(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ADMINISTRATOR" | "ADMINISTRADOR" | "ADMIN" => Some(Role::Administrator),
            "NORMAL_USER" | "USUARIO_NORMAL" | "USER" => Some(Role::NormalUser),
            _ => None,
        }
    }

    /// Resolve an optional claim into a role and its provenance.
    pub fn resolve(claim: Option<&str>) -> (Self, RoleSource) {
        match claim.and_then(Role::from_claim) {
            Some(role) => (role, RoleSource::Claimed),
            None => (Role::LEAST_PRIVILEGED, RoleSource::Defaulted),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "ADMINISTRATOR",
            Role::NormalUser => "NORMAL_USER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
