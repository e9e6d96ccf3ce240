use crate::domain::{
    credentials::ChallengeToken,
    identity::{Identity, IdentityPatch},
};

/// Coarse state of the session machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Anonymous,
    PendingSecondFactor,
    Authenticated,
}

/// Snapshot of who is logged in.
///
/// Fields are private and only reachable through constructors, so a snapshot
/// always satisfies:
/// - `authenticated` implies an identity is present;
/// - a pending second factor implies a challenge and no authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    booted: bool,
    identity: Option<Identity>,
    authenticated: bool,
    loading: bool,
    pending_second_factor: bool,
    second_factor_challenge: Option<ChallengeToken>,
}

impl SessionState {
    /// Boot state, before the persisted token has been examined.
    pub fn uninitialized() -> Self {
        Self {
            booted: false,
            identity: None,
            authenticated: false,
            loading: true,
            pending_second_factor: false,
            second_factor_challenge: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            booted: true,
            loading: false,
            ..Self::uninitialized()
        }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            booted: true,
            identity: Some(identity),
            authenticated: true,
            loading: false,
            pending_second_factor: false,
            second_factor_challenge: None,
        }
    }

    pub fn pending_second_factor(challenge: ChallengeToken) -> Self {
        Self {
            booted: true,
            identity: None,
            authenticated: false,
            loading: false,
            pending_second_factor: true,
            second_factor_challenge: Some(challenge),
        }
    }

    /// Same state with the loading flag set or cleared.
    pub fn with_loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_pending_second_factor(&self) -> bool {
        self.pending_second_factor
    }

    pub fn second_factor_challenge(&self) -> Option<&ChallengeToken> {
        self.second_factor_challenge.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        if !self.booted {
            SessionPhase::Uninitialized
        } else if self.authenticated {
            SessionPhase::Authenticated
        } else if self.pending_second_factor {
            SessionPhase::PendingSecondFactor
        } else {
            SessionPhase::Anonymous
        }
    }

    /// Apply a cosmetic patch when authenticated. Returns whether anything changed.
    pub fn patch_identity(&mut self, patch: IdentityPatch) -> bool {
        if !self.authenticated {
            return false;
        }
        match self.identity.as_mut() {
            Some(identity) => {
                let before = identity.clone();
                identity.apply(patch);
                *identity != before
            }
            None => false,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::uninitialized()
    }
}
