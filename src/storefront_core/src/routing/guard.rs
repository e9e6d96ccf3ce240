use crate::domain::{role::Role, session_state::SessionState};

/// How a path relates to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    Public,
    /// Login and recovery screens; pointless once logged in.
    AuthOnly,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session is still settling. Suspend the guarded subtree only.
    Wait,
    Render,
    RedirectLogin { return_to: String },
    RedirectUnauthorized,
    RedirectDashboard,
}

/// Decide what to do with a navigation. Total and free of I/O.
///
/// Rules apply in order: loading, auth-only while authenticated, protected
/// while anonymous, role requirement, render. A defaulted role never
/// satisfies a requirement.
pub fn decide(
    state: &SessionState,
    path: &str,
    kind: PathKind,
    required_roles: &[Role],
) -> GuardDecision {
    if state.is_loading() {
        return GuardDecision::Wait;
    }
    if kind == PathKind::AuthOnly && state.is_authenticated() {
        return GuardDecision::RedirectDashboard;
    }
    if kind == PathKind::Protected && !state.is_authenticated() {
        return GuardDecision::RedirectLogin {
            return_to: path.to_string(),
        };
    }
    if !required_roles.is_empty() {
        let allowed = state
            .identity()
            .and_then(|identity| identity.trusted_role())
            .is_some_and(|role| required_roles.contains(&role));
        if !allowed {
            return GuardDecision::RedirectUnauthorized;
        }
    }
    GuardDecision::Render
}
