use std::collections::HashMap;

use crate::domain::{role::Role, session_state::SessionState};
use crate::routing::guard::{GuardDecision, PathKind, decide};

pub const NOT_FOUND_PATH: &str = "/404";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    AuthOnly,
    Protected { roles: Vec<Role> },
}

impl RouteAccess {
    fn kind(&self) -> PathKind {
        match self {
            RouteAccess::Public => PathKind::Public,
            RouteAccess::AuthOnly => PathKind::AuthOnly,
            RouteAccess::Protected { .. } => PathKind::Protected,
        }
    }

    fn required_roles(&self) -> &[Role] {
        match self {
            RouteAccess::Protected { roles } => roles,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Route {
    pattern: String,
    segments: Vec<Segment>,
    access: RouteAccess,
}

/// A resolved route with its captured `:param` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub pattern: &'a str,
    pub access: &'a RouteAccess,
    pub params: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Decided(GuardDecision),
    /// No route matches; callers redirect to [`NOT_FOUND_PATH`].
    NotFound,
}

/// Ordered set of route patterns. First match wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: &str, access: RouteAccess) -> Self {
        let segments = split(pattern)
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();
        self.routes.push(Route {
            pattern: pattern.to_string(),
            segments,
            access,
        });
        self
    }

    /// The storefront's screens.
    pub fn storefront() -> Self {
        let admin = || RouteAccess::Protected {
            roles: vec![Role::Administrator],
        };
        let signed_in = || RouteAccess::Protected { roles: vec![] };

        Self::new()
            .route("/", RouteAccess::Public)
            .route(UNAUTHORIZED_PATH, RouteAccess::Public)
            .route(NOT_FOUND_PATH, RouteAccess::Public)
            .route(LOGIN_PATH, RouteAccess::AuthOnly)
            .route("/register", RouteAccess::AuthOnly)
            .route("/verify-2fa", RouteAccess::AuthOnly)
            .route("/forgot-username", RouteAccess::AuthOnly)
            .route("/forgot-password", RouteAccess::AuthOnly)
            .route("/reset-password/:token", RouteAccess::AuthOnly)
            .route(DASHBOARD_PATH, signed_in())
            .route("/products", signed_in())
            .route("/admin", admin())
            .route("/products/new", admin())
            .route("/products/edit/:id", admin())
    }

    /// Match a path, ignoring any query string or fragment.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let requested: Vec<&str> = split(strip_query(path)).collect();
        self.routes.iter().find_map(|route| {
            if route.segments.len() != requested.len() {
                return None;
            }
            let mut params = HashMap::new();
            for (segment, value) in route.segments.iter().zip(&requested) {
                match segment {
                    Segment::Literal(literal) if literal == value => {}
                    Segment::Literal(_) => return None,
                    Segment::Param(name) => {
                        params.insert(name.clone(), (*value).to_string());
                    }
                }
            }
            Some(RouteMatch {
                pattern: &route.pattern,
                access: &route.access,
                params,
            })
        })
    }

    /// Resolve `path` and run the guard on it.
    pub fn navigate(&self, state: &SessionState, path: &str) -> Navigation {
        match self.resolve(path) {
            Some(found) => Navigation::Decided(decide(
                state,
                path,
                found.access.kind(),
                found.access.required_roles(),
            )),
            None => Navigation::NotFound,
        }
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{identity::Identity, role::RoleSource};

    fn admin_session() -> SessionState {
        SessionState::authenticated(Identity::new(
            "1".to_string(),
            "root".to_string(),
            String::new(),
            Role::Administrator,
            RoleSource::Claimed,
            None,
        ))
    }

    #[test]
    fn test_resolve_captures_params() {
        let table = RouteTable::storefront();
        let found = table.resolve("/products/edit/17?tab=stock").unwrap();
        assert_eq!(found.pattern, "/products/edit/:id");
        assert_eq!(found.params.get("id").map(String::as_str), Some("17"));

        let root = table.resolve("/").unwrap();
        assert_eq!(root.access, &RouteAccess::Public);
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        let table = RouteTable::storefront();
        assert_eq!(
            table.navigate(&SessionState::anonymous(), "/nowhere"),
            Navigation::NotFound
        );
    }

    #[test]
    fn test_navigate_keeps_full_return_path() {
        let table = RouteTable::storefront();
        assert_eq!(
            table.navigate(&SessionState::anonymous(), "/products?page=2"),
            Navigation::Decided(GuardDecision::RedirectLogin {
                return_to: "/products?page=2".to_string()
            })
        );
    }

    #[test]
    fn test_admin_routes() {
        let table = RouteTable::storefront();
        assert_eq!(
            table.navigate(&admin_session(), "/products/new"),
            Navigation::Decided(GuardDecision::Render)
        );
        assert_eq!(
            table.navigate(&admin_session(), "/reset-password/xyz"),
            Navigation::Decided(GuardDecision::RedirectDashboard)
        );
    }
}
