use std::sync::{Mutex, MutexGuard, PoisonError};

use storefront_application::SessionLink;
use storefront_core::{
    DASHBOARD_PATH, GuardDecision, LOGIN_PATH, NOT_FOUND_PATH, Navigation, RouteTable,
    UNAUTHORIZED_PATH,
};

/// Applies the route table to the live session and remembers where an
/// anonymous visitor was headed.
pub struct Navigator {
    link: SessionLink,
    routes: RouteTable,
    return_to: Mutex<Option<String>>,
}

impl Navigator {
    pub fn new(link: SessionLink) -> Self {
        Self::with_routes(link, RouteTable::storefront())
    }

    pub fn with_routes(link: SessionLink, routes: RouteTable) -> Self {
        Self {
            link,
            routes,
            return_to: Mutex::new(None),
        }
    }

    #[tracing::instrument(name = "Navigator::visit", skip(self))]
    pub fn visit(&self, path: &str) -> Navigation {
        let navigation = self.routes.navigate(&self.link.state(), path);
        if let Navigation::Decided(GuardDecision::RedirectLogin { return_to }) = &navigation {
            *self.remembered() = Some(return_to.clone());
        }
        tracing::debug!(?navigation);
        navigation
    }

    /// Where to go once logged in. The remembered path is handed out once.
    pub fn after_login(&self) -> String {
        self.remembered()
            .take()
            .unwrap_or_else(|| DASHBOARD_PATH.to_string())
    }

    pub fn after_authorization_failure(&self) -> &'static str {
        LOGIN_PATH
    }

    fn remembered(&self) -> MutexGuard<'_, Option<String>> {
        self.return_to.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Path to redirect to, if the navigation is a redirect.
pub fn redirect_path(navigation: &Navigation) -> Option<&'static str> {
    match navigation {
        Navigation::NotFound => Some(NOT_FOUND_PATH),
        Navigation::Decided(decision) => match decision {
            GuardDecision::Wait | GuardDecision::Render => None,
            GuardDecision::RedirectLogin { .. } => Some(LOGIN_PATH),
            GuardDecision::RedirectUnauthorized => Some(UNAUTHORIZED_PATH),
            GuardDecision::RedirectDashboard => Some(DASHBOARD_PATH),
        },
    }
}
