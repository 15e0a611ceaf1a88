//! Navigation shell: which links to show and the logout action.
//!
//! Hiding a link is cosmetic. Access control lives in the gates that
//! [`Router`] runs on every navigation.

use serde::Serialize;

use crate::error::ApiError;
use crate::router::{Navigation, Route, Router};
use crate::session::{Session, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub path: String,
}

impl NavLink {
    fn new(label: &'static str, route: Route) -> Self {
        Self {
            label,
            path: route.path(),
        }
    }
}

#[derive(Clone)]
pub struct Shell {
    session: SessionStore,
    router: Router,
}

impl Shell {
    pub fn new(session: SessionStore, router: Router) -> Self {
        Self { session, router }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Links for the given session, in display order
    pub fn links(session: &Session) -> Vec<NavLink> {
        if !session.is_authenticated() {
            return vec![NavLink::new("Login", Route::Login), NavLink::new("Register", Route::Register)];
        }

        let mut links = vec![NavLink::new("Dashboard", Route::Dashboard)];
        if session.is_admin() {
            links.push(NavLink::new("Create Task", Route::TaskCreate));
            links.push(NavLink::new("Manage Users", Route::AdminUsers));
            links.push(NavLink::new("Add User", Route::AdminUserCreate));
        }
        links
    }

    /// Role badge next to the logout action
    pub fn badge(session: &Session) -> Option<&'static str> {
        session.identity().map(|i| if i.role.is_admin() { "Admin" } else { "User" })
    }

    pub fn current_links(&self) -> Vec<NavLink> {
        Self::links(&self.session.current())
    }

    pub fn logout(&self) -> Navigation {
        if let Err(e) = self.session.clear() {
            tracing::warn!("Session cleared in memory but storage removal failed: {}", e);
        }
        self.router.navigate_to(Route::Login)
    }

    /// An authentication rejection means the held credential is no longer
    /// honoured: drop it and go to login. Other failures are left to the view.
    pub fn on_api_error(&self, error: &ApiError) -> Option<Navigation> {
        if !error.is_authentication_rejected() {
            return None;
        }

        tracing::info!("Credential rejected by server ({}), logging out", error);
        Some(self.logout())
    }
}
