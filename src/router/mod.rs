//! Typed routes and the per-navigation gate check.

use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::ApiError;
use crate::guard::{AdminGate, AuthenticatedGate, Decision, Gate};
use crate::session::SessionStore;

static AUTHENTICATED: AuthenticatedGate = AuthenticatedGate;
static ADMIN: AdminGate = AdminGate;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    TaskCreate,
    TaskDetail(String),
    TaskEdit(String),
    AdminUsers,
    AdminUserCreate,
    UserEdit(String),
    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

impl Route {
    /// Unmatched paths become [`Route::NotFound`]; query strings and
    /// fragments are ignored.
    pub fn parse(path: &str) -> Self {
        let clean = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = clean.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Dashboard,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["task", "create"] => Route::TaskCreate,
            ["task", "edit", id] => Route::TaskEdit(id.to_string()),
            ["task", id] => Route::TaskDetail(id.to_string()),
            ["admin", "users"] => Route::AdminUsers,
            ["admin", "users", "create"] => Route::AdminUserCreate,
            ["users", "edit", id] => Route::UserEdit(id.to_string()),
            _ => Route::NotFound(clean.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::TaskCreate => "/task/create".to_string(),
            Route::TaskDetail(id) => format!("/task/{}", id),
            Route::TaskEdit(id) => format!("/task/edit/{}", id),
            Route::AdminUsers => "/admin/users".to_string(),
            Route::AdminUserCreate => "/admin/users/create".to_string(),
            Route::UserEdit(id) => format!("/users/edit/{}", id),
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Login | Route::Register | Route::NotFound(_) => Access::Public,
            Route::Dashboard | Route::TaskCreate | Route::TaskDetail(_) | Route::TaskEdit(_) => Access::Authenticated,
            Route::AdminUsers | Route::AdminUserCreate | Route::UserEdit(_) => Access::Admin,
        }
    }

    pub fn gate(&self) -> Option<&'static dyn Gate> {
        match self.access() {
            Access::Public => None,
            Access::Authenticated => Some(&AUTHENTICATED),
            Access::Admin => Some(&ADMIN),
        }
    }
}

impl FromStr for Route {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Route::parse(s))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationState {
    Pending,
    Allowed,
    Redirected(Route),
}

/// Outcome of one navigation. Starts `Pending` and is resolved exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: Route,
    state: NavigationState,
}

impl Navigation {
    fn pending(requested: Route) -> Self {
        Self {
            requested,
            state: NavigationState::Pending,
        }
    }

    fn resolve(mut self, decision: Decision) -> Self {
        if self.state == NavigationState::Pending {
            self.state = match decision {
                Decision::Allowed => NavigationState::Allowed,
                Decision::Redirected(target) => NavigationState::Redirected(target),
            };
        }
        self
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn is_allowed(&self) -> bool {
        self.state == NavigationState::Allowed
    }

    pub fn redirect_target(&self) -> Option<&Route> {
        match &self.state {
            NavigationState::Redirected(target) => Some(target),
            _ => None,
        }
    }

    /// The route that actually renders
    pub fn landed(&self) -> &Route {
        self.redirect_target().unwrap_or(&self.requested)
    }
}

/// Runs gates on every navigation and tracks the current route. Each
/// navigation bumps a generation counter so requests started by the
/// previous view can be abandoned via [`Router::scoped`].
#[derive(Clone)]
pub struct Router {
    session: SessionStore,
    current: Arc<RwLock<Route>>,
    generation: Arc<watch::Sender<u64>>,
}

impl Router {
    pub fn new(session: SessionStore) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            session,
            current: Arc::new(RwLock::new(Route::Login)),
            generation: Arc::new(generation),
        }
    }

    pub fn current(&self) -> Route {
        self.current.read().clone()
    }

    pub fn navigate(&self, path: &str) -> Navigation {
        self.navigate_to(Route::parse(path))
    }

    /// Decisions are never cached: the gate sees the session as it is now
    pub fn navigate_to(&self, route: Route) -> Navigation {
        self.generation.send_modify(|g| *g += 1);

        let navigation = Navigation::pending(route);
        let decision = match navigation.requested.gate() {
            Some(gate) => gate.decide(&self.session.current()),
            None => Decision::Allowed,
        };
        let navigation = navigation.resolve(decision);

        match navigation.redirect_target() {
            Some(target) => tracing::debug!("Navigation to {} redirected to {}", navigation.requested, target),
            None => tracing::debug!("Navigation to {} allowed", navigation.requested),
        }

        *self.current.write() = navigation.landed().clone();
        navigation
    }

    /// Run a view's request, abandoning it with [`ApiError::Cancelled`] if
    /// another navigation happens first
    pub async fn scoped<F, T>(&self, request: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let mut changes = self.generation.subscribe();
        tokio::select! {
            result = request => result,
            _ = changes.changed() => {
                tracing::debug!("Request abandoned after navigation");
                Err(ApiError::Cancelled)
            }
        }
    }
}
