//! Pre-render gates for protected routes.
//!
//! A gate only looks at the session snapshot it is handed. Presence of a
//! credential is enough for [`AuthenticatedGate`]; whether the credential is
//! still accepted is decided by the server on the first call the view makes.
//! Both gates send rejected navigations to `/login`.

use crate::router::Route;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Redirected(Route),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

pub trait Gate: Send + Sync {
    fn name(&self) -> &'static str;

    fn decide(&self, session: &Session) -> Decision;
}

/// Allows any session holding a credential
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticatedGate;

/// Allows only authenticated admin sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminGate;

impl Gate for AuthenticatedGate {
    fn name(&self) -> &'static str {
        "authenticated"
    }

    fn decide(&self, session: &Session) -> Decision {
        if session.is_authenticated() {
            Decision::Allowed
        } else {
            Decision::Redirected(Route::Login)
        }
    }
}

impl Gate for AdminGate {
    fn name(&self) -> &'static str {
        "admin"
    }

    fn decide(&self, session: &Session) -> Decision {
        if session.is_admin() {
            Decision::Allowed
        } else {
            Decision::Redirected(Route::Login)
        }
    }
}
