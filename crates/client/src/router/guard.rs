//! Authorization guard evaluated before every navigation.
//!
//! The guard is advisory: it keeps users away from pages they cannot use,
//! but the backend re-checks every request.

use crate::router::routes::{HOME_PATH, LOGIN_PATH, RouteDef, RouteName};
use crate::session::SessionSnapshot;

/// Outcome of the guard for one navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Proceed to the target.
    Allow,
    /// Cancel the navigation and go to this path instead.
    Redirect(&'static str),
}

/// Decide whether `target` may be opened with the given session.
#[must_use]
pub fn authorize(target: &RouteDef, session: SessionSnapshot) -> Decision {
    if target.name == RouteName::Login {
        return if session.authenticated {
            Decision::Redirect(HOME_PATH)
        } else {
            Decision::Allow
        };
    }

    if !session.authenticated {
        return Decision::Redirect(LOGIN_PATH);
    }

    if target.meta.requires_admin && !session.role.is_some_and(points_mall_core::Role::is_admin) {
        return Decision::Redirect(HOME_PATH);
    }

    Decision::Allow
}
