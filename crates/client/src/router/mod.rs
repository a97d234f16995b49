//! Client-side routing.
//!
//! # Architecture
//!
//! - [`routes`] - Static route table and path matching
//! - [`guard`] - Authorization predicate run before each transition
//! - [`Router`] - Applies static redirects and the guard, tracks the current
//!   location
//!
//! Navigation follows redirects (static ones and those issued by the guard)
//! until a page is allowed, so `/` for an anonymous user ends on `/login`.

pub mod guard;
pub mod routes;

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::add_breadcrumb;
use crate::session::Session;

pub use guard::{Decision, authorize};
pub use routes::{HOME_PATH, LOGIN_PATH, RouteDef, RouteMeta, RouteName};

/// Longest redirect chain followed before giving up.
const MAX_REDIRECTS: usize = 8;

/// Errors that can occur while navigating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// No route matches the path.
    #[error("No route matches {0}")]
    NotFound(String),

    /// Redirects did not settle on a page.
    #[error("Too many redirects starting from {0}")]
    TooManyRedirects(String),
}

/// Something that can move the whole application to another page.
///
/// The API client uses this to send the user to the login page when the
/// backend rejects their token.
pub trait Navigator: Send + Sync {
    /// Navigate to `path`, going through the guard.
    fn redirect(&self, path: &str);
}

/// Page the application is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: RouteName,
    /// Path of the page actually shown.
    pub path: String,
    /// Values captured from dynamic segments, e.g. `id` for `/product/:id`.
    pub params: BTreeMap<String, String>,
    pub meta: RouteMeta,
    /// Path originally requested, when redirects changed it.
    pub redirected_from: Option<String>,
}

/// Shared handle to the router.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

struct RouterInner {
    session: Session,
    current: RwLock<Option<Location>>,
}

impl Router {
    /// Create a router that authorizes against `session`.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                session,
                current: RwLock::new(None),
            }),
        }
    }

    /// Page currently shown, if any navigation succeeded yet.
    #[must_use]
    pub fn current(&self) -> Option<Location> {
        self.inner.current.read().clone()
    }

    /// Navigate to `path`.
    ///
    /// Static redirects and guard redirects are followed. On success the
    /// resulting page becomes the current location.
    ///
    /// # Errors
    ///
    /// Returns an error if a path along the way matches no route or the
    /// redirects do not settle. The current location is left unchanged.
    pub fn navigate(&self, path: &str) -> Result<Location, NavigationError> {
        let mut target = path.to_string();
        let mut redirected = false;

        for _ in 0..=MAX_REDIRECTS {
            let matched = routes::resolve(&target)
                .ok_or_else(|| NavigationError::NotFound(target.clone()))?;

            if let Some(to) = matched.route.redirect {
                debug!(from = %matched.path, to, "Static redirect");
                target = to.to_string();
                redirected = true;
                continue;
            }

            match authorize(matched.route, self.inner.session.snapshot()) {
                Decision::Redirect(to) => {
                    debug!(from = %matched.path, to, "Guard redirect");
                    target = to.to_string();
                    redirected = true;
                }
                Decision::Allow => {
                    let location = Location {
                        name: matched.route.name,
                        path: matched.path,
                        params: matched.params,
                        meta: matched.route.meta,
                        redirected_from: redirected.then(|| path.to_string()),
                    };

                    add_breadcrumb(
                        "navigation",
                        "Opened page",
                        Some(&[("path", location.path.as_str())]),
                    );
                    *self.inner.current.write() = Some(location.clone());
                    return Ok(location);
                }
            }
        }

        Err(NavigationError::TooManyRedirects(path.to_string()))
    }
}

impl Navigator for Router {
    fn redirect(&self, path: &str) {
        if let Err(e) = self.navigate(path) {
            warn!(path, error = %e, "Forced redirect failed");
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("current", &*self.inner.current.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use points_mall_core::{Role, UserId, UserProfile};

    use super::*;
    use crate::storage::MemoryStore;

    fn router() -> (Session, Router) {
        let session = Session::new(Arc::new(MemoryStore::new()));
        let router = Router::new(session.clone());
        (session, router)
    }

    fn sign_in(session: &Session, role: Role) {
        session.set_token("tok");
        session.set_user_info(UserProfile {
            id: UserId::new(1),
            username: "alice".to_string(),
            nickname: None,
            role,
        });
    }

    #[test]
    fn test_anonymous_root_ends_on_login() {
        let (_, router) = router();

        let location = router.navigate("/").unwrap();
        assert_eq!(location.name, RouteName::Login);
        assert_eq!(location.path, LOGIN_PATH);
        assert_eq!(location.redirected_from.as_deref(), Some("/"));
        assert!(location.meta.hide_layout);
        assert_eq!(router.current(), Some(location));
    }

    #[test]
    fn test_signed_in_login_ends_on_home() {
        let (session, router) = router();
        sign_in(&session, Role::User);

        let location = router.navigate("/login").unwrap();
        assert_eq!(location.name, RouteName::Home);
    }

    #[test]
    fn test_admin_gate() {
        let (session, router) = router();
        sign_in(&session, Role::User);
        assert_eq!(
            router.navigate("/admin/points").unwrap().name,
            RouteName::Home
        );

        sign_in(&session, Role::SuperAdministrator);
        let location = router.navigate("/admin/points").unwrap();
        assert_eq!(location.name, RouteName::AdminPoints);
        assert!(location.redirected_from.is_none());
    }

    #[test]
    fn test_params_are_passed_through() {
        let (session, router) = router();
        sign_in(&session, Role::User);

        let location = router.navigate("/product/9").unwrap();
        assert_eq!(location.name, RouteName::ProductDetail);
        assert_eq!(location.params.get("id").map(String::as_str), Some("9"));
    }

    #[test]
    fn test_unknown_path_keeps_current() {
        let (session, router) = router();
        sign_in(&session, Role::User);
        router.navigate("/cart").unwrap();

        let err = router.navigate("/nowhere").unwrap_err();
        assert_eq!(err, NavigationError::NotFound("/nowhere".to_string()));
        assert_eq!(router.current().unwrap().name, RouteName::Cart);
    }

    #[test]
    fn test_forced_redirect_after_logout() {
        let (session, router) = router();
        sign_in(&session, Role::User);
        router.navigate("/orders").unwrap();

        session.logout();
        router.redirect(LOGIN_PATH);
        assert_eq!(router.current().unwrap().name, RouteName::Login);
    }
}
