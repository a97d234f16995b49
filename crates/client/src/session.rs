//! User session state.
//!
//! The session holds the bearer token, the user profile and the points
//! balance. Every setter mirrors its value into the [`KeyValueStore`] so a
//! restarted client picks up where it left off.
//!
//! `Session` is a cheap handle: clones share the same state. One instance is
//! built per process and handed to the router and the API client explicitly.
//!
//! Mutators hold the state lock across the storage write, so memory and
//! storage always change together.

use std::sync::Arc;

use parking_lot::RwLock;
use points_mall_core::{Role, UserProfile};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::storage::{KeyValueStore, keys};

/// Shared handle to the session state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<SessionState>,
}

#[derive(Default)]
struct SessionState {
    token: Option<SecretString>,
    user_info: Option<UserProfile>,
    points: i64,
}

/// Point-in-time view of the session used for route authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    /// Whether a non-empty token is present.
    pub authenticated: bool,
    /// Role of the stored profile, if any.
    pub role: Option<Role>,
}

impl Session {
    /// Create a session, rehydrating token, profile and points from `storage`.
    ///
    /// Missing or unreadable values start empty: no token, no profile, zero
    /// points.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let state = SessionState {
            token: read(storage.as_ref(), keys::TOKEN)
                .filter(|token| !token.is_empty())
                .map(SecretString::from),
            user_info: read(storage.as_ref(), keys::USER_INFO).and_then(|raw| {
                serde_json::from_str::<Option<UserProfile>>(&raw)
                    .inspect_err(|e| warn!(error = %e, "Discarding unreadable stored profile"))
                    .ok()
                    .flatten()
            }),
            points: read(storage.as_ref(), keys::POINTS).map_or(0, |raw| {
                raw.trim()
                    .parse()
                    .inspect_err(|e| warn!(error = %e, "Discarding unreadable stored points"))
                    .unwrap_or(0)
            }),
        };

        debug!(
            authenticated = state.token.is_some(),
            has_profile = state.user_info.is_some(),
            points = state.points,
            "Session rehydrated"
        );

        Self {
            inner: Arc::new(SessionInner {
                storage,
                state: RwLock::new(state),
            }),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.inner.state.read().token.clone()
    }

    /// Whether a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.read().token.is_some()
    }

    /// Profile of the logged-in user.
    #[must_use]
    pub fn user_info(&self) -> Option<UserProfile> {
        self.inner.state.read().user_info.clone()
    }

    /// Points balance.
    #[must_use]
    pub fn points(&self) -> i64 {
        self.inner.state.read().points
    }

    /// Token presence and role, read under a single lock.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.read();
        SessionSnapshot {
            authenticated: state.token.is_some(),
            role: state.user_info.as_ref().map(|profile| profile.role),
        }
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Replace the token and persist it.
    ///
    /// The token is opaque; an empty string leaves the session unauthenticated.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();

        let mut state = self.inner.state.write();
        self.persist(keys::TOKEN, &token);
        state.token = (!token.is_empty()).then(|| SecretString::from(token));
        debug!(authenticated = state.token.is_some(), "Token updated");
    }

    /// Replace the profile and persist it as JSON.
    pub fn set_user_info(&self, profile: UserProfile) {
        set_sentry_user(&profile.id, Some(&profile.username));
        debug!(user_id = %profile.id, role = %profile.role, "Profile updated");

        let mut state = self.inner.state.write();
        match serde_json::to_string(&profile) {
            Ok(serialized) => self.persist(keys::USER_INFO, &serialized),
            Err(e) => warn!(error = %e, "Failed to serialize profile"),
        }
        state.user_info = Some(profile);
    }

    /// Replace the points balance and persist it.
    pub fn set_points(&self, points: i64) {
        let mut state = self.inner.state.write();
        self.persist(keys::POINTS, &points.to_string());
        state.points = points;
        debug!(points, "Points updated");
    }

    /// Clear token, profile and points, in memory and in storage.
    pub fn logout(&self) {
        {
            let mut state = self.inner.state.write();
            self.forget(keys::TOKEN);
            self.forget(keys::USER_INFO);
            self.forget(keys::POINTS);
            *state = SessionState::default();
        }

        clear_sentry_user();
        debug!("Session cleared");
    }

    /// Drop only the token, keeping profile and points.
    ///
    /// Used when the backend rejects the token as unauthorized.
    pub fn expire_token(&self) {
        let mut state = self.inner.state.write();
        self.forget(keys::TOKEN);
        state.token = None;
        debug!("Token expired");
    }

    /// Value for an `Authorization` header, if a token is present.
    pub(crate) fn bearer(&self) -> Option<String> {
        self.inner
            .state
            .read()
            .token
            .as_ref()
            .map(|token| token.expose_secret().to_string())
    }

    // =========================================================================
    // Storage Helpers
    // =========================================================================

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.inner.storage.set(key, value) {
            warn!(key, error = %e, "Failed to persist session value");
        }
    }

    fn forget(&self, key: &str) {
        if let Err(e) = self.inner.storage.remove(key) {
            warn!(key, error = %e, "Failed to remove session value");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("Session")
            .field("token", &state.token.as_ref().map(|_| "[REDACTED]"))
            .field("user_info", &state.user_info)
            .field("points", &state.points)
            .finish()
    }
}

fn read(storage: &dyn KeyValueStore, key: &str) -> Option<String> {
    storage
        .get(key)
        .inspect_err(|e| warn!(key, error = %e, "Failed to read session value"))
        .ok()
        .flatten()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{OnceLock, Weak};

    use points_mall_core::UserId;

    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    fn profile(role: Role) -> UserProfile {
        UserProfile {
            id: UserId::new(7),
            username: "alice".to_string(),
            nickname: None,
            role,
        }
    }

    fn session() -> (Arc<MemoryStore>, Session) {
        let storage = Arc::new(MemoryStore::new());
        let session = Session::new(storage.clone());
        (storage, session)
    }

    #[test]
    fn test_new_session_is_empty() {
        let (_, session) = session();

        assert!(!session.is_authenticated());
        assert!(session.user_info().is_none());
        assert_eq!(session.points(), 0);
        assert_eq!(session.snapshot(), SessionSnapshot::default());
    }

    #[test]
    fn test_setters_persist() {
        let (storage, session) = session();

        session.set_token("tok-123");
        session.set_user_info(profile(Role::Administrator));
        session.set_points(350);

        assert_eq!(storage.get(keys::TOKEN).unwrap().as_deref(), Some("tok-123"));
        assert_eq!(storage.get(keys::POINTS).unwrap().as_deref(), Some("350"));
        let stored: UserProfile =
            serde_json::from_str(&storage.get(keys::USER_INFO).unwrap().unwrap()).unwrap();
        assert_eq!(stored.role, Role::Administrator);

        assert_eq!(session.token().unwrap().expose_secret(), "tok-123");
        assert_eq!(
            session.snapshot(),
            SessionSnapshot {
                authenticated: true,
                role: Some(Role::Administrator),
            }
        );
    }

    #[test]
    fn test_rehydrates_from_storage() {
        let (storage, session) = session();
        session.set_token("tok-123");
        session.set_user_info(profile(Role::User));
        session.set_points(90);

        let restored = Session::new(storage);
        assert!(restored.is_authenticated());
        assert_eq!(restored.user_info(), Some(profile(Role::User)));
        assert_eq!(restored.points(), 90);
    }

    #[test]
    fn test_unreadable_values_rehydrate_empty() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(keys::USER_INFO, "{not json").unwrap();
        storage.set(keys::POINTS, "lots").unwrap();
        storage.set(keys::TOKEN, "").unwrap();

        let session = Session::new(storage);
        assert!(!session.is_authenticated());
        assert!(session.user_info().is_none());
        assert_eq!(session.points(), 0);
    }

    #[test]
    fn test_null_profile_rehydrates_as_absent() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(keys::USER_INFO, "null").unwrap();

        let session = Session::new(storage);
        assert!(session.user_info().is_none());
    }

    #[test]
    fn test_logout_clears_everything() {
        let (storage, session) = session();
        session.set_token("tok-123");
        session.set_user_info(profile(Role::SuperAdministrator));
        session.set_points(10);

        session.logout();

        assert!(session.token().is_none());
        assert!(session.user_info().is_none());
        assert_eq!(session.points(), 0);
        assert!(storage.get(keys::TOKEN).unwrap().is_none());
        assert!(storage.get(keys::USER_INFO).unwrap().is_none());
        assert!(storage.get(keys::POINTS).unwrap().is_none());
    }

    #[test]
    fn test_expire_token_keeps_profile() {
        let (storage, session) = session();
        session.set_token("tok-123");
        session.set_user_info(profile(Role::User));

        session.expire_token();

        assert!(!session.is_authenticated());
        assert!(session.user_info().is_some());
        assert!(storage.get(keys::TOKEN).unwrap().is_none());
        assert!(storage.get(keys::USER_INFO).unwrap().is_some());
    }

    /// Store that records whether the session lock was held for each write.
    #[derive(Default)]
    struct LockCheckingStore {
        entries: MemoryStore,
        session: OnceLock<Weak<SessionInner>>,
        unlocked_writes: AtomicUsize,
    }

    impl LockCheckingStore {
        fn check(&self) {
            let locked = self
                .session
                .get()
                .and_then(Weak::upgrade)
                .is_some_and(|inner| inner.state.try_read().is_none());
            if !locked {
                self.unlocked_writes.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    impl KeyValueStore for LockCheckingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.entries.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.check();
            self.entries.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.check();
            self.entries.remove(key)
        }
    }

    #[test]
    fn test_storage_writes_happen_under_the_state_lock() {
        let storage = Arc::new(LockCheckingStore::default());
        let session = Session::new(storage.clone());
        assert!(storage.session.set(Arc::downgrade(&session.inner)).is_ok());

        session.set_token("tok");
        session.set_user_info(profile(Role::User));
        session.set_points(40);
        session.expire_token();
        session.logout();

        assert_eq!(storage.unlocked_writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_concurrent_login_and_logout_stay_in_sync() {
        let (storage, session) = session();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..500 {
                    session.set_token(format!("tok-{i}"));
                }
            });
            scope.spawn(|| {
                for _ in 0..500 {
                    session.logout();
                }
            });
        });

        let stored = storage.get(keys::TOKEN).unwrap();
        assert_eq!(session.bearer(), stored);
    }

    #[test]
    fn test_clones_share_state() {
        let (_, session) = session();
        let other = session.clone();

        other.set_token("shared");
        assert_eq!(session.bearer().as_deref(), Some("shared"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let (_, session) = session();
        session.set_token("super-secret-token");

        let debug_output = format!("{session:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-token"));
    }
}
