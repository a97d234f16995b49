//! Integration tests for the Points Mall client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p points-mall-integration-tests
//! ```
//!
//! No external services are needed: HTTP scenarios run against a local
//! `wiremock` server and storage is in memory or in a temporary directory.
//!
//! # Test Categories
//!
//! - `api_client` - Token injection, failure notifications, 401 handling
//! - `navigation` - Guard behavior through the wired application state
//! - `cart` - Cart aggregation properties
//! - `persistence` - Session and cart rehydration from the file store

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use points_mall_client::config::ClientConfig;
use points_mall_client::notify::{Notification, NotificationLog};
use points_mall_client::state::AppState;
use points_mall_client::storage::MemoryStore;
use points_mall_core::{Role, UserId, UserProfile};
use url::Url;
use wiremock::MockServer;

/// Application state wired against a mock backend.
pub struct TestContext {
    pub server: MockServer,
    pub state: AppState,
    pub storage: Arc<MemoryStore>,
    pub notifications: Arc<NotificationLog>,
}

impl TestContext {
    /// Start a mock backend and wire a fresh client against it.
    ///
    /// # Panics
    ///
    /// Panics if the mock server URI is not a valid URL.
    pub async fn new() -> Self {
        Self::with_timeout(Duration::from_secs(10)).await
    }

    /// Like [`TestContext::new`] with a custom request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the mock server URI is not a valid URL.
    pub async fn with_timeout(timeout: Duration) -> Self {
        let server = MockServer::start().await;
        let base_url = Url::parse(&server.uri()).expect("mock server uri");
        let config = ClientConfig::new(base_url).with_timeout(timeout);

        let storage = Arc::new(MemoryStore::new());
        let notifications = Arc::new(NotificationLog::new());
        let state = AppState::new(&config, storage.clone(), notifications.clone())
            .expect("application state");

        Self {
            server,
            state,
            storage,
            notifications,
        }
    }

    /// Store a token and a profile with `role`.
    pub fn sign_in(&self, token: &str, role: Role) {
        self.state.session().set_token(token);
        self.state.session().set_user_info(profile(role));
    }

    /// Messages of every notification shown so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.notifications
            .snapshot()
            .into_iter()
            .map(|Notification { message, .. }| message)
            .collect()
    }
}

/// Profile of a test user with `role`.
#[must_use]
pub fn profile(role: Role) -> UserProfile {
    UserProfile {
        id: UserId::new(1001),
        username: "tester".to_string(),
        nickname: Some("Test User".to_string()),
        role,
    }
}
