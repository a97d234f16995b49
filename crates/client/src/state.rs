//! Application state shared across the client.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cart::Cart;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::notify::Notifier;
use crate::router::Router;
use crate::session::Session;
use crate::storage::{FileStore, KeyValueStore};

/// Application state: one session, cart, router and API client per process.
///
/// This struct is cheaply cloneable via `Arc`. The session is created once
/// and handed to the router and the API client here, so nothing reaches for
/// it through globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    session: Session,
    cart: Cart,
    router: Router,
    api: ApiClient,
}

impl AppState {
    /// Wire the client over `storage` with a process-lifetime cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        Self::assemble(config, storage, notifier, Cart::new())
    }

    /// Wire the client over the file store at `config.storage_path`.
    ///
    /// The cart is persisted too, so it survives between runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or the HTTP client
    /// cannot be built.
    pub fn open(config: &ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage_path)?);
        let cart = Cart::persistent(storage.clone());
        Self::assemble(config, storage, notifier, cart)
    }

    fn assemble(
        config: &ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        cart: Cart,
    ) -> Result<Self> {
        let session = Session::new(storage);
        let router = Router::new(session.clone());
        let api = ApiClient::new(
            config,
            session.clone(),
            notifier,
            Arc::new(router.clone()),
        )?;

        tracing::debug!(
            base_url = %config.base_url,
            authenticated = session.is_authenticated(),
            "Application state ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                session,
                cart,
                router,
                api,
            }),
        })
    }

    /// Get the session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Get the cart.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.inner.cart
    }

    /// Get the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.inner.router
    }

    /// Get the API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use points_mall_core::{ProductId, Role, UserId, UserProfile};
    use url::Url;

    use super::*;
    use crate::cart::CartLine;
    use crate::notify::NotificationLog;
    use crate::router::RouteName;
    use crate::storage::MemoryStore;

    fn config() -> ClientConfig {
        ClientConfig::new(Url::parse("http://127.0.0.1:9").unwrap())
    }

    #[test]
    fn test_components_share_the_session() {
        let state = AppState::new(
            &config(),
            Arc::new(MemoryStore::new()),
            Arc::new(NotificationLog::new()),
        )
        .unwrap();

        state.session().set_token("tok");
        state.session().set_user_info(UserProfile {
            id: UserId::new(1),
            username: "root".to_string(),
            nickname: None,
            role: Role::Administrator,
        });

        let location = state.router().navigate("/admin/reports").unwrap();
        assert_eq!(location.name, RouteName::AdminReports);
    }

    #[test]
    fn test_open_persists_session_and_cart() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.storage_path = dir.path().join("storage.json");

        {
            let state = AppState::open(&config, Arc::new(NotificationLog::new())).unwrap();
            state.session().set_token("tok");
            state.session().set_points(500);
            state
                .cart()
                .add_to_cart(CartLine {
                    id: ProductId::new(5),
                    name: "Tea".to_string(),
                    image: None,
                    quantity: 2,
                    points_required: 120,
                })
                .unwrap();
        }

        let state = AppState::open(&config, Arc::new(NotificationLog::new())).unwrap();
        assert!(state.session().is_authenticated());
        assert_eq!(state.session().points(), 500);
        assert_eq!(state.cart().total_points(), 240);
    }
}
