//! Integration tests for rehydrating state from the file store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use points_mall_client::cart::CartLine;
use points_mall_client::config::ClientConfig;
use points_mall_client::notify::NotificationLog;
use points_mall_client::router::{LOGIN_PATH, RouteName};
use points_mall_client::state::AppState;
use points_mall_client::storage::{FileStore, KeyValueStore, keys};
use points_mall_core::{ProductId, Role};
use points_mall_integration_tests::profile;
use url::Url;

fn config(dir: &tempfile::TempDir) -> ClientConfig {
    let mut config = ClientConfig::new(Url::parse("http://127.0.0.1:9").unwrap());
    config.storage_path = dir.path().join("nested").join("storage.json");
    config
}

fn open(config: &ClientConfig) -> AppState {
    AppState::open(config, Arc::new(NotificationLog::new())).unwrap()
}

#[test]
fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);

    {
        let state = open(&config);
        state.session().set_token("persisted-token");
        state.session().set_user_info(profile(Role::Administrator));
        state.session().set_points(1200);
    }

    let state = open(&config);
    let session = state.session();
    assert!(session.is_authenticated());
    assert_eq!(session.user_info(), Some(profile(Role::Administrator)));
    assert_eq!(session.points(), 1200);

    let location = state.router().navigate("/admin/inventory").unwrap();
    assert_eq!(location.name, RouteName::AdminInventory);
}

#[test]
fn test_logout_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);

    {
        let state = open(&config);
        state.session().set_token("tok");
        state.session().set_user_info(profile(Role::User));
        state.session().logout();
    }

    let state = open(&config);
    assert!(!state.session().is_authenticated());
    assert!(state.session().user_info().is_none());
    assert_eq!(state.session().points(), 0);
    assert_eq!(state.router().navigate("/cart").unwrap().path, LOGIN_PATH);
}

#[test]
fn test_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);

    {
        let state = open(&config);
        for (id, quantity) in [(1, 2), (2, 3)] {
            state
                .cart()
                .add_to_cart(CartLine {
                    id: ProductId::new(id),
                    name: format!("Product {id}"),
                    image: Some(format!("https://cdn.example.com/{id}.png")),
                    quantity,
                    points_required: 50,
                })
                .unwrap();
        }
        state.cart().update_quantity(ProductId::new(2), 1);
    }

    let state = open(&config);
    assert_eq!(state.cart().cart_count(), 3);
    assert_eq!(state.cart().total_points(), 150);
    assert_eq!(
        state
            .cart()
            .line(ProductId::new(1))
            .and_then(|line| line.image),
        Some("https://cdn.example.com/1.png".to_string())
    );
}

#[test]
fn test_stored_keys_use_wire_names() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);

    {
        let state = open(&config);
        state.session().set_token("tok");
        state.session().set_user_info(profile(Role::User));
        state.session().set_points(75);
    }

    let store = FileStore::open(&config.storage_path).unwrap();
    assert_eq!(store.get(keys::TOKEN).unwrap().as_deref(), Some("tok"));
    assert_eq!(store.get(keys::POINTS).unwrap().as_deref(), Some("75"));

    let raw = store.get(keys::USER_INFO).unwrap().unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored["username"], "tester");
    assert_eq!(stored["role"], "USER");
}

#[test]
fn test_unreadable_values_start_empty() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);

    {
        let store = FileStore::open(&config.storage_path).unwrap();
        store.set(keys::TOKEN, "").unwrap();
        store.set(keys::USER_INFO, "not json").unwrap();
        store.set(keys::POINTS, "lots").unwrap();
        store.set(keys::CART, "{}").unwrap();
    }

    let state = open(&config);
    assert!(!state.session().is_authenticated());
    assert!(state.session().user_info().is_none());
    assert_eq!(state.session().points(), 0);
    assert!(state.cart().is_empty());
}
