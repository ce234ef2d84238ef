//! Cart reconciliation against the mock backend.
//!
//! The server cart wins whenever the backend answers; otherwise changes
//! land in the local store and survive a restart.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use nursery_core::{ProductId, ShippingAddress};
use nursery_integration_tests::MockBackend;
use nursery_storefront::storage::{FileStore, LocalStore};
use nursery_storefront::{CheckoutError, Storefront, SyncOutcome};
use secrecy::ExposeSecret;
use tempfile::TempDir;

async fn storefront(backend: &MockBackend, dir: &TempDir) -> Storefront {
    let config = backend.config(dir.path());
    let store: Arc<dyn LocalStore> = Arc::new(FileStore::new(dir.path()));
    let mut storefront = Storefront::with_store(config, store).unwrap();
    storefront.cart.load().await;
    storefront
}

fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Meera Iyer".to_string(),
        line1: "12 Lalbagh Road".to_string(),
        line2: None,
        city: "Bengaluru".to_string(),
        state: "KA".to_string(),
        postal_code: "560027".to_string(),
        country: "IN".to_string(),
        phone: "9845000000".to_string(),
    }
}

#[tokio::test]
async fn test_signed_out_cart_is_local_and_survives_restart() {
    let backend = MockBackend::start().await;
    let fern = backend.add_product("Boston Fern", "boston-fern", 34_900, 5);
    let dir = tempfile::tempdir().unwrap();

    let mut sf = storefront(&backend, &dir).await;
    let outcome = sf.cart.add(fern.to_cart_item(), 2).await;
    assert_eq!(
        outcome,
        SyncOutcome::LocalOnly {
            reason: "not signed in".to_string()
        }
    );
    assert_eq!(sf.cart.item_count(), 2);
    drop(sf);

    let restarted = storefront(&backend, &dir).await;
    assert_eq!(restarted.cart.items().len(), 1);
    assert_eq!(restarted.cart.items()[0].id, fern.id);
    assert_eq!(restarted.cart.items()[0].quantity, 2);
}

#[tokio::test]
async fn test_signed_in_changes_mirror_server_cart() {
    let backend = MockBackend::start().await;
    let fern = backend.add_product("Boston Fern", "boston-fern", 34_900, 5);
    let palm = backend.add_product("Areca Palm", "areca-palm", 79_900, 2);
    let dir = tempfile::tempdir().unwrap();

    let mut sf = storefront(&backend, &dir).await;
    let (user, outcome) = sf.sign_in("meera@nursery.test").await.unwrap();
    assert_eq!(user.id.as_i64(), 1);
    assert!(outcome.is_synced());

    assert!(sf.cart.add(fern.to_cart_item(), 1).await.is_synced());
    assert!(sf.cart.add(palm.to_cart_item(), 3).await.is_synced());
    assert!(sf.cart.update_quantity(palm.id, 0).await.is_synced());
    assert!(sf.cart.remove(fern.id).await.is_synced());

    let token = sf.auth.session().unwrap().token().expose_secret().to_string();
    let server = backend.cart(&token);
    assert_eq!(server.len(), 1);
    assert_eq!(server[0].id, palm.id);
    // Quantity requests below one are clamped.
    assert_eq!(server[0].quantity, 1);
    assert_eq!(sf.cart.items(), server.as_slice());
}

#[tokio::test]
async fn test_outage_falls_back_then_server_wins() {
    let backend = MockBackend::start().await;
    let fern = backend.add_product("Boston Fern", "boston-fern", 34_900, 5);
    let cactus = backend.add_product("Moon Cactus", "moon-cactus", 19_900, 8);
    let dir = tempfile::tempdir().unwrap();

    let mut sf = storefront(&backend, &dir).await;
    sf.sign_in("meera@nursery.test").await.unwrap();
    assert!(sf.cart.add(fern.to_cart_item(), 1).await.is_synced());

    backend.set_failing(true);
    let outcome = sf.cart.add(cactus.to_cart_item(), 1).await;
    let SyncOutcome::LocalOnly { reason } = outcome else {
        panic!("expected a local-only outcome");
    };
    assert!(reason.contains("503"), "{reason}");
    assert_eq!(sf.cart.items().len(), 2);

    backend.set_failing(false);
    assert!(sf.cart.refresh().await.is_synced());
    let ids: Vec<ProductId> = sf.cart.items().iter().map(|i| i.id).collect();
    assert_eq!(ids, [fern.id]);
}

#[tokio::test]
async fn test_checkout_places_order_and_empties_cart() {
    let backend = MockBackend::start().await;
    let fern = backend.add_product("Boston Fern", "boston-fern", 34_900, 5);
    let dir = tempfile::tempdir().unwrap();

    let mut sf = storefront(&backend, &dir).await;
    assert!(matches!(
        sf.cart.checkout(address()).await,
        Err(CheckoutError::EmptyCart)
    ));

    sf.cart.add(fern.to_cart_item(), 2).await;
    assert!(matches!(
        sf.cart.checkout(address()).await,
        Err(CheckoutError::NotSignedIn)
    ));

    sf.sign_in("meera@nursery.test").await.unwrap();
    sf.cart.add(fern.to_cart_item(), 2).await;
    let order = sf.cart.checkout(address()).await.unwrap();

    assert_eq!(order.items.len(), 1);
    assert_eq!(order.total, fern.price.times(2));
    assert!(sf.cart.is_empty());
    assert_eq!(backend.orders().len(), 1);

    let listed = sf.api().list_orders().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(sf.api().get_order(order.id).await.unwrap().id, order.id);
}

#[tokio::test]
async fn test_incomplete_address_rejected_before_request() {
    let backend = MockBackend::start().await;
    let fern = backend.add_product("Boston Fern", "boston-fern", 34_900, 5);
    let dir = tempfile::tempdir().unwrap();

    let mut sf = storefront(&backend, &dir).await;
    sf.sign_in("meera@nursery.test").await.unwrap();
    sf.cart.add(fern.to_cart_item(), 1).await;

    let err = sf
        .cart
        .checkout(ShippingAddress {
            phone: " ".to_string(),
            ..address()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::IncompleteAddress(ref f) if f == &["phone"]));
    assert!(backend.orders().is_empty());
    assert_eq!(sf.cart.items().len(), 1);
}
