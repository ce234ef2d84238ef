//! Order and user administration.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use nursery_admin::{AdminError, OrderAdmin, UserAdmin};
use nursery_core::{OrderStatus, Role, ShippingAddress};
use nursery_integration_tests::{CLERK_TOKEN, CUSTOMER_TOKEN, MockBackend};
use nursery_storefront::{ApiError, Storefront};

async fn signed_in(backend: &MockBackend, dir: &std::path::Path, token: &str, email: &str) -> Storefront {
    let mut sf = Storefront::new(backend.clerk_config(dir, token)).unwrap();
    sf.sign_in(email).await.unwrap();
    sf
}

#[tokio::test]
async fn test_status_changes_stop_at_final_states() {
    let backend = MockBackend::start().await;
    backend.register_user(CLERK_TOKEN, 7, "gardener@nursery.test", Role::Admin);
    backend.register_user(CUSTOMER_TOKEN, 11, "asha@nursery.test", Role::Customer);
    let monstera = backend.add_product("Monstera", "monstera", 129_900, 3);

    let shopper_dir = tempfile::tempdir().unwrap();
    let mut shopper = signed_in(&backend, shopper_dir.path(), CUSTOMER_TOKEN, "asha@nursery.test").await;
    shopper.cart.add(monstera.to_cart_item(), 1).await;
    let order = shopper
        .cart
        .checkout(ShippingAddress {
            full_name: "Asha Rao".to_string(),
            line1: "4 MG Road".to_string(),
            line2: Some("Flat 2B".to_string()),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            postal_code: "411001".to_string(),
            country: "IN".to_string(),
            phone: "9800000000".to_string(),
        })
        .await
        .unwrap();

    let admin_dir = tempfile::tempdir().unwrap();
    let admin = signed_in(&backend, admin_dir.path(), CLERK_TOKEN, "gardener@nursery.test").await;
    let orders = OrderAdmin::new(admin.api().clone());

    let listed = orders.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, OrderStatus::Pending);

    let shipped = orders.update_status(order.id, OrderStatus::Shipped).await.unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    orders.update_status(order.id, OrderStatus::Delivered).await.unwrap();

    let err = orders
        .update_status(order.id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::BadRequest(_)), "{err}");
    assert_eq!(backend.orders()[0].status, OrderStatus::Delivered);
}

#[tokio::test]
async fn test_user_roles() {
    let backend = MockBackend::start().await;
    backend.register_user(CLERK_TOKEN, 7, "gardener@nursery.test", Role::Admin);
    let customer = backend.register_user(CUSTOMER_TOKEN, 11, "asha@nursery.test", Role::Customer);

    let shopper_dir = tempfile::tempdir().unwrap();
    let shopper = signed_in(&backend, shopper_dir.path(), CUSTOMER_TOKEN, "asha@nursery.test").await;
    let err = UserAdmin::new(shopper.api().clone()).list().await.unwrap_err();
    assert!(matches!(err, AdminError::Api(ApiError::Forbidden(_))), "{err}");

    let admin_dir = tempfile::tempdir().unwrap();
    let admin = signed_in(&backend, admin_dir.path(), CLERK_TOKEN, "gardener@nursery.test").await;
    let users = UserAdmin::new(admin.api().clone());

    assert_eq!(users.list().await.unwrap().len(), 2);
    let promoted = users.set_role(customer.id, Role::Admin).await.unwrap();
    assert_eq!(promoted.role, Role::Admin);
}
