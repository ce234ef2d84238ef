//! Back-office catalog operations: category editing and product CSV.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::Method;
use nursery_admin::{AdminError, CategoryManager, ProductAdmin};
use nursery_core::product_csv::{CsvError, CsvFlavor};
use nursery_core::tree::TreeError;
use nursery_core::{CategoryId, CategoryInput, Role};
use nursery_integration_tests::{CLERK_TOKEN, MockBackend};
use nursery_storefront::Storefront;
use nursery_storefront::api::ProductQuery;
use tempfile::TempDir;

async fn admin_storefront(backend: &MockBackend, dir: &TempDir) -> Storefront {
    backend.register_user(CLERK_TOKEN, 7, "gardener@nursery.test", Role::Admin);
    let mut sf = Storefront::new(backend.clerk_config(dir.path(), CLERK_TOKEN)).unwrap();
    sf.sign_in("gardener@nursery.test").await.unwrap();
    sf
}

#[tokio::test]
async fn test_create_derives_slug_and_rejects_unknown_parent() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let sf = admin_storefront(&backend, &dir).await;

    let mut manager = CategoryManager::new(sf.api().clone());
    assert!(manager.load().await.is_empty());

    let created = manager
        .create(CategoryInput {
            slug: String::new(),
            ..CategoryInput::named("Air Plants")
        })
        .await
        .unwrap();
    assert_eq!(created.slug, "air-plants");
    assert_eq!(backend.categories().len(), 1);

    let err = manager
        .create(CategoryInput {
            parent_id: Some(CategoryId::new(999)),
            ..CategoryInput::named("Orphans")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Tree(TreeError::UnknownParent(_))));
    assert_eq!(backend.hits(&Method::POST, "/api/categories"), 1);
}

#[tokio::test]
async fn test_cycle_and_children_guards() {
    let backend = MockBackend::start().await;
    let indoor = backend.add_category("Indoor Plants", None, 0);
    let ferns = backend.add_category("Ferns", Some(indoor.id), 0);
    let maidenhair = backend.add_category("Maidenhair", Some(ferns.id), 0);
    let dir = tempfile::tempdir().unwrap();
    let sf = admin_storefront(&backend, &dir).await;

    let mut manager = CategoryManager::new(sf.api().clone());
    manager.load().await;

    let err = manager
        .update(
            indoor.id,
            CategoryInput {
                parent_id: Some(maidenhair.id),
                ..CategoryInput::from(&indoor)
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Tree(TreeError::Cycle { .. })), "{err}");
    let path = format!("/api/categories/{}", indoor.id);
    assert_eq!(backend.hits(&Method::PUT, &path), 0);

    let err = manager.delete(indoor.id).await.unwrap_err();
    assert!(matches!(err, AdminError::HasChildren { count: 1, .. }));

    manager.delete(maidenhair.id).await.unwrap();
    assert!(manager.get(maidenhair.id).is_none());
    assert_eq!(backend.categories().len(), 2);

    // Moving a subtree under a sibling root is fine.
    let outdoor = backend.add_category("Outdoor Plants", None, 1);
    manager.load().await;
    let moved = manager
        .update(
            ferns.id,
            CategoryInput {
                parent_id: Some(outdoor.id),
                ..CategoryInput::from(&ferns)
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.parent_id, Some(outdoor.id));
}

#[tokio::test]
async fn test_move_sibling_renumbers_and_persists() {
    let backend = MockBackend::start().await;
    let herbs = backend.add_category("Herbs", None, 0);
    let cacti = backend.add_category("Cacti", None, 1);
    let bonsai = backend.add_category("Bonsai", None, 2);
    let dir = tempfile::tempdir().unwrap();
    let sf = admin_storefront(&backend, &dir).await;

    let mut manager = CategoryManager::new(sf.api().clone());
    manager.load().await;
    let changed = manager.move_sibling(None, 2, 0).await.unwrap();
    assert_eq!(changed, 3);

    let mut stored = backend.categories();
    stored.sort_by_key(|c| c.sort_order);
    let ids: Vec<CategoryId> = stored.iter().map(|c| c.id).collect();
    assert_eq!(ids, [bonsai.id, herbs.id, cacti.id]);

    let tree = manager.tree();
    assert_eq!(tree[0].category.id, bonsai.id);
}

#[tokio::test]
async fn test_load_swallows_malformed_listing() {
    let backend = MockBackend::start().await;
    backend.add_category("Succulents", None, 0);
    backend.set_malformed_categories(true);
    let dir = tempfile::tempdir().unwrap();
    let sf = admin_storefront(&backend, &dir).await;

    let mut manager = CategoryManager::new(sf.api().clone());
    assert!(manager.load().await.is_empty());
    assert!(manager.tree().is_empty());
}

#[tokio::test]
async fn test_try_load_reports_the_failure() {
    let backend = MockBackend::start().await;
    let succulents = backend.add_category("Succulents", None, 0);
    let dir = tempfile::tempdir().unwrap();
    let sf = admin_storefront(&backend, &dir).await;

    backend.set_failing(true);
    let mut manager = CategoryManager::new(sf.api().clone());
    let err = manager.try_load().await.unwrap_err();
    assert!(matches!(err, AdminError::Api(ref e) if e.is_server_fault()));
    assert!(manager.categories().is_empty());

    backend.set_failing(false);
    backend.set_malformed_categories(true);
    assert!(matches!(
        manager.try_load().await,
        Err(AdminError::Api(_))
    ));

    backend.set_malformed_categories(false);
    assert_eq!(manager.try_load().await.unwrap().len(), 1);
    assert!(manager.get(succulents.id).is_some());
}

#[tokio::test]
async fn test_basic_import_uploads_file() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let sf = admin_storefront(&backend, &dir).await;
    let products = ProductAdmin::new(sf.api().clone());

    let report = products
        .import_csv("plants.csv", "name,slug,price\nRose,rose,199\nLily,lily,249.50\n")
        .await
        .unwrap();

    assert_eq!(report.flavor, CsvFlavor::Basic);
    assert_eq!(report.created, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(backend.hits(&Method::POST, "/api/products/bulk-upload"), 1);
    assert_eq!(backend.hits(&Method::POST, "/api/products"), 0);
    assert_eq!(backend.products().len(), 2);
}

#[tokio::test]
async fn test_basic_import_skips_malformed_rows() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let sf = admin_storefront(&backend, &dir).await;
    let products = ProductAdmin::new(sf.api().clone());

    let report = products
        .import_csv(
            "plants.csv",
            "name,slug,price\nRose,rose,199\nLily,lily,\nTulip,tulip,149\n",
        )
        .await
        .unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors, ["Row 3: missing price"]);

    let uploads = backend.uploads();
    assert_eq!(uploads.len(), 1);
    assert!(!uploads[0].contains("lily"));
    assert!(uploads[0].contains("rose") && uploads[0].contains("tulip"));
    let slugs: Vec<_> = backend.products().into_iter().map(|p| p.slug).collect();
    assert_eq!(slugs, ["rose", "tulip"]);
}

#[tokio::test]
async fn test_basic_import_without_valid_rows_sends_nothing() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let sf = admin_storefront(&backend, &dir).await;
    let products = ProductAdmin::new(sf.api().clone());

    let report = products
        .import_csv("plants.csv", "name,slug,price\nLily,lily,\n")
        .await
        .unwrap();

    assert_eq!((report.created, report.failed), (0, 1));
    assert_eq!(backend.hits(&Method::POST, "/api/products/bulk-upload"), 0);
}

#[tokio::test]
async fn test_enhanced_import_reports_bad_rows() {
    let backend = MockBackend::start().await;
    backend.add_product("Rose", "rose", 19_900, 4);
    let dir = tempfile::tempdir().unwrap();
    let sf = admin_storefront(&backend, &dir).await;
    let products = ProductAdmin::new(sf.api().clone());

    let csv = "name, slug, price, description, inventory\n\
               Fern,fern,249,Shade lover,12\n\
               Bad,bad,cheap,,3\n\
               Rose,rose,199,,1\n\
               Palm,palm,799,,4\n";
    let report = products.import_csv("plants.csv", csv).await.unwrap();

    assert_eq!(report.flavor, CsvFlavor::Enhanced);
    assert_eq!(report.created, 2);
    assert_eq!(report.failed, 2);
    assert!(report.errors.iter().any(|e| e.contains("invalid price")));
    assert!(report.errors.iter().any(|e| e.starts_with("rose:")));
    assert_eq!(backend.products().len(), 3);
}

#[tokio::test]
async fn test_unknown_header_stops_import() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let sf = admin_storefront(&backend, &dir).await;
    let products = ProductAdmin::new(sf.api().clone());

    let err = products
        .import_csv("plants.csv", "title,price\nRose,199\n")
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Csv(CsvError::Header { .. })));
    assert!(backend.products().is_empty());
}

#[tokio::test]
async fn test_export_matches_server_export_and_refreshes_cache() {
    let backend = MockBackend::start().await;
    for n in 0..3 {
        backend.add_product(&format!("Plant {n}"), &format!("plant-{n}"), 10_000 + n, 1);
    }
    let dir = tempfile::tempdir().unwrap();
    let sf = admin_storefront(&backend, &dir).await;
    let products = ProductAdmin::new(sf.api().clone());

    let local = products.export_csv().await.unwrap();
    let server = products.download_export().await.unwrap();
    assert!(local.starts_with("name,slug,price,description,inventory\n"));
    assert!(local.contains("plant-2"));
    assert_eq!(local, server);

    let query = ProductQuery::default();
    assert_eq!(products.list(&query).await.unwrap().total, 3);
    let listings = backend.hits(&Method::GET, "/api/products");
    products.list(&query).await.unwrap();
    assert_eq!(backend.hits(&Method::GET, "/api/products"), listings);

    let first = backend.products()[0].id;
    products.delete(first).await.unwrap();
    assert_eq!(products.list(&query).await.unwrap().total, 2);
    assert_eq!(backend.hits(&Method::GET, "/api/products"), listings + 1);
}
