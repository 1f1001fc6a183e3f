//! Integration tests for the catalog domain
//!
//! These run against real PostgreSQL via testcontainers to check:
//! - Listing SQL (ILIKE escaping, ordering, price bounds, counts)
//! - The image triple and its CHECK constraint
//! - Units of work commit or roll back as a whole

use domain_catalog::imaging::Upload;
use domain_catalog::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};
use uuid::Uuid;

fn service(db: &TestDatabase) -> CatalogService<PgCatalogStore> {
    CatalogService::new(
        PgCatalogStore::new(db.connection()),
        CatalogSettings::default(),
    )
}

fn form(name: &str, price: f64, category_id: Uuid) -> ProductForm {
    ProductForm {
        nome: name.to_string(),
        preco: Some(price),
        ativo: true,
        estoque: Some(1),
        categoria: Some(category_id),
        ..Default::default()
    }
}

fn listing(q: Option<&str>, category_id: Option<Uuid>, min: Option<&str>, max: Option<&str>) -> ListingParams {
    ListingParams {
        q: q.map(str::to_string),
        categoria_id: category_id.map(|id| id.to_string()),
        preco_min: min.map(str::to_string),
        preco_max: max.map(str::to_string),
        ..Default::default()
    }
}

// ============================================================================
// Write path
// ============================================================================

#[tokio::test]
async fn test_create_and_read_back_product() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("create_and_read_back");
    let category_id = db
        .seed_category(builder.id(0), &builder.name("category", "main"))
        .await;
    let service = service(&db);

    let mut create = form(&builder.name("product", "lamp"), 10.0, category_id);
    create.foto = Some(Upload {
        content_type: "image/jpeg".into(),
        bytes: vec![0xFF, 0xD8, 0xFF, 0x00, 0x42],
    });
    let created = service.create_product(create).await.unwrap();

    let context = service.edit_form(created.id).await.unwrap();
    assert_uuid_eq(context.product.id, created.id, "product id");
    assert_uuid_eq(context.product.category_id, category_id, "category id");
    assert_eq!(context.categories.len(), 1);

    let image = service.product_image(created.id).await.unwrap();
    assert_eq!(image.bytes, vec![0xFF, 0xD8, 0xFF, 0x00, 0x42]);
    assert_eq!(image.mime_type, "image/jpeg");
}

#[tokio::test]
async fn test_missing_category_commits_nothing() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("missing_category");
    db.seed_category(builder.id(0), &builder.name("category", "main"))
        .await;
    let service = service(&db);

    let err = service
        .create_product(form("Orphan", 1.0, builder.id(99)))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::CategoryNotFound(_)));
    assert_eq!(db.count_rows("products").await, 0);
}

#[tokio::test]
async fn test_remove_image_clears_all_columns() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("remove_image");
    let category_id = db
        .seed_category(builder.id(0), &builder.name("category", "main"))
        .await;
    let service = service(&db);

    let mut create = form("Lamp", 5.0, category_id);
    create.foto = Some(Upload {
        content_type: "image/png".into(),
        bytes: vec![1, 2, 3],
    });
    let created = service.create_product(create).await.unwrap();

    let mut edit = form("Lamp", 5.0, category_id);
    edit.remover_foto = true;
    service.update_product(created.id, edit).await.unwrap();

    // chk_products_image_triple would have rejected a partial clear
    let context = service.edit_form(created.id).await.unwrap();
    assert!(context.product.image.is_none());
    assert!(matches!(
        service.product_image(created.id).await,
        Err(CatalogError::NoImage(_))
    ));
}

#[tokio::test]
async fn test_uncommitted_unit_of_work_rolls_back() {
    let db = TestDatabase::new().await;
    let store = PgCatalogStore::new(db.connection());

    {
        let mut tx = store.begin().await.unwrap();
        let category = Category::new(CreateCategory {
            name: "Temporary".into(),
        });
        tx.insert_category(&category).await.unwrap();
        assert_eq!(tx.count_categories().await.unwrap(), 1);
    }

    assert_eq!(db.count_rows("categories").await, 0);
}

#[tokio::test]
async fn test_delete_product() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("delete_product");
    let category_id = db
        .seed_category(builder.id(0), &builder.name("category", "main"))
        .await;
    let service = service(&db);

    let created = service
        .create_product(form("Lamp", 5.0, category_id))
        .await
        .unwrap();

    service.delete_product(created.id).await.unwrap();
    assert_eq!(db.count_rows("products").await, 0);
    assert!(matches!(
        service.delete_product(created.id).await,
        Err(CatalogError::ProductNotFound(_))
    ));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_listing_filters_and_order() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("listing_filters");
    let toys = db.seed_category(builder.id(0), "Toys").await;
    let books = db.seed_category(builder.id(1), "Books").await;
    let service = service(&db);

    for (name, price, category) in [
        ("Red Ball", 5.0, toys),
        ("blue ball", 15.0, toys),
        ("Ball games", 20.0, books),
        ("Kite", 9.0, toys),
    ] {
        service
            .create_product(form(name, price, category))
            .await
            .unwrap();
    }

    let response = service
        .list_products(&listing(Some("BALL"), Some(toys), Some("5"), Some("15")))
        .await
        .unwrap();
    assert_eq!(response.page.total_items, 2);
    let prices: Vec<f64> = response.page.items.iter().map(|p| p.price).collect();
    assert!(prices.iter().all(|p| (5.0..=15.0).contains(p)));
    assert!(response
        .page
        .items
        .iter()
        .all(|p| p.name.to_lowercase().contains("ball") && p.category_id == toys));

    let everything = service
        .list_products(&ListingParams::default())
        .await
        .unwrap();
    assert_eq!(everything.page.total_items, 4);
    assert_eq!(everything.categories[0].name, "Books");
}

#[tokio::test]
async fn test_listing_matches_wildcards_literally() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("listing_wildcards");
    let category_id = db.seed_category(builder.id(0), "Sale").await;
    let service = service(&db);

    for name in ["50% off", "500 off", "a_b", "axb"] {
        service
            .create_product(form(name, 1.0, category_id))
            .await
            .unwrap();
    }

    let percent = service
        .list_products(&listing(Some("0%"), None, None, None))
        .await
        .unwrap();
    assert_eq!(percent.page.total_items, 1);
    assert_eq!(percent.page.items[0].name, "50% off");

    let underscore = service
        .list_products(&listing(Some("_"), None, None, None))
        .await
        .unwrap();
    assert_eq!(underscore.page.total_items, 1);
    assert_eq!(underscore.page.items[0].name, "a_b");
}

#[tokio::test]
async fn test_listing_pagination_and_recovery() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("listing_pagination");
    let category_id = db.seed_category(builder.id(0), "Misc").await;
    let service = service(&db);

    for i in 0..5 {
        service
            .create_product(form(&format!("Item {}", i), 1.0, category_id))
            .await
            .unwrap();
    }

    let params = |page: &str| ListingParams {
        page: Some(page.to_string()),
        pp: Some("2".to_string()),
        ..Default::default()
    };

    let last = service.list_products(&params("3")).await.unwrap();
    assert!(!last.page.recovered);
    assert_eq!(last.page.total_pages, 3);
    assert_eq!(last.page.items.len(), 1);
    assert_eq!(last.page.items[0].name, "Item 4");

    let overflow = service.list_products(&params("4")).await.unwrap();
    assert!(overflow.page.recovered);
    assert_eq!(overflow.page.requested_page, Some(4));
    assert_eq!(overflow.page.current_page, 1);
    assert_sorted_by(&overflow.page.items, |p| p.name.clone(), "recovered page");
    assert_eq!(overflow.page.items[0].name, "Item 0");
}

#[tokio::test]
async fn test_empty_listing() {
    let db = TestDatabase::new().await;
    let service = service(&db);

    let response = service
        .list_products(&ListingParams::default())
        .await
        .unwrap();
    assert!(response.page.items.is_empty());
    assert_eq!(response.page.total_pages, 0);
    assert!(!response.page.recovered);
}
