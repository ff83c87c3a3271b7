//! Integration tests for the catalog REST client.
//!
//! Each test starts its own `MockCatalog`, so they can run in parallel.

use onlinestore_core::{CategoryId, CategoryRequest, ProductId, ProductRequest};
use onlinestore_integration_tests::{MockCatalog, TEST_API_TOKEN, sample_category, sample_product};
use onlinestore_storefront::catalog::{CatalogClient, CatalogError, ProductFilter};
use onlinestore_storefront::config::CatalogConfig;

async fn seeded_catalog() -> (MockCatalog, CatalogClient) {
    let mock = MockCatalog::spawn().await;
    let clothes = sample_category(1, "Clothes");
    let shoes = sample_category(2, "Shoes");
    mock.insert_product(sample_product(1, "Blue T-Shirt", 15, &clothes));
    mock.insert_product(sample_product(2, "Red T-Shirt", 25, &clothes));
    mock.insert_product(sample_product(3, "Running Shoes", 90, &shoes));
    mock.insert_product(sample_product(4, "Leather Boots", 150, &shoes));

    let client = CatalogClient::new(&mock.client_config()).expect("Failed to build client");
    (mock, client)
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_fetch_products_applies_filters() {
    let (_mock, client) = seeded_catalog().await;

    let shirts = client
        .fetch_products(&ProductFilter {
            title: Some("t-shirt".to_string()),
            ..ProductFilter::default()
        })
        .await
        .expect("Failed to fetch products");
    let ids: Vec<_> = shirts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![ProductId::new(1), ProductId::new(2)]);

    let mid_range = client
        .fetch_products(&ProductFilter {
            price_min: Some(20),
            price_max: Some(100),
            ..ProductFilter::default()
        })
        .await
        .expect("Failed to fetch products");
    let ids: Vec<_> = mid_range.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![ProductId::new(2), ProductId::new(3)]);

    let shoes = client
        .fetch_products(&ProductFilter {
            category_id: Some(CategoryId::new(2)),
            ..ProductFilter::default()
        })
        .await
        .expect("Failed to fetch products");
    assert!(shoes.iter().all(|p| p.category.name == "Shoes"));
    assert_eq!(shoes.len(), 2);
}

#[tokio::test]
async fn test_fetch_products_paginates() {
    let (_mock, client) = seeded_catalog().await;

    let second_page = client
        .fetch_products(&ProductFilter::page(2, 2))
        .await
        .expect("Failed to fetch products");
    let ids: Vec<_> = second_page.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![ProductId::new(3), ProductId::new(4)]);
}

#[tokio::test]
async fn test_fetch_product_not_found() {
    let (_mock, client) = seeded_catalog().await;

    let result = client.fetch_product(ProductId::new(999)).await;
    assert!(matches!(result, Err(CatalogError::NotFound(_))));
}

#[tokio::test]
async fn test_category_products_and_categories() {
    let (_mock, client) = seeded_catalog().await;

    let categories = client
        .fetch_categories(10)
        .await
        .expect("Failed to fetch categories");
    assert_eq!(categories.len(), 2);

    let category = client
        .fetch_category(CategoryId::new(1))
        .await
        .expect("Failed to fetch category");
    assert_eq!(category.name, "Clothes");

    let clothes = client
        .fetch_category_products(CategoryId::new(1), 10, 0)
        .await
        .expect("Failed to fetch category products");
    assert_eq!(clothes.len(), 2);

    let missing = client
        .fetch_category_products(CategoryId::new(42), 10, 0)
        .await;
    assert!(matches!(missing, Err(CatalogError::NotFound(_))));
}

#[tokio::test]
async fn test_rate_limit_reports_retry_after() {
    let (mock, client) = seeded_catalog().await;
    mock.set_throttled(true);

    let result = client.fetch_products(&ProductFilter::default()).await;
    assert!(matches!(result, Err(CatalogError::RateLimited(7))));
}

// ============================================================================
// Caching
// ============================================================================

#[tokio::test]
async fn test_reads_are_cached_until_a_write() {
    let (mock, client) = seeded_catalog().await;

    let first = client
        .fetch_product(ProductId::new(1))
        .await
        .expect("Failed to fetch product");
    let hits_after_first = mock.hits();

    mock.rename_product(ProductId::new(1), "Renamed Shirt");
    let cached = client
        .fetch_product(ProductId::new(1))
        .await
        .expect("Failed to fetch product");
    assert_eq!(cached, first);
    assert_eq!(mock.hits(), hits_after_first);

    // Any write clears the cache
    client
        .create_category(&CategoryRequest {
            name: "Hats".to_string(),
            image: "https://placehold.co/hats".to_string(),
        })
        .await
        .expect("Failed to create category");

    let fresh = client
        .fetch_product(ProductId::new(1))
        .await
        .expect("Failed to fetch product");
    assert_eq!(fresh.title, "Renamed Shirt");
}

#[tokio::test]
async fn test_filters_are_cached_separately() {
    let (mock, client) = seeded_catalog().await;

    client
        .fetch_products(&ProductFilter::page(2, 0))
        .await
        .expect("Failed to fetch products");
    let hits = mock.hits();

    client
        .fetch_products(&ProductFilter::page(2, 2))
        .await
        .expect("Failed to fetch products");
    assert_eq!(mock.hits(), hits + 1);
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn test_product_crud_round_trip() {
    let (_mock, client) = seeded_catalog().await;

    let created = client
        .create_product(&ProductRequest {
            title: "Mug".to_string(),
            price: 12,
            description: "Ceramic".to_string(),
            category_id: CategoryId::new(1),
            images: vec!["https://placehold.co/mug".to_string()],
        })
        .await
        .expect("Failed to create product");
    assert_eq!(created.id, ProductId::new(5));
    assert_eq!(created.category.name, "Clothes");

    let updated = client
        .update_product(
            created.id,
            &ProductRequest {
                title: "Large Mug".to_string(),
                price: 14,
                description: "Ceramic".to_string(),
                category_id: CategoryId::new(2),
                images: vec![],
            },
        )
        .await
        .expect("Failed to update product");
    assert_eq!(updated.title, "Large Mug");
    assert_eq!(updated.category.name, "Shoes");

    let deleted = client
        .delete_product(created.id)
        .await
        .expect("Failed to delete product");
    assert!(deleted);

    let result = client.fetch_product(created.id).await;
    assert!(matches!(result, Err(CatalogError::NotFound(_))));
}

#[tokio::test]
async fn test_category_crud_round_trip() {
    let (_mock, client) = seeded_catalog().await;

    let created = client
        .create_category(&CategoryRequest {
            name: "Hats".to_string(),
            image: "https://placehold.co/hats".to_string(),
        })
        .await
        .expect("Failed to create category");
    assert_eq!(created.id, CategoryId::new(3));

    let updated = client
        .update_category(
            created.id,
            &CategoryRequest {
                name: "Caps".to_string(),
                image: "https://placehold.co/caps".to_string(),
            },
        )
        .await
        .expect("Failed to update category");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Caps");

    let fetched = client
        .fetch_category(created.id)
        .await
        .expect("Failed to fetch category");
    assert_eq!(fetched, updated);

    let deleted = client
        .delete_category(created.id)
        .await
        .expect("Failed to delete category");
    assert!(deleted);

    let result = client.fetch_category(created.id).await;
    assert!(matches!(result, Err(CatalogError::NotFound(_))));
}

#[tokio::test]
async fn test_update_missing_category_is_not_found() {
    let (_mock, client) = seeded_catalog().await;

    let result = client
        .update_category(
            CategoryId::new(42),
            &CategoryRequest {
                name: "Ghost".to_string(),
                image: String::new(),
            },
        )
        .await;
    assert!(matches!(result, Err(CatalogError::NotFound(_))));
}

#[tokio::test]
async fn test_create_with_unknown_category_is_rejected() {
    let (_mock, client) = seeded_catalog().await;

    let result = client
        .create_product(&ProductRequest {
            title: "Orphan".to_string(),
            price: 1,
            description: String::new(),
            category_id: CategoryId::new(99),
            images: vec![],
        })
        .await;
    assert!(matches!(
        result,
        Err(CatalogError::Status { status: 400, .. })
    ));
}

#[tokio::test]
async fn test_writes_send_bearer_token() {
    let (mock, client) = seeded_catalog().await;

    client
        .delete_category(CategoryId::new(2))
        .await
        .expect("Failed to delete category");
    client
        .delete_product(ProductId::new(1))
        .await
        .expect("Failed to delete product");

    let expected = Some(format!("Bearer {TEST_API_TOKEN}"));
    assert_eq!(mock.authorizations(), vec![expected.clone(), expected]);
}

#[tokio::test]
async fn test_writes_without_token_send_no_authorization() {
    let (mock, _) = seeded_catalog().await;
    let client = CatalogClient::new(&CatalogConfig::new(mock.base_url().clone()))
        .expect("Failed to build client");

    client
        .delete_product(ProductId::new(2))
        .await
        .expect("Failed to delete product");

    assert_eq!(mock.authorizations(), vec![None]);
}
