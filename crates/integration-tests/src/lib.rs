//! Integration tests for the online store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p onlinestore-integration-tests
//! ```
//!
//! The tests are self-contained: [`MockCatalog`] serves the catalog REST API
//! on a random local port, and users live in a temporary JSON file.
//!
//! # Test Categories
//!
//! - `catalog` - Catalog client against the mock API (caching, errors, auth)
//! - `sync` - Cart and wishlist store with the file-backed user store

#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use onlinestore_core::{Category, CategoryId, CategoryRequest, Product, ProductId, ProductRequest};
use onlinestore_storefront::config::{CatalogConfig, StorefrontConfig, SyncConfig};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use url::Url;

/// Token the catalog client sends on writes in these tests.
pub const TEST_API_TOKEN: &str = "test-manager-token";

/// Build a category fixture.
#[must_use]
pub fn sample_category(id: i32, name: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_string(),
        image: format!("https://placehold.co/{id}"),
    }
}

/// Build a product fixture.
#[must_use]
pub fn sample_product(id: i32, title: &str, price: i64, category: &Category) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        price,
        description: format!("{title} description"),
        images: vec![format!("https://placehold.co/p{id}")],
        category: category.clone(),
    }
}

/// Storefront configuration pointing at `catalog` and storing users in
/// `user_file`, with a fast sync loop.
#[must_use]
pub fn storefront_config(catalog: &MockCatalog, user_file: &Path) -> StorefrontConfig {
    StorefrontConfig {
        catalog: catalog.client_config(),
        sync: SyncConfig {
            interval: Duration::from_millis(20),
            max_backoff: Duration::from_millis(200),
        },
        user_file: user_file.to_path_buf(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Poll `check` until it holds or two seconds pass.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

// =============================================================================
// Mock catalog API
// =============================================================================

#[derive(Default)]
struct MockState {
    products: Mutex<Vec<Product>>,
    categories: Mutex<Vec<Category>>,
    hits: AtomicUsize,
    authorizations: Mutex<Vec<Option<String>>>,
    throttled: AtomicBool,
}

impl MockState {
    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }

    fn record_auth(&self, headers: &HeaderMap) {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.authorizations.lock().push(auth);
    }

    fn category(&self, id: CategoryId) -> Option<Category> {
        self.categories.lock().iter().find(|c| c.id == id).cloned()
    }
}

/// In-process stand-in for the catalog REST API under `/api/v1`.
pub struct MockCatalog {
    base_url: Url,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockCatalog {
    /// Start the mock on a random local port.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/api/v1/products", get(list_products).post(create_product))
            .route(
                "/api/v1/products/{id}",
                get(get_product).put(update_product).delete(delete_product),
            )
            .route("/api/v1/categories", get(list_categories).post(create_category))
            .route(
                "/api/v1/categories/{id}",
                get(get_category)
                    .put(update_category)
                    .delete(delete_category),
            )
            .route("/api/v1/categories/{id}/products", get(category_products))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock catalog");
        let addr = listener.local_addr().expect("Failed to read local address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock catalog server failed");
        });

        let base_url = Url::parse(&format!("http://{addr}")).expect("Failed to build base URL");
        Self {
            base_url,
            state,
            server,
        }
    }

    /// Base URL of the mock, without the `/api/v1` prefix.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Client configuration with the test token and a long cache TTL.
    #[must_use]
    pub fn client_config(&self) -> CatalogConfig {
        let mut config = CatalogConfig::new(self.base_url.clone());
        config.api_token = Some(TEST_API_TOKEN.to_string().into());
        config.cache_ttl = Duration::from_secs(300);
        config
    }

    /// Seed a category.
    pub fn insert_category(&self, category: Category) {
        self.state.categories.lock().push(category);
    }

    /// Seed a product (its category is seeded too when missing).
    pub fn insert_product(&self, product: Product) {
        if self.state.category(product.category.id).is_none() {
            self.insert_category(product.category.clone());
        }
        self.state.products.lock().push(product);
    }

    /// Change a product behind the client's back.
    pub fn rename_product(&self, id: ProductId, title: &str) {
        if let Some(product) = self
            .state
            .products
            .lock()
            .iter_mut()
            .find(|p| p.id == id)
        {
            product.title = title.to_string();
        }
    }

    /// Number of requests the mock has served.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// `Authorization` header of every write, in order.
    #[must_use]
    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.state.authorizations.lock().clone()
    }

    /// Make product listings answer `429 Too Many Requests`.
    pub fn set_throttled(&self, throttled: bool) {
        self.state.throttled.store(throttled, Ordering::SeqCst);
    }
}

impl Drop for MockCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}

type Shared = State<Arc<MockState>>;

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"message": "Could not find any entity"})),
    )
        .into_response()
}

fn page<T: Clone>(items: &[T], params: &HashMap<String, String>) -> Vec<T> {
    let number = |key: &str| params.get(key).and_then(|v| v.parse::<usize>().ok());
    let offset = number("offset").unwrap_or(0);
    let limit = number("limit").unwrap_or(usize::MAX);
    items.iter().skip(offset).take(limit).cloned().collect()
}

async fn list_products(
    State(state): Shared,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hit();
    if state.throttled.load(Ordering::SeqCst) {
        return (StatusCode::TOO_MANY_REQUESTS, [(header::RETRY_AFTER, "7")]).into_response();
    }

    let number = |key: &str| params.get(key).and_then(|v| v.parse::<i64>().ok());
    let title = params.get("title").cloned().unwrap_or_default();
    let category_id = number("categoryId");
    let price_min = number("priceMin");
    let price_max = number("priceMax");

    let matching: Vec<Product> = state
        .products
        .lock()
        .iter()
        .filter(|p| p.title_matches(&title))
        .filter(|p| category_id.is_none_or(|id| i64::from(p.category.id.as_i32()) == id))
        .filter(|p| price_min.is_none_or(|min| p.price >= min))
        .filter(|p| price_max.is_none_or(|max| p.price <= max))
        .cloned()
        .collect();

    Json(page(&matching, &params)).into_response()
}

async fn get_product(State(state): Shared, UrlPath(id): UrlPath<i32>) -> Response {
    state.hit();
    let product = state
        .products
        .lock()
        .iter()
        .find(|p| p.id == ProductId::new(id))
        .cloned();
    product.map_or_else(not_found, |p| Json(p).into_response())
}

async fn create_product(
    State(state): Shared,
    headers: HeaderMap,
    Json(request): Json<ProductRequest>,
) -> Response {
    state.hit();
    state.record_auth(&headers);

    let Some(category) = state.category(request.category_id) else {
        return (StatusCode::BAD_REQUEST, "unknown category").into_response();
    };

    let mut products = state.products.lock();
    let id = products.iter().map(|p| p.id.as_i32()).max().unwrap_or(0) + 1;
    let product = Product {
        id: ProductId::new(id),
        title: request.title,
        price: request.price,
        description: request.description,
        images: request.images,
        category,
    };
    products.push(product.clone());
    (StatusCode::CREATED, Json(product)).into_response()
}

async fn update_product(
    State(state): Shared,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i32>,
    Json(request): Json<ProductRequest>,
) -> Response {
    state.hit();
    state.record_auth(&headers);

    let Some(category) = state.category(request.category_id) else {
        return (StatusCode::BAD_REQUEST, "unknown category").into_response();
    };

    let mut products = state.products.lock();
    let Some(product) = products.iter_mut().find(|p| p.id == ProductId::new(id)) else {
        return not_found();
    };
    product.title = request.title;
    product.price = request.price;
    product.description = request.description;
    product.images = request.images;
    product.category = category;
    Json(product.clone()).into_response()
}

async fn delete_product(
    State(state): Shared,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i32>,
) -> Response {
    state.hit();
    state.record_auth(&headers);

    let mut products = state.products.lock();
    let before = products.len();
    products.retain(|p| p.id != ProductId::new(id));
    if products.len() == before {
        return not_found();
    }
    Json(true).into_response()
}

async fn list_categories(
    State(state): Shared,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hit();
    let categories = state.categories.lock().clone();
    Json(page(&categories, &params)).into_response()
}

async fn get_category(State(state): Shared, UrlPath(id): UrlPath<i32>) -> Response {
    state.hit();
    state
        .category(CategoryId::new(id))
        .map_or_else(not_found, |c| Json(c).into_response())
}

async fn create_category(
    State(state): Shared,
    headers: HeaderMap,
    Json(request): Json<CategoryRequest>,
) -> Response {
    state.hit();
    state.record_auth(&headers);

    let mut categories = state.categories.lock();
    let id = categories.iter().map(|c| c.id.as_i32()).max().unwrap_or(0) + 1;
    let category = Category {
        id: CategoryId::new(id),
        name: request.name,
        image: request.image,
    };
    categories.push(category.clone());
    (StatusCode::CREATED, Json(category)).into_response()
}

async fn update_category(
    State(state): Shared,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i32>,
    Json(request): Json<CategoryRequest>,
) -> Response {
    state.hit();
    state.record_auth(&headers);

    let mut categories = state.categories.lock();
    let Some(category) = categories.iter_mut().find(|c| c.id == CategoryId::new(id)) else {
        return not_found();
    };
    category.name = request.name;
    category.image = request.image;
    Json(category.clone()).into_response()
}

async fn delete_category(
    State(state): Shared,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i32>,
) -> Response {
    state.hit();
    state.record_auth(&headers);

    let mut categories = state.categories.lock();
    let before = categories.len();
    categories.retain(|c| c.id != CategoryId::new(id));
    if categories.len() == before {
        return not_found();
    }
    Json(true).into_response()
}

async fn category_products(
    State(state): Shared,
    UrlPath(id): UrlPath<i32>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hit();
    let id = CategoryId::new(id);
    if state.category(id).is_none() {
        return not_found();
    }
    let matching: Vec<Product> = state
        .products
        .lock()
        .iter()
        .filter(|p| p.category.id == id)
        .cloned()
        .collect();
    Json(page(&matching, &params)).into_response()
}
