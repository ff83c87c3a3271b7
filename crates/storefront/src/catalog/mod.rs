//! Catalog REST API client.
//!
//! # Architecture
//!
//! - The catalog API is the source of truth for products and categories
//! - Endpoints live under `{base_url}/api/v1`: `/products` and `/categories`
//! - Reads are cached in memory via `moka`; any write clears the cache
//! - Writes (the manager screens) send the optional bearer token
//!
//! # Example
//!
//! ```rust,ignore
//! use onlinestore_storefront::catalog::{CatalogClient, ProductFilter};
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let shirts = client
//!     .fetch_products(&ProductFilter {
//!         title: Some("shirt".to_string()),
//!         ..ProductFilter::default()
//!     })
//!     .await?;
//! ```

mod cache;
pub mod types;

pub use types::{DEFAULT_CATEGORY_LIMIT, DEFAULT_PAGE_SIZE, ProductFilter};

use std::sync::Arc;

use moka::future::Cache;
use onlinestore_core::{Category, CategoryId, CategoryRequest, Product, ProductId, ProductRequest};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

use crate::config::CatalogConfig;
use cache::{CacheKey, CacheValue};

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The configured base URL cannot carry API paths.
    #[error("Invalid catalog base URL: {0}")]
    InvalidUrl(String),
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the catalog REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    api_root: Url,
    api_token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("api_root", &self.inner.api_root.as_str())
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidUrl` if the base URL cannot be a base
    /// (e.g. `mailto:`).
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        let mut api_root = config.base_url.clone();
        api_root
            .path_segments_mut()
            .map_err(|()| CatalogError::InvalidUrl(config.base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "v1"]);

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                api_root,
                api_token: config.api_token.clone(),
                cache,
            }),
        })
    }

    /// Build an endpoint URL under the API root.
    fn endpoint<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.inner.api_root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    /// Start a request, attaching the bearer token to writes.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let is_write = method != Method::GET;
        let request = self.inner.client.request(method, url);
        match &self.inner.api_token {
            Some(token) if is_write => request.bearer_auth(token.expose_secret()),
            _ => request,
        }
    }

    /// Send a request and decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, CatalogError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(what.to_string()));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError> {
        let cache_key = CacheKey::Products(filter.clone());
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut url = self.endpoint(["products"]);
        filter.apply(&mut url);
        let products: Vec<Product> = self
            .send(self.request(Method::GET, url), "products")
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn fetch_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let cache_key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(["products".to_string(), id.to_string()]);
        let product: Product = self
            .send(
                self.request(Method::GET, url),
                &format!("product {id}"),
            )
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_product(&self, request: &ProductRequest) -> Result<Product, CatalogError> {
        let url = self.endpoint(["products"]);
        let product = self
            .send(
                self.request(Method::POST, url).json(request),
                "products",
            )
            .await?;
        self.invalidate();
        Ok(product)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist.
    #[instrument(skip(self, request))]
    pub async fn update_product(
        &self,
        id: ProductId,
        request: &ProductRequest,
    ) -> Result<Product, CatalogError> {
        let url = self.endpoint(["products".to_string(), id.to_string()]);
        let product = self
            .send(
                self.request(Method::PUT, url).json(request),
                &format!("product {id}"),
            )
            .await?;
        self.invalidate();
        Ok(product)
    }

    /// Delete a product. Returns the API's confirmation flag.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<bool, CatalogError> {
        let url = self.endpoint(["products".to_string(), id.to_string()]);
        let deleted = self
            .send(
                self.request(Method::DELETE, url),
                &format!("product {id}"),
            )
            .await?;
        self.invalidate();
        Ok(deleted)
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// List products in a category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the category does not exist.
    #[instrument(skip(self))]
    pub async fn fetch_category_products(
        &self,
        category_id: CategoryId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Product>, CatalogError> {
        let cache_key = CacheKey::CategoryProducts {
            category_id,
            limit,
            offset,
        };
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category products");
            return Ok(products);
        }

        let mut url = self.endpoint([
            "categories".to_string(),
            category_id.to_string(),
            "products".to_string(),
        ]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        let products: Vec<Product> = self
            .send(
                self.request(Method::GET, url),
                &format!("category {category_id}"),
            )
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// List categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self, limit: u32) -> Result<Vec<Category>, CatalogError> {
        let cache_key = CacheKey::Categories { limit };
        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let mut url = self.endpoint(["categories"]);
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        let categories: Vec<Category> = self
            .send(self.request(Method::GET, url), "categories")
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Get a single category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the category does not exist.
    #[instrument(skip(self))]
    pub async fn fetch_category(&self, id: CategoryId) -> Result<Category, CatalogError> {
        let cache_key = CacheKey::Category(id);
        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(category);
        }

        let url = self.endpoint(["categories".to_string(), id.to_string()]);
        let category: Category = self
            .send(
                self.request(Method::GET, url),
                &format!("category {id}"),
            )
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Category(category.clone()))
            .await;
        Ok(category)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_category(&self, request: &CategoryRequest) -> Result<Category, CatalogError> {
        let url = self.endpoint(["categories"]);
        let category = self
            .send(
                self.request(Method::POST, url).json(request),
                "categories",
            )
            .await?;
        self.invalidate();
        Ok(category)
    }

    /// Replace a category's fields.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the category does not exist.
    #[instrument(skip(self, request))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        request: &CategoryRequest,
    ) -> Result<Category, CatalogError> {
        let url = self.endpoint(["categories".to_string(), id.to_string()]);
        let category = self
            .send(
                self.request(Method::PUT, url).json(request),
                &format!("category {id}"),
            )
            .await?;
        self.invalidate();
        Ok(category)
    }

    /// Delete a category. Returns the API's confirmation flag.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the category does not exist.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<bool, CatalogError> {
        let url = self.endpoint(["categories".to_string(), id.to_string()]);
        let deleted = self
            .send(
                self.request(Method::DELETE, url),
                &format!("category {id}"),
            )
            .await?;
        self.invalidate();
        Ok(deleted)
    }

    /// Drop every cached catalog response.
    pub fn invalidate(&self) {
        self.inner.cache.invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> CatalogClient {
        CatalogClient::new(&CatalogConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_appends_api_prefix() {
        let client = client("https://api.example.test");
        assert_eq!(
            client.endpoint(["products", "4"]).as_str(),
            "https://api.example.test/api/v1/products/4"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("https://example.test/proxy/");
        assert_eq!(
            client.endpoint(["categories"]).as_str(),
            "https://example.test/proxy/api/v1/categories"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = CatalogConfig::new(Url::parse("mailto:shop@example.test").unwrap());
        let err = CatalogClient::new(&config).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidUrl(_)));
    }
}
