//! Query types for the catalog API.

use onlinestore_core::CategoryId;
use url::Url;

/// Default page size for product listings.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default number of categories fetched when no limit is given.
pub const DEFAULT_CATEGORY_LIMIT: u32 = 30;

/// Filters for listing products.
///
/// Maps onto the `/products` query string: `limit`, `offset`, `title`,
/// `categoryId`, `priceMin`, `priceMax`. Unset filters are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductFilter {
    pub limit: u32,
    pub offset: u32,
    pub title: Option<String>,
    pub category_id: Option<CategoryId>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            title: None,
            category_id: None,
            price_min: None,
            price_max: None,
        }
    }
}

impl ProductFilter {
    /// `limit` products starting at `offset`.
    #[must_use]
    pub fn page(limit: u32, offset: u32) -> Self {
        Self {
            limit,
            offset,
            ..Self::default()
        }
    }

    /// Append this filter to `url` as query parameters.
    pub(crate) fn apply(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("limit", &self.limit.to_string());
        pairs.append_pair("offset", &self.offset.to_string());
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            pairs.append_pair("title", title);
        }
        if let Some(category_id) = self.category_id {
            pairs.append_pair("categoryId", &category_id.to_string());
        }
        if let Some(price_min) = self.price_min {
            pairs.append_pair("priceMin", &price_min.to_string());
        }
        if let Some(price_max) = self.price_max {
            pairs.append_pair("priceMax", &price_max.to_string());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_default_filter() {
        let mut url = Url::parse("https://api.example.test/api/v1/products").unwrap();
        ProductFilter::default().apply(&mut url);
        assert_eq!(url.query(), Some("limit=20&offset=0"));
    }

    #[test]
    fn test_apply_all_filters() {
        let mut url = Url::parse("https://api.example.test/api/v1/products").unwrap();
        let filter = ProductFilter {
            limit: 10,
            offset: 30,
            title: Some("blue shirt".to_string()),
            category_id: Some(CategoryId::new(2)),
            price_min: Some(5),
            price_max: Some(50),
        };
        filter.apply(&mut url);
        assert_eq!(
            url.query(),
            Some("limit=10&offset=30&title=blue+shirt&categoryId=2&priceMin=5&priceMax=50")
        );
    }

    #[test]
    fn test_apply_skips_empty_title() {
        let mut url = Url::parse("https://api.example.test/api/v1/products").unwrap();
        let filter = ProductFilter {
            title: Some(String::new()),
            ..ProductFilter::page(5, 0)
        };
        filter.apply(&mut url);
        assert_eq!(url.query(), Some("limit=5&offset=0"));
    }
}
