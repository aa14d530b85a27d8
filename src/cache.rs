//! In-memory caching for frequently accessed data.
//! Uses moka for TTL-based caching with LRU eviction.

use moka::sync::Cache;
use once_cell::sync::Lazy;
use std::time::Duration;

/// Cache for rendered catalog pages.
/// Key is built by [`catalog_key`], value is the serialized response body.
static CATALOG_CACHE: Lazy<Cache<String, serde_json::Value>> = Lazy::new(|| {
    let config = crate::app_config::cache();
    Cache::builder()
        .time_to_live(Duration::from_secs(config.catalog_ttl_seconds))
        .max_capacity(config.catalog_capacity)
        .build()
});

/// Cache key for a catalog page, scoped by subject filter and page number.
pub fn catalog_key(subject: Option<&str>, page: u64) -> String {
    match subject {
        Some(slug) => format!("catalog:{}:{}", slug, page),
        None => format!("catalog:all:{}", page),
    }
}

/// Get a cached catalog page if it is still fresh.
pub fn get_catalog_page(key: &str) -> Option<serde_json::Value> {
    CATALOG_CACHE.get(key)
}

/// Store a rendered catalog page.
pub fn store_catalog_page(key: String, page: serde_json::Value) {
    CATALOG_CACHE.insert(key, page);
}

/// Invalidate every cached catalog page.
/// Call this when a course or subject changes; pages are cheap to rebuild
/// and enumerating affected keys is not worth the bookkeeping.
pub fn invalidate_catalog() {
    CATALOG_CACHE.invalidate_all();
    log::debug!("Catalog cache invalidated");
}
