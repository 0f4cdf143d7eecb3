use crate::models::product::ProductResponse;
use dashmap::DashMap;
use tracing::debug;

/// In-process product cache with two independent keyspaces: one entry per
/// product id, and one entry per category holding that category's full
/// list. DashMap shards serialize operations on the same key while leaving
/// different keys free to proceed concurrently. Never the source of truth;
/// the product service decides when entries are written or evicted.
#[derive(Default)]
pub struct ProductCache {
    by_id: DashMap<u64, ProductResponse>,
    by_category: DashMap<String, Vec<ProductResponse>>,
}

impl ProductCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_by_id(&self, id: u64) -> Option<ProductResponse> {
        self.by_id.get(&id).map(|entry| entry.value().clone())
    }

    pub fn put_by_id(&self, id: u64, product: ProductResponse) {
        self.by_id.insert(id, product);
    }

    pub fn evict_by_id(&self, id: u64) {
        if self.by_id.remove(&id).is_some() {
            debug!(product_id = id, "Evicted product cache entry");
        }
    }

    pub fn get_category(&self, category: &str) -> Option<Vec<ProductResponse>> {
        self.by_category
            .get(category)
            .map(|entry| entry.value().clone())
    }

    pub fn put_category(&self, category: &str, products: Vec<ProductResponse>) {
        self.by_category.insert(category.to_string(), products);
    }

    pub fn evict_category(&self, category: &str) {
        if self.by_category.remove(category).is_some() {
            debug!(category = %category, "Evicted category cache entry");
        }
    }

    /// Coarse invalidation used on delete: drops every cached category
    /// list rather than targeting one.
    pub fn clear_categories(&self) {
        self.by_category.clear();
        debug!("Cleared category cache keyspace");
    }
}
