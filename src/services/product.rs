use crate::cache::ProductCache;
use crate::db::product_repository::ProductRepository;
use crate::error::ProductError;
use crate::models::product::{Product, ProductPage, ProductRequest, ProductResponse};
use std::sync::Arc;
use tracing::{debug, info};

const SORTABLE_FIELDS: &[&str] = &[
    "id",
    "name",
    "price",
    "category",
    "stock",
    "createdDate",
    "lastUpdatedDate",
];

/// CRUD over the product store, mediated by the in-process cache. All
/// invalidation ordering lives here so it stays a visible, testable
/// contract rather than an annotation side effect.
#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepository,
    cache: Arc<ProductCache>,
}

impl ProductService {
    pub fn new(repo: ProductRepository, cache: Arc<ProductCache>) -> Self {
        ProductService { repo, cache }
    }

    /// Paginated listing. Always reads the store directly; the cache is
    /// never consulted or populated here.
    pub async fn get_all(
        &self,
        page: usize,
        size: usize,
        sort_by: &str,
        direction: &str,
    ) -> Result<ProductPage, ProductError> {
        if size == 0 {
            return Err(ProductError::Validation(
                "Page size must be at least 1".to_string(),
            ));
        }
        if !SORTABLE_FIELDS.contains(&sort_by) {
            return Err(ProductError::Validation(format!(
                "Unknown sort field '{sort_by}'"
            )));
        }
        let descending = match direction.to_ascii_uppercase().as_str() {
            "ASC" => false,
            "DESC" => true,
            other => {
                return Err(ProductError::Validation(format!(
                    "Unknown sort direction '{other}'"
                )))
            }
        };

        let mut products = self.repo.find_all().await?;
        sort_products(&mut products, sort_by);
        if descending {
            products.reverse();
        }

        let total_elements = products.len();
        let total_pages = total_elements.div_ceil(size);
        let content = products
            .iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .map(ProductResponse::from)
            .collect();

        Ok(ProductPage {
            content,
            page,
            size,
            total_elements,
            total_pages,
        })
    }

    /// Read-through by id: cache hit returns without touching the store.
    pub async fn get_by_id(&self, id: u64) -> Result<ProductResponse, ProductError> {
        if let Some(cached) = self.cache.get_by_id(id) {
            debug!(product_id = id, "Product cache hit");
            return Ok(cached);
        }

        let product = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;
        let response = ProductResponse::from(&product);
        self.cache.put_by_id(id, response.clone());
        Ok(response)
    }

    /// Read-through by category. An empty list is a valid cached value.
    pub async fn get_by_category(&self, category: &str) -> Result<Vec<ProductResponse>, ProductError> {
        if let Some(cached) = self.cache.get_category(category) {
            debug!(category = %category, "Category cache hit");
            return Ok(cached);
        }

        let products = self.repo.find_by_category(category).await?;
        let responses: Vec<ProductResponse> = products.iter().map(ProductResponse::from).collect();
        self.cache.put_category(category, responses.clone());
        Ok(responses)
    }

    /// Writes through to the store and leaves both cache keyspaces alone;
    /// the next read of this id or category repopulates on miss.
    pub async fn create(&self, request: &ProductRequest) -> Result<ProductResponse, ProductError> {
        request.validate().map_err(ProductError::Validation)?;

        let product = self.repo.create(request, chrono::Utc::now()).await?;
        info!(product_id = product.id, name = %product.name, "Product created");
        Ok(ProductResponse::from(&product))
    }

    /// Replaces all mutable fields, then overwrites the by-id entry and
    /// evicts the category list for the product's new category. If the
    /// update moved the product out of a previously cached category, that
    /// old list is knowingly left stale.
    pub async fn update(
        &self,
        id: u64,
        request: &ProductRequest,
    ) -> Result<ProductResponse, ProductError> {
        request.validate().map_err(ProductError::Validation)?;

        let mut product = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        product.name = request.name.clone();
        product.description = request.description.clone();
        product.price = request.price;
        product.category = request.category.clone();
        product.stock = request.stock;
        product.last_updated_date = chrono::Utc::now();

        self.repo.save(&product).await?;

        let response = ProductResponse::from(&product);
        self.cache.put_by_id(id, response.clone());
        if let Some(category) = &response.category {
            self.cache.evict_category(category);
        }

        info!(product_id = id, "Product updated");
        Ok(response)
    }

    /// Deletes the row, evicts the by-id entry, and clears the whole
    /// category keyspace rather than targeting one list.
    pub async fn delete(&self, id: u64) -> Result<(), ProductError> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ProductError::NotFound(id));
        }

        self.repo.delete(id).await?;
        self.cache.evict_by_id(id);
        self.cache.clear_categories();

        info!(product_id = id, "Product deleted");
        Ok(())
    }
}

fn sort_products(products: &mut [Product], sort_by: &str) {
    match sort_by {
        "id" => products.sort_by_key(|p| p.id),
        "name" => products.sort_by(|a, b| a.name.cmp(&b.name)),
        "price" => products.sort_by(|a, b| a.price.cmp(&b.price)),
        "category" => products.sort_by(|a, b| a.category.cmp(&b.category)),
        "stock" => products.sort_by(|a, b| a.stock.cmp(&b.stock)),
        "createdDate" => products.sort_by_key(|p| p.created_date),
        "lastUpdatedDate" => products.sort_by_key(|p| p.last_updated_date),
        _ => unreachable!("sort field validated by caller"),
    }
}
