use crate::db::Database;
use crate::error::StoreError;
use crate::models::product::{Product, ProductRequest};
use bincode::{Decode, Encode};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::info;

const PRODUCTS_TREE: &str = "products";

#[derive(Debug, Encode, Decode)]
struct StoredProduct {
    id: u64,
    name: String,
    description: Option<String>,
    price: String, // canonical decimal string
    category: Option<String>,
    stock: Option<u32>,
    created_date: i64, // epoch micros
    last_updated_date: i64,
}

impl From<&Product> for StoredProduct {
    fn from(product: &Product) -> Self {
        StoredProduct {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            category: product.category.clone(),
            stock: product.stock,
            created_date: product.created_date.timestamp_micros(),
            last_updated_date: product.last_updated_date.timestamp_micros(),
        }
    }
}

impl TryFrom<StoredProduct> for Product {
    type Error = StoreError;

    fn try_from(stored: StoredProduct) -> Result<Self, StoreError> {
        let price = Decimal::from_str(&stored.price)
            .map_err(|_| StoreError::Corrupt(format!("bad price for product {}", stored.id)))?;
        Ok(Product {
            id: stored.id,
            name: stored.name,
            description: stored.description,
            price,
            category: stored.category,
            stock: stored.stock,
            created_date: chrono::DateTime::from_timestamp_micros(stored.created_date)
                .unwrap_or_else(Utc::now),
            last_updated_date: chrono::DateTime::from_timestamp_micros(stored.last_updated_date)
                .unwrap_or_else(Utc::now),
        })
    }
}

/// Product store. Rows are keyed by a store-assigned monotonic id.
#[derive(Clone)]
pub struct ProductRepository {
    db: Database,
}

impl ProductRepository {
    pub fn new(db: Database) -> Self {
        ProductRepository { db }
    }

    /// Inserts a new row with a store-assigned id; `now` becomes both the
    /// created and last-updated timestamp.
    pub async fn create(
        &self,
        request: &ProductRequest,
        now: DateTime<Utc>,
    ) -> Result<Product, StoreError> {
        let id = self.db.db.generate_id()?;
        let product = Product {
            id,
            name: request.name.clone(),
            description: request.description.clone(),
            price: request.price,
            category: request.category.clone(),
            stock: request.stock,
            created_date: now,
            last_updated_date: now,
        };
        self.put(&product)?;

        info!(product_id = id, name = %product.name, "Product created in database");

        Ok(product)
    }

    pub async fn find_by_id(&self, id: u64) -> Result<Option<Product>, StoreError> {
        let tree = self.db.db.open_tree(PRODUCTS_TREE)?;

        match tree.get(id.to_be_bytes())? {
            Some(data) => {
                let (stored, _): (StoredProduct, usize) =
                    bincode::decode_from_slice(&data, bincode::config::standard())?;
                Ok(Some(Product::try_from(stored)?))
            }
            None => Ok(None),
        }
    }

    /// Full scan in id order. The list-all endpoint always reads here,
    /// never through the cache.
    pub async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        let tree = self.db.db.open_tree(PRODUCTS_TREE)?;

        let mut products = Vec::new();
        for entry in tree.iter() {
            let (_, data) = entry?;
            let (stored, _): (StoredProduct, usize) =
                bincode::decode_from_slice(&data, bincode::config::standard())?;
            products.push(Product::try_from(stored)?);
        }
        Ok(products)
    }

    pub async fn find_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError> {
        let products = self.find_all().await?;
        Ok(products
            .into_iter()
            .filter(|p| p.category.as_deref() == Some(category))
            .collect())
    }

    /// Overwrites an existing row in place.
    pub async fn save(&self, product: &Product) -> Result<(), StoreError> {
        self.put(product)?;
        info!(product_id = product.id, "Product updated in database");
        Ok(())
    }

    pub async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let tree = self.db.db.open_tree(PRODUCTS_TREE)?;
        let removed = tree.remove(id.to_be_bytes())?;
        if removed.is_some() {
            info!(product_id = id, "Product deleted from database");
        }
        Ok(removed.is_some())
    }

    fn put(&self, product: &Product) -> Result<(), StoreError> {
        let tree = self.db.db.open_tree(PRODUCTS_TREE)?;
        let stored = StoredProduct::from(product);
        let encoded = bincode::encode_to_vec(&stored, bincode::config::standard())?;
        tree.insert(product.id.to_be_bytes(), encoded.as_slice())?;
        Ok(())
    }
}
