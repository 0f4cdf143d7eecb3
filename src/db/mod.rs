pub mod product_repository;
pub mod user_repository;

use crate::error::StoreError;

#[derive(Clone)]
pub struct Database {
    pub db: sled::Db,
}

impl Database {
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Database { db })
    }

    /// Throwaway database for tests, removed when dropped.
    #[allow(dead_code)]
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Database { db })
    }
}
