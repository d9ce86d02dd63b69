//! Persisted snapshot of the product list and the discount counter
//!
//! Reads are tolerant: an absent or undecodable value falls back to the
//! empty list / zero counter instead of failing startup.

use std::sync::Arc;

use tracing::{debug, warn};

use super::key_value_store::KeyValueStore;
use super::sync_error::StorageError;
use crate::domain::{DiscountCounter, Product};

pub const COUNTER_KEY: &str = "cantidadDescuento";
pub const PRODUCTS_KEY: &str = "productos";

#[derive(Clone)]
pub struct SnapshotRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SnapshotRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub async fn load_counter(&self) -> DiscountCounter {
        let raw = match self.store.get(COUNTER_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read persisted counter: {}", e);
                None
            }
        };

        let value = raw
            .as_deref()
            .and_then(|s| match serde_json::from_str::<u64>(s) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Ignoring invalid persisted counter {:?}: {}", s, e);
                    None
                }
            })
            .unwrap_or(0);

        debug!("Restored discount counter: {}", value);
        DiscountCounter::new(value)
    }

    pub async fn save_counter(&self, counter: DiscountCounter) -> Result<(), StorageError> {
        let value = serde_json::to_string(&counter.value()).map_err(|source| {
            StorageError::Serialization {
                key: COUNTER_KEY.to_string(),
                source,
            }
        })?;
        self.store.set(COUNTER_KEY, value).await
    }

    pub async fn load_products(&self) -> Vec<Product> {
        let raw = match self.store.get(PRODUCTS_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read persisted products: {}", e);
                None
            }
        };

        let Some(raw) = raw else {
            return Vec::new();
        };

        match serde_json::from_str::<Vec<Product>>(&raw) {
            Ok(products) => {
                debug!("Restored {} persisted products", products.len());
                products
            }
            Err(e) => {
                warn!("Ignoring invalid persisted product list: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn save_products(&self, products: &[Product]) -> Result<(), StorageError> {
        let value = serde_json::to_string(products).map_err(|source| {
            StorageError::Serialization {
                key: PRODUCTS_KEY.to_string(),
                source,
            }
        })?;
        self.store.set(PRODUCTS_KEY, value).await
    }

    pub async fn clear_products(&self) -> Result<(), StorageError> {
        self.store.remove(PRODUCTS_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::key_value_store::MemoryKeyValueStore;
    use rstest::rstest;

    fn repository(entries: Vec<(&str, &str)>) -> SnapshotRepository {
        SnapshotRepository::new(Arc::new(MemoryKeyValueStore::with_entries(entries)))
    }

    #[rstest]
    #[case(vec![], 0)]
    #[case(vec![(COUNTER_KEY, "3")], 3)]
    #[case(vec![(COUNTER_KEY, "\"three\"")], 0)]
    #[case(vec![(COUNTER_KEY, "-2")], 0)]
    #[case(vec![(COUNTER_KEY, "null")], 0)]
    #[tokio::test]
    async fn test_load_counter(#[case] entries: Vec<(&str, &str)>, #[case] expected: u64) {
        let repo = repository(entries);
        assert_eq!(repo.load_counter().await.value(), expected);
    }

    #[rstest]
    #[case(vec![], 0)]
    #[case(vec![(PRODUCTS_KEY, "{}")], 0)]
    #[case(vec![(PRODUCTS_KEY, "garbage")], 0)]
    #[case(vec![(PRODUCTS_KEY, r#"[{"nombre":"a","precio":1.5,"codigo":"A","descuento":false}]"#)], 1)]
    #[tokio::test]
    async fn test_load_products(#[case] entries: Vec<(&str, &str)>, #[case] expected_len: usize) {
        let repo = repository(entries);
        assert_eq!(repo.load_products().await.len(), expected_len);
    }

    #[tokio::test]
    async fn test_save_and_clear_products_leaves_counter() {
        let repo = repository(vec![]);
        repo.save_counter(DiscountCounter::new(5)).await.unwrap();
        repo.save_products(&[Product::new("a", 1.0, "A", true)]).await.unwrap();

        repo.clear_products().await.unwrap();

        assert!(repo.store().get(PRODUCTS_KEY).await.unwrap().is_none());
        assert_eq!(repo.store().get(COUNTER_KEY).await.unwrap().as_deref(), Some("5"));
    }
}
