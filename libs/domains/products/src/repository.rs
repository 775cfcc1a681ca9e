use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product, UpdateProduct};

/// Name of the unique constraint the in-memory store mirrors
pub const UNIQUE_NAME_CONSTRAINT: &str = "products_name_key";

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products in ascending id order
    async fn find_all(&self) -> ProductResult<Vec<Product>>;

    async fn find_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    /// Exact, case-sensitive name lookup
    async fn find_by_name(&self, name: &str) -> ProductResult<Option<Product>>;

    /// Insert a product; the store assigns id and timestamps
    async fn insert(&self, input: NewProduct) -> ProductResult<Product>;

    /// Apply a partial update. Returns `None` if the id does not exist.
    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Option<Product>>;

    /// Delete by id. Returns whether a row was removed.
    async fn delete(&self, id: i32) -> ProductResult<bool>;
}

#[derive(Debug, Default)]
struct Store {
    last_id: i32,
    products: BTreeMap<i32, Product>,
}

impl Store {
    fn name_taken(&self, name: &str, except: Option<i32>) -> bool {
        self.products
            .values()
            .any(|p| p.name == name && Some(p.id) != except)
    }
}

/// In-memory implementation of ProductRepository (for development/testing)
///
/// Enforces the same unique constraint on `name` as the database table.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unique_violation() -> ProductError {
    ProductError::UniqueViolation(format!(
        "duplicate key value violates unique constraint \"{UNIQUE_NAME_CONSTRAINT}\""
    ))
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_all(&self) -> ProductResult<Vec<Product>> {
        let store = self.store.read().await;
        Ok(store.products.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> ProductResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.values().find(|p| p.name == name).cloned())
    }

    async fn insert(&self, input: NewProduct) -> ProductResult<Product> {
        let mut store = self.store.write().await;

        if store.name_taken(&input.name, None) {
            return Err(unique_violation());
        }

        store.last_id += 1;
        let product = Product::new(store.last_id, input);
        store.products.insert(product.id, product.clone());

        tracing::debug!(product_id = product.id, "Inserted product");
        Ok(product)
    }

    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Option<Product>> {
        let mut store = self.store.write().await;

        if !store.products.contains_key(&id) {
            return Ok(None);
        }

        if let Some(ref new_name) = input.name {
            if store.name_taken(new_name, Some(id)) {
                return Err(unique_violation());
            }
        }

        let updated = store.products.get_mut(&id).map(|product| {
            product.apply_update(input);
            product.clone()
        });

        tracing::debug!(product_id = id, "Updated product");
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let mut store = self.store.write().await;
        let removed = store.products.remove(&id).is_some();

        if removed {
            tracing::debug!(product_id = id, "Deleted product");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductStatus;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn new_product(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: "A jar".to_string(),
            price: Decimal::new(1250, 2),
            quantity: 5,
            expiry_date: NaiveDate::from_ymd_opt(2035, 1, 1).unwrap(),
            status: ProductStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = InMemoryProductRepository::new();

        let first = repo.insert(new_product("a")).await.unwrap();
        let second = repo.insert(new_product("b")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.find_by_id(2).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = InMemoryProductRepository::new();

        let first = repo.insert(new_product("a")).await.unwrap();
        assert!(repo.delete(first.id).await.unwrap());

        let next = repo.insert(new_product("b")).await.unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_find_all_in_id_order() {
        let repo = InMemoryProductRepository::new();
        for name in ["c", "a", "b"] {
            repo.insert(new_product(name)).await.unwrap();
        }

        let ids: Vec<i32> = repo.find_all().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_find_by_name_is_case_sensitive() {
        let repo = InMemoryProductRepository::new();
        repo.insert(new_product("Honey")).await.unwrap();

        assert!(repo.find_by_name("Honey").await.unwrap().is_some());
        assert!(repo.find_by_name("honey").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_constraint_on_insert() {
        let repo = InMemoryProductRepository::new();
        repo.insert(new_product("Honey")).await.unwrap();

        let result = repo.insert(new_product("Honey")).await;
        assert!(matches!(result, Err(ProductError::UniqueViolation(_))));

        assert!(repo.insert(new_product("honey")).await.is_ok());
    }

    #[tokio::test]
    async fn test_unique_constraint_on_update_ignores_self() {
        let repo = InMemoryProductRepository::new();
        let honey = repo.insert(new_product("Honey")).await.unwrap();
        let jam = repo.insert(new_product("Jam")).await.unwrap();

        let rename_self = UpdateProduct {
            name: Some("Honey".to_string()),
            ..Default::default()
        };
        assert!(repo.update(honey.id, rename_self).await.unwrap().is_some());

        let steal = UpdateProduct {
            name: Some("Honey".to_string()),
            ..Default::default()
        };
        let result = repo.update(jam.id, steal).await;
        assert!(matches!(result, Err(ProductError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_id() {
        let repo = InMemoryProductRepository::new();

        let updated = repo.update(99, UpdateProduct::default()).await.unwrap();
        assert!(updated.is_none());
        assert!(!repo.delete(99).await.unwrap());
    }
}
