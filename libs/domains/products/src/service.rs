use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, NewProduct, Product, UpdateProduct};
use crate::repository::ProductRepository;

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Guard service for product writes.
///
/// Sits between the transport and the repository and enforces:
/// - names are unique (exact, case-sensitive match)
/// - the expiry date is not before today when a product is created or updated
/// - the target product exists before get, update or delete
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    today: fn() -> NaiveDate,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            today: self.today,
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self::with_clock(repository, utc_today)
    }

    /// Build a service whose notion of "today" comes from `today`.
    pub fn with_clock(repository: R, today: fn() -> NaiveDate) -> Self {
        Self {
            repository: Arc::new(repository),
            today,
        }
    }

    fn ensure_not_expired(&self, expiry_date: NaiveDate) -> ProductResult<()> {
        if expiry_date < (self.today)() {
            return Err(ProductError::ExpiryDateInPast(expiry_date));
        }
        Ok(())
    }

    /// List all products
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ProductResult<Vec<Product>> {
        self.repository.find_all().await
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> ProductResult<Product> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Create a product after validating the payload and running the name
    /// and expiry checks
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        if self.repository.find_by_name(&input.name).await?.is_some() {
            return Err(ProductError::DuplicateName(input.name));
        }

        self.ensure_not_expired(input.expiry_date)?;

        let product = self.repository.insert(NewProduct::from(input)).await?;

        tracing::info!(product_id = product.id, "Created product");
        Ok(product)
    }

    /// Apply a partial update to an existing product
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: i32, input: UpdateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.get_product(id).await?;

        if let Some(ref name) = input.name {
            let owner = self.repository.find_by_name(name).await?;
            if owner.is_some_and(|existing| existing.id != id) {
                return Err(ProductError::DuplicateName(name.clone()));
            }
        }

        if let Some(expiry_date) = input.expiry_date {
            self.ensure_not_expired(expiry_date)?;
        }

        // The row can disappear between the existence check and the write
        let product = self
            .repository
            .update(id, input)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        tracing::info!(product_id = id, "Updated product");
        Ok(product)
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> ProductResult<()> {
        self.get_product(id).await?;

        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound(id));
        }

        tracing::info!(product_id = id, "Deleted product");
        Ok(())
    }
}
