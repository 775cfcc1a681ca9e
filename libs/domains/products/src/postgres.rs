use async_trait::async_trait;
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, SqlErr,
};

use crate::{
    entity,
    error::{ProductError, ProductResult},
    models::{NewProduct, Product, UpdateProduct},
    repository::ProductRepository,
};

/// SeaORM-backed repository over the `products` table
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Unique-constraint failures become `UniqueViolation`; everything else is a
/// generic database error.
fn map_db_err(err: DbErr) -> ProductError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => ProductError::UniqueViolation(detail),
        _ => ProductError::Database(err.to_string()),
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_all(&self) -> ProductResult<Vec<Product>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.map(Into::into))
    }

    async fn insert(&self, input: NewProduct) -> ProductResult<Product> {
        let active_model: entity::ActiveModel = input.into();

        let model = active_model.insert(&self.db).await.map_err(map_db_err)?;

        tracing::debug!(product_id = model.id, "Inserted product");
        Ok(model.into())
    }

    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Option<Product>> {
        let mut active_model = entity::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };

        if let Some(name) = input.name {
            active_model.name = Set(name);
        }
        if let Some(description) = input.description {
            active_model.description = Set(description);
        }
        if let Some(price) = input.price {
            active_model.price = Set(price);
        }
        if let Some(quantity) = input.quantity {
            active_model.quantity = Set(quantity);
        }
        if let Some(expiry_date) = input.expiry_date {
            active_model.expiry_date = Set(expiry_date);
        }
        if let Some(status) = input.status {
            active_model.status = Set(status);
        }

        // Nothing to write
        if !active_model.is_changed() {
            return self.find_by_id(id).await;
        }

        active_model.updated_at = Set(chrono::Utc::now().into());

        match active_model.update(&self.db).await {
            Ok(model) => {
                tracing::debug!(product_id = id, "Updated product");
                Ok(Some(model.into()))
            }
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(map_db_err(e)),
        }
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected > 0 {
            tracing::debug!(product_id = id, "Deleted product");
        }
        Ok(result.rows_affected > 0)
    }
}
