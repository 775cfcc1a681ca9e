use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Largest number of fractional digits a price may carry
const PRICE_MAX_SCALE: u32 = 2;

/// Largest price a `numeric(12,2)` column holds
/// (mantissa 999_999_999_999 = 0xE8_D4A5_0FFF split into 32-bit words)
const PRICE_MAX: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, PRICE_MAX_SCALE);

/// Rejects strings that are empty or whitespace-only.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

/// Price must be strictly positive, fit the price column and carry at most
/// two decimal places.
fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() || price.is_zero() {
        return Err(
            ValidationError::new("range").with_message("price must be greater than zero".into()),
        );
    }
    if *price > PRICE_MAX {
        return Err(ValidationError::new("range")
            .with_message("price must not exceed 9999999999.99".into()));
    }
    if price.normalize().scale() > PRICE_MAX_SCALE {
        return Err(ValidationError::new("scale")
            .with_message("price must have at most two decimal places".into()));
    }
    Ok(())
}

/// Product availability status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "product_status")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Store-assigned identifier
    pub id: i32,
    /// Unique product name
    pub name: String,
    pub description: String,
    /// Unit price, at most two decimal places
    #[schema(value_type = f64, example = 31.99)]
    pub price: Decimal,
    pub quantity: i32,
    /// Calendar date (YYYY-MM-DD) after which the product is expired
    pub expiry_date: NaiveDate,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(min = 1), custom(function = "not_blank"))]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = f64, example = 31.99)]
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub quantity: i32,
    pub expiry_date: NaiveDate,
    /// Defaults to `active` when omitted
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

/// DTO for updating an existing product; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(length(min = 1), custom(function = "not_blank"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<f64>, example = 29.5)]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    pub expiry_date: Option<NaiveDate>,
    pub status: Option<ProductStatus>,
}

/// Create payload with defaults resolved, as handed to the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub expiry_date: NaiveDate,
    pub status: ProductStatus,
}

impl From<CreateProduct> for NewProduct {
    fn from(input: CreateProduct) -> Self {
        Self {
            name: input.name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            expiry_date: input.expiry_date,
            status: input.status.unwrap_or_default(),
        }
    }
}

impl Product {
    /// Build a product from a resolved create payload
    pub fn new(id: i32, input: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            expiry_date: input.expiry_date,
            status: input.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply updates from UpdateProduct DTO
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(expiry_date) = update.expiry_date {
            self.expiry_date = expiry_date;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}
