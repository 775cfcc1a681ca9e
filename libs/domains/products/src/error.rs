use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product with id {0} not found")]
    NotFound(i32),

    #[error("Product with name '{0}' already exists")]
    DuplicateName(String),

    #[error(
        "Expiry date {0} is in the past; a product that has already expired cannot be saved"
    )]
    ExpiryDateInPast(NaiveDate),

    /// Raised by the store when its unique constraint on `name` rejects a write
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => AppError::NotFound(err.to_string()),
            ProductError::DuplicateName(_)
            | ProductError::ExpiryDateInPast(_)
            | ProductError::UniqueViolation(_) => AppError::Conflict(err.to_string()),
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_of(err: ProductError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_guard_failures_are_conflicts() {
        assert_eq!(
            status_of(ProductError::DuplicateName("Honey".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ProductError::ExpiryDateInPast(
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
            )),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ProductError::UniqueViolation("products_name_key".into())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_other_variants_map_to_expected_status() {
        assert_eq!(status_of(ProductError::NotFound(3)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ProductError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ProductError::Database("down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ProductError::NotFound(42).to_string(),
            "Product with id 42 not found"
        );
        assert_eq!(
            ProductError::DuplicateName("Wildflower Honey".into()).to_string(),
            "Product with name 'Wildflower Honey' already exists"
        );
    }
}
