//! Validation utilities for Web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// Wire format of `updateDate`; the fraction is optional.
pub const UPDATE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// A JSON extractor that validates the request body.
///
/// This extractor deserializes the request body as JSON and then validates it
/// using the `validator` crate. If validation fails, it returns a detailed
/// error response with field-level error information.
///
/// # Example
///
/// ```ignore
/// use disk::web::dto::ValidatedJson;
///
/// async fn post_imports(
///     ValidatedJson(payload): ValidatedJson<ImportRequest>,
/// ) -> Result<StatusCode, ApiError> {
///     // payload is already validated
///     // ...
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // First, extract the JSON body
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        // Then, validate the deserialized value
        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Parse an `updateDate` timestamp, keeping only the date.
pub fn parse_update_date(value: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(value, UPDATE_DATE_FORMAT)
        .ok()
        .map(|dt| dt.date())
}

/// Validate that a string is a UTC timestamp in the `updateDate` format.
pub fn update_date_format(value: &str) -> Result<(), validator::ValidationError> {
    if parse_update_date(value).is_none() {
        return Err(validator::ValidationError::new("update_date_format")
            .with_message("Must be an ISO 8601 UTC timestamp".into()));
    }
    Ok(())
}
