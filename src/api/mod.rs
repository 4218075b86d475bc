//! REST API module.
//!
//! Public storefront routes and the admin console routes share one response
//! envelope carrying the store revision.

mod calendar;
mod contact;
mod datastore;
mod items;
mod kits;
mod products;
mod quotes;

pub use calendar::*;
pub use contact::*;
pub use datastore::*;
pub use items::*;
pub use kits::*;
pub use products::*;
pub use quotes::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: AppError, revision_id: i64) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

/// Remove keys a client may not write.
fn strip_keys(map: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        map.shift_remove(*key);
    }
}

/// Trimmed, non-empty text.
fn required_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Check a `name` present in a merge body: it must stay a non-blank string.
fn validate_name_change(fields: &Map<String, Value>) -> Result<(), AppError> {
    match fields.get("name") {
        None => Ok(()),
        Some(Value::String(name)) if !name.trim().is_empty() => Ok(()),
        Some(_) => Err(AppError::Validation(
            "Name must be a non-empty string".to_string(),
        )),
    }
}
