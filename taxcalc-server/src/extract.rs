//! Extractor rejections as [`ApiError::BadRequest`], so malformed input gets
//! the same JSON error body as every other failure.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` (or the query/path
//! equivalents) and unwrap it with the helpers here:
//!
//! ```ignore
//! async fn handler(body: Result<Json<T>, JsonRejection>) -> ApiResult<...> {
//!     let body = extract_json(body)?;
//! }
//! ```

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};

use crate::error::ApiError;

pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    result
        .map(|Json(value)| value)
        .map_err(|err| ApiError::BadRequest(err.body_text()))
}

pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    result
        .map(|Query(value)| value)
        .map_err(|err| ApiError::BadRequest(err.body_text()))
}

pub fn extract_path<T>(result: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    result
        .map(|Path(value)| value)
        .map_err(|err| ApiError::BadRequest(err.body_text()))
}
