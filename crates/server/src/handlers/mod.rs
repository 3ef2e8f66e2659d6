pub mod admin;
pub mod health;
pub mod payment;
pub mod public;
pub mod wallet;

use axum::http::StatusCode;
use axum::Json;

use vantage_booking::models::ApiResponse;

use crate::store::StoreError;

pub type HandlerError = (StatusCode, Json<ApiResponse<()>>);

pub fn store_error(err: StoreError) -> HandlerError {
    match err {
        StoreError::NotFound(what) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("{} not found", what))),
        ),
        StoreError::Conflict(msg) => (StatusCode::CONFLICT, Json(ApiResponse::error(msg))),
        StoreError::Invalid(msg) => (StatusCode::BAD_REQUEST, Json(ApiResponse::error(msg))),
    }
}
