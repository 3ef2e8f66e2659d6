use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use vantage_booking::models::{
    ApiResponse, CreatePaymentLinkRequest, PaymentLinkResponse, PaymentStatusResponse,
};

use crate::handlers::{store_error, HandlerError};
use crate::AppState;

/// POST /api/payments/create-link — price the deposit plus cart and mint
/// the link the customer pays through. Retrying returns the same link.
pub async fn create_link(
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentLinkRequest>,
) -> Result<Json<ApiResponse<PaymentLinkResponse>>, HandlerError> {
    let link = state.create_payment_link(&body).map_err(store_error)?;
    Ok(Json(ApiResponse::success(link)))
}

/// GET /api/payments/status/{booking_id} — where the payment stands.
pub async fn payment_status(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<PaymentStatusResponse>>, HandlerError> {
    let status = state.payment_status(booking_id).map_err(store_error)?;
    Ok(Json(ApiResponse::success(PaymentStatusResponse { status })))
}

fn ensure_sandbox(state: &AppState, booking_id: i64) -> Result<(), HandlerError> {
    let is_sandbox = state
        .payments
        .get(&booking_id)
        .map(|p| p.is_sandbox)
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("payment not found")),
        ))?;
    if !is_sandbox {
        return Err((
            StatusCode::CONFLICT,
            Json(ApiResponse::error("payment is not in sandbox mode")),
        ));
    }
    Ok(())
}

/// POST /api/payments/sandbox-complete/{booking_id} — settle a sandbox
/// payment as the provider callback would.
pub async fn sandbox_complete(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, HandlerError> {
    ensure_sandbox(&state, booking_id)?;
    state.settle_payment(booking_id).map_err(store_error)?;
    Ok(Json(ApiResponse::success("payment completed")))
}

/// POST /api/payments/sandbox-fail/{booking_id} — fail a sandbox payment,
/// cancelling the booking and freeing its slots.
pub async fn sandbox_fail(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, HandlerError> {
    ensure_sandbox(&state, booking_id)?;
    state.fail_payment(booking_id).map_err(store_error)?;
    Ok(Json(ApiResponse::success("payment failed")))
}
