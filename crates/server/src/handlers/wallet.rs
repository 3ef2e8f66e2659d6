use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use vantage_booking::models::{
    ApiResponse, BarberDashboard, OwnerDashboard, ResolveWithdrawalRequest, Wallet,
    WalletTransaction, WithdrawRequest, WithdrawalRequest, WithdrawalStatus,
};

use crate::handlers::{store_error, HandlerError};
use crate::AppState;

#[derive(Deserialize)]
pub struct WithdrawalsQuery {
    pub status: Option<WithdrawalStatus>,
}

/// GET /api/wallet/{barber_id} — available, pending, and lifetime balances.
pub async fn wallet_summary(
    State(state): State<AppState>,
    Path(barber_id): Path<i64>,
) -> Result<Json<ApiResponse<Wallet>>, HandlerError> {
    let wallet = state.wallet_summary(barber_id).map_err(store_error)?;
    Ok(Json(ApiResponse::success(wallet)))
}

/// GET /api/wallet/{barber_id}/transactions — the ledger, newest first.
pub async fn wallet_transactions(
    State(state): State<AppState>,
    Path(barber_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<WalletTransaction>>>, HandlerError> {
    if !state.barbers.contains_key(&barber_id) {
        return Err(store_error(crate::store::StoreError::NotFound("barber")));
    }
    Ok(Json(ApiResponse::success(state.transactions_for(barber_id))))
}

/// POST /api/wallet/{barber_id}/withdraw — hold part of the available
/// balance for payout.
pub async fn request_withdrawal(
    State(state): State<AppState>,
    Path(barber_id): Path<i64>,
    Json(body): Json<WithdrawRequest>,
) -> Result<Json<ApiResponse<WithdrawalRequest>>, HandlerError> {
    let request = state
        .request_withdrawal(barber_id, body.amount_cents)
        .map_err(store_error)?;
    tracing::info!(barber_id, amount_cents = body.amount_cents, "withdrawal requested");
    Ok(Json(ApiResponse::success(request)))
}

/// GET /api/withdrawals?status=pending — payout requests, optionally by
/// status.
pub async fn list_withdrawals(
    State(state): State<AppState>,
    Query(query): Query<WithdrawalsQuery>,
) -> Result<Json<ApiResponse<Vec<WithdrawalRequest>>>, HandlerError> {
    Ok(Json(ApiResponse::success(
        state.withdrawals_sorted(query.status),
    )))
}

/// PUT /api/withdrawals/{id} — approve a payout or release the hold.
pub async fn resolve_withdrawal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ResolveWithdrawalRequest>,
) -> Result<Json<ApiResponse<WithdrawalRequest>>, HandlerError> {
    let request = state
        .resolve_withdrawal(id, body.approve)
        .map_err(store_error)?;
    tracing::info!(id, approved = body.approve, "withdrawal resolved");
    Ok(Json(ApiResponse::success(request)))
}

/// GET /api/dashboard/owner — shop-wide revenue, commission, and roster
/// stats for the month.
pub async fn owner_dashboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OwnerDashboard>>, HandlerError> {
    Ok(Json(ApiResponse::success(state.owner_dashboard())))
}

/// GET /api/dashboard/barber/{id} — one chair's bookings and earnings.
pub async fn barber_dashboard(
    State(state): State<AppState>,
    Path(barber_id): Path<i64>,
) -> Result<Json<ApiResponse<BarberDashboard>>, HandlerError> {
    let dashboard = state.barber_dashboard(barber_id).map_err(store_error)?;
    Ok(Json(ApiResponse::success(dashboard)))
}
