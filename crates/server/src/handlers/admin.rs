use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use vantage_booking::models::{
    AddSlotRequest, ApiResponse, GenerateScheduleRequest, GenerateScheduleResponse, ShopSettings,
    Slot,
};

use crate::handlers::{store_error, HandlerError};
use crate::AppState;

#[derive(Deserialize)]
pub struct ManageQuery {
    pub date: String,
}

/// POST /api/barbers/{id}/slots/generate — lay out the base schedule for a
/// day from the shop's working hours. Existing slots are left alone.
pub async fn generate_schedule(
    State(state): State<AppState>,
    Path(barber_id): Path<i64>,
    Json(body): Json<GenerateScheduleRequest>,
) -> Result<Json<ApiResponse<GenerateScheduleResponse>>, HandlerError> {
    let inserted = state
        .generate_schedule(barber_id, &body.date)
        .map_err(store_error)?;
    tracing::info!(barber_id, date = %body.date, inserted, "schedule generated");
    Ok(Json(ApiResponse::success(GenerateScheduleResponse {
        inserted,
    })))
}

/// GET /api/barbers/{id}/slots/manage?date=YYYY-MM-DD — every slot of the
/// day, booked and hidden ones included.
pub async fn manage_slots(
    State(state): State<AppState>,
    Path(barber_id): Path<i64>,
    Query(query): Query<ManageQuery>,
) -> Result<Json<ApiResponse<Vec<Slot>>>, HandlerError> {
    if !state.barbers.contains_key(&barber_id) {
        return Err(store_error(crate::store::StoreError::NotFound("barber")));
    }
    Ok(Json(ApiResponse::success(
        state.day_slots(barber_id, &query.date),
    )))
}

/// PUT /api/admin/slots/{id}/toggle — hide or show a slot. Booked slots
/// cannot be touched.
pub async fn toggle_slot(
    State(state): State<AppState>,
    Path(slot_id): Path<i64>,
) -> Result<Json<ApiResponse<Slot>>, HandlerError> {
    let slot = state.toggle_slot(slot_id).map_err(store_error)?;
    Ok(Json(ApiResponse::success(slot)))
}

/// POST /api/barbers/{id}/slots/add — add a one-off slot outside the base
/// schedule.
pub async fn add_slot(
    State(state): State<AppState>,
    Path(barber_id): Path<i64>,
    Json(body): Json<AddSlotRequest>,
) -> Result<Json<ApiResponse<Slot>>, HandlerError> {
    let slot = state
        .add_custom_slot(barber_id, &body.date, &body.time)
        .map_err(store_error)?;
    Ok(Json(ApiResponse::success(slot)))
}

/// DELETE /api/admin/slots/{id} — remove a slot. Booked slots cannot be
/// deleted until their booking is cancelled.
pub async fn delete_slot(
    State(state): State<AppState>,
    Path(slot_id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, HandlerError> {
    state.delete_slot(slot_id).map_err(store_error)?;
    Ok(Json(ApiResponse::success("slot deleted")))
}

/// PUT /api/settings — update working hours, slot interval, and tips.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<ShopSettings>,
) -> Result<Json<ApiResponse<ShopSettings>>, HandlerError> {
    let settings = state.update_settings(body).map_err(store_error)?;
    tracing::info!(
        work_start = %settings.work_start,
        work_end = %settings.work_end,
        interval = settings.slot_interval_minutes,
        "settings updated"
    );
    Ok(Json(ApiResponse::success(settings)))
}
