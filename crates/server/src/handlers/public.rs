use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use vantage_booking::models::{
    ApiResponse, Barber, Booking, CreateBookingRequest, Product, ShopSettings, Slot,
};

use crate::handlers::{store_error, HandlerError};
use crate::AppState;

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String,
    pub service_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct BookingsQuery {
    pub barber_id: Option<i64>,
}

/// GET /api/barbers — the roster with each barber's service menu.
pub async fn list_barbers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Barber>>>, HandlerError> {
    Ok(Json(ApiResponse::success(state.barbers_sorted())))
}

/// GET /api/barbers/{id}/slots?date=YYYY-MM-DD&service_id=N — slots a
/// customer can start the service in on that day.
pub async fn list_slots(
    State(state): State<AppState>,
    Path(barber_id): Path<i64>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<ApiResponse<Vec<Slot>>>, HandlerError> {
    let slots = state
        .bookable_slots(barber_id, &query.date, query.service_id)
        .map_err(store_error)?;
    Ok(Json(ApiResponse::success(slots)))
}

/// POST /api/bookings — reserve a slot chain, pending payment.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<Booking>>, HandlerError> {
    let booking = state.create_booking(&body).map_err(store_error)?;
    Ok(Json(ApiResponse::success(booking)))
}

/// GET /api/bookings?barber_id=N — bookings, optionally for one barber.
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, HandlerError> {
    Ok(Json(ApiResponse::success(
        state.bookings_sorted(query.barber_id),
    )))
}

/// GET /api/products — the retail shelf, inactive items included so the
/// admin screens can see them.
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Product>>>, HandlerError> {
    let mut products: Vec<Product> = state.products.iter().map(|e| e.value().clone()).collect();
    products.sort_by_key(|p| p.id);
    Ok(Json(ApiResponse::success(products)))
}

/// GET /api/settings — current working hours and display flags.
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ShopSettings>>, HandlerError> {
    Ok(Json(ApiResponse::success(state.current_settings())))
}
