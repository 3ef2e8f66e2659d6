//! HTTP surface for the booking core: an in-memory shop behind the same
//! JSON API the client crate speaks.

pub mod handlers;
pub mod store;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use store::{PaymentLinkMode, ShopState, StoreError};

pub type AppState = Arc<ShopState>;

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/barbers", get(handlers::public::list_barbers))
        .route(
            "/api/barbers/{barber_id}/slots",
            get(handlers::public::list_slots),
        )
        .route(
            "/api/bookings",
            get(handlers::public::list_bookings).post(handlers::public::create_booking),
        )
        .route("/api/products", get(handlers::public::list_products))
        .route(
            "/api/settings",
            get(handlers::public::get_settings).put(handlers::admin::update_settings),
        );

    let payment_routes = Router::new()
        .route(
            "/api/payments/create-link",
            post(handlers::payment::create_link),
        )
        .route(
            "/api/payments/status/{booking_id}",
            get(handlers::payment::payment_status),
        )
        .route(
            "/api/payments/sandbox-complete/{booking_id}",
            post(handlers::payment::sandbox_complete),
        )
        .route(
            "/api/payments/sandbox-fail/{booking_id}",
            post(handlers::payment::sandbox_fail),
        );

    let admin_routes = Router::new()
        .route(
            "/api/barbers/{barber_id}/slots/generate",
            post(handlers::admin::generate_schedule),
        )
        .route(
            "/api/barbers/{barber_id}/slots/manage",
            get(handlers::admin::manage_slots),
        )
        .route(
            "/api/barbers/{barber_id}/slots/add",
            post(handlers::admin::add_slot),
        )
        .route(
            "/api/admin/slots/{slot_id}/toggle",
            put(handlers::admin::toggle_slot),
        )
        .route(
            "/api/admin/slots/{slot_id}",
            delete(handlers::admin::delete_slot),
        );

    let wallet_routes = Router::new()
        .route(
            "/api/wallet/{barber_id}",
            get(handlers::wallet::wallet_summary),
        )
        .route(
            "/api/wallet/{barber_id}/transactions",
            get(handlers::wallet::wallet_transactions),
        )
        .route(
            "/api/wallet/{barber_id}/withdraw",
            post(handlers::wallet::request_withdrawal),
        )
        .route(
            "/api/withdrawals",
            get(handlers::wallet::list_withdrawals),
        )
        .route(
            "/api/withdrawals/{id}",
            put(handlers::wallet::resolve_withdrawal),
        )
        .route(
            "/api/dashboard/owner",
            get(handlers::wallet::owner_dashboard),
        )
        .route(
            "/api/dashboard/barber/{barber_id}",
            get(handlers::wallet::barber_dashboard),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public_routes
        .merge(payment_routes)
        .merge(admin_routes)
        .merge(wallet_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
