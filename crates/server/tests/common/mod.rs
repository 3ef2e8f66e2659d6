use std::sync::Arc;

use chrono::NaiveDate;

use vantage_booking::{BookingSession, Checkout, ShopClient};
use vantage_server::{build_router, PaymentLinkMode, ShopState};

/// Serve a seeded shop on an ephemeral port and return a client for it.
pub async fn spawn_shop(mode: PaymentLinkMode) -> (ShopClient, Arc<ShopState>) {
    let state = Arc::new(ShopState::new(mode));
    state.seed_demo_data();
    let app = build_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let client = ShopClient::from_url(&format!("http://{}", addr)).unwrap();
    (client, state)
}

pub async fn spawn_sandbox() -> (ShopClient, Arc<ShopState>) {
    spawn_shop(PaymentLinkMode::Sandbox).await
}

/// A day comfortably in the future, so calendar checks pass whenever the
/// suite runs.
pub fn booking_day() -> (NaiveDate, String) {
    let day = chrono::Local::now().date_naive() + chrono::Duration::days(7);
    (day, day.format("%Y-%m-%d").to_string())
}

/// Drive a fresh wizard straight through to checkout: first barber, their
/// first service, the earliest open slot a week out, nothing in the cart.
pub async fn quick_checkout(client: &ShopClient) -> Checkout {
    let (day, ymd) = booking_day();
    let barbers = client.list_barbers().await.unwrap();
    let barber = barbers[0].clone();
    client.generate_day_schedule(barber.id, &ymd).await.unwrap();

    let mut session = BookingSession::new(chrono::Local::now().date_naive());
    session.apply_settings(client.shop_settings().await.unwrap());
    session.apply_barbers(barbers);
    session.apply_products(client.list_products().await.unwrap());

    session.select_barber(barber.id).unwrap();
    let service = session.services_for_selection()[0].clone();
    session.select_service(service.id).unwrap();
    let key = session.select_date(day).unwrap();
    let slots = client
        .list_slots(barber.id, &ymd, Some(service.id))
        .await
        .unwrap();
    assert!(session.apply_slots(key, slots));
    let slot_id = session.available_slots().unwrap()[0].slots[0].id;
    session.select_slot(slot_id).unwrap();
    session.proceed_to_confirm().unwrap();
    session.confirm(client).await.unwrap()
}
