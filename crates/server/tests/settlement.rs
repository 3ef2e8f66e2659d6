mod common;

use std::sync::Arc;
use std::time::Duration;

use vantage_booking::models::{BookingStatus, PaymentStatus};
use vantage_booking::{Error, PaymentHandoff, PaymentMode, PaymentOutcome, PollConfig};
use vantage_server::PaymentLinkMode;

use common::{booking_day, quick_checkout, spawn_sandbox, spawn_shop};

fn live_mode() -> PaymentLinkMode {
    PaymentLinkMode::Live {
        checkout_base: "https://pay.example".to_string(),
    }
}

fn fast_poll() -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(25),
        cap: Duration::from_secs(2),
    }
}

#[tokio::test]
async fn test_live_checkout_mints_payment_link() {
    let (client, _state) = spawn_shop(live_mode()).await;
    let checkout = quick_checkout(&client).await;

    let expected = format!("https://pay.example/pay/{}", checkout.booking.id);
    assert_eq!(
        checkout.mode,
        PaymentMode::Live {
            payment_url: expected.clone()
        }
    );
    let handoff = PaymentHandoff::new(checkout);
    assert_eq!(handoff.payment_url(), Some(expected.as_str()));
}

#[tokio::test]
async fn test_settlement_poll_sees_completion() {
    let (client, state) = spawn_shop(live_mode()).await;
    let checkout = quick_checkout(&client).await;
    let booking_id = checkout.booking.id;

    let settler = Arc::clone(&state);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(80)).await;
        settler.settle_payment(booking_id).unwrap();
    });

    let mut handoff = PaymentHandoff::with_poll_config(checkout, fast_poll());
    let outcome = handoff.await_settlement(&client).await.unwrap();
    assert_eq!(outcome, PaymentOutcome::Completed);
    assert!(handoff.polls() >= 2);
    assert_eq!(
        state.bookings.get(&booking_id).unwrap().status,
        BookingStatus::Confirmed
    );
}

#[tokio::test]
async fn test_settlement_poll_sees_failure() {
    let (client, state) = spawn_shop(live_mode()).await;
    let checkout = quick_checkout(&client).await;
    let booking_id = checkout.booking.id;
    let barber_id = checkout.booking.barber_id;

    let failer = Arc::clone(&state);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        failer.fail_payment(booking_id).unwrap();
    });

    let mut handoff = PaymentHandoff::with_poll_config(checkout, fast_poll());
    let outcome = handoff.await_settlement(&client).await.unwrap();
    assert_eq!(outcome, PaymentOutcome::Failed);
    assert_eq!(
        state.bookings.get(&booking_id).unwrap().status,
        BookingStatus::Cancelled
    );
    // The whole day frees back up.
    let (_, ymd) = booking_day();
    let managed = client.manage_slots(barber_id, &ymd).await.unwrap();
    assert!(managed.iter().all(|s| !s.is_booked));
}

#[tokio::test]
async fn test_settlement_poll_times_out_while_pending() {
    let (client, _state) = spawn_shop(live_mode()).await;
    let checkout = quick_checkout(&client).await;
    let booking_id = checkout.booking.id;

    let mut handoff = PaymentHandoff::with_poll_config(
        checkout,
        PollConfig {
            interval: Duration::from_millis(40),
            cap: Duration::from_millis(120),
        },
    );
    let outcome = handoff.await_settlement(&client).await.unwrap();
    assert_eq!(outcome, PaymentOutcome::TimedOut);
    // Timing out abandons the wait, not the payment.
    assert_eq!(
        client.payment_status(booking_id).await.unwrap(),
        PaymentStatus::Pending
    );
}

#[tokio::test]
async fn test_dropping_the_poll_stops_it() {
    let (client, _state) = spawn_shop(live_mode()).await;
    let checkout = quick_checkout(&client).await;
    let booking_id = checkout.booking.id;

    let mut handoff = PaymentHandoff::with_poll_config(
        checkout,
        PollConfig {
            interval: Duration::from_secs(5),
            cap: Duration::from_secs(60),
        },
    );
    tokio::select! {
        _ = handoff.await_settlement(&client) => panic!("payment cannot settle"),
        _ = tokio::time::sleep(Duration::from_millis(100)) => {}
    }
    // Only the immediate first check ran before the future was dropped.
    assert_eq!(handoff.polls(), 1);
    assert_eq!(
        client.payment_status(booking_id).await.unwrap(),
        PaymentStatus::Pending
    );
}

#[tokio::test]
async fn test_sandbox_endpoints_rejected_in_live_mode() {
    let (client, _state) = spawn_shop(live_mode()).await;
    let checkout = quick_checkout(&client).await;

    let err = client.sandbox_complete(checkout.booking.id).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    let err = client.sandbox_fail(checkout.booking.id).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(
        client.payment_status(checkout.booking.id).await.unwrap(),
        PaymentStatus::Pending
    );
}

#[tokio::test]
async fn test_sandbox_failure_cancels_and_frees_the_slot() {
    let (client, state) = spawn_sandbox().await;
    let checkout = quick_checkout(&client).await;
    let booking = checkout.booking.clone();

    client.sandbox_fail(booking.id).await.unwrap();

    assert_eq!(
        client.payment_status(booking.id).await.unwrap(),
        PaymentStatus::Failed
    );
    assert_eq!(
        state.bookings.get(&booking.id).unwrap().status,
        BookingStatus::Cancelled
    );
    let (_, ymd) = booking_day();
    let open = client
        .list_slots(booking.barber_id, &ymd, None)
        .await
        .unwrap();
    assert!(open.iter().any(|s| s.start_time == booking.start_time));
}

#[tokio::test]
async fn test_unpaid_bookings_expire_and_paid_ones_survive() {
    let (client, state) = spawn_sandbox().await;

    let unpaid = quick_checkout(&client).await.booking;
    let paid = quick_checkout(&client).await.booking;
    client.sandbox_complete(paid.id).await.unwrap();

    let later = chrono::Utc::now() + chrono::Duration::minutes(16);
    let expired = state.expire_stale_pending(chrono::Duration::minutes(15), later);
    assert_eq!(expired, 1);

    assert_eq!(
        state.bookings.get(&unpaid.id).unwrap().status,
        BookingStatus::Cancelled
    );
    assert_eq!(
        client.payment_status(unpaid.id).await.unwrap(),
        PaymentStatus::Failed
    );
    assert_eq!(
        state.bookings.get(&paid.id).unwrap().status,
        BookingStatus::Confirmed
    );
    // Sweeping again finds nothing left to expire.
    assert_eq!(
        state.expire_stale_pending(chrono::Duration::minutes(15), later),
        0
    );
}
