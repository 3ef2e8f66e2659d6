mod common;

use vantage_booking::availability::TimeBucket;
use vantage_booking::models::{BookingStatus, CreateBookingRequest};
use vantage_booking::{BookingSession, Error, PaymentHandoff, PaymentMode, PaymentOutcome};

use common::{booking_day, spawn_sandbox};

#[tokio::test]
async fn test_full_sandbox_booking_with_extras() {
    let (client, state) = spawn_sandbox().await;
    let (day, ymd) = booking_day();

    let barbers = client.list_barbers().await.unwrap();
    let marcus = barbers[0].clone();
    assert_eq!(client.generate_day_schedule(marcus.id, &ymd).await.unwrap(), 18);

    let mut session = BookingSession::new(chrono::Local::now().date_naive());
    session.apply_settings(client.shop_settings().await.unwrap());
    session.apply_barbers(barbers);
    session.apply_products(client.list_products().await.unwrap());

    // Only sellable products reach the extras screen.
    let shelf = session.products_for_sale();
    assert_eq!(shelf.len(), 2);
    let pomade = shelf
        .iter()
        .find(|p| p.name == "Matte Pomade")
        .cloned()
        .unwrap();

    session.select_barber(marcus.id).unwrap();
    let classic = session
        .services_for_selection()
        .into_iter()
        .find(|s| s.name == "Classic Cut")
        .unwrap();
    session.select_service(classic.id).unwrap();

    let key = session.select_date(day).unwrap();
    let slots = client
        .list_slots(marcus.id, &ymd, Some(classic.id))
        .await
        .unwrap();
    assert!(session.apply_slots(key, slots));

    // A full 09:00-18:00 day splits evenly across the three buckets.
    let buckets = session.available_slots().unwrap();
    assert_eq!(buckets.len(), 3);
    assert_eq!(buckets[0].bucket, TimeBucket::Morning);
    assert_eq!(buckets[1].bucket, TimeBucket::Midday);
    assert_eq!(buckets[2].bucket, TimeBucket::Evening);
    assert!(buckets.iter().all(|b| b.slots.len() == 6));

    let ten = buckets[0]
        .slots
        .iter()
        .find(|s| s.start_time == "10:00")
        .cloned()
        .unwrap();
    session.select_slot(ten.id).unwrap();

    session.set_cart_quantity(pomade.id, 2).unwrap();
    session.proceed_to_confirm().unwrap();
    session.set_tip(Some(20)).unwrap();

    let quote = session.quote().unwrap();
    assert_eq!(quote.service_price_cents, 4_500);
    assert_eq!(quote.deposit_cents, 1_000);
    assert_eq!(quote.balance_due_cents, 3_500);
    assert_eq!(quote.cart_total_cents, 3_600);
    assert_eq!(quote.cart_count, 2);
    assert_eq!(quote.pay_now_cents, 4_600);
    assert_eq!(quote.tip.unwrap().amount_cents, 900);

    let checkout = session.confirm(&client).await.unwrap();
    assert_eq!(checkout.mode, PaymentMode::Sandbox);
    assert_eq!(checkout.booking.start_time, "10:00");

    let mut handoff = PaymentHandoff::new(checkout);
    let outcome = handoff.simulate_completed(&client).await.unwrap();
    assert_eq!(outcome, PaymentOutcome::Completed);

    let receipt = handoff.receipt();
    assert_eq!(receipt.barber_name, "Marcus Webb");
    assert_eq!(receipt.service_name, "Classic Cut");
    assert_eq!(receipt.deposit_paid, "$10.00");
    assert_eq!(receipt.products_paid, "$36.00");
    assert_eq!(receipt.total_paid, "$46.00");
    assert_eq!(receipt.balance_due, "$35.00");
    assert_eq!(receipt.tip_hint.as_deref(), Some("20% tip: $9.00"));
    assert_eq!(receipt.items.len(), 1);
    assert_eq!(receipt.items[0].quantity, 2);
    assert_eq!(receipt.items[0].line_total_cents, 3_600);

    // Server side: booking confirmed, slot taken, stock drawn down.
    let booking_id = handoff.checkout().booking.id;
    assert_eq!(
        state.bookings.get(&booking_id).unwrap().status,
        BookingStatus::Confirmed
    );
    let managed = client.manage_slots(marcus.id, &ymd).await.unwrap();
    assert!(managed.iter().any(|s| s.start_time == "10:00" && s.is_booked));
    let open = client
        .list_slots(marcus.id, &ymd, Some(classic.id))
        .await
        .unwrap();
    assert_eq!(open.len(), 17);
    let products = client.list_products().await.unwrap();
    let restocked = products.iter().find(|p| p.id == pomade.id).unwrap();
    assert_eq!(restocked.stock_quantity, pomade.stock_quantity - 2);
}

#[tokio::test]
async fn test_slot_taken_between_fetch_and_confirm() {
    let (client, _state) = spawn_sandbox().await;
    let (day, ymd) = booking_day();

    let barbers = client.list_barbers().await.unwrap();
    let marcus = barbers[0].clone();
    client.generate_day_schedule(marcus.id, &ymd).await.unwrap();

    let mut session = BookingSession::new(chrono::Local::now().date_naive());
    session.apply_settings(client.shop_settings().await.unwrap());
    session.apply_barbers(barbers);
    session.apply_products(client.list_products().await.unwrap());
    session.select_barber(marcus.id).unwrap();
    let classic = session.services_for_selection()[0].clone();
    session.select_service(classic.id).unwrap();
    let key = session.select_date(day).unwrap();
    let slots = client
        .list_slots(marcus.id, &ymd, Some(classic.id))
        .await
        .unwrap();
    session.apply_slots(key, slots);
    let ten = session.available_slots().unwrap()[0]
        .slots
        .iter()
        .find(|s| s.start_time == "10:00")
        .cloned()
        .unwrap();
    session.select_slot(ten.id).unwrap();
    session.proceed_to_confirm().unwrap();

    // Another customer grabs the same slot first.
    client
        .create_booking(&CreateBookingRequest {
            barber_id: marcus.id,
            service_id: classic.id,
            date: ymd.clone(),
            start_time: "10:00".to_string(),
        })
        .await
        .unwrap();

    let err = session.confirm(&client).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    // The wizard recovers by stepping back and picking another slot.
    session.go_back(vantage_booking::WizardStep::SelectSlot).unwrap();
    let fresh = client
        .list_slots(marcus.id, &ymd, Some(classic.id))
        .await
        .unwrap();
    assert!(!fresh.iter().any(|s| s.start_time == "10:00"));
    assert!(session.apply_slots(key, fresh));
    let other = session.available_slots().unwrap()[0].slots[0].clone();
    session.select_slot(other.id).unwrap();
    session.proceed_to_confirm().unwrap();
    let checkout = session.confirm(&client).await.unwrap();
    assert_ne!(checkout.booking.start_time, "10:00");
}

#[tokio::test]
async fn test_slot_listing_is_duration_aware() {
    let (client, _state) = spawn_sandbox().await;
    let (_, ymd) = booking_day();

    let barbers = client.list_barbers().await.unwrap();
    let marcus = barbers[0].clone();
    let classic = marcus.services.iter().find(|s| s.duration_minutes == 30).unwrap();
    let fade = marcus.services.iter().find(|s| s.duration_minutes == 60).unwrap();
    client.generate_day_schedule(marcus.id, &ymd).await.unwrap();

    // Strand 10:00 between two bookings.
    for start in ["09:30", "10:30"] {
        client
            .create_booking(&CreateBookingRequest {
                barber_id: marcus.id,
                service_id: classic.id,
                date: ymd.clone(),
                start_time: start.to_string(),
            })
            .await
            .unwrap();
    }

    let for_fade: Vec<String> = client
        .list_slots(marcus.id, &ymd, Some(fade.id))
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.start_time)
        .collect();
    assert!(!for_fade.contains(&"10:00".to_string()));
    assert!(!for_fade.contains(&"17:30".to_string()));
    assert!(for_fade.contains(&"11:00".to_string()));

    let for_classic: Vec<String> = client
        .list_slots(marcus.id, &ymd, Some(classic.id))
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.start_time)
        .collect();
    assert!(for_classic.contains(&"10:00".to_string()));
}

#[tokio::test]
async fn test_barber_without_menu_offers_shop_catalog() {
    let (client, _state) = spawn_sandbox().await;

    let barbers = client.list_barbers().await.unwrap();
    let diego = barbers
        .iter()
        .find(|b| b.services.is_empty())
        .cloned()
        .unwrap();

    let mut session = BookingSession::new(chrono::Local::now().date_naive());
    session.apply_barbers(barbers.clone());
    session.select_barber(diego.id).unwrap();

    let pooled = session.services_for_selection();
    let expected: usize = barbers.iter().map(|b| b.services.len()).sum();
    assert_eq!(pooled.len(), expected);
    assert!(pooled.iter().any(|s| s.name == "Classic Cut"));
    assert!(pooled.iter().any(|s| s.name == "Beard Sculpt"));
}
