use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;

use vantage_booking::availability::minute_of_day;
use vantage_booking::models::*;
use vantage_booking::wallet::{split_settlement, validate_withdrawal};

/// Where payment links point, decided once at startup.
#[derive(Debug, Clone)]
pub enum PaymentLinkMode {
    /// No provider; settlement happens through the sandbox endpoints.
    Sandbox,
    /// Links are minted under this checkout base URL.
    Live { checkout_base: String },
}

/// Failures from store operations, mapped to HTTP statuses by the handlers.
#[derive(Debug)]
pub enum StoreError {
    NotFound(&'static str),
    Conflict(String),
    Invalid(String),
}

/// Server-side record of one booking's payment, created with the link and
/// finalized at settlement.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub booking_id: i64,
    pub barber_id: i64,
    pub status: PaymentStatus,
    pub deposit_cents: i64,
    pub products_total_cents: i64,
    pub total_cents: i64,
    pub items: Vec<PaymentLineItem>,
    pub is_sandbox: bool,
    pub payment_url: Option<String>,
    /// Set at settlement, from the barber's commission rate.
    pub barber_cents: i64,
    pub owner_cents: i64,
    pub settled_on: Option<String>,
}

/// Shared application state: the whole shop, in memory.
///
/// Entities live in per-id maps; booking creation serializes on one gate so
/// a slot chain is checked and marked without interleaving writers. All
/// other mutations touch a single entry at a time.
pub struct ShopState {
    pub barbers: DashMap<i64, Barber>,
    pub slots: DashMap<i64, Slot>,
    pub bookings: DashMap<i64, Booking>,
    /// Slot chain held by each booking, released on cancellation.
    pub booking_slots: DashMap<i64, Vec<i64>>,
    pub products: DashMap<i64, Product>,
    pub payments: DashMap<i64, PaymentRecord>,
    pub wallets: DashMap<i64, Wallet>,
    pub transactions: DashMap<i64, WalletTransaction>,
    pub withdrawals: DashMap<i64, WithdrawalRequest>,
    pub settings: Mutex<ShopSettings>,
    pub link_mode: PaymentLinkMode,
    pub started_at: Instant,
    next_id: AtomicI64,
    booking_gate: Mutex<()>,
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

fn today_ymd() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

impl ShopState {
    pub fn new(link_mode: PaymentLinkMode) -> Self {
        Self {
            barbers: DashMap::new(),
            slots: DashMap::new(),
            bookings: DashMap::new(),
            booking_slots: DashMap::new(),
            products: DashMap::new(),
            payments: DashMap::new(),
            wallets: DashMap::new(),
            transactions: DashMap::new(),
            withdrawals: DashMap::new(),
            settings: Mutex::new(ShopSettings {
                work_start: "09:00".to_string(),
                work_end: "18:00".to_string(),
                slot_interval_minutes: 30,
                show_tips: true,
            }),
            link_mode,
            started_at: Instant::now(),
            next_id: AtomicI64::new(1),
            booking_gate: Mutex::new(()),
        }
    }

    pub fn alloc_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn current_settings(&self) -> ShopSettings {
        self.settings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    // ── Catalog ──

    pub fn barbers_sorted(&self) -> Vec<Barber> {
        let mut all: Vec<Barber> = self.barbers.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|b| b.id);
        all
    }

    /// Look a service up across every barber's menu. Needed because a barber
    /// without a menu of their own serves the shop-wide catalog.
    pub fn find_service(&self, service_id: i64) -> Option<Service> {
        self.barbers.iter().find_map(|entry| {
            entry
                .value()
                .services
                .iter()
                .find(|s| s.id == service_id)
                .cloned()
        })
    }

    // ── Slots ──

    /// One barber's day, sorted by start time.
    pub fn day_slots(&self, barber_id: i64, date: &str) -> Vec<Slot> {
        let mut day: Vec<Slot> = self
            .slots
            .iter()
            .filter(|e| e.value().barber_id == barber_id && e.value().date == date)
            .map(|e| e.value().clone())
            .collect();
        day.sort_by_key(|s| minute_of_day(&s.start_time).unwrap_or(0));
        day
    }

    /// Slots a customer may start the given service in: free, visible, and
    /// with enough free adjacent slots to cover the duration.
    pub fn bookable_slots(
        &self,
        barber_id: i64,
        date: &str,
        service_id: Option<i64>,
    ) -> Result<Vec<Slot>, StoreError> {
        if !self.barbers.contains_key(&barber_id) {
            return Err(StoreError::NotFound("barber"));
        }
        let day = self.day_slots(barber_id, date);
        let needed = match service_id {
            Some(id) => {
                let service = self.find_service(id).ok_or(StoreError::NotFound("service"))?;
                self.slots_needed(service.duration_minutes)
            }
            None => 1,
        };
        Ok(day
            .iter()
            .enumerate()
            .filter(|(i, slot)| {
                !slot.is_booked && slot.is_active && chain_is_free(&day, *i, needed)
            })
            .map(|(_, slot)| slot.clone())
            .collect())
    }

    fn slots_needed(&self, duration_minutes: i64) -> usize {
        let interval = self.current_settings().slot_interval_minutes.max(1);
        (((duration_minutes.max(1) + interval - 1) / interval) as usize).max(1)
    }

    /// Lay out the base schedule for a day from the shop's working hours.
    /// Times that already have a slot are skipped.
    pub fn generate_schedule(&self, barber_id: i64, date: &str) -> Result<u32, StoreError> {
        if !self.barbers.contains_key(&barber_id) {
            return Err(StoreError::NotFound("barber"));
        }
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(StoreError::Invalid(format!("invalid date: {}", date)));
        }
        let settings = self.current_settings();
        let start = minute_of_day(&settings.work_start)
            .ok_or_else(|| StoreError::Invalid("invalid work_start in settings".to_string()))?;
        let end = minute_of_day(&settings.work_end)
            .ok_or_else(|| StoreError::Invalid("invalid work_end in settings".to_string()))?;
        let interval = settings.slot_interval_minutes.max(1) as u32;

        let existing: HashSet<String> = self
            .day_slots(barber_id, date)
            .into_iter()
            .map(|s| s.start_time)
            .collect();

        let mut inserted = 0;
        let mut minute = start;
        while minute + interval <= end {
            let start_time = minutes_to_time(minute);
            if !existing.contains(&start_time) {
                let id = self.alloc_id();
                self.slots.insert(
                    id,
                    Slot {
                        id,
                        barber_id,
                        date: date.to_string(),
                        start_time,
                        end_time: Some(minutes_to_time(minute + interval)),
                        is_booked: false,
                        is_active: true,
                    },
                );
                inserted += 1;
            }
            minute += interval;
        }
        Ok(inserted)
    }

    pub fn add_custom_slot(
        &self,
        barber_id: i64,
        date: &str,
        time: &str,
    ) -> Result<Slot, StoreError> {
        if !self.barbers.contains_key(&barber_id) {
            return Err(StoreError::NotFound("barber"));
        }
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(StoreError::Invalid(format!("invalid date: {}", date)));
        }
        let minute = minute_of_day(time)
            .ok_or_else(|| StoreError::Invalid(format!("invalid time: {}", time)))?;
        if self
            .day_slots(barber_id, date)
            .iter()
            .any(|s| s.start_time == time)
        {
            return Err(StoreError::Conflict(format!(
                "a slot at {} already exists",
                time
            )));
        }
        let interval = self.current_settings().slot_interval_minutes.max(1) as u32;
        let id = self.alloc_id();
        let slot = Slot {
            id,
            barber_id,
            date: date.to_string(),
            start_time: time.to_string(),
            end_time: Some(minutes_to_time((minute + interval).min(23 * 60 + 59))),
            is_booked: false,
            is_active: true,
        };
        self.slots.insert(id, slot.clone());
        Ok(slot)
    }

    pub fn toggle_slot(&self, slot_id: i64) -> Result<Slot, StoreError> {
        let mut slot = self
            .slots
            .get_mut(&slot_id)
            .ok_or(StoreError::NotFound("slot"))?;
        if slot.is_booked {
            return Err(StoreError::Conflict(
                "cannot modify a booked slot".to_string(),
            ));
        }
        slot.is_active = !slot.is_active;
        Ok(slot.clone())
    }

    pub fn delete_slot(&self, slot_id: i64) -> Result<(), StoreError> {
        let booked = self
            .slots
            .get(&slot_id)
            .map(|s| s.is_booked)
            .ok_or(StoreError::NotFound("slot"))?;
        if booked {
            return Err(StoreError::Conflict(
                "cannot delete a booked slot, cancel the booking first".to_string(),
            ));
        }
        self.slots.remove(&slot_id);
        Ok(())
    }

    // ── Bookings ──

    /// Create a booking, marking the whole slot chain the service needs.
    /// The check and the marking happen under one gate, so two customers
    /// racing for overlapping chains cannot both win.
    pub fn create_booking(&self, req: &CreateBookingRequest) -> Result<Booking, StoreError> {
        if !self.barbers.contains_key(&req.barber_id) {
            return Err(StoreError::NotFound("barber"));
        }
        let service = self
            .find_service(req.service_id)
            .ok_or(StoreError::NotFound("service"))?;
        let needed = self.slots_needed(service.duration_minutes);

        let _gate = self.booking_gate.lock().unwrap_or_else(|e| e.into_inner());

        let day = self.day_slots(req.barber_id, &req.date);
        let start_idx = day
            .iter()
            .position(|s| s.start_time == req.start_time)
            .ok_or(StoreError::NotFound("slot"))?;
        if !chain_is_free(&day, start_idx, needed) {
            return Err(StoreError::Conflict(
                "slot is no longer available".to_string(),
            ));
        }

        let chain: Vec<i64> = day[start_idx..start_idx + needed]
            .iter()
            .map(|s| s.id)
            .collect();
        for slot_id in &chain {
            if let Some(mut slot) = self.slots.get_mut(slot_id) {
                slot.is_booked = true;
            }
        }

        let id = self.alloc_id();
        let booking = Booking {
            id,
            barber_id: req.barber_id,
            service_id: req.service_id,
            slot_id: chain[0],
            date: req.date.clone(),
            start_time: req.start_time.clone(),
            status: BookingStatus::Pending,
            created_at: now_rfc3339(),
        };
        self.bookings.insert(id, booking.clone());
        self.booking_slots.insert(id, chain);
        tracing::info!(
            booking_id = id,
            barber_id = req.barber_id,
            date = %req.date,
            start = %req.start_time,
            "booking created"
        );
        Ok(booking)
    }

    pub fn bookings_sorted(&self, barber_id: Option<i64>) -> Vec<Booking> {
        let mut all: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|e| barber_id.is_none_or(|id| e.value().barber_id == id))
            .map(|e| e.value().clone())
            .collect();
        all.sort_by(|a, b| (&a.date, &a.start_time).cmp(&(&b.date, &b.start_time)));
        all
    }

    fn release_booking_slots(&self, booking_id: i64) {
        if let Some((_, chain)) = self.booking_slots.remove(&booking_id) {
            for slot_id in chain {
                if let Some(mut slot) = self.slots.get_mut(&slot_id) {
                    slot.is_booked = false;
                }
            }
        }
    }

    /// Cancel pending bookings whose payment never completed within the
    /// window. Returns how many were expired.
    pub fn expire_stale_pending(
        &self,
        older_than: chrono::Duration,
        now: DateTime<Utc>,
    ) -> u32 {
        let cutoff = now - older_than;
        let stale: Vec<i64> = self
            .bookings
            .iter()
            .filter(|e| {
                e.value().status == BookingStatus::Pending
                    && DateTime::parse_from_rfc3339(&e.value().created_at)
                        .map(|t| t.with_timezone(&Utc) < cutoff)
                        .unwrap_or(false)
            })
            .map(|e| *e.key())
            .collect();

        let mut expired = 0;
        for id in stale {
            if let Some(mut payment) = self.payments.get_mut(&id) {
                if payment.status == PaymentStatus::Completed {
                    continue;
                }
                payment.status = PaymentStatus::Failed;
            }
            if let Some(mut booking) = self.bookings.get_mut(&id) {
                booking.status = BookingStatus::Cancelled;
            }
            self.release_booking_slots(id);
            expired += 1;
            tracing::info!(booking_id = id, "expired unpaid booking");
        }
        expired
    }

    // ── Payments ──

    pub fn create_payment_link(
        &self,
        req: &CreatePaymentLinkRequest,
    ) -> Result<PaymentLinkResponse, StoreError> {
        let booking = self
            .bookings
            .get(&req.booking_id)
            .map(|b| b.clone())
            .ok_or(StoreError::NotFound("booking"))?;
        if booking.status != BookingStatus::Pending {
            return Err(StoreError::Conflict(
                "booking is not awaiting payment".to_string(),
            ));
        }
        if req.deposit_cents <= 0 {
            return Err(StoreError::Invalid(
                "deposit must be positive".to_string(),
            ));
        }

        // Retried link creation returns the existing link unchanged.
        if let Some(existing) = self.payments.get(&req.booking_id) {
            return Ok(PaymentLinkResponse {
                payment_url: existing.payment_url.clone(),
                is_sandbox: existing.is_sandbox,
            });
        }

        let mut products_total_cents = 0;
        for item in &req.products {
            let product = self
                .products
                .get(&item.product_id)
                .ok_or(StoreError::NotFound("product"))?;
            if !product.is_active {
                return Err(StoreError::Invalid(format!(
                    "{} is not for sale",
                    product.name
                )));
            }
            if i64::from(item.quantity) > product.stock_quantity {
                return Err(StoreError::Invalid(format!(
                    "only {} of {} in stock",
                    product.stock_quantity, product.name
                )));
            }
            products_total_cents += product.price_cents * i64::from(item.quantity);
        }

        let (payment_url, is_sandbox) = match &self.link_mode {
            PaymentLinkMode::Sandbox => (None, true),
            PaymentLinkMode::Live { checkout_base } => (
                Some(format!("{}/pay/{}", checkout_base, req.booking_id)),
                false,
            ),
        };

        self.payments.insert(
            req.booking_id,
            PaymentRecord {
                booking_id: req.booking_id,
                barber_id: booking.barber_id,
                status: PaymentStatus::Pending,
                deposit_cents: req.deposit_cents,
                products_total_cents,
                total_cents: req.deposit_cents + products_total_cents,
                items: req.products.clone(),
                is_sandbox,
                payment_url: payment_url.clone(),
                barber_cents: 0,
                owner_cents: 0,
                settled_on: None,
            },
        );
        Ok(PaymentLinkResponse {
            payment_url,
            is_sandbox,
        })
    }

    pub fn payment_status(&self, booking_id: i64) -> Result<PaymentStatus, StoreError> {
        self.payments
            .get(&booking_id)
            .map(|p| p.status)
            .ok_or(StoreError::NotFound("payment"))
    }

    /// Mark a payment completed: confirm the booking, draw down product
    /// stock, and credit the barber's share of the deposit to their wallet.
    /// Settling twice is a no-op.
    pub fn settle_payment(&self, booking_id: i64) -> Result<(), StoreError> {
        let (deposit_cents, items, barber_id) = {
            let mut payment = self
                .payments
                .get_mut(&booking_id)
                .ok_or(StoreError::NotFound("payment"))?;
            match payment.status {
                PaymentStatus::Completed => return Ok(()),
                PaymentStatus::Failed => {
                    return Err(StoreError::Conflict(
                        "payment already failed".to_string(),
                    ))
                }
                PaymentStatus::Pending => {}
            }
            payment.status = PaymentStatus::Completed;
            payment.settled_on = Some(today_ymd());
            (
                payment.deposit_cents,
                payment.items.clone(),
                payment.barber_id,
            )
        };

        if let Some(mut booking) = self.bookings.get_mut(&booking_id) {
            booking.status = BookingStatus::Confirmed;
        }

        for item in &items {
            if let Some(mut product) = self.products.get_mut(&item.product_id) {
                // Stock was checked at link time; a racing sale still must
                // not drive it negative.
                product.stock_quantity =
                    (product.stock_quantity - i64::from(item.quantity)).max(0);
            }
        }

        let rate = self
            .barbers
            .get(&barber_id)
            .map(|b| b.commission_rate)
            .unwrap_or(0.0);
        let split = split_settlement(deposit_cents, rate);
        if let Some(mut payment) = self.payments.get_mut(&booking_id) {
            payment.barber_cents = split.barber_cents;
            payment.owner_cents = split.owner_cents;
        }

        {
            let mut wallet = self.wallets.entry(barber_id).or_insert_with(|| Wallet {
                barber_id,
                available_cents: 0,
                pending_cents: 0,
                total_earned_cents: 0,
            });
            wallet.available_cents += split.barber_cents;
            wallet.total_earned_cents += split.barber_cents;
        }
        let tx_id = self.alloc_id();
        self.transactions.insert(
            tx_id,
            WalletTransaction {
                id: tx_id,
                barber_id,
                kind: TransactionKind::Credit,
                amount_cents: split.barber_cents,
                description: format!("Deposit for booking #{}", booking_id),
                created_at: now_rfc3339(),
            },
        );
        tracing::info!(
            booking_id,
            barber_cents = split.barber_cents,
            owner_cents = split.owner_cents,
            "payment settled"
        );
        Ok(())
    }

    /// Mark a payment failed and cancel its booking, releasing the slots.
    pub fn fail_payment(&self, booking_id: i64) -> Result<(), StoreError> {
        {
            let mut payment = self
                .payments
                .get_mut(&booking_id)
                .ok_or(StoreError::NotFound("payment"))?;
            match payment.status {
                PaymentStatus::Completed => {
                    return Err(StoreError::Conflict(
                        "payment already completed".to_string(),
                    ))
                }
                PaymentStatus::Failed => return Ok(()),
                PaymentStatus::Pending => {}
            }
            payment.status = PaymentStatus::Failed;
        }
        if let Some(mut booking) = self.bookings.get_mut(&booking_id) {
            booking.status = BookingStatus::Cancelled;
        }
        self.release_booking_slots(booking_id);
        tracing::info!(booking_id, "payment failed, booking cancelled");
        Ok(())
    }

    // ── Settings ──

    pub fn update_settings(&self, new: ShopSettings) -> Result<ShopSettings, StoreError> {
        let start = minute_of_day(&new.work_start)
            .ok_or_else(|| StoreError::Invalid(format!("invalid work_start: {}", new.work_start)))?;
        let end = minute_of_day(&new.work_end)
            .ok_or_else(|| StoreError::Invalid(format!("invalid work_end: {}", new.work_end)))?;
        if start >= end {
            return Err(StoreError::Invalid(
                "work_start must be before work_end".to_string(),
            ));
        }
        if new.slot_interval_minutes <= 0 || new.slot_interval_minutes > 480 {
            return Err(StoreError::Invalid(
                "slot interval must be between 1 and 480 minutes".to_string(),
            ));
        }
        let mut settings = self.settings.lock().unwrap_or_else(|e| e.into_inner());
        *settings = new.clone();
        Ok(new)
    }

    // ── Wallet ──

    pub fn wallet_summary(&self, barber_id: i64) -> Result<Wallet, StoreError> {
        if !self.barbers.contains_key(&barber_id) {
            return Err(StoreError::NotFound("barber"));
        }
        Ok(self
            .wallets
            .get(&barber_id)
            .map(|w| w.clone())
            .unwrap_or(Wallet {
                barber_id,
                available_cents: 0,
                pending_cents: 0,
                total_earned_cents: 0,
            }))
    }

    /// Ledger for one barber, newest first.
    pub fn transactions_for(&self, barber_id: i64) -> Vec<WalletTransaction> {
        let mut all: Vec<WalletTransaction> = self
            .transactions
            .iter()
            .filter(|e| e.value().barber_id == barber_id)
            .map(|e| e.value().clone())
            .collect();
        all.sort_by_key(|t| std::cmp::Reverse(t.id));
        all
    }

    /// Move part of the available balance into a pending payout request.
    pub fn request_withdrawal(
        &self,
        barber_id: i64,
        amount_cents: i64,
    ) -> Result<WithdrawalRequest, StoreError> {
        if !self.barbers.contains_key(&barber_id) {
            return Err(StoreError::NotFound("barber"));
        }
        {
            let mut wallet = self
                .wallets
                .get_mut(&barber_id)
                .ok_or_else(|| StoreError::Invalid("wallet is empty".to_string()))?;
            validate_withdrawal(amount_cents, wallet.available_cents)
                .map_err(|e| StoreError::Invalid(e.to_string()))?;
            wallet.available_cents -= amount_cents;
            wallet.pending_cents += amount_cents;
        }
        let id = self.alloc_id();
        let request = WithdrawalRequest {
            id,
            barber_id,
            amount_cents,
            status: WithdrawalStatus::Pending,
            created_at: now_rfc3339(),
        };
        self.withdrawals.insert(id, request.clone());
        Ok(request)
    }

    pub fn withdrawals_sorted(&self, status: Option<WithdrawalStatus>) -> Vec<WithdrawalRequest> {
        let mut all: Vec<WithdrawalRequest> = self
            .withdrawals
            .iter()
            .filter(|e| status.is_none_or(|s| e.value().status == s))
            .map(|e| e.value().clone())
            .collect();
        all.sort_by_key(|w| w.id);
        all
    }

    /// Approve (pay out) or reject (release back to available) a pending
    /// withdrawal.
    pub fn resolve_withdrawal(
        &self,
        id: i64,
        approve: bool,
    ) -> Result<WithdrawalRequest, StoreError> {
        let (barber_id, amount_cents) = {
            let mut request = self
                .withdrawals
                .get_mut(&id)
                .ok_or(StoreError::NotFound("withdrawal"))?;
            if request.status != WithdrawalStatus::Pending {
                return Err(StoreError::Conflict(
                    "withdrawal already resolved".to_string(),
                ));
            }
            request.status = if approve {
                WithdrawalStatus::Approved
            } else {
                WithdrawalStatus::Rejected
            };
            (request.barber_id, request.amount_cents)
        };

        if let Some(mut wallet) = self.wallets.get_mut(&barber_id) {
            wallet.pending_cents -= amount_cents;
            if !approve {
                wallet.available_cents += amount_cents;
            }
        }
        if approve {
            let tx_id = self.alloc_id();
            self.transactions.insert(
                tx_id,
                WalletTransaction {
                    id: tx_id,
                    barber_id,
                    kind: TransactionKind::Withdrawal,
                    amount_cents,
                    description: format!("Withdrawal #{} paid out", id),
                    created_at: now_rfc3339(),
                },
            );
        }
        self.withdrawals
            .get(&id)
            .map(|w| w.clone())
            .ok_or(StoreError::NotFound("withdrawal"))
    }

    // ── Dashboards ──

    pub fn owner_dashboard(&self) -> OwnerDashboard {
        let today = today_ymd();
        let month = &today[..7];

        let mut revenue_today_cents = 0;
        let mut revenue_month_cents = 0;
        let mut commission_month_cents = 0;
        for entry in self.payments.iter() {
            let payment = entry.value();
            if payment.status != PaymentStatus::Completed {
                continue;
            }
            let Some(settled) = &payment.settled_on else {
                continue;
            };
            if settled == &today {
                revenue_today_cents += payment.total_cents;
            }
            if settled.starts_with(month) {
                revenue_month_cents += payment.total_cents;
                commission_month_cents += payment.owner_cents;
            }
        }

        let confirmed_month: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|e| {
                e.value().status == BookingStatus::Confirmed && e.value().date.starts_with(month)
            })
            .map(|e| e.value().clone())
            .collect();

        let barber_stats = self
            .barbers_sorted()
            .into_iter()
            .map(|barber| {
                let revenue: i64 = self
                    .payments
                    .iter()
                    .filter(|e| {
                        let p = e.value();
                        p.barber_id == barber.id
                            && p.status == PaymentStatus::Completed
                            && p.settled_on
                                .as_deref()
                                .is_some_and(|s| s.starts_with(month))
                    })
                    .map(|e| e.value().total_cents)
                    .sum();
                BarberStat {
                    barber_id: barber.id,
                    name: barber.name,
                    bookings_month: confirmed_month
                        .iter()
                        .filter(|b| b.barber_id == barber.id)
                        .count() as i64,
                    revenue_month_cents: revenue,
                }
            })
            .collect();

        OwnerDashboard {
            revenue_today_cents,
            revenue_month_cents,
            commission_month_cents,
            bookings_month: confirmed_month.len() as i64,
            barber_stats,
            pending_withdrawals: self
                .withdrawals
                .iter()
                .filter(|e| e.value().status == WithdrawalStatus::Pending)
                .count() as i64,
        }
    }

    pub fn barber_dashboard(&self, barber_id: i64) -> Result<BarberDashboard, StoreError> {
        if !self.barbers.contains_key(&barber_id) {
            return Err(StoreError::NotFound("barber"));
        }
        let today = today_ymd();
        let month = &today[..7];

        let confirmed: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|e| {
                e.value().barber_id == barber_id && e.value().status == BookingStatus::Confirmed
            })
            .map(|e| e.value().clone())
            .collect();

        let mut earnings_today_cents = 0;
        let mut earnings_month_cents = 0;
        for entry in self.payments.iter() {
            let payment = entry.value();
            if payment.barber_id != barber_id || payment.status != PaymentStatus::Completed {
                continue;
            }
            let Some(settled) = &payment.settled_on else {
                continue;
            };
            if settled == &today {
                earnings_today_cents += payment.barber_cents;
            }
            if settled.starts_with(month) {
                earnings_month_cents += payment.barber_cents;
            }
        }

        let mut upcoming: Vec<Booking> = confirmed
            .iter()
            .filter(|b| b.date.as_str() >= today.as_str())
            .cloned()
            .collect();
        upcoming.sort_by(|a, b| (&a.date, &a.start_time).cmp(&(&b.date, &b.start_time)));
        upcoming.truncate(10);

        Ok(BarberDashboard {
            bookings_today: confirmed.iter().filter(|b| b.date == today).count() as i64,
            bookings_month: confirmed
                .iter()
                .filter(|b| b.date.starts_with(month))
                .count() as i64,
            earnings_today_cents,
            earnings_month_cents,
            upcoming_bookings: upcoming,
        })
    }

    // ── Seed data ──

    /// Demo roster and retail shelf, used by the binary and the tests.
    pub fn seed_demo_data(&self) {
        let marcus_id = self.alloc_id();
        let cut_id = self.alloc_id();
        let fade_id = self.alloc_id();
        self.barbers.insert(
            marcus_id,
            Barber {
                id: marcus_id,
                name: "Marcus Webb".to_string(),
                specialty: "Classic cuts".to_string(),
                commission_rate: 0.4,
                services: vec![
                    Service {
                        id: cut_id,
                        barber_id: marcus_id,
                        name: "Classic Cut".to_string(),
                        price_cents: 4_500,
                        duration_minutes: 30,
                    },
                    Service {
                        id: fade_id,
                        barber_id: marcus_id,
                        name: "Skin Fade".to_string(),
                        price_cents: 5_500,
                        duration_minutes: 60,
                    },
                ],
            },
        );

        let andre_id = self.alloc_id();
        let beard_id = self.alloc_id();
        self.barbers.insert(
            andre_id,
            Barber {
                id: andre_id,
                name: "Andre Silva".to_string(),
                specialty: "Beards and hot towels".to_string(),
                commission_rate: 0.35,
                services: vec![Service {
                    id: beard_id,
                    barber_id: andre_id,
                    name: "Beard Sculpt".to_string(),
                    price_cents: 2_500,
                    duration_minutes: 30,
                }],
            },
        );

        // No menu of his own: customers see the shop-wide catalog.
        let diego_id = self.alloc_id();
        self.barbers.insert(
            diego_id,
            Barber {
                id: diego_id,
                name: "Diego Morales".to_string(),
                specialty: "Apprentice".to_string(),
                commission_rate: 0.5,
                services: vec![],
            },
        );

        for (name, description, price_cents, stock, active) in [
            ("Matte Pomade", "Medium hold, no shine", 1_800, 12, true),
            ("Beard Oil", "Cedar and bergamot", 1_400, 8, true),
            ("Texture Powder", "Volumizing dust", 1_600, 0, true),
            ("Clipper Kit", "Retired display unit", 9_000, 3, false),
        ] {
            let id = self.alloc_id();
            self.products.insert(
                id,
                Product {
                    id,
                    name: name.to_string(),
                    description: description.to_string(),
                    price_cents,
                    stock_quantity: stock,
                    is_active: active,
                },
            );
        }

        let today = today_ymd();
        for barber_id in [marcus_id, andre_id, diego_id] {
            if let Err(e) = self.generate_schedule(barber_id, &today) {
                tracing::warn!(barber_id, "could not seed today's schedule: {:?}", e);
            }
        }
        tracing::info!("seeded demo roster, shelf, and today's schedules");
    }
}

/// `needed` consecutive free, visible slots starting at `start`, each ending
/// exactly where the next begins.
fn chain_is_free(day: &[Slot], start: usize, needed: usize) -> bool {
    if start + needed > day.len() {
        return false;
    }
    for j in 0..needed {
        let slot = &day[start + j];
        if slot.is_booked || !slot.is_active {
            return false;
        }
        if j > 0 && day[start + j - 1].end_time.as_deref() != Some(slot.start_time.as_str()) {
            return false;
        }
    }
    true
}

// ── Tests ──
