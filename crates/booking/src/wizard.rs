use chrono::NaiveDate;

use crate::calendar::{to_ymd, CalendarNavigator};
use crate::client::ShopClient;
use crate::error::{Error, Result};
use crate::models::*;
use crate::payment::{Checkout, PaymentMode};
use crate::pricing::{self, Cart, PriceBreakdown, DEPOSIT_CENTS, TIP_PERCENTS};

// ── Steps ──

/// The six wizard steps, in flow order. Ordering is load-bearing: back
/// navigation and downstream resets compare steps with `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    SelectBarber,
    SelectService,
    SelectDate,
    SelectSlot,
    SelectExtras,
    ConfirmAndPay,
}

/// Identity of one slot fetch: the selections it was issued for. A response
/// is applied only while the session still matches its key, so a reply that
/// arrives after the customer moved on is dropped instead of overwriting the
/// current list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityKey {
    pub barber_id: i64,
    pub date: NaiveDate,
    pub service_id: Option<i64>,
}

// ── Session ──

/// One customer's booking flow from barber pick to payment handoff.
///
/// The session owns every selection plus the calendar; collaborator data
/// (barbers, products, slots, settings) is applied through `apply_*` methods
/// so the flow itself stays synchronous and testable. `confirm` is the only
/// operation that talks to the network.
#[derive(Debug)]
pub struct BookingSession {
    today: NaiveDate,
    step: WizardStep,
    calendar: CalendarNavigator,

    barbers: Vec<Barber>,
    products: Vec<Product>,
    settings: Option<ShopSettings>,

    // Deep-link target, kept until barbers load. A manual pick wins for the
    // rest of the session.
    deep_link: Option<i64>,
    manual_barber_pick: bool,

    selected_barber: Option<Barber>,
    selected_service: Option<Service>,
    selected_date: Option<NaiveDate>,
    selected_slot: Option<Slot>,
    // None until a fetch for the current key lands; Some([]) is a day with
    // nothing open, which renders differently from still-loading.
    slots: Option<Vec<Slot>>,
    pending_fetch: Option<AvailabilityKey>,

    cart: Cart,
    tip_percent: Option<u8>,
    balance_method: BalanceMethod,
    // Booking created by a confirm whose payment link failed; reused on
    // retry so the customer is not double-booked.
    pending_booking: Option<Booking>,
}

impl BookingSession {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            step: WizardStep::SelectBarber,
            calendar: CalendarNavigator::new(today),
            barbers: Vec::new(),
            products: Vec::new(),
            settings: None,
            deep_link: None,
            manual_barber_pick: false,
            selected_barber: None,
            selected_service: None,
            selected_date: None,
            selected_slot: None,
            slots: None,
            pending_fetch: None,
            cart: Cart::new(),
            tip_percent: None,
            balance_method: BalanceMethod::Local,
            pending_booking: None,
        }
    }

    /// Session opened through a barber's share link. The pick is applied as
    /// soon as the barber list loads.
    pub fn with_deep_link(today: NaiveDate, barber_id: i64) -> Self {
        let mut session = Self::new(today);
        session.deep_link = Some(barber_id);
        session
    }

    // ── Accessors ──

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn calendar(&self) -> &CalendarNavigator {
        &self.calendar
    }

    /// Week/month paging happens directly on the navigator; only `select`
    /// goes through [`BookingSession::select_date`].
    pub fn calendar_mut(&mut self) -> &mut CalendarNavigator {
        &mut self.calendar
    }

    pub fn barbers(&self) -> &[Barber] {
        &self.barbers
    }

    pub fn selected_barber(&self) -> Option<&Barber> {
        self.selected_barber.as_ref()
    }

    pub fn selected_service(&self) -> Option<&Service> {
        self.selected_service.as_ref()
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn selected_slot(&self) -> Option<&Slot> {
        self.selected_slot.as_ref()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn tip_percent(&self) -> Option<u8> {
        self.tip_percent
    }

    pub fn balance_method(&self) -> BalanceMethod {
        self.balance_method
    }

    pub fn tips_enabled(&self) -> bool {
        self.settings.as_ref().map(|s| s.show_tips).unwrap_or(false)
    }

    // ── Collaborator data ──

    pub fn apply_settings(&mut self, settings: ShopSettings) {
        self.settings = Some(settings);
    }

    pub fn apply_barbers(&mut self, barbers: Vec<Barber>) {
        self.barbers = barbers;
        if let Some(id) = self.deep_link {
            self.try_apply_deep_link(id);
        }
    }

    pub fn apply_products(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    /// Products offered on the extras step: active and in stock.
    pub fn products_for_sale(&self) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| p.is_active && p.stock_quantity > 0)
            .cloned()
            .collect()
    }

    /// Apply a slot fetch response. Returns false (and leaves the session
    /// untouched) when the key no longer matches the current selections.
    pub fn apply_slots(&mut self, key: AvailabilityKey, slots: Vec<Slot>) -> bool {
        if self.pending_fetch != Some(key) {
            tracing::debug!(
                date = %to_ymd(key.date),
                barber_id = key.barber_id,
                "discarding stale slot fetch"
            );
            return false;
        }
        self.slots = Some(slots);
        true
    }

    /// Customer-facing view of the applied slots, bucketed by daypart.
    /// None means no fetch has landed for the current selections yet.
    pub fn available_slots(&self) -> Option<Vec<crate::availability::BucketedSlots>> {
        self.slots
            .as_ref()
            .map(|slots| crate::availability::bucket_slots(slots.clone()))
    }

    // ── Deep links ──

    /// Register a share-link barber. Ignored after a manual pick; otherwise
    /// the newest link wins and re-entry with the same barber is a no-op.
    pub fn follow_deep_link(&mut self, barber_id: i64) {
        if self.manual_barber_pick {
            tracing::debug!(barber_id, "deep link ignored after manual pick");
            return;
        }
        self.deep_link = Some(barber_id);
        if !self.barbers.is_empty() {
            self.try_apply_deep_link(barber_id);
        }
    }

    fn try_apply_deep_link(&mut self, barber_id: i64) {
        let Some(barber) = self.barbers.iter().find(|b| b.id == barber_id).cloned() else {
            tracing::warn!(barber_id, "deep link names an unknown barber");
            self.deep_link = None;
            return;
        };
        self.deep_link = None;
        if self.selected_barber.as_ref().map(|b| b.id) == Some(barber_id) {
            // Re-entry with the same link: keep everything already chosen.
            return;
        }
        self.reset_downstream_of(WizardStep::SelectBarber);
        self.selected_barber = Some(barber);
        self.step = WizardStep::SelectService;
    }

    // ── Selections ──

    pub fn select_barber(&mut self, barber_id: i64) -> Result<()> {
        self.ensure_step(WizardStep::SelectBarber, "select a barber")?;
        let barber = self
            .barbers
            .iter()
            .find(|b| b.id == barber_id)
            .cloned()
            .ok_or_else(|| Error::validation(format!("unknown barber: {}", barber_id)))?;
        self.reset_downstream_of(WizardStep::SelectBarber);
        self.selected_barber = Some(barber);
        self.manual_barber_pick = true;
        self.deep_link = None;
        self.step = WizardStep::SelectService;
        Ok(())
    }

    /// Services offered to the customer. A barber without a menu of their own
    /// falls back to the shop-wide catalog, deduplicated by name
    /// (case-insensitive, first listing wins).
    pub fn services_for_selection(&self) -> Vec<Service> {
        let Some(barber) = &self.selected_barber else {
            return Vec::new();
        };
        if !barber.services.is_empty() {
            return barber.services.clone();
        }
        let mut seen = std::collections::HashSet::new();
        let mut catalog = Vec::new();
        for b in &self.barbers {
            for s in &b.services {
                if seen.insert(s.name.to_lowercase()) {
                    catalog.push(s.clone());
                }
            }
        }
        catalog
    }

    pub fn select_service(&mut self, service_id: i64) -> Result<()> {
        self.ensure_step(WizardStep::SelectService, "select a service")?;
        let service = self
            .services_for_selection()
            .into_iter()
            .find(|s| s.id == service_id)
            .ok_or_else(|| Error::validation(format!("unknown service: {}", service_id)))?;
        self.reset_downstream_of(WizardStep::SelectService);
        self.selected_service = Some(service);
        self.step = WizardStep::SelectDate;
        Ok(())
    }

    /// Pick a day. Past dates are rejected and leave the session unchanged.
    /// Returns the key the caller must fetch slots under.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<AvailabilityKey> {
        self.ensure_step(WizardStep::SelectDate, "select a date")?;
        if !self.calendar.select(date) {
            return Err(Error::validation(format!("{} is in the past", to_ymd(date))));
        }
        let barber_id = self
            .selected_barber
            .as_ref()
            .map(|b| b.id)
            .ok_or_else(|| Error::validation("no barber selected"))?;
        self.reset_downstream_of(WizardStep::SelectDate);
        self.selected_date = Some(date);
        self.step = WizardStep::SelectSlot;
        let key = AvailabilityKey {
            barber_id,
            date,
            service_id: self.selected_service.as_ref().map(|s| s.id),
        };
        self.pending_fetch = Some(key);
        Ok(key)
    }

    pub fn select_slot(&mut self, slot_id: i64) -> Result<()> {
        self.ensure_step(WizardStep::SelectSlot, "select a slot")?;
        let slot = self
            .slots
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|s| s.id == slot_id)
            .cloned()
            .ok_or_else(|| Error::validation(format!("unknown slot: {}", slot_id)))?;
        if slot.is_booked || !slot.is_active {
            return Err(Error::validation("slot is no longer available"));
        }
        self.reset_downstream_of(WizardStep::SelectSlot);
        self.selected_slot = Some(slot);
        self.step = WizardStep::SelectExtras;
        Ok(())
    }

    // ── Extras ──

    pub fn set_cart_quantity(&mut self, product_id: i64, quantity: u32) -> Result<()> {
        self.ensure_step(WizardStep::SelectExtras, "edit the cart")?;
        if quantity > 0 {
            let product = self
                .products_for_sale()
                .into_iter()
                .find(|p| p.id == product_id)
                .ok_or_else(|| Error::validation(format!("unknown product: {}", product_id)))?;
            if i64::from(quantity) > product.stock_quantity {
                return Err(Error::validation(format!(
                    "only {} of {} in stock",
                    product.stock_quantity, product.name
                )));
            }
        }
        self.cart.set_quantity(product_id, quantity);
        Ok(())
    }

    pub fn proceed_to_confirm(&mut self) -> Result<()> {
        self.ensure_step(WizardStep::SelectExtras, "proceed to checkout")?;
        self.step = WizardStep::ConfirmAndPay;
        Ok(())
    }

    // ── Confirmation ──

    pub fn set_tip(&mut self, percent: Option<u8>) -> Result<()> {
        self.ensure_step(WizardStep::ConfirmAndPay, "set a tip")?;
        if let Some(p) = percent {
            if !self.tips_enabled() {
                return Err(Error::validation("tips are disabled for this shop"));
            }
            if !TIP_PERCENTS.contains(&p) {
                return Err(Error::validation(format!("unsupported tip percent: {}", p)));
            }
        }
        self.tip_percent = percent;
        Ok(())
    }

    pub fn set_balance_method(&mut self, method: BalanceMethod) -> Result<()> {
        self.ensure_step(WizardStep::ConfirmAndPay, "choose a balance method")?;
        self.balance_method = method;
        Ok(())
    }

    /// Pricing figures for whatever is currently selected. None until a
    /// service is chosen.
    pub fn quote(&self) -> Option<PriceBreakdown> {
        let service = self.selected_service.as_ref()?;
        Some(pricing::quote(
            service.price_cents,
            &self.cart,
            &self.products,
            self.tip_percent,
            self.tips_enabled(),
        ))
    }

    /// Create the booking and its payment link, handing ownership of the
    /// flow to a [`Checkout`].
    ///
    /// The booking is created first; if the payment link then fails, the
    /// booking is remembered and reused on the next `confirm`, so a retry
    /// never double-books the slot.
    pub async fn confirm(&mut self, client: &ShopClient) -> Result<Checkout> {
        self.ensure_step(WizardStep::ConfirmAndPay, "confirm the booking")?;
        let context = self.booking_context()?;

        let booking = match self.pending_booking.clone() {
            Some(existing) => existing,
            None => {
                let barber = self
                    .selected_barber
                    .as_ref()
                    .ok_or_else(|| Error::validation("no barber selected"))?;
                let service = self
                    .selected_service
                    .as_ref()
                    .ok_or_else(|| Error::validation("no service selected"))?;
                let slot = self
                    .selected_slot
                    .as_ref()
                    .ok_or_else(|| Error::validation("no slot selected"))?;
                let created = client
                    .create_booking(&CreateBookingRequest {
                        barber_id: barber.id,
                        service_id: service.id,
                        date: slot.date.clone(),
                        start_time: slot.start_time.clone(),
                    })
                    .await?;
                self.pending_booking = Some(created.clone());
                created
            }
        };

        let link = client
            .create_payment_link(&CreatePaymentLinkRequest {
                booking_id: booking.id,
                deposit_cents: DEPOSIT_CENTS,
                products: self
                    .cart
                    .entries()
                    .map(|(product_id, quantity)| PaymentLineItem {
                        product_id,
                        quantity,
                    })
                    .collect(),
            })
            .await?;

        let mode = if link.is_sandbox {
            PaymentMode::Sandbox
        } else {
            let payment_url = link.payment_url.ok_or(Error::Api {
                status: 200,
                message: "live payment link missing url".to_string(),
            })?;
            PaymentMode::Live { payment_url }
        };

        self.pending_booking = None;
        Ok(Checkout {
            booking,
            mode,
            context,
        })
    }

    fn booking_context(&self) -> Result<BookingContext> {
        let barber = self
            .selected_barber
            .as_ref()
            .ok_or_else(|| Error::validation("no barber selected"))?;
        let service = self
            .selected_service
            .as_ref()
            .ok_or_else(|| Error::validation("no service selected"))?;
        let date = self
            .selected_date
            .ok_or_else(|| Error::validation("no date selected"))?;
        let slot = self
            .selected_slot
            .as_ref()
            .ok_or_else(|| Error::validation("no slot selected"))?;

        let items: Vec<ContextItem> = self
            .cart
            .entries()
            .filter_map(|(product_id, quantity)| {
                self.products.iter().find(|p| p.id == product_id).map(|p| ContextItem {
                    product_id,
                    name: p.name.clone(),
                    quantity,
                    unit_price_cents: p.price_cents,
                    line_total_cents: p.price_cents * i64::from(quantity),
                })
            })
            .collect();
        let products_total_cents = items.iter().map(|i| i.line_total_cents).sum();

        Ok(BookingContext {
            barber_name: barber.name.clone(),
            date: to_ymd(date),
            start_time: slot.start_time.clone(),
            service_name: service.name.clone(),
            service_price_cents: service.price_cents,
            balance_method: self.balance_method,
            tip_percent: if self.tips_enabled() { self.tip_percent } else { None },
            items,
            products_total_cents,
            deposit_cents: DEPOSIT_CENTS,
        })
    }

    // ── Navigation ──

    /// Return to an earlier step. Selections owned by steps strictly after
    /// the target are discarded; the target's own selection survives so the
    /// customer sees what they had picked.
    pub fn go_back(&mut self, target: WizardStep) -> Result<()> {
        if target >= self.step {
            return Err(Error::Transition {
                step: self.step,
                action: "go back",
            });
        }
        self.reset_downstream_of(target);
        self.step = target;
        Ok(())
    }

    fn ensure_step(&self, expected: WizardStep, action: &'static str) -> Result<()> {
        if self.step != expected {
            return Err(Error::Transition {
                step: self.step,
                action,
            });
        }
        Ok(())
    }

    fn reset_downstream_of(&mut self, target: WizardStep) {
        if target < WizardStep::SelectService {
            self.selected_service = None;
        }
        if target < WizardStep::SelectDate {
            self.selected_date = None;
        }
        if target < WizardStep::SelectSlot {
            self.selected_slot = None;
            self.slots = None;
            self.pending_fetch = None;
        }
        if target < WizardStep::SelectExtras {
            self.cart.clear();
        }
        if target < WizardStep::ConfirmAndPay {
            self.tip_percent = None;
            self.balance_method = BalanceMethod::Local;
            self.pending_booking = None;
        }
    }
}

// ── Tests ──
