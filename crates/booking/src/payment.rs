use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::client::ShopClient;
use crate::error::{Error, Result};
use crate::models::{BalanceMethod, Booking, BookingContext, ContextItem, PaymentStatus};
use crate::pricing::{format_usd, suggested_tip};

/// How often the settlement loop asks for the payment status.
pub const POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Polling stops after this long without a terminal status.
pub const POLL_CAP: Duration = Duration::from_secs(300);

// ── Handoff types ──

/// Payment environment for a confirmed booking, decided by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMode {
    /// No provider involved; settlement is simulated on request.
    Sandbox,
    /// Real provider checkout the customer opens in a browser.
    Live { payment_url: String },
}

/// Everything the settlement screen needs, handed over by the wizard once
/// the booking and payment link exist. The wizard keeps nothing back; the
/// checkout owns the flow from here.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub booking: Booking,
    pub mode: PaymentMode,
    pub context: BookingContext,
}

/// How a settlement wait ended. Timing out is not a failure: the payment may
/// still complete later, the customer just stops waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Completed,
    Failed,
    TimedOut,
}

/// Poll cadence, injectable so tests settle in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub cap: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            cap: POLL_CAP,
        }
    }
}

// ── Handoff ──

/// Drives one checkout to a settled state.
///
/// In live mode [`PaymentHandoff::await_settlement`] polls the status
/// endpoint; dropping that future stops the polling, nothing keeps running
/// in the background. In sandbox mode the customer triggers
/// [`PaymentHandoff::simulate_completed`] instead.
#[derive(Debug)]
pub struct PaymentHandoff {
    checkout: Checkout,
    config: PollConfig,
    polls: u32,
}

impl PaymentHandoff {
    pub fn new(checkout: Checkout) -> Self {
        Self::with_poll_config(checkout, PollConfig::default())
    }

    pub fn with_poll_config(checkout: Checkout, config: PollConfig) -> Self {
        Self {
            checkout,
            config,
            polls: 0,
        }
    }

    pub fn checkout(&self) -> &Checkout {
        &self.checkout
    }

    pub fn mode(&self) -> &PaymentMode {
        &self.checkout.mode
    }

    pub fn payment_url(&self) -> Option<&str> {
        match &self.checkout.mode {
            PaymentMode::Live { payment_url } => Some(payment_url),
            PaymentMode::Sandbox => None,
        }
    }

    /// Status checks performed so far.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Sandbox only: ask the server to settle the payment, then read the
    /// status back. On an error the payment stays pending and the call may
    /// simply be retried.
    pub async fn simulate_completed(&mut self, client: &ShopClient) -> Result<PaymentOutcome> {
        if self.checkout.mode != PaymentMode::Sandbox {
            return Err(Error::validation(
                "payment simulation is only available in sandbox mode",
            ));
        }
        client.sandbox_complete(self.checkout.booking.id).await?;
        self.polls += 1;
        match client.payment_status(self.checkout.booking.id).await? {
            PaymentStatus::Completed => Ok(PaymentOutcome::Completed),
            PaymentStatus::Failed => Ok(PaymentOutcome::Failed),
            PaymentStatus::Pending => Err(Error::validation("payment is still pending")),
        }
    }

    /// Poll until the payment reaches a terminal status or the cap elapses.
    ///
    /// The first check fires immediately, then one per interval. Transient
    /// transport errors are logged and polling continues; a server-declared
    /// error aborts the wait. Dropping the future cancels the loop.
    pub async fn await_settlement(&mut self, client: &ShopClient) -> Result<PaymentOutcome> {
        let started = tokio::time::Instant::now();
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.polls += 1;
            match client.payment_status(self.checkout.booking.id).await {
                Ok(PaymentStatus::Completed) => return Ok(PaymentOutcome::Completed),
                Ok(PaymentStatus::Failed) => return Ok(PaymentOutcome::Failed),
                Ok(PaymentStatus::Pending) => {}
                Err(e) if e.is_transient() => {
                    tracing::warn!("payment status poll failed: {}", e);
                }
                Err(e) => return Err(e),
            }
            if started.elapsed() >= self.config.cap {
                tracing::info!(
                    booking_id = self.checkout.booking.id,
                    polls = self.polls,
                    "settlement wait capped out"
                );
                return Ok(PaymentOutcome::TimedOut);
            }
        }
    }

    /// Render the post-payment receipt from the context snapshot.
    pub fn receipt(&self) -> Receipt {
        let ctx = &self.checkout.context;
        Receipt {
            barber_name: ctx.barber_name.clone(),
            service_name: ctx.service_name.clone(),
            date: ctx.date.clone(),
            start_time: ctx.start_time.clone(),
            items: ctx.items.clone(),
            deposit_paid: format_usd(ctx.deposit_cents),
            products_paid: format_usd(ctx.products_total_cents),
            total_paid: format_usd(ctx.deposit_cents + ctx.products_total_cents),
            balance_due: format_usd(ctx.service_price_cents - ctx.deposit_cents),
            balance_method: ctx.balance_method,
            tip_hint: ctx.tip_percent.map(|p| {
                format!(
                    "{}% tip: {}",
                    p,
                    format_usd(suggested_tip(ctx.service_price_cents, p))
                )
            }),
        }
    }
}

/// Human-readable settlement summary. Amounts arrive pre-formatted; this is
/// the last stop before a chat message or terminal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub barber_name: String,
    pub service_name: String,
    pub date: String,
    pub start_time: String,
    pub items: Vec<ContextItem>,
    pub deposit_paid: String,
    pub products_paid: String,
    pub total_paid: String,
    pub balance_due: String,
    pub balance_method: BalanceMethod,
    pub tip_hint: Option<String>,
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;

    fn make_checkout(mode: PaymentMode) -> Checkout {
        Checkout {
            booking: Booking {
                id: 7,
                barber_id: 1,
                service_id: 10,
                slot_id: 100,
                date: "2026-03-14".to_string(),
                start_time: "10:00".to_string(),
                status: BookingStatus::Pending,
                created_at: "2026-03-10T12:00:00Z".to_string(),
            },
            mode,
            context: BookingContext {
                barber_name: "Marcus".to_string(),
                date: "2026-03-14".to_string(),
                start_time: "10:00".to_string(),
                service_name: "Classic Cut".to_string(),
                service_price_cents: 4_500,
                balance_method: BalanceMethod::Local,
                tip_percent: Some(20),
                items: vec![ContextItem {
                    product_id: 1,
                    name: "Pomade".to_string(),
                    quantity: 2,
                    unit_price_cents: 1_000,
                    line_total_cents: 2_000,
                }],
                products_total_cents: 2_000,
                deposit_cents: 1_000,
            },
        }
    }

    #[test]
    fn test_default_poll_config() {
        let config = PollConfig::default();
        assert_eq!(config.interval, Duration::from_secs(4));
        assert_eq!(config.cap, Duration::from_secs(300));
    }

    #[test]
    fn test_payment_url_only_in_live_mode() {
        let live = PaymentHandoff::new(make_checkout(PaymentMode::Live {
            payment_url: "https://pay.example/cs_123".to_string(),
        }));
        assert_eq!(live.payment_url(), Some("https://pay.example/cs_123"));

        let sandbox = PaymentHandoff::new(make_checkout(PaymentMode::Sandbox));
        assert_eq!(sandbox.payment_url(), None);
    }

    #[tokio::test]
    async fn test_simulate_rejected_in_live_mode() {
        // The guard fires before any request is made, so an unreachable
        // base URL is fine here.
        let client = ShopClient::from_url("http://127.0.0.1:1").unwrap();
        let mut handoff = PaymentHandoff::new(make_checkout(PaymentMode::Live {
            payment_url: "https://pay.example/cs_123".to_string(),
        }));
        assert!(matches!(
            handoff.simulate_completed(&client).await,
            Err(Error::Validation(_))
        ));
        assert_eq!(handoff.polls(), 0);
    }

    #[test]
    fn test_receipt_formats_amounts() {
        let handoff = PaymentHandoff::new(make_checkout(PaymentMode::Sandbox));
        let receipt = handoff.receipt();
        assert_eq!(receipt.deposit_paid, "$10.00");
        assert_eq!(receipt.products_paid, "$20.00");
        assert_eq!(receipt.total_paid, "$30.00");
        assert_eq!(receipt.balance_due, "$35.00");
        assert_eq!(receipt.tip_hint.as_deref(), Some("20% tip: $9.00"));
        assert_eq!(receipt.items.len(), 1);
    }

    #[test]
    fn test_receipt_negative_balance_for_cheap_service() {
        let mut checkout = make_checkout(PaymentMode::Sandbox);
        checkout.context.service_price_cents = 550;
        checkout.context.tip_percent = None;
        let receipt = PaymentHandoff::new(checkout).receipt();
        assert_eq!(receipt.balance_due, "-$4.50");
        assert_eq!(receipt.tip_hint, None);
    }
}
