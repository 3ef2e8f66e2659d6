//! Booking core for a barbershop: the customer-facing wizard, slot
//! availability view, cart pricing, payment handoff, wallets, and the
//! owner's schedule console, all speaking to the shop API over HTTP.
//!
//! Money is integer cents everywhere. Dates are `YYYY-MM-DD` strings on the
//! wire and [`chrono::NaiveDate`] in memory; slot times are `HH:MM`.

pub mod admin;
pub mod availability;
pub mod calendar;
pub mod client;
pub mod error;
pub mod models;
pub mod payment;
pub mod pricing;
pub mod wallet;
pub mod wizard;

pub use admin::AdminSlotManager;
pub use client::ShopClient;
pub use error::{Error, Result};
pub use payment::{Checkout, PaymentHandoff, PaymentMode, PaymentOutcome, PollConfig};
pub use wizard::{AvailabilityKey, BookingSession, WizardStep};
