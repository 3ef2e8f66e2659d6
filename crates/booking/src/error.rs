use thiserror::Error;

use crate::wizard::WizardStep;

/// Errors surfaced by the booking core.
///
/// Every variant resolves to a re-enterable state: validation and transition
/// errors are raised before any network call, transport errors invite a
/// manual retry, and a conflict sends the customer back to slot selection.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before any network call (missing selection, bad
    /// amount, malformed time, quantity above stock).
    #[error("{0}")]
    Validation(String),

    /// An action was invoked in a wizard step that does not own it.
    #[error("cannot {action} during {step:?}")]
    Transition {
        step: WizardStep,
        action: &'static str,
    },

    /// Network or protocol failure while talking to the shop API.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the request with a conflict (slot taken between
    /// fetch and submit, or a guarded admin mutation raced a booking).
    #[error("{0}")]
    Conflict(String),

    /// Any other server-declared failure (non-2xx or `ok=false` envelope).
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Affordance-level guard: booked slots are immutable from the console.
    #[error("slot is booked and cannot be modified")]
    SlotBooked,
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// True for failures worth a manual retry (network hiccups), as opposed
    /// to input or state problems.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
