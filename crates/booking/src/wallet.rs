use crate::error::{Error, Result};

/// One settled amount divided between the shop and the barber's wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementSplit {
    pub owner_cents: i64,
    pub barber_cents: i64,
}

/// Split a settled amount by the barber's commission rate (the owner's
/// fraction). The owner's cut rounds down, so odd cents land in the wallet.
pub fn split_settlement(amount_cents: i64, commission_rate: f64) -> SettlementSplit {
    let rate = commission_rate.clamp(0.0, 1.0);
    let owner_cents = (amount_cents as f64 * rate).floor() as i64;
    SettlementSplit {
        owner_cents,
        barber_cents: amount_cents - owner_cents,
    }
}

/// Check a payout request against the available balance. Pending withdrawals
/// are already carved out of `available_cents` by the ledger.
pub fn validate_withdrawal(amount_cents: i64, available_cents: i64) -> Result<()> {
    if amount_cents <= 0 {
        return Err(Error::validation("withdrawal amount must be positive"));
    }
    if amount_cents > available_cents {
        return Err(Error::validation(format!(
            "withdrawal exceeds available balance ({} > {})",
            amount_cents, available_cents
        )));
    }
    Ok(())
}

// ── Tests ──
