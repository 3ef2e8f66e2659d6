use std::collections::BTreeMap;

use crate::models::Product;

// ── Constants ──

/// Fixed reservation deposit in cents, independent of service price.
pub const DEPOSIT_CENTS: i64 = 1_000;

/// Tip percentages offered at confirmation.
pub const TIP_PERCENTS: [u8; 3] = [15, 20, 25];

// ── Cart ──

/// Product selections for one wizard session: product id → quantity.
///
/// Quantities are bounded by product stock at the wizard level; the cart
/// itself only tracks what was picked.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: BTreeMap<i64, u32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quantity for a product; zero removes the entry.
    pub fn set_quantity(&mut self, product_id: i64, quantity: u32) {
        if quantity == 0 {
            self.items.remove(&product_id);
        } else {
            self.items.insert(product_id, quantity);
        }
    }

    pub fn quantity(&self, product_id: i64) -> u32 {
        self.items.get(&product_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn entries(&self) -> impl Iterator<Item = (i64, u32)> + '_ {
        self.items.iter().map(|(&id, &qty)| (id, qty))
    }
}

// ── Pure computations ──

/// Σ price × quantity over cart entries that resolve to a known product.
pub fn cart_total(cart: &Cart, products: &[Product]) -> i64 {
    cart.entries()
        .filter(|&(_, qty)| qty > 0)
        .filter_map(|(id, qty)| {
            products
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.price_cents * qty as i64)
        })
        .sum()
}

/// Σ quantity over all cart entries.
pub fn cart_count(cart: &Cart) -> u32 {
    cart.entries().map(|(_, qty)| qty).sum()
}

/// Remaining amount after the deposit. Not clamped: a service priced below
/// the deposit shows a negative balance.
pub fn balance_due(service_price_cents: i64) -> i64 {
    service_price_cents - DEPOSIT_CENTS
}

/// Advisory tip amount; never part of the pay-now total.
pub fn suggested_tip(service_price_cents: i64, percent: u8) -> i64 {
    service_price_cents * percent as i64 / 100
}

/// Deposit plus cart total: what is charged right now.
pub fn pay_now_total(cart_total_cents: i64) -> i64 {
    DEPOSIT_CENTS + cart_total_cents
}

/// Render cents as dollars, e.g. `$10.00`, `-$4.50`.
pub fn format_usd(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

// ── Confirmation snapshot ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipSuggestion {
    pub percent: u8,
    pub amount_cents: i64,
}

/// Display-only pricing figures for the confirmation step. Authoritative
/// totals are computed by the payment collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub service_price_cents: i64,
    pub deposit_cents: i64,
    pub balance_due_cents: i64,
    pub cart_total_cents: i64,
    pub cart_count: u32,
    pub pay_now_cents: i64,
    pub tip: Option<TipSuggestion>,
}

/// Assemble the confirmation breakdown. A selected tip is honored only when
/// `show_tips` is on; with tips hidden it is treated as unset.
pub fn quote(
    service_price_cents: i64,
    cart: &Cart,
    products: &[Product],
    tip_percent: Option<u8>,
    show_tips: bool,
) -> PriceBreakdown {
    let cart_total_cents = cart_total(cart, products);
    let tip = if show_tips {
        tip_percent.map(|percent| TipSuggestion {
            percent,
            amount_cents: suggested_tip(service_price_cents, percent),
        })
    } else {
        None
    };

    PriceBreakdown {
        service_price_cents,
        deposit_cents: DEPOSIT_CENTS,
        balance_due_cents: balance_due(service_price_cents),
        cart_total_cents,
        cart_count: cart_count(cart),
        pay_now_cents: pay_now_total(cart_total_cents),
        tip,
    }
}

// ── Tests ──
