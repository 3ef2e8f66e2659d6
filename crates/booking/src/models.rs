use serde::{Deserialize, Serialize};

// ── Shop entities ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barber {
    pub id: i64,
    pub name: String,
    pub specialty: String,
    /// Owner's fraction of settled revenue; the rest goes to the wallet.
    pub commission_rate: f64,
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub barber_id: i64,
    pub name: String,
    pub price_cents: i64,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: i64,
    pub barber_id: i64,
    pub date: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub is_booked: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub barber_id: i64,
    pub service_id: i64,
    pub slot_id: i64,
    pub date: String,
    pub start_time: String,
    pub status: BookingStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub stock_quantity: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopSettings {
    pub work_start: String,
    pub work_end: String,
    pub slot_interval_minutes: i64,
    pub show_tips: bool,
}

/// How the remaining (non-deposit) amount is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceMethod {
    Local,
    Online,
}

// ── Payments ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentLinkResponse {
    pub payment_url: Option<String>,
    pub is_sandbox: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentStatusResponse {
    pub status: PaymentStatus,
}

// ── Wallet (barber earnings) ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub barber_id: i64,
    pub available_cents: i64,
    pub pending_cents: i64,
    pub total_earned_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
    Withdrawal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: i64,
    pub barber_id: i64,
    pub kind: TransactionKind,
    pub amount_cents: i64,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: i64,
    pub barber_id: i64,
    pub amount_cents: i64,
    pub status: WithdrawalStatus,
    pub created_at: String,
}

// ── Dashboards ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarberStat {
    pub barber_id: i64,
    pub name: String,
    pub bookings_month: i64,
    pub revenue_month_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerDashboard {
    pub revenue_today_cents: i64,
    pub revenue_month_cents: i64,
    pub commission_month_cents: i64,
    pub bookings_month: i64,
    pub barber_stats: Vec<BarberStat>,
    pub pending_withdrawals: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarberDashboard {
    pub bookings_today: i64,
    pub bookings_month: i64,
    pub earnings_today_cents: i64,
    pub earnings_month_cents: i64,
    pub upcoming_bookings: Vec<Booking>,
}

// ── API request/response types ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub barber_id: i64,
    pub service_id: i64,
    pub date: String,
    pub start_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLineItem {
    pub product_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentLinkRequest {
    pub booking_id: i64,
    pub deposit_cents: i64,
    pub products: Vec<PaymentLineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateScheduleRequest {
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateScheduleResponse {
    pub inserted: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSlotRequest {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub amount_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveWithdrawalRequest {
    pub approve: bool,
}

// ── Booking context (confirmation → settlement transfer) ──

/// One purchased product line, priced at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextItem {
    pub product_id: i64,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// Immutable snapshot taken at booking + payment-link creation, consumed
/// once by the settlement screen to render the receipt. Never mutated after
/// construction; ownership moves it from the wizard to the handoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingContext {
    pub barber_name: String,
    pub date: String,
    pub start_time: String,
    pub service_name: String,
    pub service_price_cents: i64,
    pub balance_method: BalanceMethod,
    pub tip_percent: Option<u8>,
    pub items: Vec<ContextItem>,
    pub products_total_cents: i64,
    pub deposit_cents: i64,
}

// ── JSON envelope ──

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
