use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};
use crate::models::*;

/// Typed async client for the shop collaborator API.
///
/// Every response uses the `{ok, data, error}` envelope; non-2xx statuses
/// and `ok=false` bodies are mapped onto the crate error taxonomy (409 →
/// [`Error::Conflict`], everything else → [`Error::Api`]).
#[derive(Debug, Clone)]
pub struct ShopClient {
    base: String,
    http: reqwest::Client,
}

impl ShopClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            base: base_url.as_str().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Parse and validate a base URL string.
    pub fn from_url(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| Error::validation(format!("invalid base url: {}", e)))?;
        Ok(Self::new(url))
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    // ── Request plumbing ──

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .http
            .get(format!("{}{}", self.base, path))
            .send()
            .await?;
        unwrap_envelope(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let resp = self
            .http
            .post(format!("{}{}", self.base, path))
            .json(body)
            .send()
            .await?;
        unwrap_envelope(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let resp = self
            .http
            .put(format!("{}{}", self.base, path))
            .json(body)
            .send()
            .await?;
        unwrap_envelope(resp).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .http
            .delete(format!("{}{}", self.base, path))
            .send()
            .await?;
        unwrap_envelope(resp).await
    }

    // ── Storefront ──

    /// GET /api/barbers — all barbers with their service menus.
    pub async fn list_barbers(&self) -> Result<Vec<Barber>> {
        self.get("/api/barbers").await
    }

    /// GET /api/barbers/{id}/slots?date= — customer-visible slots for a date.
    ///
    /// `service_id` lets the server apply duration-aware filtering; booked
    /// slots may still be present and are filtered by the resolver.
    pub async fn list_slots(
        &self,
        barber_id: i64,
        date: &str,
        service_id: Option<i64>,
    ) -> Result<Vec<Slot>> {
        let mut path = format!("/api/barbers/{}/slots?date={}", barber_id, date);
        if let Some(sid) = service_id {
            path.push_str(&format!("&service_id={}", sid));
        }
        self.get(&path).await
    }

    /// POST /api/bookings — create a booking; 409 when the slot was taken.
    pub async fn create_booking(&self, req: &CreateBookingRequest) -> Result<Booking> {
        self.post("/api/bookings", req).await
    }

    /// GET /api/bookings?barber_id= — bookings, optionally for one barber.
    pub async fn list_bookings(&self, barber_id: Option<i64>) -> Result<Vec<Booking>> {
        let path = match barber_id {
            Some(id) => format!("/api/bookings?barber_id={}", id),
            None => "/api/bookings".to_string(),
        };
        self.get(&path).await
    }

    /// GET /api/products — retail products; active/stock filtering is the
    /// caller's job.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        self.get("/api/products").await
    }

    /// GET /api/settings — shop working hours, interval, tip gating.
    pub async fn shop_settings(&self) -> Result<ShopSettings> {
        self.get("/api/settings").await
    }

    /// PUT /api/settings — owner settings update.
    pub async fn update_settings(&self, settings: &ShopSettings) -> Result<ShopSettings> {
        self.put("/api/settings", settings).await
    }

    // ── Payments ──

    /// POST /api/payments/create-link — payment link or sandbox session for
    /// a confirmed booking.
    pub async fn create_payment_link(
        &self,
        req: &CreatePaymentLinkRequest,
    ) -> Result<PaymentLinkResponse> {
        self.post("/api/payments/create-link", req).await
    }

    /// GET /api/payments/status/{booking_id} — settlement status.
    pub async fn payment_status(&self, booking_id: i64) -> Result<PaymentStatus> {
        let resp: PaymentStatusResponse = self
            .get(&format!("/api/payments/status/{}", booking_id))
            .await?;
        Ok(resp.status)
    }

    /// POST /api/payments/sandbox-complete/{booking_id} — simulate settlement.
    pub async fn sandbox_complete(&self, booking_id: i64) -> Result<()> {
        let _: String = self
            .post(
                &format!("/api/payments/sandbox-complete/{}", booking_id),
                &serde_json::json!({}),
            )
            .await?;
        Ok(())
    }

    /// POST /api/payments/sandbox-fail/{booking_id} — simulate a failed
    /// settlement (dev-only collaborator affordance).
    pub async fn sandbox_fail(&self, booking_id: i64) -> Result<()> {
        let _: String = self
            .post(
                &format!("/api/payments/sandbox-fail/{}", booking_id),
                &serde_json::json!({}),
            )
            .await?;
        Ok(())
    }

    // ── Owner console ──

    /// POST /api/barbers/{id}/slots/generate — lay out the base schedule.
    pub async fn generate_day_schedule(&self, barber_id: i64, date: &str) -> Result<u32> {
        let resp: GenerateScheduleResponse = self
            .post(
                &format!("/api/barbers/{}/slots/generate", barber_id),
                &GenerateScheduleRequest {
                    date: date.to_string(),
                },
            )
            .await?;
        Ok(resp.inserted)
    }

    /// GET /api/barbers/{id}/slots/manage?date= — full slot list including
    /// booked and inactive entries.
    pub async fn manage_slots(&self, barber_id: i64, date: &str) -> Result<Vec<Slot>> {
        self.get(&format!(
            "/api/barbers/{}/slots/manage?date={}",
            barber_id, date
        ))
        .await
    }

    /// PUT /api/admin/slots/{id}/toggle — flip a slot's visibility.
    pub async fn toggle_slot(&self, slot_id: i64) -> Result<Slot> {
        self.put(
            &format!("/api/admin/slots/{}/toggle", slot_id),
            &serde_json::json!({}),
        )
        .await
    }

    /// POST /api/barbers/{id}/slots/add — insert one ad hoc slot.
    pub async fn add_slot(&self, barber_id: i64, req: &AddSlotRequest) -> Result<Slot> {
        self.post(&format!("/api/barbers/{}/slots/add", barber_id), req)
            .await
    }

    /// DELETE /api/admin/slots/{id} — remove a slot.
    pub async fn delete_slot(&self, slot_id: i64) -> Result<()> {
        let _: String = self.delete(&format!("/api/admin/slots/{}", slot_id)).await?;
        Ok(())
    }

    // ── Wallet & dashboards ──

    /// GET /api/wallet/{barber_id} — balance summary.
    pub async fn wallet(&self, barber_id: i64) -> Result<Wallet> {
        self.get(&format!("/api/wallet/{}", barber_id)).await
    }

    /// GET /api/wallet/{barber_id}/transactions — ledger, newest first.
    pub async fn wallet_transactions(&self, barber_id: i64) -> Result<Vec<WalletTransaction>> {
        self.get(&format!("/api/wallet/{}/transactions", barber_id))
            .await
    }

    /// POST /api/wallet/{barber_id}/withdraw — request a payout.
    pub async fn request_withdrawal(
        &self,
        barber_id: i64,
        amount_cents: i64,
    ) -> Result<WithdrawalRequest> {
        self.post(
            &format!("/api/wallet/{}/withdraw", barber_id),
            &WithdrawRequest { amount_cents },
        )
        .await
    }

    /// GET /api/withdrawals?status= — withdrawal requests for the owner.
    pub async fn list_withdrawals(
        &self,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<WithdrawalRequest>> {
        let path = match status {
            Some(WithdrawalStatus::Pending) => "/api/withdrawals?status=pending",
            Some(WithdrawalStatus::Approved) => "/api/withdrawals?status=approved",
            Some(WithdrawalStatus::Rejected) => "/api/withdrawals?status=rejected",
            None => "/api/withdrawals",
        };
        self.get(path).await
    }

    /// PUT /api/withdrawals/{id} — approve or reject a payout request.
    pub async fn resolve_withdrawal(&self, id: i64, approve: bool) -> Result<WithdrawalRequest> {
        self.put(
            &format!("/api/withdrawals/{}", id),
            &ResolveWithdrawalRequest { approve },
        )
        .await
    }

    /// GET /api/dashboard/owner — shop-wide revenue snapshot.
    pub async fn owner_dashboard(&self) -> Result<OwnerDashboard> {
        self.get("/api/dashboard/owner").await
    }

    /// GET /api/dashboard/barber/{id} — per-barber activity snapshot.
    pub async fn barber_dashboard(&self, barber_id: i64) -> Result<BarberDashboard> {
        self.get(&format!("/api/dashboard/barber/{}", barber_id)).await
    }
}

/// Decode an enveloped response, mapping failures onto the error taxonomy.
async fn unwrap_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();

    if !status.is_success() {
        let message = resp
            .json::<ApiResponse<serde_json::Value>>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| status.to_string());
        tracing::error!("shop api error: {} - {}", status, message);
        if status == StatusCode::CONFLICT {
            return Err(Error::Conflict(message));
        }
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: ApiResponse<T> = resp.json().await?;
    if !envelope.ok {
        return Err(Error::Api {
            status: status.as_u16(),
            message: envelope
                .error
                .unwrap_or_else(|| "server reported failure".to_string()),
        });
    }
    envelope.data.ok_or(Error::Api {
        status: status.as_u16(),
        message: "response envelope missing data".to_string(),
    })
}

// ── Tests ──
