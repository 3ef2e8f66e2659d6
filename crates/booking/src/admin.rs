use chrono::NaiveDate;

use crate::availability::minute_of_day;
use crate::calendar::to_ymd;
use crate::client::ShopClient;
use crate::error::{Error, Result};
use crate::models::{AddSlotRequest, Slot};

/// Owner console over one barber's day.
///
/// Holds the management view of the schedule (booked and hidden slots
/// included) and refetches it after every mutation, so the local list never
/// drifts from the server. Booked slots are guarded here, before any request
/// goes out; the server enforces the same rule with a conflict.
#[derive(Debug)]
pub struct AdminSlotManager {
    client: ShopClient,
    barber_id: i64,
    date: NaiveDate,
    slots: Vec<Slot>,
}

impl AdminSlotManager {
    /// Open the console on a barber and day, loading the current schedule.
    pub async fn open(client: ShopClient, barber_id: i64, date: NaiveDate) -> Result<Self> {
        let mut manager = Self {
            client,
            barber_id,
            date,
            slots: Vec::new(),
        };
        manager.refresh().await?;
        Ok(manager)
    }

    pub fn barber_id(&self) -> i64 {
        self.barber_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Full management view: booked and inactive slots included.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// True when the slot may be toggled or deleted.
    pub fn can_modify(&self, slot_id: i64) -> bool {
        self.slots
            .iter()
            .any(|s| s.id == slot_id && !s.is_booked)
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.slots = self
            .client
            .manage_slots(self.barber_id, &to_ymd(self.date))
            .await?;
        Ok(())
    }

    /// Move the console to another day.
    pub async fn switch_day(&mut self, date: NaiveDate) -> Result<()> {
        self.date = date;
        self.refresh().await
    }

    /// Lay out the base schedule from the shop's working hours. Times that
    /// already have a slot are left alone; returns how many were inserted.
    pub async fn generate_base_schedule(&mut self) -> Result<u32> {
        let inserted = self
            .client
            .generate_day_schedule(self.barber_id, &to_ymd(self.date))
            .await?;
        tracing::info!(
            barber_id = self.barber_id,
            date = %to_ymd(self.date),
            inserted,
            "generated base schedule"
        );
        self.refresh().await?;
        Ok(inserted)
    }

    /// Hide or reveal a free slot.
    pub async fn toggle_active(&mut self, slot_id: i64) -> Result<()> {
        self.ensure_mutable(slot_id)?;
        if let Err(err) = self.client.toggle_slot(slot_id).await {
            // The local view was stale; resync before surfacing the error.
            self.refresh().await?;
            return Err(err);
        }
        self.refresh().await
    }

    /// Insert one ad hoc slot at `time` (H:MM or HH:MM).
    pub async fn add_custom_slot(&mut self, time: &str) -> Result<()> {
        if minute_of_day(time).is_none() {
            return Err(Error::validation(format!("invalid time: {}", time)));
        }
        if self.slots.iter().any(|s| s.start_time == time) {
            return Err(Error::Conflict(format!(
                "a slot at {} already exists",
                time
            )));
        }
        self.client
            .add_slot(
                self.barber_id,
                &AddSlotRequest {
                    date: to_ymd(self.date),
                    time: time.to_string(),
                },
            )
            .await?;
        self.refresh().await
    }

    /// Remove a free slot from the day.
    pub async fn delete_slot(&mut self, slot_id: i64) -> Result<()> {
        self.ensure_mutable(slot_id)?;
        if let Err(err) = self.client.delete_slot(slot_id).await {
            self.refresh().await?;
            return Err(err);
        }
        self.refresh().await
    }

    fn ensure_mutable(&self, slot_id: i64) -> Result<()> {
        let slot = self
            .slots
            .iter()
            .find(|s| s.id == slot_id)
            .ok_or_else(|| Error::validation(format!("unknown slot: {}", slot_id)))?;
        if slot.is_booked {
            return Err(Error::SlotBooked);
        }
        Ok(())
    }
}

// ── Tests ──
