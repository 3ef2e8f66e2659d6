use crate::models::Slot;

// ── Time-of-day buckets ──

/// Minute of day where Midday begins (12:00).
const MIDDAY_START_MIN: u32 = 720;
/// Minute of day where Evening begins (15:00).
const EVENING_START_MIN: u32 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimeBucket {
    Morning,
    Midday,
    Evening,
}

impl TimeBucket {
    /// Bucket for a start-of-day minute offset.
    pub fn of_minute(minute: u32) -> TimeBucket {
        if minute < MIDDAY_START_MIN {
            TimeBucket::Morning
        } else if minute < EVENING_START_MIN {
            TimeBucket::Midday
        } else {
            TimeBucket::Evening
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::Morning => "Morning",
            TimeBucket::Midday => "Midday",
            TimeBucket::Evening => "Evening",
        }
    }
}

/// One non-empty bucket of customer-selectable slots.
#[derive(Debug, Clone)]
pub struct BucketedSlots {
    pub bucket: TimeBucket,
    pub slots: Vec<Slot>,
}

// ── Time parsing & display ──

/// Parse `HH:MM` or `HH:MM:SS` into minutes since midnight.
pub fn minute_of_day(time: &str) -> Option<u32> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return None;
    }
    let hour: u32 = parts[0].parse().ok()?;
    let min: u32 = parts[1].parse().ok()?;
    if hour > 23 || min > 59 {
        return None;
    }
    Some(hour * 60 + min)
}

/// Convert 24-hour `HH:MM[:SS]` to 12-hour `H:MM AM/PM` for display.
///
/// Unparseable input is shown as-is rather than dropped.
pub fn format_time_12h(time: &str) -> String {
    let Some(minute) = minute_of_day(time) else {
        return time.to_string();
    };
    let (hour, min) = (minute / 60, minute % 60);
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hour, min, suffix)
}

/// Display label for a slot: a range when it carries an end time.
pub fn slot_label(slot: &Slot) -> String {
    match &slot.end_time {
        Some(end) => format!(
            "{} - {}",
            format_time_12h(&slot.start_time),
            format_time_12h(end)
        ),
        None => format_time_12h(&slot.start_time),
    }
}

// ── Resolver ──

/// True when a slot may be offered to customers.
fn is_selectable(slot: &Slot) -> bool {
    !slot.is_booked && slot.is_active
}

/// Partition fetched slots into time-of-day buckets for display.
///
/// Booked and inactive slots are never included. Every selectable slot lands
/// in exactly one bucket; buckets with no slots are omitted from the result.
/// Slots are ordered by start time within each bucket.
pub fn bucket_slots(slots: Vec<Slot>) -> Vec<BucketedSlots> {
    let mut morning = Vec::new();
    let mut midday = Vec::new();
    let mut evening = Vec::new();

    for slot in slots {
        if !is_selectable(&slot) {
            continue;
        }
        let Some(minute) = minute_of_day(&slot.start_time) else {
            tracing::warn!("slot {} has malformed start_time {:?}", slot.id, slot.start_time);
            continue;
        };
        match TimeBucket::of_minute(minute) {
            TimeBucket::Morning => morning.push(slot),
            TimeBucket::Midday => midday.push(slot),
            TimeBucket::Evening => evening.push(slot),
        }
    }

    let mut buckets = Vec::new();
    for (bucket, mut slots) in [
        (TimeBucket::Morning, morning),
        (TimeBucket::Midday, midday),
        (TimeBucket::Evening, evening),
    ] {
        if slots.is_empty() {
            continue;
        }
        slots.sort_by_key(|s| minute_of_day(&s.start_time).unwrap_or(0));
        buckets.push(BucketedSlots { bucket, slots });
    }
    buckets
}

// ── Tests ──
