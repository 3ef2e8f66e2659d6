use chrono::{Datelike, NaiveDate};

// ── Date helpers ──

/// Canonical date key, timezone-naive local calendar date.
pub fn to_ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a canonical `YYYY-MM-DD` key.
pub fn parse_ymd(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Shift a date by `n` days (negative shifts backward).
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    date + chrono::Duration::days(n)
}

/// Number of days in the month containing `date`.
fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

// ── Navigator ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarView {
    Week,
    Month,
}

/// Pure date-arithmetic model behind the date-picking step.
///
/// Week view is a rolling 7-day window anchored at `week_start`; Month view
/// is a Sunday-first grid with leading blanks. Both share one selected date.
/// Dates strictly before `today` are rejected by `select`, not merely styled
/// out.
#[derive(Debug, Clone)]
pub struct CalendarNavigator {
    today: NaiveDate,
    view: CalendarView,
    week_start: NaiveDate,
    month_anchor: NaiveDate,
    selected: Option<NaiveDate>,
}

impl CalendarNavigator {
    /// Build a navigator with an explicit "today" (no ambient clock reads).
    pub fn new(today: NaiveDate) -> Self {
        let month_anchor =
            NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
        Self {
            today,
            view: CalendarView::Week,
            week_start: today,
            month_anchor,
            selected: None,
        }
    }

    /// Convenience constructor anchored at the local calendar date.
    pub fn starting_today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn view(&self) -> CalendarView {
        self.view
    }

    pub fn set_view(&mut self, view: CalendarView) {
        self.view = view;
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    /// Selected date as the canonical availability-query key.
    pub fn selected_key(&self) -> Option<String> {
        self.selected.map(to_ymd)
    }

    /// The 7 days of the current week window.
    pub fn week_days(&self) -> [NaiveDate; 7] {
        let mut days = [self.week_start; 7];
        for (i, day) in days.iter_mut().enumerate() {
            *day = add_days(self.week_start, i as i64);
        }
        days
    }

    pub fn prev_week(&mut self) {
        self.week_start = add_days(self.week_start, -7);
    }

    pub fn next_week(&mut self) {
        self.week_start = add_days(self.week_start, 7);
    }

    /// First day of the month the Month view is anchored to.
    pub fn month_anchor(&self) -> NaiveDate {
        self.month_anchor
    }

    pub fn prev_month(&mut self) {
        if let Some(anchor) = self.month_anchor.checked_sub_months(chrono::Months::new(1)) {
            self.month_anchor = anchor;
        }
    }

    pub fn next_month(&mut self) {
        if let Some(anchor) = self.month_anchor.checked_add_months(chrono::Months::new(1)) {
            self.month_anchor = anchor;
        }
    }

    /// Month grid cells, Sunday-first: `None` for the leading blanks of the
    /// first week, then one `Some(date)` per day of the anchored month.
    pub fn month_grid(&self) -> Vec<Option<NaiveDate>> {
        let offset = self.month_anchor.weekday().num_days_from_sunday() as usize;
        let days = days_in_month(self.month_anchor);

        let mut cells: Vec<Option<NaiveDate>> = Vec::with_capacity(offset + days as usize);
        cells.resize(offset, None);
        for day in 1..=days {
            cells.push(NaiveDate::from_ymd_opt(
                self.month_anchor.year(),
                self.month_anchor.month(),
                day,
            ));
        }
        cells
    }

    /// True when `date` may be selected (today or later).
    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        date >= self.today
    }

    /// Select a date. Past dates are rejected with no state change.
    ///
    /// Selecting in Month view re-anchors the week window to the chosen date
    /// and switches the active view to Week.
    pub fn select(&mut self, date: NaiveDate) -> bool {
        if !self.is_selectable(date) {
            return false;
        }
        self.selected = Some(date);
        if self.view == CalendarView::Month {
            self.week_start = date;
            self.view = CalendarView::Week;
        }
        true
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // ── to_ymd / parse_ymd / add_days ──

    #[test]
    fn test_ymd_format() {
        assert_eq!(to_ymd(d(2026, 3, 5)), "2026-03-05");
    }

    #[test]
    fn test_parse_ymd_valid() {
        assert_eq!(parse_ymd("2026-03-05"), Some(d(2026, 3, 5)));
    }

    #[test]
    fn test_parse_ymd_garbage() {
        assert_eq!(parse_ymd("not-a-date"), None);
    }

    #[test]
    fn test_add_days_within_month() {
        assert_eq!(add_days(d(2026, 3, 5), 3), d(2026, 3, 8));
    }

    #[test]
    fn test_add_days_month_boundary() {
        assert_eq!(to_ymd(add_days(d(2026, 1, 31), 1)), "2026-02-01");
    }

    #[test]
    fn test_add_days_year_boundary() {
        assert_eq!(to_ymd(add_days(d(2026, 12, 31), 1)), "2027-01-01");
    }

    #[test]
    fn test_add_days_leap_february() {
        assert_eq!(to_ymd(add_days(d(2024, 2, 28), 1)), "2024-02-29");
        assert_eq!(to_ymd(add_days(d(2024, 2, 29), 1)), "2024-03-01");
    }

    #[test]
    fn test_add_days_negative() {
        assert_eq!(add_days(d(2026, 3, 1), -1), d(2026, 2, 28));
    }

    #[test]
    fn test_ymd_round_trip_across_boundaries() {
        let start = d(2026, 1, 28);
        for n in -40..=400 {
            let shifted = add_days(start, n);
            assert_eq!(parse_ymd(&to_ymd(shifted)), Some(shifted));
        }
    }

    // ── week view ──

    #[test]
    fn test_week_window_starts_today() {
        let nav = CalendarNavigator::new(d(2026, 3, 5));
        let days = nav.week_days();
        assert_eq!(days[0], d(2026, 3, 5));
        assert_eq!(days[6], d(2026, 3, 11));
    }

    #[test]
    fn test_next_week_shifts_forward() {
        let mut nav = CalendarNavigator::new(d(2026, 3, 5));
        nav.next_week();
        assert_eq!(nav.week_days()[0], d(2026, 3, 12));
    }

    #[test]
    fn test_prev_week_shifts_back() {
        let mut nav = CalendarNavigator::new(d(2026, 3, 5));
        nav.next_week();
        nav.prev_week();
        assert_eq!(nav.week_days()[0], d(2026, 3, 5));
    }

    #[test]
    fn test_week_window_crosses_month() {
        let nav = CalendarNavigator::new(d(2026, 3, 29));
        let days = nav.week_days();
        assert_eq!(days[2], d(2026, 3, 31));
        assert_eq!(days[3], d(2026, 4, 1));
    }

    // ── month view ──

    #[test]
    fn test_month_grid_no_offset() {
        // 2026-03-01 is a Sunday: zero leading blanks.
        let mut nav = CalendarNavigator::new(d(2026, 3, 5));
        nav.set_view(CalendarView::Month);
        let grid = nav.month_grid();
        assert_eq!(grid.len(), 31);
        assert_eq!(grid[0], Some(d(2026, 3, 1)));
    }

    #[test]
    fn test_month_grid_leading_blanks() {
        // 2026-08-01 is a Saturday: six leading blanks.
        let nav = CalendarNavigator::new(d(2026, 8, 10));
        let grid = nav.month_grid();
        assert_eq!(grid.len(), 6 + 31);
        assert!(grid[..6].iter().all(|c| c.is_none()));
        assert_eq!(grid[6], Some(d(2026, 8, 1)));
    }

    #[test]
    fn test_next_month_shifts_anchor() {
        let mut nav = CalendarNavigator::new(d(2026, 3, 5));
        nav.next_month();
        assert_eq!(nav.month_anchor(), d(2026, 4, 1));
    }

    #[test]
    fn test_prev_month_across_year() {
        let mut nav = CalendarNavigator::new(d(2026, 1, 15));
        nav.prev_month();
        assert_eq!(nav.month_anchor(), d(2025, 12, 1));
    }

    #[test]
    fn test_month_grid_february_leap() {
        let mut nav = CalendarNavigator::new(d(2024, 2, 10));
        nav.set_view(CalendarView::Month);
        let filled = nav.month_grid().iter().filter(|c| c.is_some()).count();
        assert_eq!(filled, 29);
    }

    // ── selection ──

    #[test]
    fn test_select_past_date_rejected() {
        let mut nav = CalendarNavigator::new(d(2026, 3, 5));
        assert!(!nav.select(d(2026, 3, 4)));
        assert_eq!(nav.selected(), None);
    }

    #[test]
    fn test_select_today_allowed() {
        let mut nav = CalendarNavigator::new(d(2026, 3, 5));
        assert!(nav.select(d(2026, 3, 5)));
        assert_eq!(nav.selected_key().as_deref(), Some("2026-03-05"));
    }

    #[test]
    fn test_select_future_allowed() {
        let mut nav = CalendarNavigator::new(d(2026, 3, 5));
        assert!(nav.select(d(2026, 4, 1)));
        assert_eq!(nav.selected(), Some(d(2026, 4, 1)));
    }

    #[test]
    fn test_select_past_keeps_previous_selection() {
        let mut nav = CalendarNavigator::new(d(2026, 3, 5));
        nav.select(d(2026, 3, 6));
        assert!(!nav.select(d(2026, 3, 1)));
        assert_eq!(nav.selected(), Some(d(2026, 3, 6)));
    }

    #[test]
    fn test_month_selection_reanchors_week_and_switches_view() {
        let mut nav = CalendarNavigator::new(d(2026, 3, 5));
        nav.set_view(CalendarView::Month);
        nav.next_month();
        assert!(nav.select(d(2026, 4, 15)));
        assert_eq!(nav.view(), CalendarView::Week);
        assert_eq!(nav.week_days()[0], d(2026, 4, 15));
    }

    #[test]
    fn test_week_selection_keeps_view() {
        let mut nav = CalendarNavigator::new(d(2026, 3, 5));
        assert!(nav.select(d(2026, 3, 7)));
        assert_eq!(nav.view(), CalendarView::Week);
        assert_eq!(nav.week_days()[0], d(2026, 3, 5));
    }

    #[test]
    fn test_is_selectable_boundary() {
        let nav = CalendarNavigator::new(d(2026, 3, 5));
        assert!(!nav.is_selectable(d(2026, 3, 4)));
        assert!(nav.is_selectable(d(2026, 3, 5)));
        assert!(nav.is_selectable(d(2026, 3, 6)));
    }
}
