//! Trailing 60-month window over the loss register

use crate::register::LossEvent;
use chrono::{Months, NaiveDate};

/// Length of the observation window in calendar months
pub const WINDOW_MONTHS: u32 = 60;

/// Inclusive date range of the observation window
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    /// Window ending at `end` and reaching back `WINDOW_MONTHS` calendar months.
    /// Day-of-month clamps to the end of a shorter month (Feb 29 -> Feb 28).
    pub fn ending_at(end: NaiveDate) -> Self {
        let start = end
            .checked_sub_months(Months::new(WINDOW_MONTHS))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Window ending at the latest registration date, `None` for an empty register
    pub fn for_register(events: &[LossEvent]) -> Option<Self> {
        events
            .iter()
            .map(|e| e.registration_date)
            .max()
            .map(Self::ending_at)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Rows of the register that fall inside its own trailing window
pub fn filter_window(events: &[LossEvent]) -> (Option<Window>, Vec<LossEvent>) {
    let Some(window) = Window::for_register(events) else {
        return (None, Vec::new());
    };

    let kept = events
        .iter()
        .filter(|e| window.contains(e.registration_date))
        .cloned()
        .collect();

    (Some(window), kept)
}
