//! Day-state filter for the weekly ledger.
//!
//! The operator can switch off individual kiosk days (holidays, school events).
//! The set of disabled dates travels in the `dias_off` query parameter as a
//! comma-separated list and is echoed back in every link of the view.

use crate::{
    core::week::{WeekWindow, format_iso_date, parse_iso_date},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// A kiosk day together with whether it is currently enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayState {
    /// The calendar day
    pub date: NaiveDate,
    /// `false` when the day has been switched off
    pub enabled: bool,
}

/// Set of dates switched off by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisabledDays {
    dates: BTreeSet<NaiveDate>,
}

impl DisabledDays {
    /// Parses a comma-separated list such as `"2025-01-07,2025-01-09"`.
    ///
    /// Whitespace around items is ignored, as are empty items. Any item that is
    /// not a `YYYY-MM-DD` date makes the whole value invalid.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut dates = BTreeSet::new();
        for item in raw.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let date = parse_iso_date(item).ok_or_else(|| Error::invalid_input("dias_off", item))?;
            dates.insert(date);
        }
        Ok(Self { dates })
    }

    /// Whether `date` is switched off.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// No day is switched off.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Copy with `date` flipped: removed if present, added otherwise.
    #[must_use]
    pub fn toggled(&self, date: NaiveDate) -> Self {
        let mut dates = self.dates.clone();
        if !dates.remove(&date) {
            dates.insert(date);
        }
        Self { dates }
    }

    /// Value for the `dias_off` query parameter, in date order.
    #[must_use]
    pub fn to_param(&self) -> String {
        self.dates
            .iter()
            .map(|date| format_iso_date(*date))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Marks each of the six kiosk days of `window` as enabled or disabled.
#[must_use]
pub fn day_states(window: &WeekWindow, disabled: &DisabledDays) -> Vec<DayState> {
    window
        .days()
        .into_iter()
        .map(|date| DayState {
            date,
            enabled: !disabled.contains(date),
        })
        .collect()
}

/// Only the enabled days, in order. These are the columns the ledger grid shows.
#[must_use]
pub fn enabled_days(states: &[DayState]) -> Vec<NaiveDate> {
    states
        .iter()
        .filter(|state| state.enabled)
        .map(|state| state.date)
        .collect()
}
