//! Week window resolution.
//!
//! The kiosk works Monday to Saturday. Every view is anchored on the window that
//! contains a reference date: Monday 00:00:00 through Saturday 23:59:59. Sunday
//! is numbered as the seventh day, so a Sunday resolves to the Monday six days
//! before it and lies just past that window's Saturday.

use chrono::{Datelike, Days, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Number of kiosk days in a window (Monday..=Saturday).
pub const KIOSK_DAYS: usize = 6;

/// Textual date format used in URLs and forms.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

const MONTHS_UPPER: [&str; 12] = [
    "ENERO",
    "FEBRERO",
    "MARZO",
    "ABRIL",
    "MAYO",
    "JUNIO",
    "JULIO",
    "AGOSTO",
    "SEPTIEMBRE",
    "OCTUBRE",
    "NOVIEMBRE",
    "DICIEMBRE",
];

/// The Monday–Saturday span containing a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekWindow {
    monday: NaiveDate,
}

impl WeekWindow {
    /// Resolves the window containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        // Monday = 1 .. Sunday = 7
        let offset = u64::from(date.weekday().number_from_monday() - 1);
        Self {
            monday: date - Days::new(offset),
        }
    }

    /// Window containing today's local date.
    #[must_use]
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    /// First day of the window.
    #[must_use]
    pub const fn monday(&self) -> NaiveDate {
        self.monday
    }

    /// Last day of the window.
    #[must_use]
    pub fn saturday(&self) -> NaiveDate {
        self.monday + Days::new(5)
    }

    /// Monday at 00:00:00.
    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        self.monday.and_time(NaiveTime::default())
    }

    /// Saturday at 23:59:59.
    #[must_use]
    pub fn end(&self) -> NaiveDateTime {
        self.saturday().and_time(NaiveTime::default()) + Duration::seconds(86_399)
    }

    /// The six kiosk days, Monday first.
    #[must_use]
    pub fn days(&self) -> [NaiveDate; KIOSK_DAYS] {
        let mut days = [self.monday; KIOSK_DAYS];
        for (offset, day) in (0_u64..).zip(days.iter_mut()) {
            *day = self.monday + Days::new(offset);
        }
        days
    }

    /// Whether `date` is one of the six kiosk days of this window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.monday && date <= self.saturday()
    }

    /// The window one week earlier.
    #[must_use]
    pub fn previous(&self) -> Self {
        Self {
            monday: self.monday - Days::new(7),
        }
    }

    /// The window one week later.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            monday: self.monday + Days::new(7),
        }
    }
}

/// Parses a `YYYY-MM-DD` date. Anything else (including unpadded fields) is rejected.
#[must_use]
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let well_formed = raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT).ok()
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

fn month_upper(date: NaiveDate) -> &'static str {
    MONTHS_UPPER[date.month0() as usize]
}

/// Heading for a window, e.g. `"6 AL 11 DE ENERO"` or
/// `"27 DE ENERO AL 1 DE FEBRERO"` when the window spans two months.
#[must_use]
pub fn week_label(window: &WeekWindow) -> String {
    let start = window.monday();
    let end = window.saturday();

    if start.month() == end.month() {
        format!("{} AL {} DE {}", start.day(), end.day(), month_upper(start))
    } else {
        format!(
            "{} DE {} AL {} DE {}",
            start.day(),
            month_upper(start),
            end.day(),
            month_upper(end)
        )
    }
}
