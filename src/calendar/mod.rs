//! Calendar systems for filtering and month-bucketing transactions.
//!
//! Every transaction date is stored as a Gregorian date. Views can display
//! and bucket those dates under either the Gregorian (AD) calendar or the
//! Bikram Sambat (BS) calendar. The calendar is selected per request, and
//! all aggregation code goes through [month_key] and [month_window] so the
//! two systems stay interchangeable.

mod bikram;

pub use bikram::{BsDate, bs_month_bounds, bs_to_gregorian, gregorian_to_bs};

use serde::Deserialize;
use time::{Date, Month};

/// The calendar system used to filter and bucket transaction dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum CalendarMode {
    /// The Gregorian calendar, labelled "AD" in the UI.
    #[default]
    #[serde(rename = "ad")]
    Gregorian,
    /// The Bikram Sambat calendar, labelled "BS" in the UI.
    #[serde(rename = "bs")]
    BikramSambat,
}

impl CalendarMode {
    /// The value used for the `calendar` query parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Gregorian => "ad",
            Self::BikramSambat => "bs",
        }
    }

    /// The short label shown on the calendar toggle buttons.
    pub fn label(self) -> &'static str {
        match self {
            Self::Gregorian => "AD",
            Self::BikramSambat => "BS",
        }
    }
}

/// Query parameters shared by the pages that offer an AD/BS toggle.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    /// The calendar system to display dates in.
    #[serde(default)]
    pub calendar: CalendarMode,
}

/// A year and month under some calendar system.
///
/// Keys are only comparable within one calendar mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based month number.
    pub month: u8,
}

/// Map a stored Gregorian date to its month key under `mode`.
///
/// Returns `None` when the date cannot be represented in the target
/// calendar (outside the BS conversion table); callers treat such records
/// the same as records with unparseable dates and exclude them.
pub fn month_key(mode: CalendarMode, date: Date) -> Option<MonthKey> {
    match mode {
        CalendarMode::Gregorian => Some(MonthKey {
            year: date.year(),
            month: u8::from(date.month()),
        }),
        CalendarMode::BikramSambat => gregorian_to_bs(date).ok().map(|bs| MonthKey {
            year: bs.year,
            month: bs.month,
        }),
    }
}

/// The Gregorian date bounds (inclusive) of the month containing `today`
/// under `mode`.
///
/// When `today` falls outside the BS conversion table the Gregorian bounds
/// are used instead so that views degrade rather than fail.
pub fn month_window(mode: CalendarMode, today: Date) -> (Date, Date) {
    match mode {
        CalendarMode::Gregorian => gregorian_month_bounds(today.year(), today.month()),
        CalendarMode::BikramSambat => gregorian_to_bs(today)
            .ok()
            .and_then(|bs| bs_month_bounds(bs.year, bs.month).ok())
            .unwrap_or_else(|| gregorian_month_bounds(today.year(), today.month())),
    }
}

/// The month key immediately before `key`.
pub fn previous_month_key(key: MonthKey) -> MonthKey {
    if key.month == 1 {
        MonthKey {
            year: key.year - 1,
            month: 12,
        }
    } else {
        MonthKey {
            year: key.year,
            month: key.month - 1,
        }
    }
}

/// The `n` month keys ending at the month containing `today` under `mode`,
/// in chronological order.
pub fn trailing_month_keys(mode: CalendarMode, today: Date, n: usize) -> Vec<MonthKey> {
    let current = match month_key(mode, today) {
        Some(key) => key,
        // Fall back to the Gregorian key so the trend always has buckets.
        None => MonthKey {
            year: today.year(),
            month: u8::from(today.month()),
        },
    };

    let mut keys = Vec::with_capacity(n);
    let mut key = current;
    for _ in 0..n {
        keys.push(key);
        key = previous_month_key(key);
    }
    keys.reverse();

    keys
}

const BS_MONTH_NAMES: [&str; 12] = [
    "Baisakh", "Jestha", "Ashadh", "Shrawan", "Bhadra", "Ashwin", "Kartik", "Mangsir", "Poush",
    "Magh", "Falgun", "Chaitra",
];

const AD_MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A short display label for a month key, e.g. "Jan" or "Magh".
pub fn month_label(mode: CalendarMode, key: MonthKey) -> String {
    let names = match mode {
        CalendarMode::Gregorian => &AD_MONTH_NAMES,
        CalendarMode::BikramSambat => &BS_MONTH_NAMES,
    };

    names[(key.month - 1) as usize].to_string()
}

/// A display label naming the month and year, e.g. "January 2025 AD" or
/// "Magh 2081 BS".
pub fn month_year_label(mode: CalendarMode, key: MonthKey) -> String {
    match mode {
        CalendarMode::Gregorian => {
            const FULL_NAMES: [&str; 12] = [
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ];
            format!("{} {} AD", FULL_NAMES[(key.month - 1) as usize], key.year)
        }
        CalendarMode::BikramSambat => {
            format!("{} {} BS", BS_MONTH_NAMES[(key.month - 1) as usize], key.year)
        }
    }
}

/// Format a stored Gregorian date for display under `mode`, e.g.
/// "5 Jan 2025" or "21 Poush 2081".
///
/// Dates outside the BS conversion table fall back to the Gregorian form.
pub fn format_date(mode: CalendarMode, date: Date) -> String {
    match mode {
        CalendarMode::Gregorian => format!(
            "{} {} {}",
            date.day(),
            AD_MONTH_NAMES[u8::from(date.month()) as usize - 1],
            date.year()
        ),
        CalendarMode::BikramSambat => match gregorian_to_bs(date) {
            Ok(bs) => format!(
                "{} {} {}",
                bs.day,
                BS_MONTH_NAMES[(bs.month - 1) as usize],
                bs.year
            ),
            Err(_) => format_date(CalendarMode::Gregorian, date),
        },
    }
}

fn gregorian_month_bounds(year: i32, month: Month) -> (Date, Date) {
    let start = Date::from_calendar_date(year, month, 1).expect("invalid month start date");
    let end = Date::from_calendar_date(year, month, last_day_of_month(year, month))
        .expect("invalid month end date");

    (start, end)
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
