//! Table-driven conversion between Gregorian and Bikram Sambat dates.
//!
//! The Bikram Sambat calendar is lunisolar: month lengths vary from year to
//! year and follow no closed formula, so the conversion is driven by a table
//! of month lengths covering BS years 2000 through 2090 (roughly AD 1943 to
//! AD 2034). Dates outside that range return [Error::DateOutOfRange].

use time::{Date, macros::date};

use crate::Error;

/// A date in the Bikram Sambat calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsDate {
    /// The BS year, e.g. 2081.
    pub year: i32,
    /// 1-based month number, Baisakh is 1 and Chaitra is 12.
    pub month: u8,
    /// 1-based day of the month.
    pub day: u8,
}

/// The first day covered by the conversion table: 1 Baisakh 2000 BS.
const BS_EPOCH_AD: Date = date!(1943 - 04 - 14);

/// The first BS year covered by [BS_MONTH_DAYS].
const BS_EPOCH_YEAR: i32 = 2000;

/// Days in each BS month for the years 2000 through 2090.
///
/// Row `i` holds the month lengths for BS year `2000 + i`, Baisakh first.
const BS_MONTH_DAYS: [[u8; 12]; 91] = [
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 29, 31],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31],
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31],
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 31, 32, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [30, 32, 31, 32, 31, 31, 29, 30, 30, 29, 29, 31],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31],
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 31, 32, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [30, 32, 31, 32, 31, 31, 29, 30, 29, 30, 29, 31],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 29, 31],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31],
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31],
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30],
    [31, 31, 32, 32, 31, 30, 30, 30, 29, 30, 30, 30],
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 30, 30],
    [31, 31, 32, 31, 31, 30, 30, 30, 29, 30, 30, 30],
    [31, 31, 32, 31, 31, 30, 30, 30, 29, 30, 30, 30],
    [31, 32, 31, 32, 30, 31, 30, 30, 29, 30, 30, 30],
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 30, 30],
    [31, 31, 32, 31, 31, 31, 30, 30, 29, 30, 30, 30],
    [30, 31, 32, 32, 30, 31, 30, 30, 29, 30, 30, 30],
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 30, 30],
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 30, 30],
];

fn month_days(year: i32) -> Option<&'static [u8; 12]> {
    let index = usize::try_from(year - BS_EPOCH_YEAR).ok()?;
    BS_MONTH_DAYS.get(index)
}

/// The number of days in the given BS month.
///
/// # Errors
/// Returns [Error::DateOutOfRange] if the year is outside the table or the
/// month is not in 1..=12.
pub fn days_in_bs_month(year: i32, month: u8) -> Result<u8, Error> {
    if !(1..=12).contains(&month) {
        return Err(Error::DateOutOfRange(BS_EPOCH_AD));
    }

    month_days(year)
        .map(|days| days[(month - 1) as usize])
        .ok_or(Error::DateOutOfRange(BS_EPOCH_AD))
}

/// Convert a Gregorian date to its Bikram Sambat equivalent.
///
/// # Errors
/// Returns [Error::DateOutOfRange] if `date` falls before 1 Baisakh 2000 BS
/// or after the last day covered by the conversion table.
pub fn gregorian_to_bs(date: Date) -> Result<BsDate, Error> {
    let mut remaining = (date - BS_EPOCH_AD).whole_days();

    if remaining < 0 {
        return Err(Error::DateOutOfRange(date));
    }

    for (index, months) in BS_MONTH_DAYS.iter().enumerate() {
        for (month_index, &days) in months.iter().enumerate() {
            if remaining < i64::from(days) {
                return Ok(BsDate {
                    year: BS_EPOCH_YEAR + index as i32,
                    month: month_index as u8 + 1,
                    day: remaining as u8 + 1,
                });
            }

            remaining -= i64::from(days);
        }
    }

    Err(Error::DateOutOfRange(date))
}

/// Convert a Bikram Sambat date back to its Gregorian equivalent.
///
/// # Errors
/// Returns [Error::DateOutOfRange] if the year is outside the conversion
/// table or the month/day do not exist in that year.
pub fn bs_to_gregorian(bs: BsDate) -> Result<Date, Error> {
    let days_in_month = days_in_bs_month(bs.year, bs.month)?;

    if bs.day == 0 || bs.day > days_in_month {
        return Err(Error::DateOutOfRange(BS_EPOCH_AD));
    }

    let mut offset: i64 = 0;

    for year in BS_EPOCH_YEAR..bs.year {
        let months = month_days(year).ok_or(Error::DateOutOfRange(BS_EPOCH_AD))?;
        offset += months.iter().map(|&days| i64::from(days)).sum::<i64>();
    }

    let months = month_days(bs.year).ok_or(Error::DateOutOfRange(BS_EPOCH_AD))?;
    offset += months[..(bs.month - 1) as usize]
        .iter()
        .map(|&days| i64::from(days))
        .sum::<i64>();
    offset += i64::from(bs.day) - 1;

    BS_EPOCH_AD
        .checked_add(time::Duration::days(offset))
        .ok_or(Error::DateOutOfRange(BS_EPOCH_AD))
}

/// The Gregorian date bounds (inclusive) of the given BS month.
///
/// # Errors
/// Returns [Error::DateOutOfRange] if the month is outside the conversion
/// table.
pub fn bs_month_bounds(year: i32, month: u8) -> Result<(Date, Date), Error> {
    let days_in_month = days_in_bs_month(year, month)?;

    let start = bs_to_gregorian(BsDate {
        year,
        month,
        day: 1,
    })?;
    let end = bs_to_gregorian(BsDate {
        year,
        month,
        day: days_in_month,
    })?;

    Ok((start, end))
}
