//! Read-side rollups: month calendars, report summaries, and rates.
//!
//! Everything here works on already-loaded rows; the database layer decides
//! which reservations are in scope.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::booking::{ReservationStatus, StayRange};
use crate::error::CoreError;
use crate::types::Money;

const MIN_YEAR: i32 = 1970;
const MAX_YEAR: i32 = 9999;

/// First day of the month and first day of the following month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), CoreError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(CoreError::Validation(format!("Invalid year {year}")));
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CoreError::Validation(format!("Invalid month {month}")))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| CoreError::Validation(format!("Invalid month {month}")))?;
    Ok((start, next))
}

/// First day of the month containing `day`.
pub fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// [`month_bounds`] for the month containing `day`.
pub fn month_containing(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = month_start(day);
    let next = start
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    (start, next)
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Activity on one calendar day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay<T> {
    pub check_ins: Vec<T>,
    pub check_outs: Vec<T>,
    pub current_guests: Vec<T>,
}

impl<T> Default for CalendarDay<T> {
    fn default() -> Self {
        Self {
            check_ins: Vec::new(),
            check_outs: Vec::new(),
            current_guests: Vec::new(),
        }
    }
}

/// Calendar keyed by `YYYY-MM-DD`, one entry for every day of the month.
pub type MonthCalendar<T> = BTreeMap<String, CalendarDay<T>>;

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Bucket stays into the days of a month.
///
/// A stay appears under `checkIns` on its check-in day, under `checkOuts` on
/// its check-out day, and under `currentGuests` on every night it occupies.
/// Days outside the month are ignored, as are items without a valid stay.
pub fn build_calendar<T, F>(
    year: i32,
    month: u32,
    items: &[T],
    stay_of: F,
) -> Result<MonthCalendar<T>, CoreError>
where
    T: Clone,
    F: Fn(&T) -> Option<StayRange>,
{
    let (start, next) = month_bounds(year, month)?;

    let mut calendar: MonthCalendar<T> = start
        .iter_days()
        .take_while(|d| *d < next)
        .map(|d| (day_key(d), CalendarDay::default()))
        .collect();

    for item in items {
        let Some(stay) = stay_of(item) else {
            continue;
        };

        if let Some(day) = calendar.get_mut(&day_key(stay.check_in())) {
            day.check_ins.push(item.clone());
        }
        if let Some(day) = calendar.get_mut(&day_key(stay.check_out())) {
            day.check_outs.push(item.clone());
        }

        let first = stay.check_in().max(start);
        for night in first
            .iter_days()
            .take_while(|d| *d < next && stay.occupies(*d))
        {
            if let Some(day) = calendar.get_mut(&day_key(night)) {
                day.current_guests.push(item.clone());
            }
        }
    }

    Ok(calendar)
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// The figures of one reservation that feed a report summary.
#[derive(Debug, Clone, Copy)]
pub struct StayFigures {
    pub status: ReservationStatus,
    pub nights: i64,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSummary {
    pub total_reservations: i64,
    pub total_revenue: Money,
    pub average_stay: f64,
    pub status_breakdown: BTreeMap<String, i64>,
}

/// Summarize a filtered reservation set. Revenue sums every row in the set;
/// the caller filters by status when that matters.
pub fn summarize<I>(rows: I) -> ReservationSummary
where
    I: IntoIterator<Item = StayFigures>,
{
    let mut count = 0_i64;
    let mut nights = 0_i64;
    let mut revenue = Decimal::ZERO;
    let mut breakdown: BTreeMap<String, i64> = BTreeMap::new();

    for row in rows {
        count += 1;
        nights += row.nights;
        revenue += row.total;
        *breakdown.entry(row.status.as_str().to_string()).or_default() += 1;
    }

    let average_stay = if count > 0 {
        round1(nights as f64 / count as f64)
    } else {
        0.0
    };

    ReservationSummary {
        total_reservations: count,
        total_revenue: revenue.round_dp(2),
        average_stay,
        status_breakdown: breakdown,
    }
}

/// `part / whole * 100`, one decimal place. Zero when `whole` is zero.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    round1(part as f64 / whole as f64 * 100.0)
}

/// Mean value per reservation rounded to cents. Zero for an empty set.
pub fn average_value(total: Money, count: i64) -> Money {
    if count <= 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(count)).round_dp(2)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::str::FromStr;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Booking {
        id: i64,
        stay: StayRange,
    }

    fn booking(id: i64, a: &str, b: &str) -> Booking {
        Booking {
            id,
            stay: StayRange::new(d(a), d(b)).unwrap(),
        }
    }

    fn ids(items: &[Booking]) -> Vec<i64> {
        items.iter().map(|b| b.id).collect()
    }

    #[test]
    fn month_bounds_rejects_bad_input() {
        assert_matches!(month_bounds(2027, 0), Err(CoreError::Validation(_)));
        assert_matches!(month_bounds(2027, 13), Err(CoreError::Validation(_)));
        assert_matches!(month_bounds(10_000, 1), Err(CoreError::Validation(_)));
        assert_eq!(month_bounds(2027, 12).unwrap(), (d("2027-12-01"), d("2028-01-01")));
    }

    #[test]
    fn month_containing_matches_month_bounds() {
        assert_eq!(month_containing(d("2027-12-15")), month_bounds(2027, 12).unwrap());
        assert_eq!(month_containing(d("2028-02-29")), (d("2028-02-01"), d("2028-03-01")));
    }

    #[test]
    fn calendar_has_one_entry_per_day() {
        let cal = build_calendar::<Booking, _>(2028, 2, &[], |b| Some(b.stay)).unwrap();
        assert_eq!(cal.len(), 29);
        assert!(cal.contains_key("2028-02-29"));
    }

    #[test]
    fn calendar_places_check_ins_outs_and_nights() {
        let items = vec![booking(1, "2027-01-10", "2027-01-12")];
        let cal = build_calendar(2027, 1, &items, |b| Some(b.stay)).unwrap();

        assert_eq!(ids(&cal["2027-01-10"].check_ins), vec![1]);
        assert_eq!(ids(&cal["2027-01-12"].check_outs), vec![1]);
        assert_eq!(ids(&cal["2027-01-10"].current_guests), vec![1]);
        assert_eq!(ids(&cal["2027-01-11"].current_guests), vec![1]);
        assert!(cal["2027-01-12"].current_guests.is_empty());
    }

    #[test]
    fn calendar_clips_stays_spanning_months() {
        let items = vec![booking(7, "2027-01-30", "2027-02-03")];
        let cal = build_calendar(2027, 2, &items, |b| Some(b.stay)).unwrap();

        assert!(cal.values().all(|day| day.check_ins.is_empty()));
        assert_eq!(ids(&cal["2027-02-03"].check_outs), vec![7]);
        let occupied: Vec<_> = cal
            .iter()
            .filter(|(_, day)| !day.current_guests.is_empty())
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(occupied, vec!["2027-02-01", "2027-02-02"]);
    }

    #[test]
    fn summary_averages_stay_to_one_decimal() {
        let rows = vec![
            StayFigures {
                status: ReservationStatus::Confirmed,
                nights: 3,
                total: Decimal::from_str("447.00").unwrap(),
            },
            StayFigures {
                status: ReservationStatus::Confirmed,
                nights: 2,
                total: Decimal::from_str("398.00").unwrap(),
            },
            StayFigures {
                status: ReservationStatus::Cancelled,
                nights: 2,
                total: Decimal::from_str("498.00").unwrap(),
            },
        ];
        let summary = summarize(rows);

        assert_eq!(summary.total_reservations, 3);
        assert_eq!(summary.total_revenue, Decimal::from_str("1343.00").unwrap());
        assert_eq!(summary.average_stay, 2.3);
        assert_eq!(summary.status_breakdown["CONFIRMED"], 2);
        assert_eq!(summary.status_breakdown["CANCELLED"], 1);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let summary = summarize(Vec::new());
        assert_eq!(summary.total_reservations, 0);
        assert_eq!(summary.average_stay, 0.0);
        assert!(summary.status_breakdown.is_empty());
    }

    #[test]
    fn percentage_rounds_and_guards_zero() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn average_value_rounds_to_cents() {
        let total = Decimal::from_str("1000.00").unwrap();
        assert_eq!(average_value(total, 3), Decimal::from_str("333.33").unwrap());
        assert_eq!(average_value(total, 0), Decimal::ZERO);
    }
}
