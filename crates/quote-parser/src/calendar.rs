use chrono::{Datelike, NaiveDate, Weekday};

/// Calendar rules for quote dates: validity, year clamping, year inference
/// for month/day-only dates, and weekend detection
pub struct QuoteCalendar;

/// Years an explicit date may drift from the current year before clamping
const YEAR_CLAMP: i32 = 3;

/// Farthest a month/day-only date may be from today to be considered
const MAX_INFERENCE_DISTANCE_DAYS: i64 = 366;

impl QuoteCalendar {
    pub fn is_leap_year(year: i32) -> bool {
        (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
    }

    /// Number of days in a month, 0 for an invalid month
    pub fn days_in_month(year: i32, month: u32) -> u32 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    /// Build a date only if it exists on the calendar
    pub fn valid_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        if day == 0 || day > Self::days_in_month(year, month) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Keep a written year within three years of the current one
    pub fn clamp_year(year: i32, today: NaiveDate) -> i32 {
        year.clamp(today.year() - YEAR_CLAMP, today.year() + YEAR_CLAMP)
    }

    /// Pick the year for a date written without one.
    ///
    /// Candidates are this year and next year. Those more than 366 days from
    /// today are dropped (unless that drops all of them); among the rest the
    /// earliest date on or after today wins, otherwise the closest one.
    /// Returns None when the month/day is invalid in both years.
    pub fn infer_year(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
        let candidates: Vec<NaiveDate> = [today.year(), today.year() + 1]
            .into_iter()
            .filter_map(|year| Self::valid_date(year, month, day))
            .collect();

        let near: Vec<NaiveDate> = candidates
            .iter()
            .copied()
            .filter(|date| (*date - today).num_days().abs() <= MAX_INFERENCE_DISTANCE_DAYS)
            .collect();

        if near.is_empty() {
            Self::closest_future_first(&candidates, today)
        } else {
            Self::closest_future_first(&near, today)
        }
    }

    fn closest_future_first(candidates: &[NaiveDate], today: NaiveDate) -> Option<NaiveDate> {
        candidates
            .iter()
            .filter(|date| **date >= today)
            .min()
            .or_else(|| {
                candidates
                    .iter()
                    .min_by_key(|date| (**date - today).num_days().abs())
            })
            .copied()
    }

    /// "Sat" / "Sun" for weekend dates; weekday dates carry no day label
    pub fn weekend_label(date: NaiveDate) -> Option<&'static str> {
        match date.weekday() {
            Weekday::Sat => Some("Sat"),
            Weekday::Sun => Some("Sun"),
            _ => None,
        }
    }

    pub fn iso(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }
}
