//! Date recognition on a single line
//!
//! Three notations are tried in order: Korean year-month-day text, a
//! delimited numeric date with a year, and a bare month/day.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::calendar::QuoteCalendar;
use crate::patterns::is_age_table_line;

lazy_static! {
    /// "2026년 2월 28일" with the year optional
    static ref KOREAN_DATE: Regex =
        Regex::new(r"(?:^|\D)(?:(20\d{2})\s*년\s*)?(\d{1,2})\s*월\s*(\d{1,2})\s*일").unwrap();

    /// "2026-02-28", "2026.02.28", "2026/02/28"
    static ref DELIMITED_DATE: Regex =
        Regex::new(r"(?:^|\D)(20\d{2})[./-](\d{1,2})[./-](\d{1,2})(?:\D|$)").unwrap();

    /// "7/4", "7-4", "7.4" without a year
    static ref MONTH_DAY: Regex =
        Regex::new(r"(?:^|[^\d.,:/\-])(\d{1,2})[./-](\d{1,2})(?:[^\d.,:/\-%]|$)").unwrap();
}

fn number(caps: &regex::Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

/// Recognize the date a line is anchored on, if any.
///
/// The first notation that matches decides: an impossible date under that
/// notation yields None rather than falling through to the next one.
pub fn parse_date_from_line(line: &str, today: NaiveDate) -> Option<NaiveDate> {
    if is_age_table_line(line) {
        return None;
    }

    if let Some(caps) = KOREAN_DATE.captures(line) {
        let year = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<i32>().ok())
            .unwrap_or_else(|| chrono::Datelike::year(&today));
        let year = QuoteCalendar::clamp_year(year, today);
        return QuoteCalendar::valid_date(year, number(&caps, 2)?, number(&caps, 3)?);
    }

    if let Some(caps) = DELIMITED_DATE.captures(line) {
        let year = QuoteCalendar::clamp_year(caps[1].parse::<i32>().ok()?, today);
        return QuoteCalendar::valid_date(year, number(&caps, 2)?, number(&caps, 3)?);
    }

    if let Some(caps) = MONTH_DAY.captures(line) {
        return QuoteCalendar::infer_year(number(&caps, 1)?, number(&caps, 2)?, today);
    }

    None
}
