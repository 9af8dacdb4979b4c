// Weekend day label ("Sat" / "Sun") of a block
use chrono::NaiveDate;

use super::{Chain, FieldExtractor};
use crate::calendar::QuoteCalendar;
use crate::patterns::{has_sunday_token, SATURDAY_TOKEN};

/// A written 토/토요일 or 일/일요일 token
pub struct ExplicitDayToken;

impl FieldExtractor for ExplicitDayToken {
    type Output = &'static str;

    fn extract(&self, lines: &[String]) -> Option<&'static str> {
        lines.iter().find_map(|line| {
            if SATURDAY_TOKEN.is_match(line) {
                Some("Sat")
            } else if has_sunday_token(line) {
                Some("Sun")
            } else {
                None
            }
        })
    }
}

/// Weekday of a known date, kept only on weekends
pub struct WeekendOfDate(pub Option<NaiveDate>);

impl FieldExtractor for WeekendOfDate {
    type Output = &'static str;

    fn extract(&self, _lines: &[String]) -> Option<&'static str> {
        self.0.and_then(QuoteCalendar::weekend_label)
    }
}

/// Explicit token first, then the calendar
pub fn day_chain<'a>(date: Option<NaiveDate>) -> Chain<'a, &'static str> {
    Chain::new().then(ExplicitDayToken).then(WeekendOfDate(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_explicit_token_beats_calendar() {
        // 2026-03-02 is a Monday, the written token still wins
        let chain = day_chain(ymd(2026, 3, 2));
        assert_eq!(chain.extract(&lines(&["3월 2일 (일) 11:00"])), Some("Sun"));
    }

    #[test]
    fn test_calendar_fallback_only_for_weekends() {
        let block = lines(&["7/4 11:00", "식대 70,000원"]);
        assert_eq!(day_chain(ymd(2026, 7, 4)).extract(&block), Some("Sat"));
        assert_eq!(day_chain(ymd(2026, 7, 5)).extract(&block), Some("Sun"));
        assert_eq!(day_chain(ymd(2026, 7, 6)).extract(&block), None);
        assert_eq!(day_chain(None).extract(&block), None);
    }

    #[test]
    fn test_spaced_day_suffix_is_not_sunday() {
        // 2026-03-07 is a Saturday
        let chain = day_chain(ymd(2026, 3, 7));
        assert_eq!(chain.extract(&lines(&["2026년 3월 7 일 11:00"])), Some("Sat"));
        assert_eq!(chain.extract(&lines(&["3월 7 일 (일)"])), Some("Sun"));
    }

    #[test]
    fn test_tokens_inside_words_are_ignored() {
        let block = lines(&["토마토 샐러드", "일반 홀"]);
        assert_eq!(ExplicitDayToken.extract(&block), None);
    }
}
