//! Guest count heuristic
//!
//! Quote sheets print the guaranteed headcount as "250명" or next to a label
//! ("보증인원 250"), but the same two-to-four digit numbers also show up as
//! durations, intervals and pieces of prices. Every plausible number is
//! scored and the best candidate wins; the weights live in [`GuestScoring`].

use lazy_static::lazy_static;
use regex::Regex;

use super::FieldExtractor;
use crate::config::GuestScoring;
use crate::patterns::{
    char_index, char_window, GROUPED_NUMBER, GUEST_KEYWORD, GUEST_NEAR_KEYWORD,
    INTERVAL_IN_PARENS, MONEY_CONTEXT, PERSON_COUNT, PERSON_IN_PARENS, TIME_CONTEXT,
};

lazy_static! {
    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();
    static ref DURATION_UNIT: Regex = Regex::new(r"^\s*(?:분|시간)").unwrap();
}

pub const MIN_GUESTS: u32 = 50;
pub const MAX_GUESTS: u32 = 500;

fn in_range(n: u32) -> bool {
    (MIN_GUESTS..=MAX_GUESTS).contains(&n)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    value: u32,
    score: i32,
}

/// Scored guest count over a run of lines
pub struct GuestExtractor<'a> {
    scoring: &'a GuestScoring,
}

impl<'a> GuestExtractor<'a> {
    pub fn new(scoring: &'a GuestScoring) -> Self {
        Self { scoring }
    }

    /// "N명" count whose number stands on its own
    fn unit_count(line: &str) -> Option<u32> {
        let caps = PERSON_COUNT.captures_iter(line).find(|caps| {
            let Some(whole) = caps.get(0) else {
                return false;
            };
            let glued_before = line[..whole.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit() || c == ',');
            let glued_after = line[whole.end()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
            !glued_before && !glued_after
        })?;
        caps.get(1)?.as_str().parse().ok()
    }

    fn score_line(&self, line: &str, out: &mut Vec<Candidate>) {
        let w = self.scoring;

        if INTERVAL_IN_PARENS.is_match(line) {
            return;
        }

        let has_money = MONEY_CONTEXT.is_match(line) || GROUPED_NUMBER.is_match(line);
        let has_person_unit = PERSON_COUNT.is_match(line);
        if has_money && !has_person_unit {
            return;
        }

        let has_guest_keyword = GUEST_KEYWORD.is_match(line);

        if let Some(value) = Self::unit_count(line).filter(|n| in_range(*n)) {
            let mut score = w.unit_base;
            if has_guest_keyword {
                score += w.keyword_bonus;
            }
            if PERSON_IN_PARENS.is_match(line) {
                score -= w.paren_penalty;
            }
            out.push(Candidate { value, score });
            return;
        }

        if TIME_CONTEXT.is_match(line) && !has_guest_keyword {
            return;
        }

        for m in DIGIT_RUN.find_iter(line) {
            let before = line[..m.start()].chars().next_back();
            let after = line[m.end()..].chars().next();
            if before == Some(',') || after == Some(',') {
                continue;
            }
            if !(2..=4).contains(&m.as_str().len()) {
                continue;
            }
            let Ok(value) = m.as_str().parse::<u32>() else {
                continue;
            };
            if !in_range(value) || DURATION_UNIT.is_match(&line[m.end()..]) {
                continue;
            }

            let around = char_window(line, m.start(), m.end(), w.proximity_chars);
            if TIME_CONTEXT.is_match(around) {
                continue;
            }

            let mut score = 0;
            if has_guest_keyword {
                score += w.keyword_line;
            }
            if GUEST_NEAR_KEYWORD.is_match(around) {
                score += w.keyword_near;
            }
            if char_index(line, m.start()) <= w.early_position_chars {
                score += w.early_position;
            }
            if has_money {
                score -= w.money_penalty;
            }
            out.push(Candidate { value, score });
        }
    }
}

impl FieldExtractor for GuestExtractor<'_> {
    type Output = u32;

    fn extract(&self, lines: &[String]) -> Option<u32> {
        let mut candidates = Vec::new();
        for line in lines {
            self.score_line(line, &mut candidates);
        }

        // Strictly greater replaces, so the earliest of equal scores stays
        candidates
            .into_iter()
            .fold(None::<Candidate>, |best, c| match best {
                Some(b) if b.score >= c.score => Some(b),
                _ => Some(c),
            })
            .map(|c| c.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn guests(raw: &[&str]) -> Option<u32> {
        let scoring = GuestScoring::default();
        let lines: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
        GuestExtractor::new(&scoring).extract(&lines)
    }

    #[test]
    fn test_person_unit() {
        assert_eq!(guests(&["보증인원 250명"]), Some(250));
        assert_eq!(guests(&["250명 식대 70,000원"]), Some(250));
    }

    #[test]
    fn test_person_unit_out_of_range_is_ignored() {
        assert_eq!(guests(&["최대 1200명 수용"]), None);
        assert_eq!(guests(&["30명 이하"]), None);
    }

    #[test]
    fn test_keyword_line_number() {
        assert_eq!(guests(&["보증인원 300"]), Some(300));
        assert_eq!(guests(&["하객250"]), Some(250));
    }

    #[test]
    fn test_interval_lines_never_yield_guests() {
        assert_eq!(guests(&["(120분 간격)"]), None);
        assert_eq!(guests(&["예식 (90분 간격) 200"]), None);
    }

    #[test]
    fn test_time_context_without_keyword_is_skipped() {
        assert_eq!(guests(&["예식 시간 120"]), None);
        assert_eq!(guests(&["120분"]), None);
    }

    #[test]
    fn test_money_lines_are_skipped() {
        assert_eq!(guests(&["식대 150"]), None);
        assert_eq!(guests(&["1,250 200"]), None);
    }

    #[test]
    fn test_unit_beats_bare_number() {
        assert_eq!(guests(&["홀 A 180", "200명"]), Some(200));
    }

    #[test]
    fn test_keyword_beats_bare_number() {
        assert_eq!(guests(&["B홀 180", "보증인원 220"]), Some(220));
    }

    #[test]
    fn test_ties_keep_earliest() {
        assert_eq!(guests(&["200명", "250명"]), Some(200));
    }

    #[test]
    fn test_custom_weights() {
        let scoring = GuestScoring {
            unit_base: 0,
            keyword_line: 500,
            ..GuestScoring::default()
        };
        let lines = vec!["200명".to_string(), "하객 수 300".to_string()];
        assert_eq!(GuestExtractor::new(&scoring).extract(&lines), Some(300));
    }

    proptest! {
        #[test]
        fn guests_always_in_range(line in "[가-힣0-9 ,명()분:~]{0,40}") {
            if let Some(g) = guests(&[line.as_str()]) {
                prop_assert!((MIN_GUESTS..=MAX_GUESTS).contains(&g));
            }
        }
    }
}
