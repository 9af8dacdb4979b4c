//! Keyword patterns shared by the field extractors
//!
//! Quote sheets mix Korean labels, digits and the occasional English word,
//! and OCR inserts or drops spaces inside labels freely, so most patterns
//! allow optional whitespace between syllables.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Hall rental fee labels
    pub static ref RENTAL_KEYWORD: Regex =
        Regex::new(r"대관료|예식비|홀\s*사용료|사용료|대여료").unwrap();

    /// Loose total hint used inside a date block ("총" alone counts)
    pub static ref TOTAL_HINT: Regex = Regex::new(r"(?i)예상\s*비용|총|합계|TOTAL").unwrap();

    /// Strict total label used across the whole document and on layout lines
    pub static ref TOTAL_LABEL: Regex =
        Regex::new(r"(?i)총\s*(?:예상)?\s*비용|총\s*견적|총\s*합계|총\s*액|합계|TOTAL").unwrap();

    /// Base / list price column label
    pub static ref BASE_LABEL: Regex = Regex::new(r"기본|정상").unwrap();

    /// Promotional / discounted column label
    pub static ref PROMO_LABEL: Regex = Regex::new(r"프로모션|할인|혜택").unwrap();

    /// Guest count labels
    pub static ref GUEST_KEYWORD: Regex =
        Regex::new(r"(?i)보증\s*인원|인원|하객|게스트|guests?").unwrap();

    /// Guest labels that count when they sit right next to a number
    pub static ref GUEST_NEAR_KEYWORD: Regex = Regex::new(r"보증\s*인원|인원|하객").unwrap();

    /// Money context: a currency amount or a fee/total label
    pub static ref MONEY_CONTEXT: Regex = Regex::new(
        r"(?i)\d\s*원|[만천]\s*원|₩|\bKRW\b|식대|금액|비용|대관료|예식비|합계|총|TOTAL"
    )
    .unwrap();

    /// Thousands-grouped number such as 3,000,000
    pub static ref GROUPED_NUMBER: Regex = Regex::new(r"\d{1,3}(?:,\d{3})+").unwrap();

    /// Duration / interval context
    pub static ref TIME_CONTEXT: Regex =
        Regex::new(r"(?i)분|시간|minutes?|mins?|hours?|hr|간격").unwrap();

    /// Bracketed interval such as "(90분 간격)"
    pub static ref INTERVAL_IN_PARENS: Regex =
        Regex::new(r"\(\s*\d{1,4}\s*(?:분|시간)[^)]*\)").unwrap();

    /// Person count "250명"
    pub static ref PERSON_COUNT: Regex = Regex::new(r"(\d{2,4})\s*명").unwrap();

    /// Person unit inside parentheses
    pub static ref PERSON_IN_PARENS: Regex = Regex::new(r"\([^)]*명[^)]*\)").unwrap();

    /// Age range such as "4-7세" in child pricing tables
    pub static ref AGE_RANGE: Regex = Regex::new(r"\d{1,2}\s*[-~]\s*\d{1,2}\s*세").unwrap();

    /// Child / minor pricing labels
    pub static ref MINOR_KEYWORD: Regex = Regex::new(r"소인|어린이|아동").unwrap();

    /// Saturday token: 토 or 토요일 standing on its own
    pub static ref SATURDAY_TOKEN: Regex =
        Regex::new(r"(?:^|[\s(])토(?:요일)?(?:$|[\s)])").unwrap();

    /// Sunday token: 일 or 일요일 standing on its own
    pub static ref SUNDAY_TOKEN: Regex =
        Regex::new(r"(?:^|[\s(])일(?:요일)?(?:$|[\s)])").unwrap();
}

/// A standalone 일/일요일 on the line that is not the day suffix of a date
/// spaced out by OCR, as in "3월 7 일"
pub fn has_sunday_token(line: &str) -> bool {
    let mut start = 0;
    while let Some(m) = SUNDAY_TOKEN.find_at(line, start) {
        let date_suffix = m.as_str().starts_with(char::is_whitespace)
            && line[..m.start()]
                .trim_end()
                .ends_with(|c: char| c.is_ascii_digit());
        if !date_suffix {
            return true;
        }
        start = m.start() + m.as_str().chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// True when the line belongs to a child/age pricing table rather than a
/// schedule, so its numbers must not be read as dates
pub fn is_age_table_line(line: &str) -> bool {
    AGE_RANGE.is_match(line) || MINOR_KEYWORD.is_match(line)
}

/// Remove every whitespace character
pub fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Byte range of `text` widened by up to `chars` characters on each side of
/// `start..end`
pub fn char_window(text: &str, start: usize, end: usize, chars: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(chars)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .nth(chars)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[from..to]
}

/// Character (not byte) index of a byte offset
pub fn char_index(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count()
}
