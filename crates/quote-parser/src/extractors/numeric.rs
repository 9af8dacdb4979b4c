// Money token scanning and range validation for quote amounts
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Thousands-grouped amount (1,234,000 or 1.234.000) or a plain digit run
    static ref MONEY_TOKEN: Regex = Regex::new(r"\d{1,3}(?:[,.]\d{3})+|\d+").unwrap();

    /// Range form "70,000~80,000" / "70000-80000"
    static ref MONEY_RANGE: Regex = Regex::new(
        r"(\d{1,3}(?:,\d{3})+|\d{5,6})\s*[~\-]\s*(\d{1,3}(?:,\d{3})+|\d{5,6})"
    )
    .unwrap();
}

/// Units that mark a number as a date, time or count instead of money
const NON_MONEY_UNITS: &[char] = &['년', '월', '일', '시', '분', '명', '세'];

/// Separators that glue digit runs into dates and clock times
const DATE_TIME_SEPARATORS: &[char] = &[':', '/', '.'];

/// Parse an amount by dropping separators and every other non-digit
pub fn parse_money(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok()
}

/// A number in a line that could be an amount of money
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyToken {
    pub value: u64,
    /// Byte offsets into the source line
    pub start: usize,
    pub end: usize,
    /// Written with thousands separators
    pub grouped: bool,
    pub digits: usize,
}

/// Every money-looking token of a line, left to right
pub fn money_tokens(line: &str) -> Vec<MoneyToken> {
    MONEY_TOKEN
        .find_iter(line)
        .filter_map(|m| {
            let raw = m.as_str();
            let grouped = raw.contains(',') || raw.contains('.');
            let before = &line[..m.start()];
            let after = &line[m.end()..];

            if followed_by_unit(after) {
                return None;
            }
            if !grouped && (glued_to_digits_before(before) || glued_to_digits_after(after)) {
                return None;
            }

            let value = parse_money(raw)?;
            Some(MoneyToken {
                value,
                start: m.start(),
                end: m.end(),
                grouped,
                digits: raw.chars().filter(|c| c.is_ascii_digit()).count(),
            })
        })
        .collect()
}

fn followed_by_unit(after: &str) -> bool {
    after
        .trim_start()
        .chars()
        .next()
        .is_some_and(|c| NON_MONEY_UNITS.contains(&c))
}

fn glued_to_digits_before(before: &str) -> bool {
    let mut rev = before.chars().rev();
    matches!(
        (rev.next(), rev.next()),
        (Some(sep), Some(d)) if DATE_TIME_SEPARATORS.contains(&sep) && d.is_ascii_digit()
    )
}

fn glued_to_digits_after(after: &str) -> bool {
    let mut chars = after.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(sep), Some(d)) if DATE_TIME_SEPARATORS.contains(&sep) && d.is_ascii_digit()
    )
}

/// Validation rule for one amount field: accepted value range and the
/// length a plain (ungrouped) digit run must have to count as that field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountField {
    pub min: u64,
    pub max: u64,
    pub plain_min_digits: usize,
    pub plain_max_digits: usize,
}

/// Per-guest meal price
pub const MEAL: AmountField = AmountField {
    min: 50_000,
    max: 200_000,
    plain_min_digits: 5,
    plain_max_digits: 6,
};

/// Hall rental fee anywhere in the document
pub const RENTAL: AmountField = AmountField {
    min: 0,
    max: 20_000_000,
    plain_min_digits: 6,
    plain_max_digits: 8,
};

/// Hall rental fee inside a date block; the floor keeps per-guest prices out
pub const BLOCK_RENTAL: AmountField = AmountField {
    min: 1_000_000,
    ..RENTAL
};

/// Total expected cost
pub const TOTAL: AmountField = AmountField {
    min: 10_000_000,
    max: 100_000_000,
    plain_min_digits: 7,
    plain_max_digits: 9,
};

impl AmountField {
    pub fn in_range(&self, value: u64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Token has the field's shape and its value is in range
    pub fn accepts(&self, token: &MoneyToken) -> bool {
        let shaped = token.grouped
            || (token.digits >= self.plain_min_digits && token.digits <= self.plain_max_digits);
        shaped && self.in_range(token.value)
    }

    /// Accepted tokens of a line, left to right
    pub fn tokens(&self, line: &str) -> Vec<MoneyToken> {
        money_tokens(line)
            .into_iter()
            .filter(|t| self.accepts(t))
            .collect()
    }

    pub fn values(&self, line: &str) -> Vec<u64> {
        self.tokens(line).into_iter().map(|t| t.value).collect()
    }

    pub fn first_in_line(&self, line: &str) -> Option<u64> {
        self.tokens(line).first().map(|t| t.value)
    }

    /// First accepted token starting at or after `offset` (bytes)
    pub fn first_after(&self, line: &str, offset: usize) -> Option<u64> {
        self.tokens(line)
            .into_iter()
            .find(|t| t.start >= offset)
            .map(|t| t.value)
    }
}

/// Smaller endpoint of a range form like "70,000~80,000" if the line has one
pub fn range_low_end(line: &str) -> Option<Option<u64>> {
    let caps = MONEY_RANGE.captures_iter(line).find(|caps| {
        let whole = caps.get(0).map(|m| (m.start(), m.end()));
        whole.is_some_and(|(start, end)| {
            !line[..start].ends_with(|c: char| c.is_ascii_digit())
                && !line[end..].starts_with(|c: char| c.is_ascii_digit())
        })
    })?;
    let a = caps.get(1).and_then(|m| parse_money(m.as_str()));
    let b = caps.get(2).and_then(|m| parse_money(m.as_str()));
    Some(match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        _ => None,
    })
}

/// Format with Korean-style thousands separators
pub fn format_money(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_money_strips_separators() {
        assert_eq!(parse_money("35,000,000원"), Some(35_000_000));
        assert_eq!(parse_money("₩ 70.000"), Some(70_000));
        assert_eq!(parse_money("원"), None);
        assert_eq!(parse_money("99999999999999999999999"), None);
    }

    #[test]
    fn test_tokens_skip_dates_and_units() {
        let line = "2026년 2월 28일 11:00~12:30 250명 식대 70,000원";
        let values: Vec<u64> = money_tokens(line).iter().map(|t| t.value).collect();
        assert_eq!(values, vec![70_000]);
    }

    #[test]
    fn test_tokens_skip_dotted_dates() {
        let values: Vec<u64> = money_tokens("2026.02.18 견적")
            .iter()
            .map(|t| t.value)
            .collect();
        assert!(values.is_empty());
    }

    #[test]
    fn test_grouped_and_plain_tokens() {
        let tokens = money_tokens("대관료 3,000,000 / 식대 68000");
        assert_eq!(tokens.len(), 2);
        assert!(tokens[0].grouped);
        assert_eq!(tokens[0].value, 3_000_000);
        assert!(!tokens[1].grouped);
        assert_eq!(tokens[1].digits, 5);
    }

    #[test]
    fn test_field_shape_rules() {
        // A plain 7-digit run is too long for a meal price
        assert_eq!(MEAL.first_in_line("1500000"), None);
        assert_eq!(MEAL.first_in_line("식대 150,000"), Some(150_000));
        assert_eq!(TOTAL.first_in_line("합계 35000000"), Some(35_000_000));
        assert_eq!(RENTAL.first_in_line("2026 대관"), None);
    }

    #[test]
    fn test_first_after_offset() {
        let line = "식대 70,000원 대관료 3,000,000원";
        let offset = line.find("대관료").unwrap();
        assert_eq!(RENTAL.first_in_line(line), Some(70_000));
        assert_eq!(RENTAL.first_after(line, offset), Some(3_000_000));
    }

    #[test]
    fn test_range_low_end() {
        assert_eq!(range_low_end("식대 70,000~80,000원"), Some(Some(70_000)));
        assert_eq!(range_low_end("88000 - 75000"), Some(Some(75_000)));
        assert_eq!(range_low_end("식대 70,000원"), None);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0), "0");
        assert_eq!(format_money(999), "999");
        assert_eq!(format_money(1_000), "1,000");
        assert_eq!(format_money(35_000_000), "35,000,000");
    }

    proptest! {
        #[test]
        fn parse_money_inverts_format(n in 0u64..1_000_000_000_000) {
            prop_assert_eq!(parse_money(&format_money(n)), Some(n));
        }

        #[test]
        fn parse_money_ignores_currency_decoration(n in 0u64..1_000_000_000) {
            let decorated = format!("₩ {}원", format_money(n));
            prop_assert_eq!(parse_money(&decorated), Some(n));
        }
    }
}
