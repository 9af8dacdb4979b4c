// Per-guest meal price
use super::numeric::{range_low_end, MEAL};
use super::{Chain, FieldExtractor};
use crate::patterns::{BASE_LABEL, PROMO_LABEL};

/// Meal price of one line: a price range reads as its lower end, otherwise
/// the first money token in meal range counts. A range outside the meal
/// range abandons the line.
pub fn meal_in_line(line: &str) -> Option<u64> {
    match range_low_end(line) {
        Some(low) => low.filter(|v| MEAL.in_range(*v)),
        None => MEAL.first_in_line(line),
    }
}

/// First meal price in the first `limit` lines (all lines when None)
pub struct MealScan {
    pub limit: Option<usize>,
}

impl FieldExtractor for MealScan {
    type Output = u64;

    fn extract(&self, lines: &[String]) -> Option<u64> {
        let limit = self.limit.unwrap_or(lines.len());
        lines.iter().take(limit).find_map(|line| meal_in_line(line))
    }
}

/// Smallest meal price within `window` lines of a header carrying both a
/// base and a promotional price label
pub struct PromoHeaderMeal {
    pub window: usize,
}

impl FieldExtractor for PromoHeaderMeal {
    type Output = u64;

    fn extract(&self, lines: &[String]) -> Option<u64> {
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| BASE_LABEL.is_match(line) && PROMO_LABEL.is_match(line))
            .find_map(|(i, _)| {
                lines[i..]
                    .iter()
                    .take(self.window)
                    .filter_map(|line| meal_in_line(line))
                    .min()
            })
    }
}

/// Lines near the date anchor first, then the whole block
pub fn block_meal_chain<'a>(near_lines: usize) -> Chain<'a, u64> {
    Chain::new()
        .then(MealScan {
            limit: Some(near_lines),
        })
        .then(MealScan { limit: None })
}

/// Promotional column first, then the first meal price of the document
pub fn document_meal_chain<'a>(promo_window: usize) -> Chain<'a, u64> {
    Chain::new()
        .then(PromoHeaderMeal {
            window: promo_window,
        })
        .then(MealScan { limit: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_token_in_range() {
        assert_eq!(meal_in_line("식대 70,000원"), Some(70_000));
        assert_eq!(meal_in_line("음료 5,000 / 식대 68,000"), Some(68_000));
        assert_eq!(meal_in_line("식대 68000"), Some(68_000));
    }

    #[test]
    fn test_range_reads_lower_end() {
        assert_eq!(meal_in_line("식대 70,000~80,000원"), Some(70_000));
        assert_eq!(meal_in_line("88000 - 75000"), Some(75_000));
    }

    #[test]
    fn test_out_of_range_range_abandons_line() {
        // 30,000 is the low end, the later 60,000 on the line is not used
        assert_eq!(meal_in_line("소인 30,000~40,000 / 60,000"), None);
    }

    #[test]
    fn test_near_lines_searched_first() {
        let block = lines(&[
            "7/4 (토) 11:00",
            "대관료 3,000,000",
            "식대 72,000",
            "음주류 별도",
            "참고 상위 식대 99,000",
        ]);
        assert_eq!(block_meal_chain(2).extract(&block), Some(72_000));
        assert_eq!(block_meal_chain(6).extract(&block), Some(72_000));
    }

    #[test]
    fn test_promo_header_takes_smallest() {
        let doc = lines(&[
            "메종드아나하",
            "구분 기본가 프로모션가",
            "정상 식대 88,000",
            "특가 식대 79,000",
            "스테이크 코스 95,000",
        ]);
        assert_eq!(document_meal_chain(25).extract(&doc), Some(79_000));
        assert_eq!(document_meal_chain(2).extract(&doc), Some(88_000));
    }

    #[test]
    fn test_document_meal_without_header() {
        let doc = lines(&["식대 66,000원", "코스 77,000원"]);
        assert_eq!(document_meal_chain(25).extract(&doc), Some(66_000));
    }

    proptest! {
        #[test]
        fn meal_always_in_range(n in 0u64..1_000_000, m in 0u64..1_000_000) {
            let line = format!("식대 {} / {}", n, m);
            if let Some(v) = meal_in_line(&line) {
                prop_assert!(MEAL.in_range(v));
            }
        }
    }
}
