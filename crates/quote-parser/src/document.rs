// Document-wide values used where a date block yields nothing for a field
use shared_types::OcrWord;

use crate::config::ExtractionConfig;
use crate::extractors::guests::GuestExtractor;
use crate::extractors::meal::document_meal_chain;
use crate::extractors::numeric::RENTAL;
use crate::extractors::rental::KeywordRental;
use crate::extractors::total::document_total_chain;
use crate::extractors::FieldExtractor;
use crate::layout::LayoutPromoResolver;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFallbacks {
    pub guests: Option<u32>,
    pub meal: Option<u64>,
    pub rental: Option<u64>,
    /// Promotional total read from word geometry
    pub promo_total: Option<u64>,
    /// Promotional total if any, else the text-only document total
    pub total: Option<u64>,
}

impl DocumentFallbacks {
    pub fn compute(lines: &[String], words: &[OcrWord], config: &ExtractionConfig) -> Self {
        let promo_total = if words.is_empty() {
            None
        } else {
            LayoutPromoResolver::new(config.promo_total_window).resolve(words)
        };
        let total = promo_total
            .or_else(|| document_total_chain(config.total_followup_lines).extract(lines));

        Self {
            guests: GuestExtractor::new(&config.guests).extract(lines),
            meal: document_meal_chain(config.promo_meal_window).extract(lines),
            rental: KeywordRental(RENTAL).extract(lines),
            promo_total,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_text_only_document() {
        let doc = lines(&[
            "메종드아나하 견적서",
            "보증인원 250",
            "식대 70,000원",
            "꽃장식 1,200,000",
            "총 예상 비용",
            "38,000,000",
            "33,000,000",
        ]);
        let fallbacks = DocumentFallbacks::compute(&doc, &[], &ExtractionConfig::default());

        assert_eq!(
            fallbacks,
            DocumentFallbacks {
                guests: Some(250),
                meal: Some(70_000),
                rental: None,
                promo_total: None,
                total: Some(33_000_000),
            }
        );
    }

    #[test]
    fn test_layout_total_preferred() {
        let doc = lines(&["합계 38,000,000"]);
        let words = vec![
            OcrWord::from_box("합계", 0.0, 90.0, 40.0, 110.0),
            OcrWord::from_box("38,000,000", 100.0, 90.0, 200.0, 110.0),
            OcrWord::from_box("34,000,000", 300.0, 90.0, 400.0, 110.0),
        ];
        let fallbacks = DocumentFallbacks::compute(&doc, &words, &ExtractionConfig::default());

        assert_eq!(fallbacks.promo_total, Some(34_000_000));
        assert_eq!(fallbacks.total, Some(34_000_000));
    }
}
