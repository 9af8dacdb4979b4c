// Total expected cost
use super::numeric::TOTAL;
use super::{Chain, FieldExtractor};
use crate::patterns::{TOTAL_HINT, TOTAL_LABEL};

/// Largest amount on lines hinting at a total
pub struct HintLineTotal;

impl FieldExtractor for HintLineTotal {
    type Output = u64;

    fn extract(&self, lines: &[String]) -> Option<u64> {
        lines
            .iter()
            .filter(|line| TOTAL_HINT.is_match(line))
            .flat_map(|line| TOTAL.values(line))
            .max()
    }
}

/// Largest amount in total range anywhere
pub struct LargestTotal;

impl FieldExtractor for LargestTotal {
    type Output = u64;

    fn extract(&self, lines: &[String]) -> Option<u64> {
        lines.iter().flat_map(|line| TOTAL.values(line)).max()
    }
}

/// A total label and the lines after it. Quotes listing both a base and a
/// promotional total print the promotional one lower, so with several
/// candidates the smallest wins.
pub struct LabelFollowupTotal {
    pub followup_lines: usize,
}

impl FieldExtractor for LabelFollowupTotal {
    type Output = u64;

    fn extract(&self, lines: &[String]) -> Option<u64> {
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| TOTAL_LABEL.is_match(line))
            .find_map(|(i, _)| {
                let candidates: Vec<u64> = lines[i..]
                    .iter()
                    .take(self.followup_lines)
                    .flat_map(|line| TOTAL.values(line))
                    .collect();
                candidates.iter().copied().min()
            })
    }
}

/// Last amount on the first labelled line carrying one
pub struct LabelLineTotal;

impl FieldExtractor for LabelLineTotal {
    type Output = u64;

    fn extract(&self, lines: &[String]) -> Option<u64> {
        lines
            .iter()
            .filter(|line| TOTAL_LABEL.is_match(line))
            .find_map(|line| TOTAL.values(line).last().copied())
    }
}

pub fn block_total_chain<'a>() -> Chain<'a, u64> {
    Chain::new().then(HintLineTotal).then(LargestTotal)
}

/// Text-only document total, used when the layout gives no answer
pub fn document_total_chain<'a>(followup_lines: usize) -> Chain<'a, u64> {
    Chain::new()
        .then(LabelFollowupTotal { followup_lines })
        .then(LabelLineTotal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_hint_line_takes_largest() {
        let block = lines(&[
            "대관료 3,000,000",
            "총 예상비용 32,000,000 / 35,000,000",
            "옵션 포함 48,000,000",
        ]);
        assert_eq!(block_total_chain().extract(&block), Some(35_000_000));
    }

    #[test]
    fn test_block_maximum_without_hint() {
        let block = lines(&["기본 28,000,000", "옵션 포함 31,500,000"]);
        assert_eq!(block_total_chain().extract(&block), Some(31_500_000));
    }

    #[test]
    fn test_out_of_range_amounts_ignored() {
        let block = lines(&["합계 150,000,000", "총 9,000,000"]);
        assert_eq!(block_total_chain().extract(&block), None);
    }

    #[test]
    fn test_followup_prefers_smallest() {
        let doc = lines(&["총 예상 비용", "기본 38,000,000", "프로모션 33,000,000"]);
        assert_eq!(document_total_chain(12).extract(&doc), Some(33_000_000));
    }

    #[test]
    fn test_followup_single_candidate() {
        let doc = lines(&["합계", "35,000,000"]);
        assert_eq!(document_total_chain(12).extract(&doc), Some(35_000_000));
    }

    #[test]
    fn test_followup_window_is_bounded() {
        let mut raw = vec!["합계".to_string()];
        raw.extend((0..12).map(|i| format!("항목 {}", i)));
        raw.push("35,000,000".to_string());
        assert_eq!(document_total_chain(12).extract(&raw), None);
    }

    #[test]
    fn test_label_line_takes_last() {
        assert_eq!(
            LabelLineTotal.extract(&lines(&["TOTAL 41,000,000 38,000,000"])),
            Some(38_000_000)
        );
    }

    proptest! {
        #[test]
        fn total_always_in_range(a in 0u64..1_000_000_000, b in 0u64..1_000_000_000) {
            let block = vec![format!("합계 {} {}", a, b)];
            if let Some(v) = block_total_chain().extract(&block) {
                prop_assert!(TOTAL.in_range(v));
            }
        }
    }
}
