//! Promotional total from word geometry
//!
//! Quote sheets often print a base price column next to a promotional
//! column. Plain OCR text interleaves the two, but word boxes keep them
//! apart: words are clustered into visual lines by vertical centroid, and
//! the column boundary is taken from the header line naming both columns.

use shared_types::OcrWord;

use crate::extractors::numeric::TOTAL;
use crate::patterns::{BASE_LABEL, PROMO_LABEL, TOTAL_LABEL};

/// Smallest vertical tolerance, in pixels, for joining words into a line
const MIN_LINE_TOLERANCE: f64 = 8.0;
/// Share of the median word height two centroids may differ by
const LINE_TOLERANCE_RATIO: f64 = 0.8;
/// Split offset left of the promo label when the header has no base label
const PROMO_ONLY_SPLIT_OFFSET: f64 = 30.0;
const TOTAL_LINE_SCORE: f64 = 8.0;
const MAX_MAGNITUDE_SCORE: f64 = 3.0;
const MAGNITUDE_UNIT: f64 = 10_000_000.0;

/// Words sharing a baseline, ordered left to right
#[derive(Debug, Clone, PartialEq)]
pub struct VisualLine {
    pub centroid_y: f64,
    pub words: Vec<OcrWord>,
    pub text: String,
}

fn line_tolerance(words: &[OcrWord]) -> f64 {
    let mut heights: Vec<f64> = words.iter().map(OcrWord::height).collect();
    heights.sort_by(f64::total_cmp);
    let median = heights.get(heights.len() / 2).copied().unwrap_or(12.0);
    (median * LINE_TOLERANCE_RATIO).round().max(MIN_LINE_TOLERANCE)
}

/// Cluster words into visual lines, top to bottom.
///
/// Words are visited by centroid (y, then x) and join the first line whose
/// running mean centroid is within tolerance.
pub fn group_words_into_lines(words: &[OcrWord]) -> Vec<VisualLine> {
    if words.is_empty() {
        return Vec::new();
    }

    let tolerance = line_tolerance(words);
    let mut sorted: Vec<&OcrWord> = words.iter().collect();
    sorted.sort_by(|a, b| {
        a.centroid_y
            .total_cmp(&b.centroid_y)
            .then(a.centroid_x.total_cmp(&b.centroid_x))
    });

    let mut clusters: Vec<(f64, Vec<OcrWord>)> = Vec::new();
    for word in sorted {
        match clusters
            .iter_mut()
            .find(|(cy, _)| (*cy - word.centroid_y).abs() <= tolerance)
        {
            Some((cy, members)) => {
                members.push(word.clone());
                let n = members.len() as f64;
                *cy = (*cy * (n - 1.0) + word.centroid_y) / n;
            }
            None => clusters.push((word.centroid_y, vec![word.clone()])),
        }
    }

    let mut lines: Vec<VisualLine> = clusters
        .into_iter()
        .map(|(centroid_y, mut words)| {
            words.sort_by(|a, b| a.centroid_x.total_cmp(&b.centroid_x));
            let text = words
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            VisualLine {
                centroid_y,
                words,
                text,
            }
        })
        .collect();
    lines.sort_by(|a, b| a.centroid_y.total_cmp(&b.centroid_y));
    lines
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Amount a single word spells, if it is in total range
fn word_total(word: &OcrWord) -> Option<u64> {
    TOTAL.first_in_line(&word.text)
}

/// Finds the promotional total in a base/promo price table
#[derive(Debug, Clone, Copy)]
pub struct LayoutPromoResolver {
    /// Visual lines from a header, the header included, that may hold its values
    window: usize,
}

impl LayoutPromoResolver {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn resolve(&self, words: &[OcrWord]) -> Option<u64> {
        let lines = group_words_into_lines(words);

        let from_header = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| PROMO_LABEL.is_match(&line.text) && BASE_LABEL.is_match(&line.text))
            .find_map(|(i, _)| self.best_under_header(&lines, i));

        from_header.or_else(|| Self::rightmost_on_total_line(&lines))
    }

    fn best_under_header(&self, lines: &[VisualLine], header_index: usize) -> Option<u64> {
        let header = &lines[header_index];
        let xs_of = |label: &regex::Regex| -> Vec<f64> {
            header
                .words
                .iter()
                .filter(|w| label.is_match(&w.text))
                .map(|w| w.centroid_x)
                .collect()
        };
        let promo_x = mean(&xs_of(&*PROMO_LABEL))?;
        let split_x = match mean(&xs_of(&*BASE_LABEL)) {
            Some(base_x) => (base_x + promo_x) / 2.0,
            None => promo_x - PROMO_ONLY_SPLIT_OFFSET,
        };

        let end = lines.len().min(header_index + self.window);
        let mut best: Option<(u64, f64)> = None;
        for line in lines.get(header_index + 1..end).unwrap_or_default() {
            let line_score = if TOTAL_LABEL.is_match(&line.text) {
                TOTAL_LINE_SCORE
            } else {
                0.0
            };
            for word in line.words.iter().filter(|w| w.centroid_x >= split_x) {
                let Some(value) = word_total(word) else {
                    continue;
                };
                let score =
                    line_score + (value as f64 / MAGNITUDE_UNIT).min(MAX_MAGNITUDE_SCORE);
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((value, score));
                }
            }
        }

        if let Some((value, score)) = best {
            tracing::debug!(value, score, header = %header.text, "promo total from layout header");
        }
        best.map(|(value, _)| value)
    }

    fn rightmost_on_total_line(lines: &[VisualLine]) -> Option<u64> {
        lines
            .iter()
            .filter(|line| TOTAL_LABEL.is_match(&line.text))
            .find_map(|line| {
                let values: Vec<u64> = line.words.iter().filter_map(word_total).collect();
                if values.len() >= 2 {
                    values.last().copied()
                } else {
                    None
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word(text: &str, x: f64, y: f64) -> OcrWord {
        OcrWord::from_box(text, x - 20.0, y - 10.0, x + 20.0, y + 10.0)
    }

    #[test]
    fn test_words_cluster_into_lines() {
        let words = vec![
            word("식대", 40.0, 103.0),
            word("합계", 40.0, 200.0),
            word("70,000", 200.0, 99.0),
            word("35,000,000", 200.0, 204.0),
        ];
        let lines = group_words_into_lines(&words);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "식대 70,000");
        assert_eq!(lines[1].text, "합계 35,000,000");
        assert!((lines[0].centroid_y - 101.0).abs() < 1e-9);
    }

    #[test]
    fn test_tolerance_scales_with_word_height() {
        // 40px tall words: tolerance 32px joins centroids 25px apart
        let tall = |text: &str, x: f64, y: f64| {
            OcrWord::from_box(text, x - 20.0, y - 20.0, x + 20.0, y + 20.0)
        };
        let words = vec![tall("a", 0.0, 100.0), tall("b", 50.0, 125.0)];
        assert_eq!(group_words_into_lines(&words).len(), 1);

        let small = vec![word("a", 0.0, 100.0), word("b", 50.0, 125.0)];
        assert_eq!(group_words_into_lines(&small).len(), 2);
    }

    #[test]
    fn test_promo_column_total_wins() {
        let words = vec![
            word("구분", 40.0, 50.0),
            word("기본가", 200.0, 50.0),
            word("프로모션가", 400.0, 50.0),
            word("식대", 40.0, 100.0),
            word("88,000", 200.0, 100.0),
            word("79,000", 400.0, 100.0),
            word("총비용", 40.0, 150.0),
            word("38,000,000", 200.0, 150.0),
            word("33,000,000", 400.0, 150.0),
        ];
        let resolver = LayoutPromoResolver::new(45);
        assert_eq!(resolver.resolve(&words), Some(33_000_000));
    }

    #[test]
    fn test_total_line_beats_larger_amount() {
        let words = vec![
            word("정상", 200.0, 50.0),
            word("할인", 400.0, 50.0),
            word("옵션", 40.0, 100.0),
            word("45,000,000", 400.0, 100.0),
            word("합계", 40.0, 150.0),
            word("31,000,000", 400.0, 150.0),
        ];
        assert_eq!(LayoutPromoResolver::new(45).resolve(&words), Some(31_000_000));
    }

    #[test]
    fn test_combined_header_word_splits_at_its_center() {
        let words = vec![
            word("기본/프로모션", 400.0, 50.0),
            word("합계", 40.0, 100.0),
            word("36,000,000", 300.0, 100.0),
            word("30,000,000", 410.0, 100.0),
        ];
        assert_eq!(LayoutPromoResolver::new(45).resolve(&words), Some(30_000_000));
    }

    #[test]
    fn test_window_limits_header_scan() {
        let mut words = vec![word("기본", 200.0, 50.0), word("혜택", 400.0, 50.0)];
        for i in 1..=3 {
            words.push(word("항목", 40.0, 50.0 + 50.0 * i as f64));
        }
        words.push(word("31,000,000", 400.0, 250.0));
        assert_eq!(LayoutPromoResolver::new(5).resolve(&words), Some(31_000_000));
        assert_eq!(LayoutPromoResolver::new(4).resolve(&words), None);
    }

    #[test]
    fn test_fallback_rightmost_on_total_line() {
        let words = vec![
            word("합계", 40.0, 100.0),
            word("38,000,000", 200.0, 100.0),
            word("33,000,000", 400.0, 100.0),
        ];
        assert_eq!(LayoutPromoResolver::new(45).resolve(&words), Some(33_000_000));
    }

    #[test]
    fn test_single_value_total_line_is_not_enough() {
        let words = vec![word("합계", 40.0, 100.0), word("38,000,000", 200.0, 100.0)];
        assert_eq!(LayoutPromoResolver::new(45).resolve(&words), None);
        assert_eq!(LayoutPromoResolver::new(45).resolve(&[]), None);
    }
}
