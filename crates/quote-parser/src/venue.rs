//! Venue identification against a catalog of known venue names
//!
//! Venue names are printed in the letterhead or the footer of a quote, so
//! only both ends of the document are scanned. OCR often wraps a name over
//! two or three lines; joined neighbors are tried after single lines.

use std::collections::HashMap;

use crate::patterns::compact;

/// Venues recognized without extra configuration
pub const DEFAULT_VENUES: &[&str] = &[
    "메종드아나하",
    "더컨벤션신사",
    "더컨벤션 잠실",
    "더컨벤션 영등포",
    "아펠가모 광화문",
    "아펠가모 선릉",
    "아펠가모 반포",
    "아펠가모 잠실",
    "더채플앳청담",
    "더채플앳논현",
    "더채플앳대치",
    "라비두스",
    "빌라드지디 청담",
    "빌라드지디 논현",
    "빌라드지디 수서",
    "더라움",
    "루벨",
    "엘블레스",
    "더베르G",
    "아모리스 역삼",
    "노블발렌티 삼성",
    "노블발렌티 대치",
    "그랜드힐컨벤션",
    "더링크서울",
    "더파티움 여의도",
    "JK아트컨벤션",
    "드레스가든",
    "라붐아트홀",
    "더클래스청담",
    "르비르모어",
    "보타닉파크웨딩",
    "AW컨벤션",
    "웨스틴조선 서울",
    "롯데호텔 서울",
    "신라호텔",
    "글래드 여의도",
    "상록아트홀",
    "더플라자",
];

/// Known venue names indexed by their whitespace-free form
#[derive(Debug, Clone)]
pub struct VenueCatalog {
    by_key: HashMap<String, String>,
    /// Keys sorted longest first so the most specific name wins
    keys_longest_first: Vec<String>,
}

impl VenueCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut by_key = HashMap::new();
        for name in names {
            let name = name.into();
            let key = compact(&name);
            if !key.is_empty() {
                by_key.entry(key).or_insert(name);
            }
        }

        let mut keys_longest_first: Vec<String> = by_key.keys().cloned().collect();
        keys_longest_first.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });

        Self {
            by_key,
            keys_longest_first,
        }
    }

    /// Catalog of [`DEFAULT_VENUES`] plus extra names
    pub fn with_defaults<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = DEFAULT_VENUES
            .iter()
            .map(|name| name.to_string())
            .chain(extra.into_iter().map(Into::into));
        Self::new(names)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Exact whitespace-free match, then longest contained name
    fn find_in(&self, text: &str) -> Option<&str> {
        let candidate = compact(text);
        if candidate.is_empty() {
            return None;
        }
        if let Some(name) = self.by_key.get(&candidate) {
            return Some(name);
        }
        self.keys_longest_first
            .iter()
            .find(|key| candidate.contains(key.as_str()))
            .and_then(|key| self.by_key.get(key))
            .map(String::as_str)
    }

    /// Identify the venue from the first and last `scan_lines` lines
    pub fn match_lines(&self, lines: &[String], scan_lines: usize) -> Option<String> {
        let head = lines.iter().take(scan_lines);
        let tail = lines.iter().skip(lines.len().saturating_sub(scan_lines));
        let scope: Vec<&str> = head.chain(tail).map(String::as_str).collect();

        if let Some(name) = scope.iter().find_map(|line| self.find_in(line)) {
            return Some(name.to_string());
        }

        for i in 0..scope.len() {
            for width in [2, 3] {
                let Some(window) = scope.get(i..i + width) else {
                    continue;
                };
                if let Some(name) = self.find_in(&window.concat()) {
                    return Some(name.to_string());
                }
            }
        }

        None
    }
}

impl Default for VenueCatalog {
    fn default() -> Self {
        Self::with_defaults(std::iter::empty::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_match_ignores_spacing() {
        let catalog = VenueCatalog::default();
        let doc = lines(&["아펠 가모 광화문", "견적서"]);
        assert_eq!(
            catalog.match_lines(&doc, 10).as_deref(),
            Some("아펠가모 광화문")
        );
    }

    #[test]
    fn test_contained_name_longest_wins() {
        let catalog = VenueCatalog::new(["더컨벤션", "더컨벤션신사"]);
        let doc = lines(&["더컨벤션신사웨딩견적서"]);
        assert_eq!(catalog.match_lines(&doc, 10).as_deref(), Some("더컨벤션신사"));
    }

    #[test]
    fn test_name_wrapped_over_lines() {
        let catalog = VenueCatalog::new(["노블발렌티 삼성"]);
        let doc = lines(&["견적서", "노블", "발렌티", "삼성점 안내"]);
        assert_eq!(
            catalog.match_lines(&doc, 10).as_deref(),
            Some("노블발렌티 삼성")
        );
    }

    #[test]
    fn test_only_document_ends_are_scanned() {
        let catalog = VenueCatalog::new(["라비두스"]);
        let mut raw: Vec<String> = (0..30).map(|i| format!("항목 {}", i)).collect();
        raw[15] = "라비두스".to_string();
        assert_eq!(catalog.match_lines(&raw, 10), None);

        raw[27] = "라비두스 웨딩홀".to_string();
        assert_eq!(catalog.match_lines(&raw, 10).as_deref(), Some("라비두스"));
    }

    #[test]
    fn test_no_match() {
        let catalog = VenueCatalog::default();
        assert_eq!(catalog.match_lines(&lines(&["식대 70,000원"]), 10), None);
        assert_eq!(catalog.match_lines(&[], 10), None);
    }

    #[test]
    fn test_extra_names_extend_defaults() {
        let catalog = VenueCatalog::with_defaults(["테스트홀"]);
        assert_eq!(catalog.len(), DEFAULT_VENUES.len() + 1);
    }
}
