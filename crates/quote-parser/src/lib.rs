//! Rule-based extraction of wedding-venue price quotes from OCR output
//!
//! Text is normalized into lines, the venue is matched against a catalog,
//! and the lines are split into one block per detected date. Each block is
//! read field by field with chains of heuristic extractors; fields a block
//! leaves empty fall back to document-wide values. Every numeric field is
//! range-checked before it is accepted.

pub mod blocks;
pub mod calendar;
pub mod config;
pub mod dates;
pub mod document;
pub mod extractors;
pub mod layout;
pub mod normalize;
pub mod patterns;
pub mod venue;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use shared_types::{Estimate, OcrWord, ParsedOutput, VenueField};

pub use blocks::{split_into_date_blocks, DateBlock};
pub use config::{ExtractionConfig, GuestScoring};
pub use document::DocumentFallbacks;
pub use layout::{group_words_into_lines, LayoutPromoResolver, VisualLine};
pub use normalize::normalize_lines;
pub use venue::{VenueCatalog, DEFAULT_VENUES};

use extractors::day::day_chain;
use extractors::guests::GuestExtractor;
use extractors::meal::block_meal_chain;
use extractors::rental::block_rental_chain;
use extractors::time::TimeExtractor;
use extractors::total::block_total_chain;
use extractors::FieldExtractor;

fn field<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// QuoteParser entry point
#[derive(Debug, Clone, Default)]
pub struct QuoteParser {
    config: ExtractionConfig,
    venues: VenueCatalog,
}

impl QuoteParser {
    pub fn new(config: ExtractionConfig, venues: VenueCatalog) -> Self {
        Self { config, venues }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Calendar date of `now` where the quotes are written
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        match FixedOffset::east_opt(self.config.utc_offset_hours * 3600) {
            Some(offset) => now.with_timezone(&offset).date_naive(),
            None => {
                tracing::warn!(
                    utc_offset_hours = self.config.utc_offset_hours,
                    "invalid UTC offset, using UTC"
                );
                now.date_naive()
            }
        }
    }

    /// Parse OCR output as of the instant `now`
    pub fn parse(&self, text: &str, now: DateTime<Utc>, words: &[OcrWord]) -> ParsedOutput {
        self.parse_at(text, self.local_date(now), words)
    }

    /// Parse OCR output with `today` as the reference date for year inference
    pub fn parse_at(&self, text: &str, today: NaiveDate, words: &[OcrWord]) -> ParsedOutput {
        let lines = normalize_lines(text);
        let venue = self.venues.match_lines(&lines, self.config.venue_scan_lines);
        let fallbacks = DocumentFallbacks::compute(&lines, words, &self.config);
        let blocks = split_into_date_blocks(&lines, today);

        tracing::debug!(
            lines = lines.len(),
            blocks = blocks.len(),
            words = words.len(),
            venue = ?venue,
            "segmented quote"
        );

        let mut estimates: Vec<Estimate> = blocks
            .iter()
            .map(|block| self.estimate_for(block, &fallbacks))
            .collect();

        // A single quote with a promotional column: the layout reading is
        // more reliable than the text-order guess
        if let (Some(promo), [only]) = (fallbacks.promo_total, estimates.as_mut_slice()) {
            only.total_cost = promo.to_string();
        }

        ParsedOutput {
            venue: VenueField { v: venue },
            estimates,
        }
    }

    fn estimate_for(&self, block: &DateBlock, fallbacks: &DocumentFallbacks) -> Estimate {
        let lines = &block.lines;

        let guests = GuestExtractor::new(&self.config.guests)
            .extract(lines)
            .or(fallbacks.guests);
        let meal = block_meal_chain(self.config.meal_near_lines)
            .extract(lines)
            .or(fallbacks.meal);
        let rental = block_rental_chain().extract(lines).or(fallbacks.rental);
        let total = block_total_chain().extract(lines).or(fallbacks.total);

        let estimate = Estimate {
            date: block.iso_date(),
            day: field(day_chain(block.date).extract(lines)),
            time: field(TimeExtractor.extract(lines)),
            rental: field(rental),
            meal: field(meal),
            guests: field(guests),
            total_cost: field(total),
        };
        tracing::trace!(?estimate, "block estimate");
        estimate
    }
}
