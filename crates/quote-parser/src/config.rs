//! Tunable parameters of the extraction heuristics
//!
//! Defaults reproduce the tuned behavior on real quote sheets. They are
//! empirical, so everything here can be overridden from the worker's TOML
//! configuration and re-validated against a labeled corpus.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Lines scanned at each end of the document for the venue name
    pub venue_scan_lines: usize,
    /// Lines after a date anchor searched first for the meal price
    pub meal_near_lines: usize,
    /// Lines from a base/promo header, the header included, searched for a
    /// promotional meal price
    pub promo_meal_window: usize,
    /// Visual lines from a base/promo header, the header included, searched
    /// for the promotional total
    pub promo_total_window: usize,
    /// Lines from a total label, the label included, searched for the
    /// document-level total
    pub total_followup_lines: usize,
    /// Offset from UTC of the calendar the quotes are written in
    pub utc_offset_hours: i32,
    pub guests: GuestScoring,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            venue_scan_lines: 10,
            meal_near_lines: 6,
            promo_meal_window: 25,
            promo_total_window: 45,
            total_followup_lines: 12,
            utc_offset_hours: 9,
            guests: GuestScoring::default(),
        }
    }
}

/// Score weights of the guest-count heuristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuestScoring {
    /// Base score of a number followed by 명
    pub unit_base: i32,
    /// Bonus when a 명 line also carries a guest label
    pub keyword_bonus: i32,
    /// Penalty when 명 sits inside parentheses
    pub paren_penalty: i32,
    /// Bonus for a bare number on a guest-label line
    pub keyword_line: i32,
    /// Bonus when a guest label is within the proximity window
    pub keyword_near: i32,
    /// Bonus for a number early in its line
    pub early_position: i32,
    /// Character index up to which the early-position bonus applies
    pub early_position_chars: usize,
    /// Penalty for a bare number on a money line
    pub money_penalty: i32,
    /// Characters on each side of a number checked for time/guest context
    pub proximity_chars: usize,
}

impl Default for GuestScoring {
    fn default() -> Self {
        Self {
            unit_base: 100,
            keyword_bonus: 30,
            paren_penalty: 10,
            keyword_line: 60,
            keyword_near: 25,
            early_position: 5,
            early_position_chars: 12,
            money_penalty: 20,
            proximity_chars: 6,
        }
    }
}
