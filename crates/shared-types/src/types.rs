use serde::{Deserialize, Serialize};

/// One recognized token with its pixel bounding box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrWord {
    pub text: String,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub centroid_x: f64,
    pub centroid_y: f64,
}

impl OcrWord {
    /// Build a word from its box corners; the centroid is the box midpoint
    pub fn from_box(text: impl Into<String>, x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            text: text.into(),
            x0,
            y0,
            x1,
            y1,
            centroid_x: (x0 + x1) / 2.0,
            centroid_y: (y0 + y1) / 2.0,
        }
    }

    /// Box height, never below one pixel
    pub fn height(&self) -> f64 {
        (self.y1 - self.y0).max(1.0)
    }
}

/// Output of the OCR collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrOutput {
    pub text: String,
    #[serde(default)]
    pub words: Vec<OcrWord>,
}

/// One date/time scoped price quote.
///
/// Every field is a string and empty when the document did not yield a
/// valid value for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub date: String,
    pub day: String,
    pub time: String,
    pub rental: String,
    pub meal: String,
    pub guests: String,
    pub total_cost: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueField {
    pub v: Option<String>,
}

/// Final parse artifact for one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedOutput {
    pub venue: VenueField,
    pub estimates: Vec<Estimate>,
}
