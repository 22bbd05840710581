use serde::{Deserialize, Serialize};

/// A course as it appears in the catalog.
///
/// Lectures are immutable once loaded; schedule entries hold them behind an
/// `Arc` so every table placing the same course shares one copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: String,
    pub title: String,
    /// Credit string as published, e.g. `"3"` or `"3(2)"`
    pub credits: String,
    pub grade: u8,
    pub major: String,
    /// Raw meeting string, e.g. `"월1~3(7-301)<p>수4~5(7-301)"`
    #[serde(rename = "schedule", default)]
    pub raw_schedule: String,
}

impl Lecture {
    /// Leading integer of the credit string, if any
    pub fn credit_value(&self) -> Option<u32> {
        let digits: String = self
            .credits
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}
