use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TimetableError;

/// A weekday column of the timetable grid.
///
/// Variant order is the column order of the grid and therefore the sign of
/// horizontal drag deltas: moving right increases the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayLabel {
    #[serde(rename = "월")]
    Mon,
    #[serde(rename = "화")]
    Tue,
    #[serde(rename = "수")]
    Wed,
    #[serde(rename = "목")]
    Thu,
    #[serde(rename = "금")]
    Fri,
    #[serde(rename = "토")]
    Sat,
}

impl DayLabel {
    /// All day labels in grid column order
    pub const ALL: [DayLabel; 6] = [
        DayLabel::Mon,
        DayLabel::Tue,
        DayLabel::Wed,
        DayLabel::Thu,
        DayLabel::Fri,
        DayLabel::Sat,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The token used in raw schedule strings and on the grid header
    pub fn token(self) -> &'static str {
        match self {
            DayLabel::Mon => "월",
            DayLabel::Tue => "화",
            DayLabel::Wed => "수",
            DayLabel::Thu => "목",
            DayLabel::Fri => "금",
            DayLabel::Sat => "토",
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|day| day.token().starts_with(c))
    }
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for DayLabel {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|day| day.token() == s)
            .ok_or_else(|| TimetableError::Validation(format!("Unknown day label: {}", s)))
    }
}
