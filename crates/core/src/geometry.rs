//! Pixel geometry of the timetable grid.
//!
//! The grid has a header row of day labels, a header column of slot labels
//! and one fixed-size cell per (day, slot). Everything here is pure and can
//! be shared freely between readers.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{DayLabel, SlotRange, TimeSlot};

/// Number of slot rows in the default grid
pub const SLOT_COUNT: TimeSlot = 24;

/// Slots 1..=18 are half-hour slots starting at 09:00.
const DAYTIME_SLOTS: TimeSlot = 18;
const DAYTIME_START_MINUTES: i64 = 9 * 60;
const DAYTIME_SLOT_MINUTES: i64 = 30;
/// Evening slots start at 18:00, last 50 minutes and repeat every 55.
const EVENING_START_MINUTES: i64 = 18 * 60;
const EVENING_SLOT_MINUTES: i64 = 50;
const EVENING_SLOT_STRIDE: i64 = 55;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSize {
    pub width: f64,
    pub height: f64,
}

/// An axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Wall-clock extent of one slot, used for labels only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTime {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub cell: CellSize,
    pub header_column_width: f64,
    pub header_row_height: f64,
    pub slot_count: TimeSlot,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            cell: CellSize {
                width: 80.0,
                height: 30.0,
            },
            header_column_width: 120.0,
            header_row_height: 40.0,
            slot_count: SLOT_COUNT,
        }
    }
}

impl GridGeometry {
    pub fn day_labels(&self) -> &'static [DayLabel] {
        &DayLabel::ALL
    }

    pub fn day_count(&self) -> usize {
        DayLabel::ALL.len()
    }

    pub fn day_index_of(&self, day: DayLabel) -> usize {
        day.index()
    }

    /// The day at a signed column index, `None` outside `[0, day_count)`
    pub fn day_at(&self, index: i64) -> Option<DayLabel> {
        usize::try_from(index).ok().and_then(DayLabel::from_index)
    }

    pub fn contains_range(&self, range: &SlotRange) -> bool {
        range.first() >= 1 && range.last() <= self.slot_count
    }

    /// Rectangle occupied by an entry, inset by one pixel on the right and
    /// bottom edge so adjacent entries do not draw double borders.
    pub fn to_pixel_rect(&self, day: DayLabel, range: &SlotRange) -> PixelRect {
        PixelRect {
            left: self.header_column_width + self.cell.width * self.day_index_of(day) as f64,
            top: self.header_row_height + self.cell.height * (range.first() - 1) as f64,
            width: self.cell.width - 1.0,
            height: self.cell.height * range.len() as f64 - 1.0,
        }
    }

    /// Rectangle spanning every data cell, excluding both headers
    pub fn data_region(&self) -> PixelRect {
        PixelRect {
            left: self.header_column_width,
            top: self.header_row_height,
            width: self.cell.width * self.day_count() as f64,
            height: self.cell.height * self.slot_count as f64,
        }
    }

    /// Rectangle of the whole grid including headers
    pub fn bounds(&self) -> PixelRect {
        let data = self.data_region();
        PixelRect::new(0.0, 0.0, data.right(), data.bottom())
    }

    pub fn slot_time(&self, slot: TimeSlot) -> Option<SlotTime> {
        if slot < 1 || slot > self.slot_count {
            return None;
        }
        let (start, length) = if slot <= DAYTIME_SLOTS {
            (
                DAYTIME_START_MINUTES + DAYTIME_SLOT_MINUTES * (slot - 1) as i64,
                DAYTIME_SLOT_MINUTES,
            )
        } else {
            (
                EVENING_START_MINUTES + EVENING_SLOT_STRIDE * (slot - DAYTIME_SLOTS - 1) as i64,
                EVENING_SLOT_MINUTES,
            )
        };
        let midnight = NaiveTime::MIN;
        Some(SlotTime {
            start: midnight + Duration::minutes(start),
            end: midnight + Duration::minutes(start + length),
        })
    }

    /// Header label of a slot, e.g. `09:00~09:30`
    pub fn slot_label(&self, slot: TimeSlot) -> Option<String> {
        self.slot_time(slot).map(|time| {
            format!(
                "{}~{}",
                time.start.format("%H:%M"),
                time.end.format("%H:%M")
            )
        })
    }
}
