use std::sync::Arc;

use crate::errors::TimetableResult;
use crate::models::{DayLabel, Lecture, SlotRange};
use crate::parser::parse_schedule;

pub type TableId = String;

/// One placed session of a course on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub day: DayLabel,
    pub range: SlotRange,
    pub room: String,
    pub lecture: Arc<Lecture>,
}

impl ScheduleEntry {
    /// Expands a lecture into one entry per parsed session.
    ///
    /// A lecture whose schedule string does not parse yields no entries.
    pub fn from_lecture(lecture: Arc<Lecture>) -> Vec<ScheduleEntry> {
        parse_schedule(&lecture.raw_schedule)
            .into_iter()
            .map(|session| ScheduleEntry {
                day: session.day,
                range: session.range,
                room: session.room,
                lecture: Arc::clone(&lecture),
            })
            .collect()
    }

    /// A copy placed on `day` with every slot shifted by `time_offset`
    pub fn moved(&self, day: DayLabel, time_offset: i32) -> TimetableResult<ScheduleEntry> {
        Ok(ScheduleEntry {
            day,
            range: self.range.shifted(time_offset)?,
            room: self.room.clone(),
            lecture: Arc::clone(&self.lecture),
        })
    }

    pub fn occupies(&self, day: DayLabel, slot: i32) -> bool {
        self.day == day && self.range.contains(slot)
    }
}

/// One independent timetable.
///
/// The entry list sits behind an `Arc` so that snapshots which did not touch
/// this table share its storage with the previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub id: TableId,
    entries: Arc<Vec<ScheduleEntry>>,
}

impl Table {
    pub fn new(id: impl Into<TableId>, entries: Vec<ScheduleEntry>) -> Self {
        Self {
            id: id.into(),
            entries: Arc::new(entries),
        }
    }

    pub fn empty(id: impl Into<TableId>) -> Self {
        Self::new(id, Vec::new())
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Shared handle to the entry list, stable until the table is written
    pub fn shared_entries(&self) -> Arc<Vec<ScheduleEntry>> {
        Arc::clone(&self.entries)
    }

    pub fn with_entries(&self, entries: Vec<ScheduleEntry>) -> Table {
        Table::new(self.id.clone(), entries)
    }
}
