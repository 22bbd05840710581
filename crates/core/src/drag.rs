//! # Drag Reposition
//!
//! Turns pointer drags of an entry into grid moves.
//!
//! A drag is started with [`DragEngine::begin`], which hands back a
//! [`DragSession`] owned by the caller. Movement frames are pure arithmetic on
//! the session and never touch the store; only [`DragSession::finish`] commits.
//! At most one session exists per `tableId:entryIndex` at a time, sessions for
//! different entries never wait on each other.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{TimetableError, TimetableResult};
use crate::geometry::{GridGeometry, PixelRect};
use crate::models::{DayLabel, SlotRange, TableId};
use crate::store::{ScheduleActions, ScheduleReader};

/// Identifies the dragged entry, rendered as `tableId:entryIndex`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DragKey {
    pub table_id: TableId,
    pub entry_index: usize,
}

impl DragKey {
    pub fn new(table_id: impl Into<TableId>, entry_index: usize) -> Self {
        Self {
            table_id: table_id.into(),
            entry_index,
        }
    }
}

impl fmt::Display for DragKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table_id, self.entry_index)
    }
}

/// A pixel offset relative to the entry's resting position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What the engine does with drops that push the range off the last slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlotOverflow {
    /// Only the day axis is validated
    #[default]
    Allow,
    /// Drops leaving `1..=slot_count` are discarded like day overflow
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    DayOutOfRange,
    SlotOutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The store was updated
    Moved { day: DayLabel, time_offset: i32 },
    /// The entry snaps back; nothing was written
    Discarded(DiscardReason),
}

/// Rounds a delta to the nearest whole number of cells, ties away from zero
pub fn snap(delta: f64, cell: f64) -> f64 {
    (delta / cell).round() * cell
}

/// Snaps a cumulative pointer delta and clamps it so the dragged element
/// stays inside `container` and off the header row and column.
pub fn snap_and_clamp(
    geometry: &GridGeometry,
    delta: Offset,
    element: &PixelRect,
    container: &PixelRect,
) -> Offset {
    let x = snap(delta.x, geometry.cell.width);
    let y = snap(delta.y, geometry.cell.height);

    let min_x = container.left - element.left + geometry.header_column_width + 1.0;
    let max_x = container.right() - element.right();
    let min_y = container.top - element.top + geometry.header_row_height + 1.0;
    let max_y = container.bottom() - element.bottom();

    // max then min: when the bounds cross, the far edge wins
    Offset {
        x: x.max(min_x).min(max_x),
        y: y.max(min_y).min(max_y),
    }
}

struct EngineInner {
    geometry: GridGeometry,
    reader: ScheduleReader,
    actions: ScheduleActions,
    overflow: SlotOverflow,
    active: Mutex<HashSet<DragKey>>,
}

impl EngineInner {
    fn release(&self, key: &DragKey) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Hands out drag sessions over one store.
///
/// The engine only tracks which keys are being dragged. Each session owns
/// its own offset, so movement frames never contend with other drags.
#[derive(Clone)]
pub struct DragEngine {
    inner: Arc<EngineInner>,
}

impl DragEngine {
    /// Creates an engine with the default [`SlotOverflow::Allow`] policy
    pub fn new(geometry: GridGeometry, reader: ScheduleReader, actions: ScheduleActions) -> Self {
        Self::with_overflow(geometry, reader, actions, SlotOverflow::default())
    }

    pub fn with_overflow(
        geometry: GridGeometry,
        reader: ScheduleReader,
        actions: ScheduleActions,
        overflow: SlotOverflow,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                geometry,
                reader,
                actions,
                overflow,
                active: Mutex::new(HashSet::new()),
            }),
        }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.inner.geometry
    }

    pub fn is_dragging(&self, key: &DragKey) -> bool {
        self.inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// Starts dragging an entry, recording where it started.
    ///
    /// # Returns
    ///
    /// * `TimetableResult<DragSession>` - The session owning this drag
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The table does not exist (`UnknownTable`)
    /// - The entry index is out of range (`EntryIndexOutOfRange`)
    /// - The entry is already being dragged (`Validation`)
    pub fn begin(&self, key: DragKey) -> TimetableResult<DragSession> {
        let snapshot = self.inner.reader.snapshot();
        let entries = snapshot
            .entries(&key.table_id)
            .ok_or_else(|| TimetableError::UnknownTable(key.table_id.clone()))?;
        let entry = entries
            .get(key.entry_index)
            .ok_or_else(|| TimetableError::EntryIndexOutOfRange {
                table_id: key.table_id.clone(),
                index: key.entry_index,
                len: entries.len(),
            })?;

        let inserted = self
            .inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        if !inserted {
            return Err(TimetableError::Validation(format!(
                "Entry {} is already being dragged",
                key
            )));
        }

        debug!("Drag started for {} on {}", key, entry.day);
        Ok(DragSession {
            engine: Arc::clone(&self.inner),
            start_day: entry.day,
            range: entry.range,
            offset: Offset::default(),
            key,
            open: true,
        })
    }
}

/// One in-progress drag.
///
/// Dropping the session without calling [`DragSession::finish`] cancels it.
pub struct DragSession {
    engine: Arc<EngineInner>,
    key: DragKey,
    start_day: DayLabel,
    range: SlotRange,
    offset: Offset,
    open: bool,
}

impl DragSession {
    pub fn key(&self) -> &DragKey {
        &self.key
    }

    pub fn start_day(&self) -> DayLabel {
        self.start_day
    }

    /// The clamped visual offset from the latest movement frame
    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// Handles one movement frame and returns the offset to render.
    pub fn update(&mut self, delta: Offset, element: &PixelRect, container: &PixelRect) -> Offset {
        self.offset = snap_and_clamp(&self.engine.geometry, delta, element, container);
        self.offset
    }

    /// Converts the last offset to a grid move and commits it.
    ///
    /// Out-of-range moves are discarded without touching the store. A zero
    /// offset is committed as a no-op move.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the commit is rejected, e.g. the
    /// entry was removed while it was being dragged.
    pub fn finish(mut self) -> TimetableResult<DropOutcome> {
        self.open = false;
        self.engine.release(&self.key);

        let geometry = &self.engine.geometry;
        let day_delta = (self.offset.x / geometry.cell.width).round() as i64;
        let time_delta = (self.offset.y / geometry.cell.height).round() as i32;

        let new_index = geometry.day_index_of(self.start_day) as i64 + day_delta;
        let Some(day) = geometry.day_at(new_index) else {
            warn!("Discarding drag of {}: day index {} out of range", self.key, new_index);
            return Ok(DropOutcome::Discarded(DiscardReason::DayOutOfRange));
        };

        if self.engine.overflow == SlotOverflow::Reject
            && !self
                .range
                .shifted(time_delta)
                .is_ok_and(|range| geometry.contains_range(&range))
        {
            warn!("Discarding drag of {}: slot offset {} leaves the grid", self.key, time_delta);
            return Ok(DropOutcome::Discarded(DiscardReason::SlotOutOfRange));
        }

        self.engine.actions.update_entry_position(
            &self.key.table_id,
            self.key.entry_index,
            day,
            time_delta,
        )?;
        debug!("Drag of {} dropped on {} with offset {}", self.key, day, time_delta);
        Ok(DropOutcome::Moved {
            day,
            time_offset: time_delta,
        })
    }

    /// Abandons the drag without writing anything
    pub fn cancel(self) {
        debug!("Drag of {} cancelled", self.key);
    }
}

impl Drop for DragSession {
    fn drop(&mut self) {
        if self.open {
            self.engine.release(&self.key);
        }
    }
}
