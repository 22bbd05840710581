use serde::{Deserialize, Serialize};

use crate::errors::{TimetableError, TimetableResult};

/// One-based index of a grid row.
///
/// Signed so that a shifted range can be represented even when it leaves
/// the grid; only the drag engine decides whether that is allowed.
pub type TimeSlot = i32;

/// A contiguous ascending run of time slots.
///
/// Serialized as the explicit list of slots, e.g. `[2, 3, 4]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<TimeSlot>", into = "Vec<TimeSlot>")]
pub struct SlotRange {
    start: TimeSlot,
    len: u32,
}

impl SlotRange {
    /// # Errors
    ///
    /// Returns `Validation` when `len` is zero or the last slot does not fit
    /// in a `TimeSlot`.
    pub fn new(start: TimeSlot, len: u32) -> TimetableResult<Self> {
        if len == 0 {
            return Err(TimetableError::Validation(
                "Slot range must not be empty".to_string(),
            ));
        }
        let fits = TimeSlot::try_from(len - 1)
            .ok()
            .and_then(|extent| start.checked_add(extent))
            .is_some();
        if !fits {
            return Err(TimetableError::Validation(format!(
                "Slot range of {} slots from {} overflows",
                len, start
            )));
        }
        Ok(Self { start, len })
    }

    /// Range covering `first..=last`
    pub fn inclusive(first: TimeSlot, last: TimeSlot) -> TimetableResult<Self> {
        if last < first {
            return Err(TimetableError::Validation(format!(
                "Slot range {}~{} is descending",
                first, last
            )));
        }
        let len = u32::try_from(i64::from(last) - i64::from(first) + 1).map_err(|_| {
            TimetableError::Validation(format!("Slot range {}~{} is too long", first, last))
        })?;
        Self::new(first, len)
    }

    pub fn first(&self) -> TimeSlot {
        self.start
    }

    pub fn last(&self) -> TimeSlot {
        self.start + self.len as TimeSlot - 1
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn contains(&self, slot: TimeSlot) -> bool {
        (self.first()..=self.last()).contains(&slot)
    }

    /// The same range moved by `offset` slots; contiguity is preserved.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the moved range does not fit in a `TimeSlot`.
    pub fn shifted(&self, offset: i32) -> TimetableResult<Self> {
        let start = self.start.checked_add(offset).ok_or_else(|| {
            TimetableError::Validation(format!(
                "Shifting slot {} by {} overflows",
                self.start, offset
            ))
        })?;
        Self::new(start, self.len)
    }

    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> {
        self.first()..=self.last()
    }
}

impl TryFrom<Vec<TimeSlot>> for SlotRange {
    type Error = TimetableError;

    fn try_from(slots: Vec<TimeSlot>) -> Result<Self, Self::Error> {
        let Some(&first) = slots.first() else {
            return Err(TimetableError::Validation(
                "Slot range must not be empty".to_string(),
            ));
        };
        let contiguous = slots
            .iter()
            .zip(first..)
            .all(|(&slot, expected)| slot == expected);
        if !contiguous {
            return Err(TimetableError::Validation(format!(
                "Slots {:?} are not a contiguous ascending run",
                slots
            )));
        }
        Self::new(first, slots.len() as u32)
    }
}

impl From<SlotRange> for Vec<TimeSlot> {
    fn from(range: SlotRange) -> Self {
        range.slots().collect()
    }
}
