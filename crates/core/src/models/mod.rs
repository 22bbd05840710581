pub mod day;
pub mod lecture;
pub mod schedule;
pub mod time_slot;

pub use day::DayLabel;
pub use lecture::Lecture;
pub use schedule::{ScheduleEntry, Table, TableId};
pub use time_slot::{SlotRange, TimeSlot};
