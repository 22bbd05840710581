//! Parsing of the raw meeting strings published in the course catalog.
//!
//! A raw schedule lists one or more sessions separated by `<p>`:
//!
//! ```text
//! 월1~3(7-301)<p>수4~5(7-301)
//! ```
//!
//! Each session is a day token, a slot range (`1~3`, a single slot `4`, or a
//! comma separated run `4,5,6`) and an optional room in parentheses. Slots
//! outside `1..=SLOT_COUNT` make the session malformed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::SLOT_COUNT;
use crate::models::{DayLabel, SlotRange, TimeSlot};

const SESSION_SEPARATOR: &str = "<p>";

/// One meeting of a course as written in its schedule string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub day: DayLabel,
    pub range: SlotRange,
    pub room: String,
}

/// Parses a raw schedule string into its sessions.
///
/// Any malformed session makes the whole string parse to an empty list, so a
/// single bad catalog row never breaks the callers iterating the catalog.
pub fn parse_schedule(raw: &str) -> Vec<Session> {
    let mut sessions = Vec::new();
    for segment in raw
        .split(SESSION_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
    {
        match parse_session(segment) {
            Some(session) => sessions.push(session),
            None => {
                debug!("Discarding malformed schedule string: {:?}", raw);
                return Vec::new();
            }
        }
    }
    sessions
}

fn parse_session(segment: &str) -> Option<Session> {
    let mut chars = segment.chars();
    let day = DayLabel::from_char(chars.next()?)?;
    let rest = chars.as_str();

    let (range_part, room) = match rest.split_once('(') {
        Some((range_part, tail)) => {
            let room = tail.strip_suffix(')').unwrap_or(tail);
            (range_part, room.trim().to_string())
        }
        None => (rest, String::new()),
    };

    Some(Session {
        day,
        range: parse_range(range_part.trim())?,
        room,
    })
}

fn parse_range(spec: &str) -> Option<SlotRange> {
    let range = match spec.split_once('~') {
        Some((first, last)) => {
            let first: TimeSlot = first.trim().parse().ok()?;
            let last: TimeSlot = last.trim().parse().ok()?;
            SlotRange::inclusive(first, last).ok()?
        }
        None => spec
            .split(',')
            .map(|slot| slot.trim().parse::<TimeSlot>().ok())
            .collect::<Option<Vec<_>>>()
            .and_then(|slots| SlotRange::try_from(slots).ok())?,
    };
    let on_grid = range.first() >= 1 && range.last() <= SLOT_COUNT;
    on_grid.then_some(range)
}
