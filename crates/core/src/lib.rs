//! # Timetable Core
//!
//! Grid state and drag-reposition engine for weekly course timetables.
//!
//! - **Models**: day labels, time slots, lectures, schedule entries and tables
//! - **Geometry**: conversion between grid coordinates and pixel rectangles
//! - **Parser**: expands a lecture's raw schedule string into sessions
//! - **Store**: the multi-table state container with separate read and write handles
//! - **Drag**: snapping, clamping and committing pointer drags
//! - **Search**: filtering and paging the course catalog

/// Drag-reposition state machine
pub mod drag;
/// Error types shared by every write path
pub mod errors;
/// Pixel geometry of the timetable grid
pub mod geometry;
/// Domain models
pub mod models;
/// Raw schedule string parsing
pub mod parser;
/// Catalog filtering and paging
pub mod search;
/// Multi-table state container
pub mod store;

pub use errors::{TimetableError, TimetableResult};
