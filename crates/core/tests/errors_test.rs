use timetable_core::errors::{TimetableError, TimetableResult};

#[test]
fn test_timetable_error_display() {
    let unknown = TimetableError::UnknownTable("schedule-9".to_string());
    let last = TimetableError::LastTable;
    let index = TimetableError::EntryIndexOutOfRange {
        table_id: "schedule-1".to_string(),
        index: 4,
        len: 2,
    };
    let validation = TimetableError::Validation("Invalid input".to_string());

    assert_eq!(unknown.to_string(), "Unknown table: schedule-9");
    assert_eq!(last.to_string(), "Cannot remove the last remaining table");
    assert_eq!(
        index.to_string(),
        "Entry index 4 out of range for table schedule-1 with 2 entries"
    );
    assert_eq!(validation.to_string(), "Validation error: Invalid input");
}

#[test]
fn test_timetable_result() {
    let result: TimetableResult<i32> = Ok(42);
    assert_eq!(result.unwrap(), 42);

    let result: TimetableResult<i32> = Err(TimetableError::LastTable);
    assert!(result.is_err());
}
