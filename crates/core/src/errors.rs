use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimetableError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Cannot remove the last remaining table")]
    LastTable,

    #[error("Entry index {index} out of range for table {table_id} with {len} entries")]
    EntryIndexOutOfRange {
        table_id: String,
        index: usize,
        len: usize,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type TimetableResult<T> = Result<T, TimetableError>;
