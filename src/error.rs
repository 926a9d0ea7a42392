//! Errors raised by the timeline core.

use thiserror::Error;

use crate::model::ItemId;

/// Errors that can occur while building, packing, or editing a timeline.
#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Item {0} not found")]
    UnknownItem(ItemId),

    #[error("Duplicate item id {0}")]
    DuplicateId(ItemId),

    #[error("Another gesture is already in progress")]
    GestureInProgress,

    #[error("Date arithmetic left the supported calendar range")]
    DateOutOfRange,

    #[error("Pixels per day must be a positive finite number, got {0}")]
    InvalidScale(f32),

    #[error("Row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("Missing required columns: {0}")]
    MissingColumns(String),

    #[error("Failed to read items file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse items JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T, E = TimelineError> = std::result::Result<T, E>;
