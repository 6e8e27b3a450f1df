//! Error kinds surfaced by the data core.
//!
//! Command handlers wrap these in `anyhow` with context; library callers can
//! match on the variants directly.

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SheetError>;

#[derive(Debug, Error)]
pub enum SheetError {
    /// The uploaded bytes are not a spreadsheet we can parse.
    #[error("Unreadable source: {0}")]
    UnreadableSource(String),
    /// The rows parsed but their column sets cannot be reconciled.
    #[error("Malformed source: {0}")]
    MalformedSource(String),
    /// An append was rejected by the uniqueness policy.
    #[error("Duplicate entry: '{value}' in column '{column}' already present at row {row}")]
    DuplicateEntry {
        column: String,
        value: String,
        row: usize,
    },
    /// An append was rejected because an identical row already exists.
    #[error("Duplicate entry: row [{}] already present at row {row}", .values.join(", "))]
    DuplicateRow { values: Vec<String>, row: usize },
    #[error("Column '{0}' not found")]
    UnknownColumn(String),
    #[error("No source has been loaded for this session")]
    NotLoaded,
    #[error("Export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SheetError {
    /// Rejections the user can fix by editing the candidate row.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SheetError::DuplicateEntry { .. }
                | SheetError::DuplicateRow { .. }
                | SheetError::UnknownColumn(_)
        )
    }
}
