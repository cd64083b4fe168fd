use std::io;

use scl_types::Stage;

use crate::records::Visibility;

/// Errors produced by ledger operations.
///
/// None of these are fatal: a failed operation leaves the chain untouched and
/// the caller may carry on with a different action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("{stage} information has already been added")]
    StageAlreadyUsed { stage: Stage },

    #[error("all {capacity} stages have been added; no more blocks can be added")]
    CapacityExceeded { capacity: usize },

    #[error("stage {stage} is already committed")]
    AlreadyCommitted { stage: Stage },

    #[error("block with block number {sequence} not found")]
    NotFound { sequence: u64 },

    #[error("block with block number {sequence} has already been soft deleted")]
    AlreadySoftDeleted { sequence: u64 },

    #[error("block with block number {sequence} has already been hard deleted")]
    AlreadyHardDeleted { sequence: u64 },

    #[error("block with block number {sequence} has been {current} and cannot be {requested}")]
    IncompatibleState {
        sequence: u64,
        current: Visibility,
        requested: Visibility,
    },
}

/// Errors produced while writing or reading an export file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed export line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("block {sequence} cannot be exported: field {field:?} {reason}")]
    Unrepresentable {
        sequence: u64,
        field: String,
        reason: &'static str,
    },
}

impl ExportError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }
}
