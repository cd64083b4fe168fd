use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid stage number {0}: expected 1-8")]
    InvalidStageNumber(u8),

    #[error("unknown stage: {0}")]
    UnknownStage(String),
}
