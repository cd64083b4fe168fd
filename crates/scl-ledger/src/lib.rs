//! Append-only block ledger for the Supply Chain Ledger (SCL).
//!
//! This crate is the heart of SCL. It provides:
//! - `Record` blocks chained to their predecessor by an opaque hash
//! - `StageTracker` enforcing at most one block per supply-chain stage
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - `InMemoryLedger`, the single-writer session ledger
//! - The soft/hard deletion state machine and its display projection
//! - Flat-text export, re-parsing, and chain validation

pub mod error;
pub mod export;
pub mod memory;
pub mod projection;
pub mod records;
pub mod stages;
pub mod traits;
pub mod validation;

pub use error::{ExportError, LedgerError};
pub use export::{export_to_path, parse_export, read_export, render_export, ExportedRecord};
pub use memory::InMemoryLedger;
pub use projection::{ProjectionBuilder, RecordView};
pub use records::{Record, Records, Visibility, BLOCK_FIELD};
pub use stages::StageTracker;
pub use traits::{LedgerReader, LedgerWriter};
pub use validation::{ChainLink, ChainValidator, GapPolicy, ValidationReport, Violation, ViolationKind};
