use scl_types::{Field, Stage};

use crate::error::LedgerError;
use crate::records::{Record, Records};
use crate::stages::StageTracker;

/// Write boundary for ledger mutations.
///
/// The ledger has a single writer, so mutation takes `&mut self`.
pub trait LedgerWriter {
    /// Append a block for `stage`, chained to the current head.
    ///
    /// `fields` are stored after a synthetic leading `Block` field naming the
    /// stage. Fails without touching the chain when every stage is already
    /// committed or when `stage` is.
    fn append(&mut self, stage: Stage, fields: Vec<Field>) -> Result<Record, LedgerError>;

    /// Hide a block's fields from display while keeping its envelope visible.
    fn soft_delete(&mut self, sequence: u64) -> Result<(), LedgerError>;

    /// Hide a block from display entirely.
    fn hard_delete(&mut self, sequence: u64) -> Result<(), LedgerError>;
}

/// Read boundary for lookup and traversal.
///
/// Nothing here consults visibility; see [`crate::ProjectionBuilder`] for the
/// display rules.
pub trait LedgerReader {
    /// Most recently appended block (genesis on a fresh ledger).
    fn head(&self) -> &Record;

    /// Head-first walk over every block.
    fn records(&self) -> Records<'_>;

    /// Block with the given sequence number, whatever its visibility.
    fn find_by_sequence(&self, sequence: u64) -> Option<&Record> {
        self.records().find(|r| r.sequence() == sequence)
    }

    /// Number of blocks, genesis included.
    fn record_count(&self) -> u64;

    fn stages(&self) -> &StageTracker;
}
