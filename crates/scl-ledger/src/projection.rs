use std::fmt;

use scl_types::{BlockHash, Field, Timestamp};

use crate::records::Record;
use crate::traits::LedgerReader;

/// A block as it is presented to a reader.
///
/// `fields` is `None` when the content is hidden (soft-deleted blocks under
/// the display rule). Rendered with `Display` as a single line:
///
/// ```text
/// Block 1 | <hash> | <prev> | <time> information: Block: Procurement Information | Supplier ID: SID12345
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordView<'a> {
    pub sequence: u64,
    pub hash: &'a BlockHash,
    pub prev_hash: &'a BlockHash,
    pub created_at: &'a Timestamp,
    pub fields: Option<&'a [Field]>,
}

impl<'a> RecordView<'a> {
    /// Everything, regardless of visibility. Used by search.
    pub fn full(record: &'a Record) -> Self {
        Self {
            sequence: record.sequence(),
            hash: record.hash(),
            prev_hash: record.prev_hash(),
            created_at: record.created_at(),
            fields: Some(record.fields()),
        }
    }

    /// Display rule: live blocks in full, soft-deleted blocks as envelope
    /// only, hard-deleted blocks not at all.
    pub fn display(record: &'a Record) -> Option<Self> {
        let visibility = record.visibility();
        if visibility.is_hard_deleted() {
            return None;
        }
        let mut view = Self::full(record);
        if visibility.is_soft_deleted() {
            view.fields = None;
        }
        Some(view)
    }
}

impl fmt::Display for RecordView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block {} | {} | {} | {}",
            self.sequence, self.hash, self.prev_hash, self.created_at
        )?;
        if let Some(fields) = self.fields {
            f.write_str(" information:")?;
            for (i, field) in fields.iter().enumerate() {
                let sep = if i == 0 { " " } else { " | " };
                write!(f, "{sep}{field}")?;
            }
        }
        Ok(())
    }
}

/// Read-side views over a ledger.
pub struct ProjectionBuilder;

impl ProjectionBuilder {
    /// Head-first display traversal: hard-deleted blocks skipped,
    /// soft-deleted blocks without fields.
    pub fn display<R: LedgerReader>(reader: &R) -> impl Iterator<Item = RecordView<'_>> {
        reader.records().filter_map(RecordView::display)
    }

    /// A single block under the display rule; hard-deleted blocks are
    /// reported as absent.
    pub fn display_one<R: LedgerReader>(reader: &R, sequence: u64) -> Option<RecordView<'_>> {
        reader.find_by_sequence(sequence).and_then(RecordView::display)
    }

    /// Head-first search traversal: every block with every field.
    pub fn search<R: LedgerReader>(reader: &R) -> impl Iterator<Item = RecordView<'_>> {
        reader.records().map(RecordView::full)
    }

    /// A single block in full, whatever its visibility.
    pub fn search_one<R: LedgerReader>(reader: &R, sequence: u64) -> Option<RecordView<'_>> {
        reader.find_by_sequence(sequence).map(RecordView::full)
    }
}
