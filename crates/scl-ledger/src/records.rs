use std::fmt;
use std::iter::Rev;
use std::slice;

use scl_types::{BlockHash, Field, Stage, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Name of the synthetic field that leads every appended block.
pub const BLOCK_FIELD: &str = "Block";

/// Visibility of a block.
///
/// Every block starts `Live`. Soft and hard deletion are separate terminal
/// branches: once a block has taken one, the other is refused and nothing
/// leads back to `Live`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Live,
    /// Existence shown, fields hidden.
    SoftDeleted,
    /// Hidden from display entirely.
    HardDeleted,
}

impl Visibility {
    pub fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }

    pub fn is_soft_deleted(self) -> bool {
        matches!(self, Self::SoftDeleted)
    }

    pub fn is_hard_deleted(self) -> bool {
        matches!(self, Self::HardDeleted)
    }

    /// Guarded transition to `target`, which must be one of the two deleted
    /// states.
    pub(crate) fn transition(&mut self, target: Visibility, sequence: u64) -> Result<(), LedgerError> {
        match (*self, target) {
            (Self::Live, Self::SoftDeleted | Self::HardDeleted) => {
                *self = target;
                Ok(())
            }
            (Self::SoftDeleted, Self::SoftDeleted) => Err(LedgerError::AlreadySoftDeleted { sequence }),
            (Self::HardDeleted, Self::HardDeleted) => Err(LedgerError::AlreadyHardDeleted { sequence }),
            (current, requested) => Err(LedgerError::IncompatibleState {
                sequence,
                current,
                requested,
            }),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::SoftDeleted => write!(f, "soft deleted"),
            Self::HardDeleted => write!(f, "hard deleted"),
        }
    }
}

/// One block of the chain.
///
/// Everything except the visibility is fixed when the block is created;
/// visibility only changes through the ledger's delete operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    sequence: u64,
    hash: BlockHash,
    prev_hash: BlockHash,
    created_at: Timestamp,
    fields: Vec<Field>,
    visibility: Visibility,
}

impl Record {
    /// The first block: sequence 0, no fields, chained to itself.
    pub(crate) fn genesis(hash: BlockHash, created_at: Timestamp) -> Self {
        Self {
            sequence: 0,
            prev_hash: hash.clone(),
            hash,
            created_at,
            fields: Vec::new(),
            visibility: Visibility::Live,
        }
    }

    pub(crate) fn new(
        sequence: u64,
        hash: BlockHash,
        prev_hash: BlockHash,
        created_at: Timestamp,
        fields: Vec<Field>,
    ) -> Self {
        Self {
            sequence,
            hash,
            prev_hash,
            created_at,
            fields,
            visibility: Visibility::Live,
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    pub fn prev_hash(&self) -> &BlockHash {
        &self.prev_hash
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_genesis(&self) -> bool {
        self.sequence == 0
    }

    /// Value of the first field called `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Stage named by the leading `Block` field; `None` for genesis.
    pub fn stage(&self) -> Option<Stage> {
        self.field(BLOCK_FIELD).and_then(Stage::from_display_name)
    }

    pub(crate) fn visibility_mut(&mut self) -> &mut Visibility {
        &mut self.visibility
    }
}

/// Head-first traversal over a ledger's blocks.
///
/// Each call to `records()` starts a fresh walk from the head.
#[derive(Clone, Debug)]
pub struct Records<'a> {
    inner: Rev<slice::Iter<'a, Record>>,
}

impl<'a> Records<'a> {
    /// `chain` is in append order (genesis first).
    pub(crate) fn new(chain: &'a [Record]) -> Self {
        Self {
            inner: chain.iter().rev(),
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Records<'_> {}
