use scl_types::Stage;

use crate::error::LedgerError;

/// Which stages already have a block.
///
/// Flags only ever go from uncommitted to committed. Stages carry no
/// ordering: any free stage may be committed next.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageTracker {
    committed: [bool; Stage::COUNT],
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_committed(&self, stage: Stage) -> bool {
        self.committed[stage.index()]
    }

    /// Mark `stage` as committed.
    pub fn commit(&mut self, stage: Stage) -> Result<(), LedgerError> {
        let slot = &mut self.committed[stage.index()];
        if *slot {
            return Err(LedgerError::AlreadyCommitted { stage });
        }
        *slot = true;
        Ok(())
    }

    pub fn committed_count(&self) -> usize {
        self.committed.iter().filter(|c| **c).count()
    }

    /// Returns `true` once all stages are committed.
    pub fn is_complete(&self) -> bool {
        self.committed_count() == Stage::COUNT
    }

    /// Stages still free, in canonical order.
    pub fn remaining(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ALL.into_iter().filter(|s| !self.is_committed(*s))
    }

    /// Committed stages, in canonical order.
    pub fn committed(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ALL.into_iter().filter(|s| self.is_committed(*s))
    }
}
