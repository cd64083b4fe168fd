use std::collections::HashSet;

use scl_types::{BlockHash, Field, IdentifierGenerator, Stage, Timestamp};
use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::records::{Record, Records, Visibility, BLOCK_FIELD};
use crate::stages::StageTracker;
use crate::traits::{LedgerReader, LedgerWriter};

/// In-memory session ledger.
///
/// Blocks are kept in append order and walked in reverse, so the head is the
/// last element. The vector is never shrunk: deletion only changes a block's
/// visibility.
#[derive(Debug)]
pub struct InMemoryLedger {
    chain: Vec<Record>,
    stages: StageTracker,
    identifiers: IdentifierGenerator,
    seen_hashes: HashSet<BlockHash>,
}

impl InMemoryLedger {
    /// Create a ledger seeded from operating-system entropy.
    pub fn new() -> Self {
        Self::with_generator(IdentifierGenerator::from_entropy())
    }

    /// Create a ledger whose hashes are reproducible from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::with_generator(IdentifierGenerator::seeded(seed))
    }

    /// Create a ledger drawing hashes from `identifiers`.
    /// The genesis block is created immediately.
    pub fn with_generator(mut identifiers: IdentifierGenerator) -> Self {
        let hash = identifiers.next_hash();
        let genesis = Record::genesis(hash.clone(), Timestamp::now());
        debug!(hash = %hash, "genesis block created");

        Self {
            chain: vec![genesis],
            stages: StageTracker::new(),
            identifiers,
            seen_hashes: HashSet::from([hash]),
        }
    }

    /// The genesis block.
    pub fn genesis(&self) -> &Record {
        &self.chain[0]
    }

    /// Sequence number the next appended block will receive.
    pub fn next_sequence(&self) -> u64 {
        self.chain.len() as u64
    }

    /// The ledger's random source, for collaborators that must share it
    /// (e.g. generated return numbers).
    pub fn identifiers(&mut self) -> &mut IdentifierGenerator {
        &mut self.identifiers
    }

    fn transition(&mut self, sequence: u64, target: Visibility) -> Result<(), LedgerError> {
        let record = self
            .chain
            .iter_mut()
            .rev()
            .find(|r| r.sequence() == sequence)
            .ok_or(LedgerError::NotFound { sequence })?;

        record.visibility_mut().transition(target, sequence)?;
        debug!(sequence, visibility = %target, "block visibility changed");
        Ok(())
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerWriter for InMemoryLedger {
    fn append(&mut self, stage: Stage, fields: Vec<Field>) -> Result<Record, LedgerError> {
        if self.stages.is_complete() {
            return Err(LedgerError::CapacityExceeded {
                capacity: Stage::COUNT,
            });
        }
        if self.stages.is_committed(stage) {
            return Err(LedgerError::StageAlreadyUsed { stage });
        }

        let hash = self.identifiers.next_hash();
        if !self.seen_hashes.insert(hash.clone()) {
            warn!(hash = %hash, "block hash collision; keeping duplicate identifier");
        }

        let mut stored = Vec::with_capacity(fields.len() + 1);
        stored.push(Field::new(BLOCK_FIELD, stage.display_name()));
        stored.extend(fields);

        let record = Record::new(
            self.next_sequence(),
            hash,
            self.head().hash().clone(),
            Timestamp::now(),
            stored,
        );

        self.stages.commit(stage)?;
        self.chain.push(record.clone());

        debug!(
            seq = record.sequence(),
            stage = %stage,
            hash = %record.hash(),
            "appended block"
        );
        Ok(record)
    }

    fn soft_delete(&mut self, sequence: u64) -> Result<(), LedgerError> {
        self.transition(sequence, Visibility::SoftDeleted)
    }

    fn hard_delete(&mut self, sequence: u64) -> Result<(), LedgerError> {
        self.transition(sequence, Visibility::HardDeleted)
    }
}

impl LedgerReader for InMemoryLedger {
    fn head(&self) -> &Record {
        // The chain always holds at least the genesis block.
        &self.chain[self.chain.len() - 1]
    }

    fn records(&self) -> Records<'_> {
        Records::new(&self.chain)
    }

    fn record_count(&self) -> u64 {
        self.chain.len() as u64
    }

    fn stages(&self) -> &StageTracker {
        &self.stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn supplier() -> Vec<Field> {
        vec![Field::new("Supplier ID", "SID12345")]
    }

    fn chain_head_first(ledger: &InMemoryLedger) -> Vec<&Record> {
        ledger.records().collect()
    }

    #[test]
    fn fresh_ledger_has_self_chained_genesis() {
        let ledger = InMemoryLedger::seeded(1);
        let genesis = ledger.genesis();
        assert_eq!(genesis.sequence(), 0);
        assert_eq!(genesis.prev_hash(), genesis.hash());
        assert!(genesis.fields().is_empty());
        assert!(genesis.visibility().is_live());
        assert_eq!(ledger.head(), genesis);
        assert_eq!(ledger.record_count(), 1);
        assert_eq!(ledger.next_sequence(), 1);
    }

    #[test]
    fn append_chains_to_head_and_prefixes_stage() {
        let mut ledger = InMemoryLedger::seeded(2);
        let genesis_hash = ledger.genesis().hash().clone();

        let record = ledger.append(Stage::Procurement, supplier()).unwrap();

        assert_eq!(record.sequence(), 1);
        assert_eq!(record.prev_hash(), &genesis_hash);
        assert_eq!(
            record.fields(),
            &[
                Field::new("Block", "Procurement Information"),
                Field::new("Supplier ID", "SID12345"),
            ]
        );
        assert_eq!(record.stage(), Some(Stage::Procurement));
        assert_eq!(ledger.head(), &record);
        assert_eq!(ledger.record_count(), 2);
        assert!(ledger.stages().is_committed(Stage::Procurement));
    }

    #[test]
    fn duplicate_stage_rejected_without_mutation() {
        let mut ledger = InMemoryLedger::seeded(3);
        ledger.append(Stage::Procurement, supplier()).unwrap();
        let head_before = ledger.head().clone();

        let err = ledger
            .append(Stage::Procurement, vec![Field::new("Supplier ID", "SID99999")])
            .unwrap_err();

        assert_eq!(err, LedgerError::StageAlreadyUsed { stage: Stage::Procurement });
        assert_eq!(ledger.head(), &head_before);
        assert_eq!(ledger.record_count(), 2);
    }

    #[test]
    fn ninth_append_exceeds_capacity() {
        let mut ledger = InMemoryLedger::seeded(4);
        for stage in Stage::ALL {
            ledger.append(stage, vec![]).unwrap();
        }
        assert_eq!(ledger.record_count(), 9);

        for stage in Stage::ALL {
            assert_eq!(
                ledger.append(stage, vec![]).unwrap_err(),
                LedgerError::CapacityExceeded { capacity: 8 }
            );
        }
        assert_eq!(ledger.record_count(), 9);
    }

    #[test]
    fn find_by_sequence_ignores_visibility() {
        let mut ledger = InMemoryLedger::seeded(5);
        ledger.append(Stage::Procurement, supplier()).unwrap();
        ledger.append(Stage::InventoryStorage, vec![Field::new("Warehouse ID", "WID00001")]).unwrap();

        ledger.soft_delete(1).unwrap();
        ledger.hard_delete(2).unwrap();

        let soft = ledger.find_by_sequence(1).unwrap();
        assert_eq!(soft.field("Supplier ID"), Some("SID12345"));
        assert!(soft.visibility().is_soft_deleted());

        let hard = ledger.find_by_sequence(2).unwrap();
        assert_eq!(hard.field("Warehouse ID"), Some("WID00001"));
        assert!(hard.visibility().is_hard_deleted());

        assert!(ledger.find_by_sequence(3).is_none());
    }

    #[test]
    fn delete_missing_block_is_not_found() {
        let mut ledger = InMemoryLedger::seeded(6);
        assert_eq!(ledger.soft_delete(7), Err(LedgerError::NotFound { sequence: 7 }));
        assert_eq!(ledger.hard_delete(7), Err(LedgerError::NotFound { sequence: 7 }));
    }

    #[test]
    fn deletions_are_monotonic_and_exclusive() {
        let mut ledger = InMemoryLedger::seeded(7);
        ledger.append(Stage::Procurement, supplier()).unwrap();
        ledger.append(Stage::Transportation, vec![]).unwrap();

        ledger.hard_delete(1).unwrap();
        assert_eq!(ledger.hard_delete(1), Err(LedgerError::AlreadyHardDeleted { sequence: 1 }));
        assert!(matches!(
            ledger.soft_delete(1),
            Err(LedgerError::IncompatibleState { sequence: 1, .. })
        ));

        ledger.soft_delete(2).unwrap();
        assert_eq!(ledger.soft_delete(2), Err(LedgerError::AlreadySoftDeleted { sequence: 2 }));
        assert!(matches!(
            ledger.hard_delete(2),
            Err(LedgerError::IncompatibleState { sequence: 2, .. })
        ));

        assert!(ledger.find_by_sequence(1).unwrap().visibility().is_hard_deleted());
        assert!(ledger.find_by_sequence(2).unwrap().visibility().is_soft_deleted());
    }

    #[test]
    fn genesis_can_be_deleted() {
        let mut ledger = InMemoryLedger::seeded(8);
        ledger.soft_delete(0).unwrap();
        assert!(ledger.genesis().visibility().is_soft_deleted());
    }

    #[test]
    fn procurement_scenario() {
        let mut ledger = InMemoryLedger::seeded(9);
        let genesis_hash = ledger.genesis().hash().clone();

        let record = ledger.append(Stage::Procurement, supplier()).unwrap();
        assert_eq!(record.sequence(), 1);
        assert_eq!(record.prev_hash(), &genesis_hash);

        assert_eq!(
            ledger.append(Stage::Procurement, supplier()),
            Err(LedgerError::StageAlreadyUsed { stage: Stage::Procurement })
        );

        ledger.soft_delete(1).unwrap();
        assert!(matches!(
            ledger.hard_delete(1),
            Err(LedgerError::IncompatibleState { .. })
        ));

        let found = ledger.find_by_sequence(1).unwrap();
        assert_eq!(found.field("Supplier ID"), Some("SID12345"));
    }

    #[test]
    fn traversal_is_restartable() {
        let mut ledger = InMemoryLedger::seeded(10);
        ledger.append(Stage::QualityControl, vec![]).unwrap();
        let first: Vec<u64> = ledger.records().map(Record::sequence).collect();
        let second: Vec<u64> = ledger.records().map(Record::sequence).collect();
        assert_eq!(first, vec![1, 0]);
        assert_eq!(first, second);
    }

    #[test]
    fn same_seed_same_hashes() {
        let mut a = InMemoryLedger::seeded(11);
        let mut b = InMemoryLedger::seeded(11);
        assert_eq!(a.genesis().hash(), b.genesis().hash());
        let ra = a.append(Stage::ProductReturn, vec![]).unwrap();
        let rb = b.append(Stage::ProductReturn, vec![]).unwrap();
        assert_eq!(ra.hash(), rb.hash());
    }

    proptest! {
        #[test]
        fn appends_form_a_linked_chain(
            order in Just(Stage::ALL.to_vec()).prop_shuffle(),
            take in 0usize..=8,
            seed in any::<u64>(),
        ) {
            let mut ledger = InMemoryLedger::seeded(seed);
            for stage in &order[..take] {
                ledger.append(*stage, vec![Field::new("note", "x")]).unwrap();
            }

            let chain = chain_head_first(&ledger);
            prop_assert_eq!(chain.len(), take + 1);
            for (i, record) in chain.iter().rev().enumerate() {
                prop_assert_eq!(record.sequence(), i as u64);
                if i > 0 {
                    let older = chain[chain.len() - i];
                    prop_assert_eq!(record.prev_hash(), older.hash());
                } else {
                    prop_assert_eq!(record.prev_hash(), record.hash());
                }
            }

            for stage in &order[..take] {
                prop_assert_eq!(
                    ledger.append(*stage, vec![]).unwrap_err(),
                    if take == Stage::COUNT {
                        LedgerError::CapacityExceeded { capacity: Stage::COUNT }
                    } else {
                        LedgerError::StageAlreadyUsed { stage: *stage }
                    }
                );
            }
        }
    }
}
