use std::collections::HashSet;
use std::fmt;

use scl_types::BlockHash;

use crate::export::ExportedRecord;
use crate::records::Record;
use crate::traits::LedgerReader;

/// Anything that sits in a block chain.
pub trait ChainLink {
    fn link_sequence(&self) -> u64;
    fn link_hash(&self) -> &BlockHash;
    fn link_prev_hash(&self) -> &BlockHash;
}

impl ChainLink for Record {
    fn link_sequence(&self) -> u64 {
        self.sequence()
    }

    fn link_hash(&self) -> &BlockHash {
        self.hash()
    }

    fn link_prev_hash(&self) -> &BlockHash {
        self.prev_hash()
    }
}

impl ChainLink for ExportedRecord {
    fn link_sequence(&self) -> u64 {
        self.sequence
    }

    fn link_hash(&self) -> &BlockHash {
        &self.hash
    }

    fn link_prev_hash(&self) -> &BlockHash {
        &self.prev_hash
    }
}

impl<T: ChainLink + ?Sized> ChainLink for &T {
    fn link_sequence(&self) -> u64 {
        (**self).link_sequence()
    }

    fn link_hash(&self) -> &BlockHash {
        (**self).link_hash()
    }

    fn link_prev_hash(&self) -> &BlockHash {
        (**self).link_prev_hash()
    }
}

/// How to treat missing sequence numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GapPolicy {
    /// Every block from genesis to head must be present.
    Strict,
    /// Missing blocks are recorded as hidden (hard-deleted blocks are left
    /// out of exports); links are only checked between adjacent sequences.
    TolerateHidden,
}

/// Result of chain validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub record_count: u64,
    /// Sequence numbers absent from the input, ascending.
    pub hidden: Vec<u64>,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub sequence: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    SequenceGap,
    OutOfOrder,
    BrokenLink,
    GenesisNotSelfChained,
    MissingGenesis,
    DuplicateHash,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {}: {:?}: {}", self.sequence, self.kind, self.description)
    }
}

/// Chain integrity validator.
pub struct ChainValidator;

impl ChainValidator {
    /// Validate a live ledger. Nothing may be missing.
    pub fn validate_ledger<R: LedgerReader>(reader: &R) -> ValidationReport {
        let records: Vec<&Record> = reader.records().collect();
        Self::validate_links(&records, GapPolicy::Strict)
    }

    /// Validate a head-first sequence of links.
    pub fn validate_links<L: ChainLink>(links: &[L], policy: GapPolicy) -> ValidationReport {
        let mut report = ValidationReport {
            record_count: links.len() as u64,
            ..Default::default()
        };
        let mut seen = HashSet::new();

        for link in links {
            if !seen.insert(link.link_hash()) {
                report.violations.push(Violation {
                    sequence: link.link_sequence(),
                    kind: ViolationKind::DuplicateHash,
                    description: format!("hash {} appears more than once", link.link_hash()),
                });
            }
        }

        for pair in links.windows(2) {
            let (newer, older) = (&pair[0], &pair[1]);
            let (n, o) = (newer.link_sequence(), older.link_sequence());

            if n <= o {
                report.violations.push(Violation {
                    sequence: n,
                    kind: ViolationKind::OutOfOrder,
                    description: format!("block {n} listed before block {o}"),
                });
            } else if n == o + 1 {
                if newer.link_prev_hash() != older.link_hash() {
                    report.violations.push(Violation {
                        sequence: n,
                        kind: ViolationKind::BrokenLink,
                        description: format!(
                            "previous hash {} does not match block {o} hash {}",
                            newer.link_prev_hash(),
                            older.link_hash()
                        ),
                    });
                }
            } else {
                Self::gap(&mut report, policy, o + 1, n);
            }
        }

        match links.last() {
            None if policy == GapPolicy::Strict => report.violations.push(Violation {
                sequence: 0,
                kind: ViolationKind::MissingGenesis,
                description: "chain is empty".into(),
            }),
            None => {}
            Some(oldest) if oldest.link_sequence() == 0 => {
                if oldest.link_prev_hash() != oldest.link_hash() {
                    report.violations.push(Violation {
                        sequence: 0,
                        kind: ViolationKind::GenesisNotSelfChained,
                        description: "genesis previous hash differs from its own hash".into(),
                    });
                }
            }
            Some(oldest) => match policy {
                GapPolicy::Strict => report.violations.push(Violation {
                    sequence: 0,
                    kind: ViolationKind::MissingGenesis,
                    description: format!("oldest block is {}", oldest.link_sequence()),
                }),
                GapPolicy::TolerateHidden => {
                    Self::gap(&mut report, policy, 0, oldest.link_sequence())
                }
            },
        }

        report.hidden.sort_unstable();
        report
    }

    /// Account for the missing range `from..to`.
    fn gap(report: &mut ValidationReport, policy: GapPolicy, from: u64, to: u64) {
        match policy {
            GapPolicy::Strict => report.violations.push(Violation {
                sequence: to,
                kind: ViolationKind::SequenceGap,
                description: format!("blocks {from}..{to} missing"),
            }),
            GapPolicy::TolerateHidden => report.hidden.extend(from..to),
        }
    }
}
