use std::fmt;

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Length of every generated block hash.
pub const HASH_LEN: usize = 20;

/// Opaque block identifier.
///
/// Despite the name this is not a digest of the block contents: it is a
/// random alphanumeric string drawn from [`IdentifierGenerator`]. Two blocks
/// colliding is possible in principle and accepted as negligible.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHash(String);

impl BlockHash {
    /// Wrap an existing identifier, e.g. one read back from an export.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this looks like a generated hash
    /// (exactly [`HASH_LEN`] ASCII alphanumerics).
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == HASH_LEN && self.0.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    /// First 8 characters, for compact listings.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.0)
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlockHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of fresh [`BlockHash`] values.
///
/// Holds a single pseudo-random generator seeded once at construction, so
/// every hash depends on the seed and on how many hashes came before it.
pub struct IdentifierGenerator {
    rng: StdRng,
}

impl IdentifierGenerator {
    /// Seed from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible sessions and tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw the next identifier: [`HASH_LEN`] characters sampled uniformly
    /// from the 62-symbol alphanumeric alphabet.
    pub fn next_hash(&mut self) -> BlockHash {
        let raw: String = (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(HASH_LEN)
            .map(char::from)
            .collect();
        BlockHash(raw)
    }

    /// Draw an integer from `range`, sharing the same seeded source.
    pub fn next_in_range(&mut self, range: std::ops::RangeInclusive<u32>) -> u32 {
        self.rng.gen_range(range)
    }
}

impl Default for IdentifierGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl fmt::Debug for IdentifierGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentifierGenerator")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn hashes_are_twenty_alphanumerics() {
        let mut generator = IdentifierGenerator::from_entropy();
        for _ in 0..100 {
            let hash = generator.next_hash();
            assert_eq!(hash.as_str().len(), HASH_LEN);
            assert!(hash.is_well_formed());
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = IdentifierGenerator::seeded(7);
        let mut b = IdentifierGenerator::seeded(7);
        for _ in 0..10 {
            assert_eq!(a.next_hash(), b.next_hash());
        }
    }

    #[test]
    fn successive_hashes_differ() {
        let mut generator = IdentifierGenerator::seeded(1);
        let seen: HashSet<_> = (0..1000).map(|_| generator.next_hash()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn from_raw_is_opaque() {
        let hash = BlockHash::from_raw("not-a-hash");
        assert_eq!(hash.as_str(), "not-a-hash");
        assert!(!hash.is_well_formed());
        assert_eq!(hash.short(), "not-a-ha");
        assert_eq!(BlockHash::from_raw("abc").short(), "abc");
    }

    #[test]
    fn range_draws_stay_in_bounds() {
        let mut generator = IdentifierGenerator::seeded(3);
        for _ in 0..200 {
            let n = generator.next_in_range(10_000..=99_999);
            assert!((10_000..=99_999).contains(&n));
        }
    }

    proptest! {
        #[test]
        fn any_seed_yields_well_formed_hashes(seed in any::<u64>()) {
            let mut generator = IdentifierGenerator::seeded(seed);
            prop_assert!(generator.next_hash().is_well_formed());
        }
    }
}
