//! Foundation types for the Supply Chain Ledger (SCL).
//!
//! This crate provides the identity, temporal, and structural types shared by
//! the ledger core, the field gate, and the command-line session.
//!
//! # Key Types
//!
//! - [`Stage`]: One of the eight fixed supply-chain stages
//! - [`BlockHash`]: Opaque 20-character block identifier
//! - [`IdentifierGenerator`]: Seeded source of fresh [`BlockHash`] values
//! - [`Timestamp`]: Creation time captured as a display string
//! - [`Field`]: Named field value carried by a block

pub mod error;
pub mod field;
pub mod identifier;
pub mod stage;
pub mod temporal;

pub use error::TypeError;
pub use field::Field;
pub use identifier::{BlockHash, IdentifierGenerator, HASH_LEN};
pub use stage::Stage;
pub use temporal::Timestamp;
