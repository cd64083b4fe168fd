//! Field gate for the Supply Chain Ledger.
//!
//! Every value that reaches the ledger passes through the gate first. Each
//! stage has a [`StageForm`] listing its fields and the [`FieldRule`] each
//! one must satisfy; the [`FormCollector`] asks a [`FieldSource`] for raw
//! answers, re-asks on invalid input, and hands back normalised
//! [`scl_types::Field`] values ready to append.
//!
//! # Quick Start
//!
//! ```rust
//! use scl_gate::{FormCollector, GateConfig, LocationRegistry, StageForm};
//! use scl_types::Stage;
//!
//! let config = GateConfig::default();
//! let locations = LocationRegistry::default();
//! let collector = FormCollector::new(&config, &locations);
//! let form = StageForm::for_stage(Stage::QualityControl);
//! let value = collector.validate(&form.fields[0], "Pass", &[]).unwrap();
//! assert_eq!(value, "pass");
//! ```

pub mod collect;
pub mod config;
pub mod error;
pub mod forms;
pub mod locations;
pub mod rules;

// Re-exports for convenience.
pub use collect::{CollectContext, FieldSource, FormCollector};
pub use config::GateConfig;
pub use error::GateError;
pub use forms::{FieldSpec, StageForm};
pub use locations::LocationRegistry;
pub use rules::{FieldRule, RuleContext};
