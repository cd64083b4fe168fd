use std::io;

use scl_types::{Field, IdentifierGenerator};
use tracing::debug;

use crate::config::GateConfig;
use crate::error::GateError;
use crate::forms::{FieldSpec, StageForm, RETURN_NUMBER};
use crate::locations::LocationRegistry;
use crate::rules::{FieldRule, RuleContext};

/// Range the numeric part of a product return number is drawn from.
const RETURN_NUMBER_RANGE: std::ops::RangeInclusive<u32> = 10_000..=99_999;

/// Where raw answers come from.
pub trait FieldSource {
    /// Ask for a value. `Ok(None)` means the input is exhausted.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Tell the user why the last answer was refused.
    fn reject(&mut self, message: &str) -> io::Result<()>;
}

/// Ledger-derived state a form may need.
pub struct CollectContext<'a> {
    /// Source of generated values (product return numbers).
    pub ids: &'a mut IdentifierGenerator,
    /// Shown when the user confirms the product worthiness status.
    pub expected_worthiness: Option<String>,
}

/// Collects and validates the fields of a stage form.
pub struct FormCollector<'a> {
    config: &'a GateConfig,
    locations: &'a LocationRegistry,
}

impl<'a> FormCollector<'a> {
    pub fn new(config: &'a GateConfig, locations: &'a LocationRegistry) -> Self {
        Self { config, locations }
    }

    /// Check one raw answer against its field rule, given the answers
    /// already collected for the form. Returns the value to store.
    pub fn validate(&self, spec: &FieldSpec, raw: &str, collected: &[Field]) -> Result<String, GateError> {
        let ctx = RuleContext {
            config: self.config,
            locations: self.locations,
            collected,
        };
        spec.rule
            .check(raw, &ctx)
            .map_err(|reason| GateError::invalid(spec.name, reason))
    }

    /// Run a whole form. Invalid answers are rejected and asked again; the
    /// result is ready to append to the ledger.
    pub fn collect<S: FieldSource>(
        &self,
        form: &StageForm,
        source: &mut S,
        ctx: &mut CollectContext<'_>,
    ) -> Result<Vec<Field>, GateError> {
        if form.needs_locations() && self.locations.is_empty() {
            return Err(GateError::NoLocations);
        }

        let mut collected: Vec<Field> = Vec::with_capacity(form.fields.len());
        for spec in &form.fields {
            let value = match spec.rule {
                FieldRule::Generated => self.generate(spec, ctx),
                _ => self.ask_field(spec, source, &collected)?,
            };
            collected.push(Field::new(spec.name, value));
        }

        if let Some(name) = form.confirms {
            self.confirm(form, name, source, ctx, &mut collected)?;
        }

        debug!(stage = %form.stage, fields = collected.len(), "collected form");
        Ok(form.assemble(collected))
    }

    fn generate(&self, spec: &FieldSpec, ctx: &mut CollectContext<'_>) -> String {
        match spec.name {
            RETURN_NUMBER => format!("R{}", ctx.ids.next_in_range(RETURN_NUMBER_RANGE)),
            _ => ctx.ids.next_hash().to_string(),
        }
    }

    fn ask_field<S: FieldSource>(
        &self,
        spec: &FieldSpec,
        source: &mut S,
        collected: &[Field],
    ) -> Result<String, GateError> {
        loop {
            let raw = source.ask(spec.prompt)?.ok_or_else(|| GateError::InputClosed {
                field: spec.name.to_string(),
            })?;
            match self.validate(spec, &raw, collected) {
                Ok(value) => return Ok(value),
                Err(e) => source.reject(&e.to_string())?,
            }
        }
    }

    fn confirm<S: FieldSource>(
        &self,
        form: &StageForm,
        name: &'static str,
        source: &mut S,
        ctx: &CollectContext<'_>,
        collected: &mut [Field],
    ) -> Result<(), GateError> {
        let Some(spec) = form.field(name) else {
            return Ok(());
        };
        let expected = ctx.expected_worthiness.as_deref().unwrap_or("unknown");
        let prompt = format!(
            "Based on the customer satisfaction survey, the expected product worthiness is '{expected}'. \
             Enter 'confirm' to proceed or 'reenter' to re-enter the {name}"
        );

        loop {
            let answer = source.ask(&prompt)?.ok_or_else(|| GateError::InputClosed {
                field: name.to_string(),
            })?;
            match answer.trim().to_lowercase().as_str() {
                "confirm" => return Ok(()),
                "reenter" => {
                    let value = self.ask_field(spec, source, collected)?;
                    if let Some(field) = collected.iter_mut().find(|f| f.name == name) {
                        field.value = value;
                    }
                }
                _ => source.reject("Please enter 'confirm' or 'reenter'")?,
            }
        }
    }
}
