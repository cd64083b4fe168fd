use std::io::{BufRead, Write};

use colored::Colorize;
use scl_gate::forms::SATISFACTION_SURVEY;
use scl_gate::{CollectContext, FieldSource, FormCollector, GateError, LocationRegistry, StageForm};
use scl_ledger::{
    export_to_path, InMemoryLedger, LedgerError, LedgerReader, LedgerWriter, ProjectionBuilder,
    RecordView,
};
use scl_types::Stage;
use tracing::info;

use crate::config::SessionConfig;
use crate::terminal::Terminal;

/// Whether the menu loop keeps going.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuChoice {
    Add,
    Display,
    Search,
    Export,
    HardDelete,
    SoftDelete,
    Exit,
}

impl MenuChoice {
    fn from_number(n: u8) -> Option<Self> {
        Some(match n {
            1 => Self::Add,
            2 => Self::Display,
            3 => Self::Search,
            4 => Self::Export,
            5 => Self::HardDelete,
            6 => Self::SoftDelete,
            7 => Self::Exit,
            _ => return None,
        })
    }
}

const MENU: &str = "\nBlockchain Menu\n\
1. Add Block\n\
2. Display Block (hard and soft deletions apply)\n\
3. Search Block (deletions do not affect search)\n\
4. Export to text file\n\
5. Hard Delete Block\n\
6. Soft Delete Block\n\
7. Exit";

/// Which blocks a number-or-`*` query selects.
enum Selection {
    All,
    One(u64),
}

/// An interactive ledger session over a terminal.
pub struct Session<R, W> {
    term: Terminal<R, W>,
    ledger: InMemoryLedger,
    config: SessionConfig,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(term: Terminal<R, W>, config: SessionConfig) -> Self {
        let ledger = match config.seed {
            Some(seed) => InMemoryLedger::seeded(seed),
            None => InMemoryLedger::new(),
        };
        Self { term, ledger, config }
    }

    #[cfg(test)]
    pub fn ledger(&self) -> &InMemoryLedger {
        &self.ledger
    }

    #[cfg(test)]
    pub fn terminal(&self) -> &Terminal<R, W> {
        &self.term
    }

    /// Run the menu loop until the user exits or the input closes.
    pub fn run(&mut self) -> anyhow::Result<()> {
        info!(genesis = %self.ledger.genesis().hash(), "session started");
        loop {
            self.term.say(MENU)?;
            let Some(answer) = self.term.ask("Enter your choice")? else {
                return Ok(());
            };
            let flow = match answer.trim().parse::<u8>() {
                Ok(n) => match MenuChoice::from_number(n) {
                    Some(choice) => self.dispatch(choice)?,
                    None => {
                        self.term.reject("Invalid choice. Please enter a valid choice.")?;
                        Flow::Continue
                    }
                },
                Err(_) => {
                    self.term.reject("Invalid input. Please enter a number.")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Exit {
                return Ok(());
            }
        }
    }

    fn dispatch(&mut self, choice: MenuChoice) -> anyhow::Result<Flow> {
        match choice {
            MenuChoice::Add => self.add_block(),
            MenuChoice::Display => self.show(false),
            MenuChoice::Search => self.show(true),
            MenuChoice::Export => self.export(),
            MenuChoice::HardDelete => self.delete(true),
            MenuChoice::SoftDelete => self.delete(false),
            MenuChoice::Exit => {
                self.term.say("Exit Program.")?;
                Ok(Flow::Exit)
            }
        }
    }

    fn add_block(&mut self) -> anyhow::Result<Flow> {
        if self.ledger.stages().is_complete() {
            let err = LedgerError::CapacityExceeded { capacity: Stage::COUNT };
            self.report(&err)?;
            return Ok(Flow::Continue);
        }

        self.term.say("\nWhich block do you want to add? (1-8)")?;
        for stage in Stage::ALL {
            self.term.say(format_args!("{}. {} Stage", stage.menu_number(), stage.name()))?;
        }
        let Some(answer) = self.term.ask("Enter your choice")? else {
            return Ok(Flow::Exit);
        };
        let stage = match answer.trim().parse::<u8>() {
            Ok(n) => match Stage::from_menu_number(n) {
                Ok(stage) => stage,
                Err(_) => {
                    self.term.reject("Invalid choice. Please enter a number between 1-8.")?;
                    return Ok(Flow::Continue);
                }
            },
            Err(_) => {
                self.term.reject("Invalid input. Please enter a number.")?;
                return Ok(Flow::Continue);
            }
        };
        if self.ledger.stages().is_committed(stage) {
            self.report(&LedgerError::StageAlreadyUsed { stage })?;
            return Ok(Flow::Continue);
        }

        let form = StageForm::for_stage(stage);
        let locations = if form.needs_locations() {
            match LocationRegistry::load(&self.config.locations_path) {
                Ok(locations) => locations,
                Err(e) => {
                    self.report(&e)?;
                    return Ok(Flow::Continue);
                }
            }
        } else {
            LocationRegistry::default()
        };

        let expected_worthiness = self
            .ledger
            .records()
            .find(|r| r.stage() == Some(Stage::CustomerDeliverySatisfaction))
            .and_then(|r| r.field(SATISFACTION_SURVEY))
            .map(str::to_string);

        let gate = self.config.gate();
        let collector = FormCollector::new(&gate, &locations);
        let mut ctx = CollectContext {
            ids: self.ledger.identifiers(),
            expected_worthiness,
        };
        let fields = match collector.collect(&form, &mut self.term, &mut ctx) {
            Ok(fields) => fields,
            Err(GateError::InputClosed { .. }) => return Ok(Flow::Exit),
            Err(GateError::Io(e)) => return Err(e.into()),
            Err(e) => {
                self.report(&e)?;
                return Ok(Flow::Continue);
            }
        };

        match self.ledger.append(stage, fields) {
            Ok(record) => self.term.say(format_args!(
                "{} {} Block Successfully Added (block {}).",
                "✓".green().bold(),
                stage.display_name(),
                record.sequence()
            ))?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    /// Display (`unfiltered == false`) or search a block or all blocks.
    fn show(&mut self, unfiltered: bool) -> anyhow::Result<Flow> {
        let prompt = if unfiltered {
            "Enter which block number you want to search (format: 1, 2, 3, ...) (* to view all)"
        } else {
            "Enter the block number you want to view (format: 1, 2, 3, ...) (* to view all)"
        };
        let Some(selection) = self.select(prompt)? else {
            return Ok(Flow::Exit);
        };

        let lines: Vec<String> = match selection {
            None => return Ok(Flow::Continue),
            Some(Selection::All) if unfiltered => {
                ProjectionBuilder::search(&self.ledger).map(|v| v.to_string()).collect()
            }
            Some(Selection::All) => {
                let lines: Vec<String> =
                    ProjectionBuilder::display(&self.ledger).map(|v| v.to_string()).collect();
                if lines.is_empty() {
                    self.term.reject("Block with number * not found.")?;
                    return Ok(Flow::Continue);
                }
                lines
            }
            Some(Selection::One(sequence)) => {
                let view: Option<RecordView<'_>> = if unfiltered {
                    ProjectionBuilder::search_one(&self.ledger, sequence)
                } else {
                    ProjectionBuilder::display_one(&self.ledger, sequence)
                };
                match view {
                    Some(view) => vec![view.to_string()],
                    None => {
                        self.term.reject(&format!("Block with number {sequence} not found."))?;
                        return Ok(Flow::Continue);
                    }
                }
            }
        };

        for line in lines {
            self.term.say(line)?;
        }
        Ok(Flow::Continue)
    }

    fn export(&mut self) -> anyhow::Result<Flow> {
        let path = self.config.export_path.clone();
        match export_to_path(&self.ledger, &path) {
            Ok(written) => self.term.say(format_args!(
                "{} {written} blocks exported to {} successfully.",
                "✓".green().bold(),
                path.display()
            ))?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn delete(&mut self, hard: bool) -> anyhow::Result<Flow> {
        let prompt = if hard {
            "Enter which block number you want to hard delete"
        } else {
            "Enter which block number you want to soft delete"
        };
        let Some(answer) = self.term.ask(prompt)? else {
            return Ok(Flow::Exit);
        };
        let Ok(sequence) = answer.trim().parse::<u64>() else {
            self.term.reject("Invalid input. Please enter a number.")?;
            return Ok(Flow::Continue);
        };

        let result = if hard {
            self.ledger.hard_delete(sequence)
        } else {
            self.ledger.soft_delete(sequence)
        };
        match result {
            Ok(()) if hard => self.term.say(format_args!(
                "Block with block number {sequence} has been hard deleted."
            ))?,
            Ok(()) => self.term.say(format_args!(
                "Information in block with block number {sequence} has been soft deleted."
            ))?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    /// Ask for a block number or `*`. The outer `None` means the input
    /// closed; the inner one that the answer was refused.
    fn select(&mut self, prompt: &str) -> std::io::Result<Option<Option<Selection>>> {
        let Some(answer) = self.term.ask(prompt)? else {
            return Ok(None);
        };
        let answer = answer.trim();
        if answer == "*" {
            return Ok(Some(Some(Selection::All)));
        }
        match answer.parse::<u64>() {
            Ok(sequence) => Ok(Some(Some(Selection::One(sequence)))),
            Err(_) => {
                self.term.reject("Invalid input. Please enter a block number or '*'.")?;
                Ok(Some(None))
            }
        }
    }

    fn report(&mut self, err: &dyn std::error::Error) -> std::io::Result<()> {
        self.term.reject(&capitalize(&err.to_string()))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    type TestSession = Session<Cursor<String>, Vec<u8>>;

    fn config(dir: &tempfile::TempDir) -> SessionConfig {
        SessionConfig {
            locations_path: dir.path().join("valid_locations.txt"),
            export_path: dir.path().join("blockchain.txt"),
            seed: Some(11),
            ..SessionConfig::default()
        }
    }

    fn run_script(config: SessionConfig, lines: &[&str]) -> (TestSession, String) {
        let mut script = lines.join("\n");
        script.push('\n');
        let mut session = Session::new(Terminal::new(Cursor::new(script), Vec::new()), config);
        session.run().unwrap();
        let out = String::from_utf8(session.terminal().output().clone()).unwrap();
        (session, out)
    }

    const PROCUREMENT: &[&str] = &[
        "1", "1", "SID12345", "Acme", "100", "05/03/24", "Pending", "By road",
    ];

    fn with_procurement<'a>(rest: &[&'a str]) -> Vec<&'a str> {
        PROCUREMENT.iter().chain(rest).copied().collect()
    }

    #[test]
    fn add_and_display_block() {
        let dir = tempfile::tempdir().unwrap();
        let (session, out) = run_script(config(&dir), &with_procurement(&["2", "1", "7"]));

        assert_eq!(session.ledger().record_count(), 2);
        assert!(out.contains("Procurement Information Block Successfully Added (block 1)."));
        assert!(out.contains("Block: Procurement Information | Supplier ID: SID12345"));
        assert!(out.contains("Order State: pending"));
        assert!(out.contains("Exit Program."));
    }

    #[test]
    fn invalid_menu_input_keeps_looping() {
        let dir = tempfile::tempdir().unwrap();
        let (_, out) = run_script(config(&dir), &["abc", "9", "7"]);
        assert!(out.contains("Invalid input. Please enter a number."));
        assert!(out.contains("Invalid choice. Please enter a valid choice."));
        assert!(out.contains("Exit Program."));
    }

    #[test]
    fn closed_input_ends_session() {
        let dir = tempfile::tempdir().unwrap();
        let (session, out) = run_script(config(&dir), &["1", "1", "SID12345"]);
        assert_eq!(session.ledger().record_count(), 1);
        assert!(!out.contains("Exit Program."));
    }

    #[test]
    fn duplicate_stage_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (session, out) = run_script(config(&dir), &with_procurement(&["1", "1", "7"]));
        assert_eq!(session.ledger().record_count(), 2);
        assert!(out.contains("Procurement information has already been added"));
    }

    #[test]
    fn soft_then_hard_delete_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let (session, out) =
            run_script(config(&dir), &with_procurement(&["6", "1", "5", "1", "6", "1", "7"]));

        assert!(out.contains("Information in block with block number 1 has been soft deleted."));
        assert!(out.contains("Block with block number 1 has been soft deleted and cannot be hard deleted"));
        assert!(out.contains("Block with block number 1 has already been soft deleted"));
        let record = session.ledger().find_by_sequence(1).unwrap();
        assert!(record.visibility().is_soft_deleted());
    }

    #[test]
    fn delete_unknown_block() {
        let dir = tempfile::tempdir().unwrap();
        let (_, out) = run_script(config(&dir), &["5", "4", "6", "x", "7"]);
        assert!(out.contains("Block with block number 4 not found"));
        assert!(out.contains("Invalid input. Please enter a number."));
    }

    #[test]
    fn search_ignores_deletions_display_does_not() {
        let dir = tempfile::tempdir().unwrap();
        let (_, out) = run_script(
            config(&dir),
            &with_procurement(&["5", "1", "2", "1", "2", "*", "3", "1", "7"]),
        );
        assert!(out.contains("Block with number 1 not found."));
        let content_lines = out.lines().filter(|l| l.contains("Supplier ID: SID12345")).count();
        assert_eq!(content_lines, 1);
    }

    #[test]
    fn display_all_with_nothing_visible() {
        let dir = tempfile::tempdir().unwrap();
        let (session, out) = run_script(
            config(&dir),
            &with_procurement(&["5", "1", "5", "0", "2", "*", "3", "*", "7"]),
        );
        assert!(session.ledger().genesis().visibility().is_hard_deleted());
        assert!(out.contains("Block with number * not found."));
        assert!(out.contains("Supplier ID: SID12345"));
    }

    #[test]
    fn export_writes_display_lines() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir);
        let path = cfg.export_path.clone();
        let (_, out) = run_script(cfg, &with_procurement(&["6", "1", "4", "7"]));

        assert!(out.contains("2 blocks exported to"));
        let parsed = scl_ledger::read_export(&path).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].sequence, 1);
        assert!(parsed[0].fields.is_none());
    }

    #[test]
    fn storage_needs_locations_file() {
        let dir = tempfile::tempdir().unwrap();
        let (session, out) = run_script(config(&dir), &["1", "2", "7"]);
        assert_eq!(session.ledger().record_count(), 1);
        assert!(out.contains("Unable to open valid locations file"));
    }

    #[test]
    fn storage_with_locations() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir);
        fs::write(&cfg.locations_path, "Austin, Texas\n").unwrap();
        let (session, _) = run_script(
            cfg,
            &["1", "2", "WID12345", "Paris, France", "Austin, Texas", "40", "Low Stock", "7"],
        );
        let head = session.ledger().head();
        assert_eq!(head.stage(), Some(Stage::InventoryStorage));
        assert_eq!(head.field("Storage Location"), Some("Austin, Texas"));
        assert_eq!(head.field("Inventory Status"), Some("low stock"));
    }

    #[test]
    fn worthiness_expects_survey_score() {
        let dir = tempfile::tempdir().unwrap();
        let (session, out) = run_script(
            config(&dir),
            &[
                "1", "5", "Delivered", "Good", "8",
                "1", "8", "Continue Product", "Well liked", "confirm",
                "7",
            ],
        );
        assert!(out.contains("the expected product worthiness is '8'"));
        assert_eq!(session.ledger().record_count(), 3);
        assert!(session.ledger().stages().is_committed(Stage::ProductWorthiness));
    }

    #[test]
    fn seeded_sessions_share_hashes() {
        let dir = tempfile::tempdir().unwrap();
        let (a, _) = run_script(config(&dir), &with_procurement(&["7"]));
        let (b, _) = run_script(config(&dir), &with_procurement(&["7"]));
        assert_eq!(a.ledger().head().hash(), b.ledger().head().hash());
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("block with"), "Block with");
        assert_eq!(capitalize(""), "");
    }
}
