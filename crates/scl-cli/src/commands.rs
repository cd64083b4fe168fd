use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use scl_gate::forms::{ROUTE, ROUTE_FROM};
use scl_gate::{FieldRule, StageForm};
use scl_ledger::{read_export, ChainValidator, ExportedRecord, GapPolicy, ValidationReport};

use crate::auth;
use crate::cli::*;
use crate::config::SessionConfig;
use crate::session::Session;
use crate::terminal::Terminal;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = SessionConfig::resolve(&cli)?;
    match cli.command {
        None | Some(Command::Run) => cmd_run(config),
        Some(Command::Stages) => cmd_stages(&mut io::stdout().lock()),
        Some(Command::Verify(args)) => {
            let path = args.file.unwrap_or_else(|| config.export_path.clone());
            cmd_verify(&path, &mut io::stdout().lock())
        }
    }
}

fn cmd_run(config: SessionConfig) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut term = Terminal::new(stdin.lock(), io::stdout().lock());

    term.say(format_args!("\n{}", "Supply Chain Ledger".bold()))?;
    let identity = auth::login(&mut term, &config.credentials_path, config.max_login_attempts)?;
    let Some(identity) = identity else {
        term.say("Exceeded maximum login attempts. Exit program.")?;
        return Ok(());
    };
    term.say(format_args!("Logged in as {}.", identity.name.cyan()))?;

    Session::new(term, config).run()
}

fn cmd_stages(out: &mut impl Write) -> anyhow::Result<()> {
    for form in StageForm::all() {
        writeln!(out, "{}. {}", form.stage.menu_number(), form.stage.display_name().bold())?;
        for spec in &form.fields {
            match spec.name {
                ROUTE_FROM => writeln!(out, "  - {} {}", ROUTE, "(from, to)".dimmed())?,
                name if name.starts_with(ROUTE) => {}
                name => match spec.rule {
                    FieldRule::Generated => writeln!(out, "  - {name} {}", "(generated)".dimmed())?,
                    _ => writeln!(out, "  - {name}")?,
                },
            }
        }
    }
    Ok(())
}

fn cmd_verify(path: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let records = read_export(path).with_context(|| format!("reading export {}", path.display()))?;
    let report = ChainValidator::validate_links(&records, GapPolicy::TolerateHidden);
    print_report(&records, &report, out)?;

    if !report.is_valid() {
        bail!("{} chain violation(s) in {}", report.violations.len(), path.display());
    }
    Ok(())
}

fn print_report(
    records: &[ExportedRecord],
    report: &ValidationReport,
    out: &mut impl Write,
) -> io::Result<()> {
    let hidden_content = records.iter().filter(|r| r.fields.is_none()).count();
    writeln!(out, "Blocks: {}", report.record_count.to_string().bold())?;
    writeln!(out, "  Content hidden: {hidden_content}")?;
    if report.hidden.is_empty() {
        writeln!(out, "  Missing: {}", "none".green())?;
    } else {
        let missing: Vec<String> = report.hidden.iter().map(u64::to_string).collect();
        writeln!(out, "  Missing: {}", missing.join(", ").yellow())?;
    }

    if report.is_valid() {
        writeln!(out, "{} Chain links verified", "✓".green().bold())?;
    } else {
        for violation in &report.violations {
            writeln!(out, "{} {violation}", "✗".red().bold())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scl_ledger::{export_to_path, InMemoryLedger, LedgerWriter};
    use scl_types::{Field, Stage};
    use std::fs;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> (anyhow::Result<()>, String) {
        let mut buf = Vec::new();
        let result = f(&mut buf);
        (result, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn stages_lists_every_form() {
        let (result, out) = render(|buf| cmd_stages(buf));
        result.unwrap();
        assert!(out.contains("Procurement Information"));
        assert!(out.contains("Product Worthiness Information"));
        assert!(out.contains("  - Transportation Route"));
        assert!(!out.contains(ROUTE_FROM));
        assert!(out.contains("  - Product Return Number"));
        assert!(out.contains("  - Product Refund Status"));
    }

    #[test]
    fn verify_accepts_export_with_deletions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blockchain.txt");
        let mut ledger = InMemoryLedger::seeded(3);
        ledger.append(Stage::Procurement, vec![Field::new("Supplier ID", "SID12345")]).unwrap();
        ledger.append(Stage::QualityControl, vec![Field::new("Product Quality", "good")]).unwrap();
        ledger.soft_delete(2).unwrap();
        ledger.hard_delete(1).unwrap();
        export_to_path(&ledger, &path).unwrap();

        let (result, out) = render(|buf| cmd_verify(&path, buf));
        result.unwrap();
        assert!(out.contains("Content hidden: 1"));
        assert!(out.contains("Chain links verified"));
    }

    #[test]
    fn verify_rejects_tampered_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blockchain.txt");
        fs::write(
            &path,
            "Block 1 | bbbb | zzzz | Tue Mar  5 09:07:01 2024 information: Block: Procurement Information\n\
             Block 0 | aaaa | aaaa | Tue Mar  5 09:07:00 2024 information:\n",
        )
        .unwrap();

        let (result, out) = render(|buf| cmd_verify(&path, buf));
        assert!(result.is_err());
        assert!(out.contains("BrokenLink"));
    }

    #[test]
    fn verify_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let (result, _) = render(|buf| cmd_verify(&dir.path().join("absent.txt"), buf));
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("reading export"));
    }
}
