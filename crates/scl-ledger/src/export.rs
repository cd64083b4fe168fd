use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use scl_types::{BlockHash, Field, Stage, Timestamp};
use tracing::{info, warn};

use crate::error::ExportError;
use crate::projection::{ProjectionBuilder, RecordView};
use crate::records::BLOCK_FIELD;
use crate::traits::LedgerReader;

const LINE_PREFIX: &str = "Block ";
const INFORMATION: &str = " information:";
const SEPARATOR: &str = " | ";
const NAME_VALUE: &str = ": ";

/// A block read back from an export file.
///
/// `fields` is `None` for blocks whose content was hidden when exported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedRecord {
    pub sequence: u64,
    pub hash: BlockHash,
    pub prev_hash: BlockHash,
    pub created_at: Timestamp,
    pub fields: Option<Vec<Field>>,
}

impl ExportedRecord {
    /// Stage named by the leading `Block` field, when present.
    pub fn stage(&self) -> Option<Stage> {
        self.fields
            .as_ref()?
            .iter()
            .find(|f| f.name == BLOCK_FIELD)
            .and_then(|f| Stage::from_display_name(&f.value))
    }
}

/// Render the display projection, one line per block, head-first.
///
/// Fails without output if any visible field would not parse back.
pub fn render_export<R: LedgerReader>(reader: &R) -> Result<String, ExportError> {
    let views = representable_views(reader)?;
    let mut out = String::new();
    for view in views {
        out.push_str(&view.to_string());
        out.push('\n');
    }
    Ok(out)
}

/// Write the display projection to `path`, replacing any existing file.
/// Returns the number of lines written.
///
/// Every block is checked before the file is touched, so a refused export
/// leaves an earlier file in place.
pub fn export_to_path<R: LedgerReader>(reader: &R, path: &Path) -> Result<usize, ExportError> {
    let views = representable_views(reader)?;
    let mut writer = BufWriter::new(File::create(path)?);
    for view in &views {
        writeln!(writer, "{view}")?;
    }
    writer.flush()?;

    info!(path = %path.display(), blocks = views.len(), "exported ledger");
    Ok(views.len())
}

fn representable_views<R: LedgerReader>(reader: &R) -> Result<Vec<RecordView<'_>>, ExportError> {
    let views: Vec<_> = ProjectionBuilder::display(reader).collect();
    for view in &views {
        for field in view.fields.unwrap_or_default() {
            if let Some(reason) = unrepresentable(field) {
                warn!(sequence = view.sequence, field = %field.name, reason, "export refused");
                return Err(ExportError::Unrepresentable {
                    sequence: view.sequence,
                    field: field.name.clone(),
                    reason,
                });
            }
        }
    }
    Ok(views)
}

/// Why `field` cannot survive a write and parse, if it cannot.
fn unrepresentable(field: &Field) -> Option<&'static str> {
    let breaks_line = |s: &str| s.contains(['\n', '\r']);
    if breaks_line(&field.name) || breaks_line(&field.value) {
        Some("contains a line break")
    } else if field.name.contains('|') || field.value.contains('|') {
        Some("contains '|'")
    } else if field.name.contains(NAME_VALUE) {
        Some("has ': ' in its name")
    } else {
        None
    }
}

/// Read and parse an export file.
pub fn read_export(path: &Path) -> Result<Vec<ExportedRecord>, ExportError> {
    let text = fs::read_to_string(path)?;
    parse_export(&text)
}

/// Parse export text. Blank lines are skipped; line numbers in errors are
/// one-based.
pub fn parse_export(text: &str) -> Result<Vec<ExportedRecord>, ExportError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_line(line, i + 1))
        .collect()
}

fn parse_line(line: &str, line_no: usize) -> Result<ExportedRecord, ExportError> {
    let body = line
        .strip_prefix(LINE_PREFIX)
        .ok_or_else(|| ExportError::malformed(line_no, "missing 'Block' prefix"))?;

    let (envelope, information) = match body.split_once(INFORMATION) {
        Some((envelope, information)) => (envelope, Some(information)),
        None => (body, None),
    };

    let parts: Vec<&str> = envelope.splitn(4, SEPARATOR).collect();
    let [sequence, hash, prev_hash, created_at] = parts[..] else {
        return Err(ExportError::malformed(
            line_no,
            format!("expected 4 envelope parts, found {}", parts.len()),
        ));
    };

    let sequence = sequence
        .parse::<u64>()
        .map_err(|e| ExportError::malformed(line_no, format!("bad block number {sequence:?}: {e}")))?;

    let fields = information
        .map(|info| parse_fields(info, line_no))
        .transpose()?;

    Ok(ExportedRecord {
        sequence,
        hash: BlockHash::from_raw(hash),
        prev_hash: BlockHash::from_raw(prev_hash),
        created_at: Timestamp::from_display(created_at),
        fields,
    })
}

fn parse_fields(information: &str, line_no: usize) -> Result<Vec<Field>, ExportError> {
    let information = information.strip_prefix(' ').unwrap_or(information);
    if information.is_empty() {
        return Ok(Vec::new());
    }
    information
        .split(SEPARATOR)
        .map(|pair| {
            pair.split_once(NAME_VALUE)
                .map(|(name, value)| Field::new(name, value))
                .ok_or_else(|| ExportError::malformed(line_no, format!("field without ': ' in {pair:?}")))
        })
        .collect()
}
