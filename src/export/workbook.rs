use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{error, info};
use rust_xlsxwriter::{Workbook, Worksheet};

use super::{RecordSink, SinkKind, FULL_COLUMNS};
use crate::data::model::DerivedTable;
use crate::error::SinkError;

/// Excel's sheet-name length limit.
pub const SHEET_NAME_MAX_CHARS: usize = 31;
const SHEET_NAME_ILLEGAL: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

// ---------------------------------------------------------------------------
// WorkbookSink – one .xlsx per batch, one sheet per table
// ---------------------------------------------------------------------------

/// Batch-scoped workbook. Sheets are built in memory and the file is written
/// once, by [`WorkbookSink::close`] or, failing that, on drop.
pub struct WorkbookSink {
    path: PathBuf,
    workbook: Workbook,
    /// Lower-cased names already used; Excel compares sheet names case-insensitively.
    used_names: HashSet<String>,
    sheet_names: Vec<String>,
    closed: bool,
}

impl WorkbookSink {
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            workbook: Workbook::new(),
            used_names: HashSet::new(),
            sheet_names: Vec::new(),
            closed: false,
        }
    }

    /// Sheet names in insertion order.
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Write the workbook file. Returns `None` when no sheet was added, in
    /// which case no file is created.
    pub fn close(mut self) -> Result<Option<PathBuf>, SinkError> {
        self.save()
    }

    fn save(&mut self) -> Result<Option<PathBuf>, SinkError> {
        self.closed = true;
        if self.sheet_names.is_empty() {
            info!("workbook {} has no sheets, not written", self.path.display());
            return Ok(None);
        }
        self.workbook.save(&self.path)?;
        info!(
            "saved workbook {} ({} sheets)",
            self.path.display(),
            self.sheet_names.len()
        );
        Ok(Some(self.path.clone()))
    }
}

impl RecordSink for WorkbookSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Workbook
    }

    fn write_table(&mut self, table: &DerivedTable) -> Result<(), SinkError> {
        let base = sanitize_sheet_name(&table.file_id);
        let name = unique_sheet_name(&base, &self.used_names);

        let mut sheet = Worksheet::new();
        sheet.set_name(&name)?;
        for (col, column) in (0u16..).zip(FULL_COLUMNS) {
            sheet.write_string(0, col, column.label())?;
        }
        for (row, record) in (1u32..).zip(&table.records) {
            for (col, column) in (0u16..).zip(FULL_COLUMNS) {
                let value = column.value(record);
                // NaN stays an empty cell.
                if !value.is_nan() {
                    sheet.write_number(row, col, value)?;
                }
            }
        }

        self.workbook.push_worksheet(sheet);
        self.used_names.insert(name.to_lowercase());
        self.sheet_names.push(name);
        Ok(())
    }
}

impl Drop for WorkbookSink {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.save() {
                error!("failed to save workbook {}: {e}", self.path.display());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Sheet naming
// ---------------------------------------------------------------------------

/// Sheet name for a dataset: file stem with characters Excel rejects replaced
/// by `_`, no leading/trailing apostrophe, at most 31 characters.
pub fn sanitize_sheet_name(file_id: &str) -> String {
    let stem = Path::new(file_id)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let cleaned: String = stem
        .chars()
        .map(|c| if SHEET_NAME_ILLEGAL.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = cleaned.trim_matches('\'');
    let truncated: String = trimmed.chars().take(SHEET_NAME_MAX_CHARS).collect();
    let truncated = truncated.trim_end_matches('\'');

    if truncated.is_empty() {
        "Sheet".to_string()
    } else {
        truncated.to_string()
    }
}

/// `base`, or `base (n)` with the smallest `n >= 2` not yet used.
fn unique_sheet_name(base: &str, used: &HashSet<String>) -> String {
    if !used.contains(&base.to_lowercase()) {
        return base.to_string();
    }
    (2usize..)
        .map(|n| {
            let suffix = format!(" ({n})");
            let keep = SHEET_NAME_MAX_CHARS - suffix.chars().count();
            let head: String = base.chars().take(keep).collect();
            format!("{head}{suffix}")
        })
        .find(|candidate| !used.contains(&candidate.to_lowercase()))
        .unwrap_or_else(|| base.to_string())
}
