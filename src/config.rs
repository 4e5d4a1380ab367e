use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::data::geometry::GeometryConstants;
use crate::format::format_value;

// ---------------------------------------------------------------------------
// RunConfig – everything the batch needs besides the geometry
// ---------------------------------------------------------------------------

/// Optional JSON settings file. Every field has a default, so `{}` is valid.
///
/// ```json
/// { "zview_dir": "Zview_files", "data_dir": "Data_txt",
///   "input_extension": "txt", "separator": ";", "overwrite": false }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Directory (relative to the working directory) for Zview files.
    pub zview_dir: PathBuf,
    /// Directory for the `;`-separated full tables.
    pub data_dir: PathBuf,
    /// Input files are the ones with this extension.
    pub input_extension: String,
    /// Field separator of the input files; a single ASCII character.
    pub separator: char,
    /// Replace existing outputs without asking.
    pub overwrite: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            zview_dir: PathBuf::from("Zview_files"),
            data_dir: PathBuf::from("Data_txt"),
            input_extension: "txt".to_string(),
            separator: ';',
            overwrite: false,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: RunConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.separator_byte()?;
        Ok(config)
    }

    pub fn separator_byte(&self) -> Result<u8> {
        if !self.separator.is_ascii() {
            bail!("separator must be a single ASCII character, got '{}'", self.separator);
        }
        Ok(self.separator as u8)
    }

    /// Output layout rooted at `work_dir`.
    pub fn layout(&self, work_dir: &Path, geometry: &GeometryConstants) -> OutputLayout {
        OutputLayout {
            workbook: work_dir.join(workbook_file_name(work_dir, geometry)),
            zview_dir: work_dir.join(&self.zview_dir),
            data_dir: work_dir.join(&self.data_dir),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputLayout – where one batch writes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    pub workbook: PathBuf,
    pub zview_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl OutputLayout {
    /// True when a previous run left all three outputs behind.
    pub fn has_previous_outputs(&self) -> bool {
        self.zview_dir.is_dir() && self.data_dir.is_dir() && self.workbook.exists()
    }
}

/// `<dir name>_h=<thickness m>_d=<diameter m>.xlsx`
pub fn workbook_file_name(work_dir: &Path, geometry: &GeometryConstants) -> String {
    let batch = work_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "batch".to_string());
    format!(
        "{batch}_h={}_d={}.xlsx",
        format_value(geometry.thickness_m),
        format_value(geometry.diameter_m)
    )
}
