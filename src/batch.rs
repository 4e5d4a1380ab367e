use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::config::OutputLayout;
use crate::data::geometry::GeometryConstants;
use crate::data::loader::{file_id, sort_by_file_name, MeasurementReader};
use crate::data::model::NumericSingularity;
use crate::data::transform::transform;
use crate::error::{ProcessingError, SinkError};
use crate::export::{RecordSink, SinkKind, SinkSet, TextSink, WorkbookSink};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Outcome of one input file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub file_id: String,
    /// Rows exported; zero when the file was rejected before transform.
    pub rows: usize,
    pub singularities: Vec<NumericSingularity>,
    /// Workbook sheet holding this file's table, once it was added.
    pub sheet: Option<String>,
    /// Empty on success. A read failure is the only entry; sink failures are
    /// one entry per failed sink.
    pub errors: Vec<ProcessingError>,
}

impl FileReport {
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub struct BatchReport {
    pub geometry: GeometryConstants,
    /// In processing order.
    pub files: Vec<FileReport>,
    /// Path of the written workbook, `None` if no sheet was produced.
    pub workbook: Option<PathBuf>,
    pub workbook_error: Option<SinkError>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.succeeded())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.succeeded())
    }

    pub fn is_clean(&self) -> bool {
        self.workbook_error.is_none() && self.files.iter().all(FileReport::succeeded)
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ok = self.succeeded().count();
        writeln!(
            f,
            "Processed {} file(s): {ok} succeeded, {} failed",
            self.files.len(),
            self.files.len() - ok
        )?;
        for file in &self.files {
            if file.succeeded() {
                write!(f, "  ok     {} ({} rows)", file.file_id, file.rows)?;
                if !file.singularities.is_empty() {
                    write!(f, ", {} singular value(s)", file.singularities.len())?;
                }
                writeln!(f)?;
            } else {
                for err in &file.errors {
                    writeln!(f, "  FAILED {} [{}] {err}", file.file_id, err.kind())?;
                }
            }
        }
        match (&self.workbook, &self.workbook_error) {
            (_, Some(err)) => writeln!(f, "Workbook NOT saved: {err}"),
            (Some(path), None) => writeln!(f, "Workbook: {}", path.display()),
            (None, None) => writeln!(f, "Workbook: not written (no sheets)"),
        }
    }
}

// ---------------------------------------------------------------------------
// BatchOrchestrator
// ---------------------------------------------------------------------------

/// Runs read → transform → export for each input file, sequentially, in file
/// name order, sharing one workbook across the batch.
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    layout: OutputLayout,
    delimiter: u8,
}

impl BatchOrchestrator {
    pub fn new(layout: OutputLayout, delimiter: u8) -> Self {
        Self { layout, delimiter }
    }

    /// Fails only on invalid geometry. Per-file problems end up in the report.
    pub fn run(
        &self,
        input_files: &[PathBuf],
        thickness_mm: f64,
        diameter_mm: f64,
    ) -> Result<BatchReport, ProcessingError> {
        let geometry = GeometryConstants::compute(thickness_mm, diameter_mm)?;
        Ok(self.run_with_geometry(input_files, geometry))
    }

    pub fn run_with_geometry(
        &self,
        input_files: &[PathBuf],
        geometry: GeometryConstants,
    ) -> BatchReport {
        let mut inputs = input_files.to_vec();
        sort_by_file_name(&mut inputs);
        info!(
            "batch start: {} file(s), h={} m, d={} m, S={:e} m², C0={:e} F",
            inputs.len(),
            geometry.thickness_m,
            geometry.diameter_m,
            geometry.area_m2,
            geometry.vacuum_capacitance_f
        );

        let mut sinks = SinkSet {
            workbook: WorkbookSink::create(&self.layout.workbook),
            zview: TextSink::zview(&self.layout.zview_dir),
            data: TextSink::plain_data(&self.layout.data_dir),
        };
        for sink in [&sinks.zview, &sinks.data] {
            if let Err(e) = sink.prepare() {
                error!("cannot create {} directory: {e}", sink.kind());
            }
        }

        let mut seen = HashSet::new();
        let mut files: Vec<FileReport> = inputs
            .iter()
            .map(|path| {
                let report = self.process_file(path, &geometry, &mut sinks, &mut seen);
                if report.succeeded() {
                    info!("{}: {} rows exported", report.file_id, report.rows);
                } else {
                    warn!("{}: {} error(s)", report.file_id, report.errors.len());
                }
                report
            })
            .collect();

        let (workbook, workbook_error) = match sinks.workbook.close() {
            Ok(path) => (path, None),
            Err(e) => {
                error!("failed to save workbook {}: {e}", self.layout.workbook.display());
                // Sheets only exist in memory until the save, so every file that
                // had one is missing from the workbook.
                for file in files.iter_mut().filter(|f| f.sheet.is_some()) {
                    file.errors.push(ProcessingError::SinkWriteFailure {
                        sink: SinkKind::Workbook,
                        source: SinkError::NotSaved {
                            path: self.layout.workbook.clone(),
                            reason: e.to_string(),
                        },
                    });
                }
                (None, Some(e))
            }
        };

        BatchReport {
            geometry,
            files,
            workbook,
            workbook_error,
        }
    }

    fn process_file(
        &self,
        path: &Path,
        geometry: &GeometryConstants,
        sinks: &mut SinkSet,
        seen: &mut HashSet<String>,
    ) -> FileReport {
        let file_id = file_id(path);
        let mut report = FileReport {
            path: path.to_path_buf(),
            file_id: file_id.clone(),
            rows: 0,
            singularities: Vec::new(),
            sheet: None,
            errors: Vec::new(),
        };

        if !seen.insert(file_id.clone()) {
            report
                .errors
                .push(ProcessingError::DuplicateIdentity { file_id });
            return report;
        }

        let table = match MeasurementReader::new(path, self.delimiter).read_table() {
            Ok(table) => table,
            Err(e) => {
                error!("{}: {e}", report.file_id);
                report.errors.push(e);
                return report;
            }
        };

        let derived = transform(&table, geometry);
        for s in &derived.singularities {
            warn!("{}: numeric singularity in {s}", derived.file_id);
        }

        report.errors = sinks.export(&derived);
        let workbook_failed = report.errors.iter().any(|e| {
            matches!(e, ProcessingError::SinkWriteFailure { sink: SinkKind::Workbook, .. })
        });
        if !workbook_failed {
            report.sheet = sinks.workbook.sheet_names().last().cloned();
        }
        report.rows = derived.len();
        report.singularities = derived.singularities;
        report
    }
}
