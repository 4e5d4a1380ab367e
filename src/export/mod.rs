/// Export layer: one derived table, three views of it.
///
/// ```text
///                 DerivedTable
///                      │
///        ┌─────────────┼──────────────┐
///        ▼             ▼              ▼
///   WorkbookSink   TextSink(Zview)  TextSink(plain data)
///   sheet/file     f Z' -Z''        full set, ';', header
/// ```
///
/// Every sink reads the same rows through a column projection; a failing sink
/// never stops the others.

pub mod text;
pub mod workbook;

use std::fmt;

use log::warn;

use crate::data::model::{Column, DerivedTable};
use crate::error::{ProcessingError, SinkError};

pub use text::TextSink;
pub use workbook::WorkbookSink;

/// Canonical order of the full derived column set.
pub const FULL_COLUMNS: [Column; 17] = [
    Column::Frequency,
    Column::ZRealSpec,
    Column::ZImagSpec,
    Column::LogFrequency,
    Column::AngularFrequency,
    Column::Capacitance,
    Column::Phase,
    Column::Conductance,
    Column::ConductivitySpec,
    Column::LogConductivitySpec,
    Column::PermittivityReal,
    Column::PermittivityImag,
    Column::BetaReal,
    Column::BetaImag,
    Column::LossTangent,
    Column::ModulusReal,
    Column::ModulusImag,
];

/// Zview expects `f, Z', -Z''`.
pub const ZVIEW_COLUMNS: [Column; 3] = [Column::Frequency, Column::ZRealSpec, Column::NegZImagSpec];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Workbook,
    Zview,
    PlainData,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SinkKind::Workbook => "workbook",
            SinkKind::Zview => "zview",
            SinkKind::PlainData => "plain-data",
        };
        f.write_str(label)
    }
}

/// A destination for derived tables.
pub trait RecordSink {
    fn kind(&self) -> SinkKind;

    fn write_table(&mut self, table: &DerivedTable) -> Result<(), SinkError>;
}

/// Write `table` to every sink. Returns one error per failed sink.
pub fn export(table: &DerivedTable, sinks: &mut [&mut dyn RecordSink]) -> Vec<ProcessingError> {
    let mut failures = Vec::new();
    for sink in sinks.iter_mut() {
        if let Err(source) = sink.write_table(table) {
            let sink = sink.kind();
            warn!("{}: {sink} sink failed: {source}", table.file_id);
            failures.push(ProcessingError::SinkWriteFailure { sink, source });
        }
    }
    failures
}

// ---------------------------------------------------------------------------
// SinkSet – the three batch destinations
// ---------------------------------------------------------------------------

/// The workbook is batch-scoped; the text sinks write one file per table.
pub struct SinkSet {
    pub workbook: WorkbookSink,
    pub zview: TextSink,
    pub data: TextSink,
}

impl SinkSet {
    pub fn export(&mut self, table: &DerivedTable) -> Vec<ProcessingError> {
        let mut sinks: [&mut dyn RecordSink; 3] = [&mut self.workbook, &mut self.zview, &mut self.data];
        export(table, &mut sinks)
    }
}
