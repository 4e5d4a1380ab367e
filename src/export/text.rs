use std::path::PathBuf;

use log::debug;

use super::{RecordSink, SinkKind, FULL_COLUMNS, ZVIEW_COLUMNS};
use crate::data::model::{Column, DerivedTable};
use crate::error::SinkError;
use crate::format::format_value;

/// One delimited text file per table, named after the input file, inside a
/// dedicated directory.
#[derive(Debug, Clone)]
pub struct TextSink {
    kind: SinkKind,
    dir: PathBuf,
    delimiter: u8,
    header: bool,
    columns: &'static [Column],
}

impl TextSink {
    /// `f Z' -Z''`, space separated, no header.
    pub fn zview(dir: impl Into<PathBuf>) -> Self {
        Self {
            kind: SinkKind::Zview,
            dir: dir.into(),
            delimiter: b' ',
            header: false,
            columns: &ZVIEW_COLUMNS,
        }
    }

    /// Full column set, `;` separated, with header.
    pub fn plain_data(dir: impl Into<PathBuf>) -> Self {
        Self {
            kind: SinkKind::PlainData,
            dir: dir.into(),
            delimiter: b';',
            header: true,
            columns: &FULL_COLUMNS,
        }
    }

    pub fn output_path(&self, file_id: &str) -> PathBuf {
        self.dir.join(file_id)
    }

    /// Create the output directory if it is missing.
    pub fn prepare(&self) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| SinkError::Io {
            path: self.dir.clone(),
            source,
        })
    }
}

impl RecordSink for TextSink {
    fn kind(&self) -> SinkKind {
        self.kind
    }

    fn write_table(&mut self, table: &DerivedTable) -> Result<(), SinkError> {
        let path = self.output_path(&table.file_id);
        let csv_err = |source| SinkError::Csv {
            path: path.clone(),
            source,
        };

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_path(&path)
            .map_err(csv_err)?;

        if self.header {
            writer
                .write_record(self.columns.iter().map(|c| c.label()))
                .map_err(csv_err)?;
        }
        for record in &table.records {
            writer
                .write_record(self.columns.iter().map(|c| format_value(c.value(record))))
                .map_err(csv_err)?;
        }
        writer.flush().map_err(|source| SinkError::Io {
            path: path.clone(),
            source,
        })?;

        debug!("{} sink wrote {}", self.kind, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::geometry::GeometryConstants;
    use crate::data::model::{MeasurementTable, RawRecord};
    use crate::data::transform::transform;

    fn sample_table() -> DerivedTable {
        let g = GeometryConstants::compute(1.0, 10.0).unwrap();
        transform(
            &MeasurementTable::new(
                "t25.txt",
                vec![
                    RawRecord::new(1000.0, 500.0, 30.0),
                    RawRecord::new(10.0, 2000.0, 60.0),
                    RawRecord::new(0.0, 500.0, 30.0),
                ],
            ),
            &g,
        )
    }

    #[test]
    fn zview_file_has_three_columns_and_positive_imaginary() {
        let dir = tempfile::tempdir().unwrap();
        let table = sample_table();
        let mut sink = TextSink::zview(dir.path());
        sink.write_table(&table).unwrap();

        let text = std::fs::read_to_string(dir.path().join("t25.txt")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: Vec<&str> = lines[0].split(' ').collect();
        assert_eq!(first.len(), 3);
        assert_eq!(first[0], "1000");
        let z_real: f64 = first[1].parse().unwrap();
        let neg_z_imag: f64 = first[2].parse().unwrap();
        assert_eq!(z_real, table.records[0].z_real_spec);
        assert_eq!(neg_z_imag, -table.records[0].z_imag_spec);
        assert!(neg_z_imag > 0.0);
    }

    #[test]
    fn plain_data_has_header_and_full_columns() {
        let dir = tempfile::tempdir().unwrap();
        let table = sample_table();
        let mut sink = TextSink::plain_data(dir.path());
        sink.write_table(&table).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_path(dir.path().join("t25.txt"))
            .unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        let expected: Vec<&str> = FULL_COLUMNS.iter().map(|c| c.label()).collect();
        assert_eq!(headers, expected);

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 3);
        let freqs: Vec<&str> = rows.iter().map(|r| &r[0]).collect();
        assert_eq!(freqs, vec!["1000", "10", "0"]);
        let z_imag: f64 = rows[0][2].parse().unwrap();
        assert!(z_imag < 0.0);
        // logf of the zero-frequency row is blank.
        assert_eq!(&rows[2][3], "");
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = TextSink::plain_data(dir.path().join("absent"));
        assert!(sink.write_table(&sample_table()).is_err());

        sink.prepare().unwrap();
        sink.write_table(&sample_table()).unwrap();
        assert!(sink.output_path("t25.txt").exists());
    }
}
