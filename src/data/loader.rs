use std::path::{Path, PathBuf};

use csv::StringRecord;
use log::debug;

use super::model::{MeasurementTable, RawRecord};
use crate::error::ProcessingError;

/// Number of fields the instrument writes per row: `f; |Z|; -φ`.
const FIELDS_PER_ROW: usize = 3;

// ---------------------------------------------------------------------------
// MeasurementReader – lazy row source for one sweep file
// ---------------------------------------------------------------------------

/// Reads one instrument file. No header, a single separator character.
///
/// Each call to [`MeasurementReader::records`] reopens the file, so the
/// sequence can be restarted by calling it again.
#[derive(Debug, Clone)]
pub struct MeasurementReader {
    path: PathBuf,
    delimiter: u8,
}

impl MeasurementReader {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            path: path.into(),
            delimiter,
        }
    }

    /// File name used as the dataset identity (sheet and output file names).
    pub fn file_id(&self) -> String {
        file_id(&self.path)
    }

    /// Rows in file order. Blank lines are skipped.
    pub fn records(
        &self,
    ) -> Result<impl Iterator<Item = Result<RawRecord, ProcessingError>>, ProcessingError> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|source| ProcessingError::InputIo {
                path: self.path.clone(),
                source,
            })?;

        let path = self.path.clone();
        Ok(reader
            .into_records()
            .enumerate()
            .map(move |(i, result)| {
                let record = result.map_err(|source| ProcessingError::InputIo {
                    path: path.clone(),
                    source,
                })?;
                let line = record.position().map(|p| p.line()).unwrap_or(i as u64 + 1);
                parse_record(&record, line)
            }))
    }

    /// Read the whole file. The first malformed row rejects the file.
    pub fn read_table(&self) -> Result<MeasurementTable, ProcessingError> {
        let records = self.records()?.collect::<Result<Vec<_>, _>>()?;
        debug!("read {} rows from {}", records.len(), self.path.display());
        Ok(MeasurementTable::new(self.file_id(), records))
    }
}

fn parse_record(record: &StringRecord, line: u64) -> Result<RawRecord, ProcessingError> {
    if record.len() != FIELDS_PER_ROW {
        return Err(ProcessingError::MalformedRecord {
            line,
            reason: format!(
                "expected {FIELDS_PER_ROW} fields, found {}",
                record.len()
            ),
        });
    }

    let mut values = [0.0_f64; FIELDS_PER_ROW];
    for (j, (slot, tok)) in values.iter_mut().zip(record.iter()).enumerate() {
        *slot = tok
            .parse::<f64>()
            .map_err(|_| ProcessingError::MalformedRecord {
                line,
                reason: format!("field {}: '{tok}' is not a number", j + 1),
            })?;
    }

    Ok(RawRecord::new(values[0], values[1], values[2]))
}

// ---------------------------------------------------------------------------
// Input discovery
// ---------------------------------------------------------------------------

pub fn file_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Every regular file directly inside `dir` whose extension matches
/// (case-insensitive), sorted by file name.
pub fn discover_inputs(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches {
            inputs.push(path);
        }
    }
    sort_by_file_name(&mut inputs);
    Ok(inputs)
}

/// Byte-wise order of file names, so `A.txt < b.txt < c.txt`. Ties (same
/// name in different directories) fall back to the full path.
pub fn sort_by_file_name(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs::File;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_rows_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "t25.txt", "1000;500;30\n100;800.5;45\n\n10000;120;12.5\n");

        let table = MeasurementReader::new(&path, b';').read_table().unwrap();
        assert_eq!(table.file_id, "t25.txt");
        let freqs: Vec<f64> = table.records.iter().map(|r| r.frequency_hz).collect();
        assert_eq!(freqs, vec![1000.0, 100.0, 10000.0]);
        assert_eq!(table.records[1], RawRecord::new(100.0, 800.5, 45.0));
    }

    #[test]
    fn wrong_field_count_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.txt", "1000;500;30\n100;800\n");

        let err = MeasurementReader::new(&path, b';').read_table().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRecord);
        match err {
            ProcessingError::MalformedRecord { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_numeric_field_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.txt", "f;|Z|;-phi\n1000;500;30\n");

        let err = MeasurementReader::new(&path, b';').read_table().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRecord);
    }

    #[test]
    fn records_can_be_restarted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.txt", "1;2;3\n4;5;6\n");
        let reader = MeasurementReader::new(&path, b';');

        let first: Vec<_> = reader.records().unwrap().map(Result::unwrap).collect();
        let second: Vec<_> = reader.records().unwrap().map(Result::unwrap).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn missing_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let reader = MeasurementReader::new(dir.path().join("nope.txt"), b';');
        assert_eq!(reader.read_table().unwrap_err().kind(), ErrorKind::InputIo);
    }

    #[test]
    fn discovery_filters_by_extension_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "A.txt", "c.TXT", "notes.md"] {
            write_file(dir.path(), name, "1;2;3\n");
        }
        std::fs::create_dir(dir.path().join("Zview_files")).unwrap();

        let names: Vec<String> = discover_inputs(dir.path(), "txt")
            .unwrap()
            .iter()
            .map(|p| file_id(p))
            .collect();
        assert_eq!(names, vec!["A.txt", "b.txt", "c.TXT"]);
    }
}
