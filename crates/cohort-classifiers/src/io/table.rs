//! Delimited text reader producing an in-memory table of string cells.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::error::{ClassifierError, Result};

/// Header names plus one string record per input row.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

impl Table {
    pub fn new(headers: Vec<String>, records: Vec<StringRecord>) -> Self {
        Self { headers, records }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn nrows(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact header match first, then ASCII case-insensitive.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header == name)
            .or_else(|| {
                self.headers
                    .iter()
                    .position(|header| header.eq_ignore_ascii_case(name))
            })
    }

    /// Cells of the named column, one per row. Rows shorter than the header
    /// yield an empty cell.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| ClassifierError::MissingColumn(name.to_string()))?;
        Ok(self
            .records
            .iter()
            .map(|record| record.get(idx).unwrap_or(""))
            .collect())
    }
}

/// Delimiter implied by the file extension: tab for `.tsv`, comma otherwise.
pub fn delimiter_for_path(path: &Path) -> u8 {
    let is_tsv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tsv"))
        .unwrap_or(false);
    if is_tsv {
        b'\t'
    } else {
        b','
    }
}

/// Read a delimited file with a header row into a [`Table`].
///
/// When `delimiter` is `None` it is inferred from the extension.
pub fn read_table<P: AsRef<Path>>(path: P, delimiter: Option<u8>) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ClassifierError::io(path, source))?;
    let delimiter = delimiter.unwrap_or_else(|| delimiter_for_path(path));

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let csv_err = |source: csv::Error| ClassifierError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        records.push(result.map_err(csv_err)?);
    }

    if records.is_empty() {
        return Err(ClassifierError::EmptyDataset);
    }

    log::debug!(
        "Read {} rows x {} columns from {}",
        records.len(),
        headers.len(),
        path.display()
    );

    Ok(Table::new(headers, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_csv_with_trimmed_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "scores.csv", "a , b\n1,2\n3,4\n");
        let table = read_table(&path, None).unwrap();
        assert_eq!(table.headers(), &["a".to_string(), "b".to_string()]);
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.column("b").unwrap(), vec!["2", "4"]);
    }

    #[test]
    fn infers_tab_delimiter_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "scores.tsv", "x\ty\n1\t2\n");
        let table = read_table(&path, None).unwrap();
        assert_eq!(table.column("Y").unwrap(), vec!["2"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_table("/nonexistent/scores.csv", None).unwrap_err();
        assert!(matches!(err, ClassifierError::Io { .. }));
    }

    #[test]
    fn ragged_row_is_a_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bad.csv", "a,b\n1,2\n3\n");
        let err = read_table(&path, None).unwrap_err();
        assert!(matches!(err, ClassifierError::Csv { .. }));
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "empty.csv", "a,b\n");
        assert!(matches!(
            read_table(&path, None),
            Err(ClassifierError::EmptyDataset)
        ));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let table = Table::new(vec!["a".to_string()], vec![StringRecord::from(vec!["1"])]);
        match table.column("b") {
            Err(ClassifierError::MissingColumn(name)) => assert_eq!(name, "b"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }
}
