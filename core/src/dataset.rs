use crate::error::{Result, RetrievalError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Column holding the free-text description of each record.
pub const DESCRIPTION_COLUMN: &str = "Description";

/// Cell contents read as a missing value, as spreadsheet exports tend to write them.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(value: &str) -> bool {
    MISSING_MARKERS.contains(&value)
}

/// One row of the dataset. Missing cells are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub fields: BTreeMap<String, String>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.get_or_empty(DESCRIPTION_COLUMN)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse comma-separated text with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.is_empty() {
            return Err(RetrievalError::InputFormat("no header row".into()));
        }
        let mut columns: Vec<String> = Vec::with_capacity(headers.len());
        for h in headers.iter() {
            if !columns.iter().any(|c| c == h) {
                columns.push(h.to_string());
            }
        }

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row?;
            if row.len() > headers.len() {
                let line = row.position().map(|p| p.line()).unwrap_or(0);
                return Err(RetrievalError::InputFormat(format!(
                    "line {line}: expected {} fields, saw {}",
                    headers.len(),
                    row.len()
                )));
            }
            let mut fields = BTreeMap::new();
            for (name, value) in headers.iter().zip(row.iter()) {
                if is_missing(value) {
                    continue;
                }
                // first occurrence of a duplicated header wins
                fields.entry(name.to_string()).or_insert_with(|| value.to_string());
            }
            records.push(Record { fields });
        }

        Ok(Self { columns, records })
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn require_column(&self, column: &str) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(RetrievalError::InputFormat(format!("dataset must contain a \"{column}\" column")))
        }
    }

    /// One description per record, in row order.
    pub fn descriptions(&self) -> Vec<&str> {
        self.records.iter().map(Record::description).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Dataset> {
        Dataset::from_reader(text.as_bytes())
    }

    #[test]
    fn reads_columns_and_rows() {
        let ds = parse("Summary,Description\nOutage,server crashed\nSlow,\"disk, full\"\n").unwrap();
        assert_eq!(ds.columns, vec!["Summary", "Description"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[1].description(), "disk, full");
        assert_eq!(ds.records[0].get("Summary"), Some("Outage"));
    }

    #[test]
    fn missing_values_read_as_empty() {
        let ds = parse("Id,Description\n1,\n2,NaN\n3\n4,ok\n").unwrap();
        assert_eq!(ds.descriptions(), vec!["", "", "", "ok"]);
        assert_eq!(ds.records[2].get("Id"), Some("3"));
    }

    #[test]
    fn header_only_is_an_empty_dataset() {
        let ds = parse("Description\n").unwrap();
        assert!(ds.is_empty());
        assert!(ds.require_column(DESCRIPTION_COLUMN).is_ok());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(parse(""), Err(RetrievalError::InputFormat(_))));
    }

    #[test]
    fn rejects_rows_wider_than_header() {
        let err = parse("Description\na,b\n").unwrap_err();
        assert!(matches!(err, RetrievalError::InputFormat(_)));
    }

    #[test]
    fn require_column_reports_missing_description() {
        let ds = parse("Summary\nx\n").unwrap();
        let err = ds.require_column(DESCRIPTION_COLUMN).unwrap_err();
        assert!(err.to_string().contains("Description"));
    }

    #[test]
    fn from_path_missing_file_is_io_error() {
        let err = Dataset::from_path("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, RetrievalError::Io(_)));
    }
}
