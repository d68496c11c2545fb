use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Result;

/// An untyped table as read from a CSV export: one header row plus string
/// rows. Header names are whitespace-trimmed on read (source exports carry
/// stray padding); cell values are kept verbatim for the cleaning stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<RawTable> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        // Sheet exports often lead with a UTF-8 BOM glued to the first header
        if let Some(first) = columns.first_mut() {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.trim().to_string();
            }
        }

        let width = columns.len();
        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(|v| v.to_string()).collect();
            // Flexible parsing can yield ragged rows; normalize to header width
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(RawTable { columns, rows })
    }

    pub fn from_csv_bytes(bytes: &[u8]) -> Result<RawTable> {
        Self::from_csv_reader(bytes)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<RawTable> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value by row and column index; `None` past either bound.
    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(column)).map(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_headers_and_rows() {
        let csv = "County,Name,Age\nNairobi,Amina,24\nKisumu,Otieno,31\n";
        let table = RawTable::from_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["County", "Name", "Age"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value(0, 1), Some("Amina"));
        assert_eq!(table.value(1, 2), Some("31"));
    }

    #[test]
    fn trims_header_whitespace_but_keeps_cell_values() {
        let csv = " County , Phone Number(verify before entry) \nNairobi,  0712 345 678 \n";
        let table = RawTable::from_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(
            table.columns,
            vec!["County", "Phone Number(verify before entry)"]
        );
        assert_eq!(table.value(0, 1), Some("  0712 345 678 "));
    }

    #[test]
    fn strips_leading_bom_from_first_header() {
        let csv = "\u{feff}Timestamp,County\n4/25/2025 14:53:22,Nairobi\n";
        let table = RawTable::from_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(table.columns[0], "Timestamp");
    }

    #[test]
    fn pads_short_rows_to_header_width() {
        let csv = "County,Name,Age\nNairobi,Amina\n";
        let table = RawTable::from_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0], vec!["Nairobi", "Amina", ""]);
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let table = RawTable::from_csv_bytes(b"").unwrap();
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }

    #[test]
    fn header_only_input_yields_zero_rows() {
        let table = RawTable::from_csv_bytes(b"County,Name\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 2);
    }
}
