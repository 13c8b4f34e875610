//! In-memory delimited table: loading, column management, and writing.

use std::path::Path;

use crate::error::Error;

/// An ordered delimited table held fully in memory. Every pass consumes a
/// `Table` and produces a new one; nothing streams. Header names are trimmed
/// at load and ragged rows are padded to header width, so downstream code can
/// index cells without bounds anxiety.
#[derive(Debug, Clone)]
pub struct Table {
    /// Trimmed header names, in file order.
    pub headers: Vec<String>,
    /// Data rows, each padded to `headers.len()` cells.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Read a headered CSV file from disk. Short rows are padded with empty
    /// cells; a row wider than the header is a fatal load error — the extra
    /// cells can't be kept consistently and must not vanish silently.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be opened, `Error::Csv` if a
    /// record cannot be parsed, or `Error::RowTooWide` for a row with more
    /// cells than the header.
    pub fn read(path: &Path) -> Result<Self, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| return h.trim().to_string())
            .collect();

        let width = headers.len();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() > width {
                return Err(Error::RowTooWide {
                    cells: row.len(),
                    columns: width,
                    path: path.to_path_buf(),
                    row: rows.len() + 1,
                });
            }
            row.resize(width, String::new());
            rows.push(row);
        }

        return Ok(Self { headers, rows });
    }

    /// Write the table back out as CSV with standard quoting.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` or `Error::Csv` on write failure.
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        return Ok(());
    }

    /// Look up a column index by its trimmed header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        return self.headers.iter().position(|h| return h == name);
    }

    /// Look up a column, failing with a schema diagnostic naming the input
    /// file. Called before any allocation so runs fail before output exists.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingColumn` if the header is absent.
    pub fn require_column(&self, name: &str, path: &Path) -> Result<usize, Error> {
        return self.column(name).ok_or_else(|| {
            return Error::MissingColumn {
                column: name.to_string(),
                path: path.to_path_buf(),
            };
        });
    }

    /// Return the index of `name`, appending an empty column if absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        return self.headers.len() - 1;
    }

    /// Blank every cell in a column. Passes that recompute a derived column
    /// clear it first so stale values never survive a rerun.
    pub fn clear_column(&mut self, idx: usize) {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(idx) {
                cell.clear();
            }
        }
    }

    /// Read one cell, empty string for out-of-range indices.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        return self
            .rows
            .get(row)
            .and_then(|r| return r.get(col))
            .map_or("", String::as_str);
    }

    /// Overwrite one cell. Out-of-range writes are ignored; rows are padded
    /// at load so this only happens for a bad row index.
    pub fn set_cell(&mut self, row: usize, col: usize, value: String) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| return r.get_mut(col)) {
            *cell = value;
        }
    }
}

/// Strip the braille blank character (U+2800) and surrounding whitespace.
/// Key columns in exported review tables carry these as invisible padding.
pub fn clean_value(value: &str) -> String {
    return value.replace('\u{2800}', "").trim().to_string();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table {
            headers: vec!["A".to_string(), "B".to_string()],
            rows: vec![
                vec!["1".to_string(), "x".to_string()],
                vec!["2".to_string(), "y".to_string()],
            ],
        }
    }

    #[test]
    fn ensure_column_appends_and_pads() {
        let mut table = sample();
        let idx = table.ensure_column("C");
        assert_eq!(idx, 2);
        assert_eq!(table.cell(0, 2), "");
        assert_eq!(table.cell(1, 2), "");
    }

    #[test]
    fn ensure_column_returns_existing_index() {
        let mut table = sample();
        assert_eq!(table.ensure_column("B"), 1);
        assert_eq!(table.headers.len(), 2);
    }

    #[test]
    fn clean_value_strips_braille_blank() {
        assert_eq!(clean_value("\u{2800} 3.1 \u{2800}"), "3.1");
    }

    #[test]
    fn short_rows_are_padded_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "A,B,C\n1,x\n").unwrap();

        let table = Table::read(&path).unwrap();
        assert_eq!(table.rows, vec![vec!["1", "x", ""]]);
    }

    #[test]
    fn over_wide_rows_fail_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "A,B\n1,x\n2,y,extra\n").unwrap();

        let err = Table::read(&path).unwrap_err();
        assert!(matches!(
            err,
            Error::RowTooWide {
                row: 2,
                cells: 3,
                columns: 2,
                ..
            }
        ));
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let table = sample();
        let err = table
            .require_column("Row #", Path::new("in.csv"))
            .unwrap_err();
        assert!(err.to_string().contains("Row #"));
    }
}
