//! Standalone-row filtering: keep only documents that belong to a group.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Error;
use crate::rownum::{ROW_COLUMN, RowKeyParser, RowNumber};
use crate::table::Table;

/// Counts reported after a filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    /// Rows kept.
    pub kept: usize,
    /// Standalone rows removed.
    pub removed: usize,
}

/// Drop every row whose integer row-number prefix appears only once —
/// standalone documents with neither siblings nor children. Rows with no
/// parseable key are standalone by definition. Survivors keep their columns
/// and input order.
///
/// # Errors
///
/// Returns `Error::MissingColumn` if the row-number column is absent.
pub fn apply(mut table: Table, input: &Path) -> Result<(Table, FilterSummary), Error> {
    let row_col = table.require_column(ROW_COLUMN, input)?;

    let parser = RowKeyParser::new();
    let keys: Vec<Option<u64>> = table
        .rows
        .iter()
        .map(|row| {
            match parser.parse(row.get(row_col).map_or("", String::as_str)) {
                RowNumber::Host(n) | RowNumber::Attachment { host: n } => Some(n),
                RowNumber::Unkeyed => None,
            }
        })
        .collect();

    let mut population: HashMap<u64, usize> = HashMap::new();
    for key in keys.iter().flatten() {
        *population.entry(*key).or_insert(0) += 1;
    }

    let before = table.rows.len();
    let mut keys_iter = keys.iter();
    table.rows.retain(|_| {
        keys_iter
            .next()
            .and_then(|k| k.as_ref())
            .is_some_and(|k| population.get(k).copied().unwrap_or(0) > 1)
    });

    let summary = FilterSummary {
        kept: table.rows.len(),
        removed: before - table.rows.len(),
    };
    Ok((table, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(tokens: &[&str]) -> Table {
        Table {
            headers: vec![ROW_COLUMN.to_string(), "Doc".to_string()],
            rows: tokens
                .iter()
                .enumerate()
                .map(|(i, t)| vec![(*t).to_string(), format!("doc{i}")])
                .collect(),
        }
    }

    #[test]
    fn standalone_rows_are_removed() {
        let (out, summary) = apply(
            table(&["1", "1.1", "2", "3", "3.1", "3.2"]),
            Path::new("in.csv"),
        )
        .unwrap();
        let kept: Vec<&str> = out.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(kept, vec!["1", "1.1", "3", "3.1", "3.2"]);
        assert_eq!(summary.removed, 1);
    }

    #[test]
    fn unkeyed_rows_count_as_standalone() {
        let (out, _) = apply(table(&["junk", "1", "1.1"]), Path::new("in.csv")).unwrap();
        assert_eq!(out.rows.len(), 2);
    }

    #[test]
    fn order_is_preserved() {
        let (out, _) = apply(table(&["2.1", "1", "2", "1.1"]), Path::new("in.csv")).unwrap();
        let kept: Vec<&str> = out.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(kept, vec!["2.1", "1", "2", "1.1"]);
    }
}
