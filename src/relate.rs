//! Parent/child reconstruction from dotted row numbers, and the two-column
//! relationship report.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Serialize;

use crate::error::Error;
use crate::rownum::{ROW_COLUMN, is_whole_number};
use crate::table::{Table, clean_value};

/// Input column carrying the document identifier.
pub const CONTROL_COLUMN: &str = "Bates/Control #";

/// One line of the relationship report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyRow {
    /// The parent (or master-listed) identifier.
    #[serde(rename = "Bates/Control #")]
    pub bates: String,
    /// Parenthesized, comma-joined child identifiers, empty when childless.
    #[serde(rename = "Children")]
    pub children: String,
}

/// Counts reported after a relate pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelateSummary {
    /// Report rows emitted.
    pub parents: usize,
    /// Child links recorded.
    pub children: usize,
    /// Children with no tracked parent, or links falling outside the master
    /// set. Dropped from the report, never merged into an unrelated group.
    pub unmatched: usize,
}

/// Walk the listing in file order, grouping each child under the most
/// recently seen parent. A row is a parent iff its cleaned row-number token
/// is a whole number. Children appear in input order; a childless parent
/// gets an empty list; children before the first parent are counted as
/// unmatched.
///
/// # Errors
///
/// Returns `Error::MissingColumn` if either required column is absent.
pub fn resolve_sequential(table: &Table, input: &Path) -> Result<(Vec<FamilyRow>, RelateSummary), Error> {
    let row_col = table.require_column(ROW_COLUMN, input)?;
    let control_col = table.require_column(CONTROL_COLUMN, input)?;

    let mut rows = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;
    let mut children_total = 0;
    let mut unmatched = 0;

    for row in 0..table.rows.len() {
        let token = clean_value(table.cell(row, row_col));
        let bates = clean_value(table.cell(row, control_col));

        if is_whole_number(&token) {
            if let Some((parent, children)) = current.take() {
                rows.push(family_row(parent, &children));
            }
            current = Some((bates, Vec::new()));
        } else if let Some((_, children)) = current.as_mut() {
            children.push(bates);
            children_total += 1;
        } else {
            unmatched += 1;
        }
    }
    if let Some((parent, children)) = current {
        rows.push(family_row(parent, &children));
    }

    let summary = RelateSummary {
        parents: rows.len(),
        children: children_total,
        unmatched,
    };
    Ok((rows, summary))
}

/// Master-set variant: the relation is symmetric (parent↔child), only
/// identifiers on the master list participate, and the report carries one
/// row per master identifier in ascending order with children sorted
/// ascending for determinism.
///
/// # Errors
///
/// Returns `Error::MissingColumn` if the relationships file lacks its two
/// columns or the master file lacks the identifier column.
pub fn resolve_with_master(
    table: &Table,
    input: &Path,
    master: &Table,
    master_path: &Path,
) -> Result<(Vec<FamilyRow>, RelateSummary), Error> {
    let row_col = table.require_column(ROW_COLUMN, input)?;
    let control_col = table.require_column(CONTROL_COLUMN, input)?;
    let master_col = master.require_column(CONTROL_COLUMN, master_path)?;

    let master_set: BTreeSet<String> = (0..master.rows.len())
        .map(|row| clean_value(master.cell(row, master_col)))
        .filter(|v| !v.is_empty())
        .collect();

    let mut relationships: BTreeMap<&str, BTreeSet<String>> =
        master_set.iter().map(|b| (b.as_str(), BTreeSet::new())).collect();

    let mut current_parent: Option<String> = None;
    let mut links = 0;
    let mut unmatched = 0;
    for row in 0..table.rows.len() {
        let token = clean_value(table.cell(row, row_col));
        let bates = clean_value(table.cell(row, control_col));

        if is_whole_number(&token) {
            current_parent = Some(bates);
            continue;
        }
        let in_master = current_parent
            .as_deref()
            .is_some_and(|parent| master_set.contains(parent) && master_set.contains(&bates));
        if in_master {
            let Some(parent) = current_parent.clone() else {
                continue;
            };
            if let Some(set) = relationships.get_mut(parent.as_str()) {
                set.insert(bates.clone());
            }
            if let Some(set) = relationships.get_mut(bates.as_str()) {
                set.insert(parent);
            }
            links += 1;
        } else {
            unmatched += 1;
        }
    }

    let rows: Vec<FamilyRow> = relationships
        .iter()
        .map(|(bates, children)| {
            let ordered: Vec<String> = children.iter().cloned().collect();
            family_row((*bates).to_string(), &ordered)
        })
        .collect();

    let summary = RelateSummary {
        parents: rows.len(),
        children: links,
        unmatched,
    };
    Ok((rows, summary))
}

/// Build one report row, quoting reserved leading markers.
fn family_row(parent: String, children: &[String]) -> FamilyRow {
    FamilyRow {
        bates: quote_reserved(parent),
        children: render_children(children),
    }
}

/// Render a children list as `(a, b, c)`, or empty for no children.
fn render_children(children: &[String]) -> String {
    if children.is_empty() {
        String::new()
    } else {
        format!("({})", children.join(", "))
    }
}

/// Wrap values starting with `#` in literal double quotes so downstream
/// formula-interpreting consumers don't eat them.
fn quote_reserved(value: String) -> String {
    if value.starts_with('#') {
        format!("\"{value}\"")
    } else {
        value
    }
}

/// Write the report with automatic quoting disabled: the quotes placed by
/// `quote_reserved` and the comma-wrap below are the only ones the file
/// gets.
///
/// # Errors
///
/// Returns `Error::Io` or `Error::Csv` on write failure.
pub fn write_report(path: &Path, rows: &[FamilyRow]) -> Result<(), Error> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_path(path)?;
    if rows.is_empty() {
        writer.write_record([CONTROL_COLUMN, "Children"])?;
    }
    for row in rows {
        let children = if row.children.contains(',') {
            format!("\"{}\"", row.children)
        } else {
            row.children.clone()
        };
        writer.serialize(FamilyRow {
            bates: row.bates.clone(),
            children,
        })?;
    }
    writer.flush()?;
    Ok(())
}
