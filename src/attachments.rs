//! The attachment-derivation pass: each host's existing Bates number seeds
//! its attachments by folder-segment increment.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Error;
use crate::identifier::BatesNumber;
use crate::number::BATES_COLUMN;
use crate::rownum::{ROW_COLUMN, RowKeyParser, RowNumber};
use crate::table::{Table, clean_value};

/// Counts reported after an attachment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentSummary {
    /// Host rows found.
    pub hosts: usize,
    /// Attachments that received a derived Bates number.
    pub assigned: usize,
    /// Non-host rows with no host to derive from; their Bates cells are
    /// cleared, never guessed.
    pub unmatched: usize,
}

/// Derive attachment Bates numbers from each host's existing value.
///
/// Hosts are rows whose cleaned row-number token is a bare integer; every
/// other row belongs to the host sharing its integer prefix and is numbered
/// by its 1-based position among that host's attachments, in file order.
/// The derived value is the host's number with the folder segment advanced
/// by the position, at the host's digit width.
///
/// # Errors
///
/// Returns `Error::MissingColumn` if the row-number or Bates column is
/// absent, `Error::MissingHostBates` if a host has no base value, or
/// `Error::MalformedBates` if a host's value is not a four-part number.
/// All three are checked before any cell is modified.
pub fn apply(mut table: Table, input: &Path) -> Result<(Table, AttachmentSummary), Error> {
    let row_col = table.require_column(ROW_COLUMN, input)?;
    let bates_col = table.require_column(BATES_COLUMN, input)?;

    let parser = RowKeyParser::new();
    let keys: Vec<RowNumber> = table
        .rows
        .iter()
        .map(|row| parser.parse(row.get(row_col).map_or("", String::as_str)))
        .collect();

    let hosts = collect_host_bases(&table, &keys, bates_col)?;

    // Attachment lists per host, strictly in file order.
    let mut pending: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut unmatched = 0;
    for (row, key) in keys.iter().enumerate() {
        match key {
            RowNumber::Host(_) => {}
            RowNumber::Attachment { host } if hosts.contains_key(host) => {
                pending.entry(*host).or_default().push(row);
            }
            RowNumber::Attachment { .. } | RowNumber::Unkeyed => {
                unmatched += 1;
                table.set_cell(row, bates_col, String::new());
            }
        }
    }

    let mut assigned = 0;
    for (host, rows) in &pending {
        let Some(base) = hosts.get(host) else {
            continue;
        };
        for (position, row) in (1u32..).zip(rows.iter()) {
            let folder = base.folder.checked_add(position).ok_or_else(|| {
                Error::FolderOverflow {
                    position,
                    value: base.to_string(),
                }
            })?;
            let derived = base.with_folder(folder);
            table.set_cell(*row, bates_col, derived.to_string());
            assigned += 1;
        }
    }

    let summary = AttachmentSummary {
        hosts: hosts.len(),
        assigned,
        unmatched,
    };
    Ok((table, summary))
}

/// Parse every host's base Bates number up front. A missing or malformed
/// base is fatal before any attachment is touched — the increment is
/// relative, so there is nothing safe to fall back to.
fn collect_host_bases(
    table: &Table,
    keys: &[RowNumber],
    bates_col: usize,
) -> Result<HashMap<u64, BatesNumber>, Error> {
    let mut hosts = HashMap::new();
    for (row, key) in keys.iter().enumerate() {
        let RowNumber::Host(host) = key else {
            continue;
        };
        let value = clean_value(table.cell(row, bates_col));
        if value.is_empty() {
            return Err(Error::MissingHostBates { row: row + 1 });
        }
        let base = BatesNumber::parse(&value).ok_or_else(|| Error::MalformedBates {
            row: row + 1,
            value: value.clone(),
        })?;
        hosts.insert(*host, base);
    }
    Ok(hosts)
}
