//! The sequence-allocation pass: one global page counter walked over
//! correctly ordered groups, plus family-root propagation inside folders.

use std::path::Path;

use crate::error::Error;
use crate::groups::{self, Group, ParsedRecord};
use crate::identifier::{self, PAGE_WIDTH};
use crate::paths::{ContainerPath, DocClass};
use crate::table::Table;

/// Input column holding the raw container path.
pub const PATH_COLUMN: &str = "File Path";
/// Output column receiving the allocated Bates number.
pub const BATES_COLUMN: &str = "Other Bates";
/// Output column linking a secondary document to its group root.
pub const PARENT_COLUMN: &str = "Parent ID";
/// Output column naming the family root for root and secondary documents.
pub const FAMILY_COLUMN: &str = "Begin Family";

/// Run configuration for one numbering pass.
#[derive(Debug, Clone)]
pub struct NumberingConfig {
    /// Free-text production prefix.
    pub prefix: String,
    /// Free-text box token.
    pub box_id: String,
    /// Folder token, used verbatim in every allocated number.
    pub folder_token: String,
    /// Whether to append the literal page suffix.
    pub include_suffix: bool,
    /// Filename prefix marking primary-class documents.
    pub primary_prefix: String,
    /// Filename prefix marking secondary-class documents.
    pub secondary_prefix: String,
}

/// Counts reported after a numbering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingSummary {
    /// Records that received a Bates number.
    pub numbered: usize,
    /// Groups visited, folder and archive-root alike.
    pub groups: usize,
    /// Records outside any archive, left untouched.
    pub skipped: usize,
}

/// The run-wide page counter. Threaded explicitly through the pass so the
/// numbering is a pure function of the ordered record sequence.
#[derive(Debug)]
struct PageCounter {
    next: u64,
}

impl PageCounter {
    fn new() -> Self {
        Self { next: 1 }
    }

    /// Take the next page value.
    ///
    /// # Errors
    ///
    /// Returns `Error::PageOverflow` once the counter no longer fits the
    /// fixed page width. Allocation stops rather than widening mid-run.
    fn allocate(&mut self) -> Result<u32, Error> {
        let max = 10u64.pow(u32::try_from(PAGE_WIDTH).unwrap_or(4)) - 1;
        if self.next > max {
            return Err(Error::PageOverflow {
                page: self.next,
                width: PAGE_WIDTH,
            });
        }
        let page = u32::try_from(self.next).unwrap_or(u32::MAX);
        self.next += 1;
        Ok(page)
    }
}

/// Assign Bates numbers to every archive-scoped record and propagate family
/// roots inside folder groups. Consumes the input table and returns the
/// numbered one; on error nothing is written anywhere.
///
/// # Errors
///
/// Returns `Error::MissingColumn` if the path column is absent, or
/// `Error::PageOverflow` if the batch exhausts the page field.
pub fn apply(
    mut table: Table,
    config: &NumberingConfig,
    input: &Path,
) -> Result<(Table, NumberingSummary), Error> {
    let path_col = table.require_column(PATH_COLUMN, input)?;
    let bates_col = table.ensure_column(BATES_COLUMN);
    let parent_col = table.ensure_column(PARENT_COLUMN);
    let family_col = table.ensure_column(FAMILY_COLUMN);

    // Family columns are derived in full by this pass; stale values from a
    // previous run must not leak through.
    table.clear_column(parent_col);
    table.clear_column(family_col);

    let records = parse_records(&table, path_col, config);
    let skipped = records.iter().filter(|r| !r.container.in_archive()).count();
    let groups = groups::build_groups(records);

    let mut counter = PageCounter::new();
    let mut numbered = 0;
    for group in &groups {
        numbered += allocate_group(&mut table, group, config, &mut counter, bates_col)?;
        if !group.is_archive_root() {
            propagate_family_root(&mut table, group, bates_col, parent_col, family_col);
        }
    }

    let summary = NumberingSummary {
        numbered,
        groups: groups.len(),
        skipped,
    };
    Ok((table, summary))
}

/// Annotate every row with parsed path tokens and a document class.
fn parse_records(table: &Table, path_col: usize, config: &NumberingConfig) -> Vec<ParsedRecord> {
    (0..table.rows.len())
        .map(|row| {
            let raw = table.cell(row, path_col);
            let container = ContainerPath::parse(raw);
            let class = DocClass::classify(
                &container.filename,
                &config.primary_prefix,
                &config.secondary_prefix,
            );
            ParsedRecord {
                row,
                path: raw.to_string(),
                container,
                class,
            }
        })
        .collect()
}

/// Stamp each member of one group, in the group's allocation order.
fn allocate_group(
    table: &mut Table,
    group: &Group,
    config: &NumberingConfig,
    counter: &mut PageCounter,
    bates_col: usize,
) -> Result<usize, Error> {
    for member in &group.members {
        let page = counter.allocate()?;
        let bates = identifier::compose(
            &config.prefix,
            &config.box_id,
            &config.folder_token,
            page,
            config.include_suffix,
        );
        table.set_cell(member.row, bates_col, bates);
    }
    Ok(group.members.len())
}

/// Designate the group's first primary record (in allocation order) as the
/// family root: it anchors its own family column, and every secondary
/// sibling points at it through both family and parent columns. Other-class
/// siblings are left alone. A group with no primary record is skipped.
fn propagate_family_root(
    table: &mut Table,
    group: &Group,
    bates_col: usize,
    parent_col: usize,
    family_col: usize,
) {
    let Some(root) = group.members.iter().find(|m| m.class == DocClass::Primary) else {
        return;
    };
    let root_bates = table.cell(root.row, bates_col).to_string();

    table.set_cell(root.row, family_col, root_bates.clone());
    for member in &group.members {
        if member.class == DocClass::Secondary {
            table.set_cell(member.row, family_col, root_bates.clone());
            table.set_cell(member.row, parent_col, root_bates.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> NumberingConfig {
        NumberingConfig {
            prefix: "ABC".to_string(),
            box_id: "001".to_string(),
            folder_token: "005".to_string(),
            include_suffix: false,
            primary_prefix: "FE".to_string(),
            secondary_prefix: "Civmec".to_string(),
        }
    }

    fn table_with_paths(paths: &[&str]) -> Table {
        Table {
            headers: vec![PATH_COLUMN.to_string()],
            rows: paths.iter().map(|p| vec![(*p).to_string()]).collect(),
        }
    }

    fn run(paths: &[&str]) -> (Table, NumberingSummary) {
        apply(table_with_paths(paths), &config(), Path::new("in.csv")).unwrap()
    }

    fn bates(table: &Table, row: usize) -> &str {
        let col = table.column(BATES_COLUMN).unwrap();
        table.cell(row, col)
    }

    #[test]
    fn counter_is_global_and_contiguous() {
        let (table, summary) = run(&[
            "b.zip///F/FE 1.pdf",
            "a.zip///F/doc.txt",
            "a.zip//root.txt",
        ]);
        // Allocation order: a.zip/F, then b.zip/F, then a.zip root.
        assert_eq!(bates(&table, 1), "ABC.001.005.0001");
        assert_eq!(bates(&table, 0), "ABC.001.005.0002");
        assert_eq!(bates(&table, 2), "ABC.001.005.0003");
        assert_eq!(summary.numbered, 3);
        assert_eq!(summary.groups, 3);
    }

    #[test]
    fn records_outside_archives_are_left_blank() {
        let (table, summary) = run(&["loose.pdf", "a.zip///F/FE 1.pdf"]);
        assert_eq!(bates(&table, 0), "");
        assert_eq!(bates(&table, 1), "ABC.001.005.0001");
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn class_precedence_orders_allocation_within_a_group() {
        let (table, _) = run(&[
            "a.zip///F/notes.txt",
            "a.zip///F/Civmec 1.pdf",
            "a.zip///F/FE 1.pdf",
        ]);
        assert_eq!(bates(&table, 2), "ABC.001.005.0001");
        assert_eq!(bates(&table, 1), "ABC.001.005.0002");
        assert_eq!(bates(&table, 0), "ABC.001.005.0003");
    }

    #[test]
    fn family_root_reaches_secondaries_but_not_others() {
        let (table, _) = run(&[
            "a.zip///F/FE 1.pdf",
            "a.zip///F/Civmec 1.pdf",
            "a.zip///F/Civmec 2.pdf",
            "a.zip///F/notes.txt",
        ]);
        let parent_col = table.column(PARENT_COLUMN).unwrap();
        let family_col = table.column(FAMILY_COLUMN).unwrap();
        let root = "ABC.001.005.0001";

        assert_eq!(table.cell(0, family_col), root);
        assert_eq!(table.cell(0, parent_col), "");
        assert_eq!(table.cell(1, family_col), root);
        assert_eq!(table.cell(1, parent_col), root);
        assert_eq!(table.cell(2, family_col), root);
        assert_eq!(table.cell(2, parent_col), root);
        assert_eq!(table.cell(3, family_col), "");
        assert_eq!(table.cell(3, parent_col), "");
    }

    #[test]
    fn group_without_primary_skips_propagation() {
        let (table, _) = run(&["a.zip///F/Civmec 1.pdf", "a.zip///F/notes.txt"]);
        let family_col = table.column(FAMILY_COLUMN).unwrap();
        assert_eq!(bates(&table, 0), "ABC.001.005.0001");
        assert_eq!(table.cell(0, family_col), "");
        assert_eq!(table.cell(1, family_col), "");
    }

    #[test]
    fn archive_root_group_gets_numbers_but_no_family() {
        let (table, _) = run(&["a.zip//FE loose.pdf", "a.zip//Civmec loose.pdf"]);
        let family_col = table.column(FAMILY_COLUMN).unwrap();
        assert_eq!(bates(&table, 0), "ABC.001.005.0001");
        assert_eq!(bates(&table, 1), "ABC.001.005.0002");
        assert_eq!(table.cell(0, family_col), "");
        assert_eq!(table.cell(1, family_col), "");
    }

    #[test]
    fn suffix_is_appended_when_configured() {
        let mut cfg = config();
        cfg.include_suffix = true;
        let (table, _) = apply(
            table_with_paths(&["a.zip///F/FE 1.pdf"]),
            &cfg,
            Path::new("in.csv"),
        )
        .unwrap();
        assert_eq!(bates(&table, 0), "ABC.001.005.0001_0001");
    }

    #[test]
    fn page_overflow_is_fatal() {
        let mut counter = PageCounter { next: 10_000 };
        let err = counter.allocate().unwrap_err();
        assert!(matches!(err, Error::PageOverflow { page: 10_000, .. }));
    }

    #[test]
    fn missing_path_column_is_fatal() {
        let table = Table {
            headers: vec!["Name".to_string()],
            rows: vec![],
        };
        let err = apply(table, &config(), Path::new("in.csv")).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { .. }));
    }
}
