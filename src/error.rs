/// Crate-level error types for batestamp diagnostics.
use std::path::PathBuf;

/// All fatal conditions in batestamp carry enough context to name the
/// offending file, row, or value without a debugger. Non-fatal anomalies
/// (unmatched attachments, orphaned children) are counted by the passes
/// and surfaced in the summary line instead of here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying CSV read/write error.
    #[error("csv: {0}")]
    Csv(
        /// The wrapped csv error.
        #[from]
        csv::Error,
    ),

    /// Advancing a host's folder segment ran past the integer range, so
    /// the attachment cannot be given a meaningful number.
    #[error("folder segment overflow deriving attachment {position} of `{value}`")]
    FolderOverflow {
        /// 1-based position of the attachment under its host.
        position: u32,
        /// The host Bates value whose folder segment could not be advanced.
        value: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// A host's existing Bates value does not have the expected
    /// four dot-separated parts, so attachment numbers cannot be derived.
    #[error("malformed Bates number `{value}` on row {row}: expected PREFIX.BOX.FOLDER.PAGE")]
    MalformedBates {
        /// One-based data row index in the input file.
        row: usize,
        /// The value that failed to parse.
        value: String,
    },

    /// A required input column is absent. Checked before any allocation
    /// begins so a run never emits a half-numbered table.
    #[error("missing required column `{column}` in {}", path.display())]
    MissingColumn {
        /// Header name that was not found.
        column: String,
        /// Input file that was missing the column.
        path: PathBuf,
    },

    /// A host row has no Bates value to increment from. The base is
    /// mandatory: attachment numbers are relative to it.
    #[error("host on row {row} has no Bates number to derive attachments from")]
    MissingHostBates {
        /// One-based data row index in the input file.
        row: usize,
    },

    /// The page counter outgrew its zero-padded width. Widening silently
    /// would reorder the production, so the run stops instead.
    #[error("page counter reached {page}, beyond the {width}-digit page field")]
    PageOverflow {
        /// The counter value that no longer fits.
        page: u64,
        /// Fixed page field width in digits.
        width: usize,
    },

    /// A data row carries more cells than the header names. Dropping the
    /// extras would lose cell data without a trace, so the load stops.
    #[error("row {row} has {cells} cells but the header names {columns} columns in {}", path.display())]
    RowTooWide {
        /// Cells found on the offending row.
        cells: usize,
        /// Columns named by the header.
        columns: usize,
        /// Input file containing the row.
        path: PathBuf,
        /// One-based data row index in the input file.
        row: usize,
    },
}
