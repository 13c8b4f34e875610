mod attachments;
mod error;
mod filter;
mod groups;
mod identifier;
mod number;
mod paths;
mod relate;
mod rownum;
mod table;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::number::NumberingConfig;
use crate::table::Table;

#[derive(Parser)]
#[command(
    name = "batestamp",
    about = "Bates numbering and family relationships for document productions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign Bates numbers to records extracted from nested archives
    Number {
        /// Input CSV with a `File Path` column
        #[arg(long, short = 'i')]
        input: PathBuf,
        /// Output CSV (default: output.csv beside the input)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Production prefix, the first Bates field
        #[arg(long)]
        prefix: String,
        /// Box token, the second Bates field
        #[arg(long = "box")]
        box_id: String,
        /// Folder token, the third Bates field, used verbatim
        #[arg(long)]
        folder: String,
        /// Append the literal `_0001` page suffix
        #[arg(long)]
        suffix: bool,
        /// Filename prefix marking primary-class documents
        #[arg(long, default_value = "FE")]
        primary_prefix: String,
        /// Filename prefix marking secondary-class documents
        #[arg(long, default_value = "Civmec")]
        secondary_prefix: String,
    },
    /// Derive attachment Bates numbers from each host's existing number
    Attachments {
        /// Input CSV with `Row #` and `Other Bates` columns
        #[arg(long, short = 'i')]
        input: PathBuf,
        /// Output CSV (default: <input stem>_updated.csv beside the input)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Rebuild parent/child groupings from dotted row numbers
    Relate {
        /// Input CSV with `Row #` and `Bates/Control #` columns
        #[arg(long, short = 'i')]
        input: PathBuf,
        /// Output CSV (default: output.csv beside the input)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Master list CSV; restricts the report to listed identifiers and
        /// makes the relation symmetric
        #[arg(long)]
        master: Option<PathBuf>,
    },
    /// Drop standalone rows, keeping only grouped documents
    Filter {
        /// Input CSV with a `Row #` column
        #[arg(long, short = 'i')]
        input: PathBuf,
        /// Output CSV (default: grouped_documents.csv beside the input)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Number {
            input,
            output,
            prefix,
            box_id,
            folder,
            suffix,
            primary_prefix,
            secondary_prefix,
        } => {
            let config = NumberingConfig {
                prefix,
                box_id,
                folder_token: folder,
                include_suffix: suffix,
                primary_prefix,
                secondary_prefix,
            };
            cmd_number(&input, output, &config)
        }
        Commands::Attachments { input, output } => cmd_attachments(&input, output),
        Commands::Relate {
            input,
            output,
            master,
        } => cmd_relate(&input, output, master.as_deref()),
        Commands::Filter { input, output } => cmd_filter(&input, output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run the numbering pass end to end. The pass completes in memory before
/// the output file is created, so a fatal error never leaves a
/// half-numbered table behind.
///
/// # Errors
///
/// Returns errors from reading, allocation, or writing.
fn cmd_number(
    input: &Path,
    output: Option<PathBuf>,
    config: &NumberingConfig,
) -> Result<(), error::Error> {
    let out_path = output.unwrap_or_else(|| sibling(input, "output.csv"));

    let table = Table::read(input)?;
    let (numbered, summary) = number::apply(table, config, input)?;
    numbered.write(&out_path)?;

    println!(
        "Numbered {} records across {} groups ({} outside archives); output saved to {}",
        summary.numbered,
        summary.groups,
        summary.skipped,
        out_path.display()
    );
    Ok(())
}

/// Run the attachment-derivation pass end to end.
///
/// # Errors
///
/// Returns errors from reading, derivation, or writing.
fn cmd_attachments(input: &Path, output: Option<PathBuf>) -> Result<(), error::Error> {
    let out_path = output.unwrap_or_else(|| updated_sibling(input));

    let table = Table::read(input)?;
    let (updated, summary) = attachments::apply(table, input)?;
    updated.write(&out_path)?;

    println!(
        "Assigned {} attachment numbers under {} hosts ({} unmatched); output saved to {}",
        summary.assigned,
        summary.hosts,
        summary.unmatched,
        out_path.display()
    );
    Ok(())
}

/// Run the relationship resolver, sequential or master-restricted.
///
/// # Errors
///
/// Returns errors from reading, resolution, or report writing.
fn cmd_relate(
    input: &Path,
    output: Option<PathBuf>,
    master: Option<&Path>,
) -> Result<(), error::Error> {
    let out_path = output.unwrap_or_else(|| sibling(input, "output.csv"));

    let table = Table::read(input)?;
    let (rows, summary) = match master {
        Some(master_path) => {
            let master_table = Table::read(master_path)?;
            relate::resolve_with_master(&table, input, &master_table, master_path)?
        }
        None => relate::resolve_sequential(&table, input)?,
    };
    relate::write_report(&out_path, &rows)?;

    println!(
        "Wrote {} parents with {} child links ({} unmatched) to {}",
        summary.parents,
        summary.children,
        summary.unmatched,
        out_path.display()
    );
    Ok(())
}

/// Run the grouped-rows filter.
///
/// # Errors
///
/// Returns errors from reading, filtering, or writing.
fn cmd_filter(input: &Path, output: Option<PathBuf>) -> Result<(), error::Error> {
    let out_path = output.unwrap_or_else(|| sibling(input, "grouped_documents.csv"));

    let table = Table::read(input)?;
    let (filtered, summary) = filter::apply(table, input)?;
    filtered.write(&out_path)?;

    println!(
        "Kept {} grouped rows, removed {} standalone; output saved to {}",
        summary.kept,
        summary.removed,
        out_path.display()
    );
    Ok(())
}

/// A path next to the input with a fixed filename.
fn sibling(input: &Path, name: &str) -> PathBuf {
    input.parent().unwrap_or(Path::new(".")).join(name)
}

/// `<stem>_updated.csv` next to the input.
fn updated_sibling(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    sibling(input, &format!("{stem}_updated.csv"))
}
