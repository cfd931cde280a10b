use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use grouper_engine::{merge_candidates, Selection, DELIMITER_PRESETS};
use grouper_io::{read_table, write_csv, write_table, ReadOptions, DEFAULT_SHEET_NAME};
use tracing_subscriber::EnvFilter;

use crate::preview::render_preview;

/// Command-line arguments for `sheet-grouper`.
#[derive(Debug, Parser)]
#[command(
    name = "sheet-grouper",
    about = "Group spreadsheet rows by key columns, merging selected columns into delimited lists."
)]
pub struct Args {
    /// Input workbook (.xlsx/.xlsm/.xlsb/.xls/.ods) or delimited text (.csv/.tsv).
    input: PathBuf,

    /// Worksheet to read from workbook inputs.
    #[arg(long, default_value = DEFAULT_SHEET_NAME)]
    sheet: String,

    /// Column to delete before grouping (repeatable).
    #[arg(long = "drop", value_name = "COLUMN")]
    drop_columns: Vec<String>,

    /// Column to group by (repeatable; order is kept in the output).
    #[arg(long = "group-by", value_name = "COLUMN")]
    group_by: Vec<String>,

    /// Column whose unique values are joined per group (repeatable).
    #[arg(long = "merge", value_name = "COLUMN")]
    merge_columns: Vec<String>,

    /// Delimiter placed between merged values (default ", ").
    ///
    /// Common choices: ", ", " | ", "; ", " / ", "||".
    #[arg(long)]
    delimiter: Option<String>,

    /// JSON file holding a saved selection. Flags given on the command line replace the
    /// corresponding fields.
    #[arg(long, value_name = "PATH")]
    selection: Option<PathBuf>,

    /// Output file (.xlsx, .csv or .tsv). Without it the result is written to stdout as CSV.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the column headers found in the input and exit.
    #[arg(long)]
    list_columns: bool,

    /// Print the first ROWS result rows as a text table on stderr.
    #[arg(long, value_name = "ROWS")]
    preview: Option<usize>,
}

/// Install the process-wide log subscriber. `RUST_LOG` overrides the default `warn` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    run_with_args(args, &mut handle)
}

pub fn run_with_args(args: Args, stdout: &mut impl Write) -> Result<()> {
    let selection = build_selection(&args)?;
    if !DELIMITER_PRESETS.contains(&selection.delimiter.as_str()) {
        log::info!("using custom delimiter {:?}", selection.delimiter);
    }

    let options = ReadOptions {
        sheet_name: args.sheet.clone(),
        ..ReadOptions::default()
    };
    let table = read_table(&args.input, &options)
        .with_context(|| format!("read {}", args.input.display()))?;

    if args.list_columns {
        return list_columns(&table, &selection, stdout);
    }

    let grouped = selection.apply(&table)?;
    log::info!(
        "grouped {} rows into {} rows",
        table.row_count(),
        grouped.row_count()
    );

    if let Some(rows) = args.preview {
        eprint!("{}", render_preview(&grouped, rows));
    }

    match &args.output {
        Some(path) => {
            write_table(path, &grouped).with_context(|| format!("write {}", path.display()))?;
            log::info!("wrote {} rows to {}", grouped.row_count(), path.display());
        }
        None => write_csv(&mut *stdout, &grouped, b',').context("write result to stdout")?,
    }
    Ok(())
}

fn build_selection(args: &Args) -> Result<Selection> {
    let mut selection = match &args.selection {
        Some(path) => load_selection(path)?,
        None => Selection::default(),
    };

    if !args.drop_columns.is_empty() {
        selection.drop_columns = args.drop_columns.clone();
    }
    if !args.group_by.is_empty() {
        selection.group_by = args.group_by.clone();
    }
    if !args.merge_columns.is_empty() {
        selection.merge_columns = args.merge_columns.clone();
    }
    if let Some(delimiter) = &args.delimiter {
        selection.delimiter = delimiter.clone();
    }
    Ok(selection)
}

fn load_selection(path: &Path) -> Result<Selection> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read selection file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse selection file {}", path.display()))
}

fn list_columns(
    table: &grouper_engine::Table,
    selection: &Selection,
    stdout: &mut impl Write,
) -> Result<()> {
    writeln!(stdout, "Columns: {}", table.columns().join(", "))?;
    if selection.drop_columns.is_empty() {
        return Ok(());
    }

    let kept = table.drop_columns(&selection.drop_columns)?;
    writeln!(stdout, "After drop: {}", kept.columns().join(", "))?;
    if !selection.group_by.is_empty() {
        let candidates = merge_candidates(&kept, &selection.group_by);
        writeln!(stdout, "Merge candidates: {}", candidates.join(", "))?;
    }
    Ok(())
}
