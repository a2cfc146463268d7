//! `timeline-viewer` command line front end.
//!
//! Thin presentation layer over the library: every command opens its tables
//! through [`Workspace`], so a file that fails to open is reported and never
//! displayed.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use timeline_viewer::{
    Cell, FilterColumn, RowFilter, TableConfig, TimelineTable, Workspace, config::default_data_dir,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "timeline-viewer", version, about = "Browse, tag and search forensic timelines")]
struct Cli {
    /// Directory for sidecar tag files
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show schema, size and tag state of a timeline
    Info {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print rows, tab separated
    Show {
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        start: usize,
        #[arg(long, default_value_t = 50)]
        count: usize,
    },
    /// Print one field in full, pretty-printing embedded JSON/XML messages
    Cell {
        file: PathBuf,
        row: usize,
        /// Column index or exact header name
        column: String,
    },
    /// Search one or more timelines for a substring
    Search {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        term: String,
        /// Column name; all columns when omitted
        #[arg(long)]
        column: Option<String>,
    },
    /// Tag rows and save
    Tag { file: PathBuf, rows: Vec<usize> },
    /// Remove tags from rows and save
    Untag { file: PathBuf, rows: Vec<usize> },
    /// List tagged rows
    Tags { file: PathBuf },
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = TableConfig::with_data_dir(cli.data_dir.unwrap_or_else(default_data_dir));
    let mut workspace = Workspace::new(config);

    match cli.command {
        Command::Info { file, json } => {
            let table = open(&mut workspace, &file)?;
            if json {
                let info = json!({
                    "path": table.path(),
                    "type": table.timeline_type(),
                    "rows": table.row_count(),
                    "columns": table.column_names(),
                    "tag_file": table.tag_path(),
                    "tagged": table.tagged_rows().len(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("File:     {}", table.path().display());
                println!("Type:     {}", table.timeline_type().label());
                println!("Rows:     {}", table.row_count());
                println!("Columns:  {}", table.column_names().join(", "));
                println!("Tag file: {}", table.tag_path().display());
                println!("Tagged:   {}", table.tagged_rows().len());
            }
        }
        Command::Show { file, start, count } => {
            let table = open(&mut workspace, &file)?;
            println!("#\t{}", table.column_names().join("\t"));
            let end = start.saturating_add(count).min(table.row_count());
            for row in start..end {
                let cells: Vec<String> = (0..table.column_count())
                    .map(|col| single_line(&table.get_cell(row, col)))
                    .collect();
                println!("{}\t{}", row, cells.join("\t"));
            }
        }
        Command::Cell { file, row, column } => {
            let table = open(&mut workspace, &file)?;
            let col = resolve_column(table, &column)?;
            if row >= table.row_count() {
                bail!("row {} out of range (0..{})", row, table.row_count());
            }
            println!("Field Details: {}", table.column_name(col).unwrap_or_default());
            println!("{}", table.get_cell(row, col));
        }
        Command::Search {
            files,
            term,
            column,
        } => {
            for file in &files {
                open(&mut workspace, file)?;
            }
            let filter = RowFilter::new(
                column.as_deref().map(FilterColumn::parse).unwrap_or_default(),
                term,
            );
            let report = workspace.search_all(&filter);
            for (table, outcome) in workspace.tables().iter().zip(&report.outcomes) {
                let rows: Vec<String> = outcome.rows.iter().map(|r| r.to_string()).collect();
                println!("{}: {} match(es) {}", table.file_name(), outcome.len(), rows.join(","));
            }
            if report.tables_matched() == 0 {
                println!("No matches found.");
            } else {
                println!("{} file(s) matched for '{}'.", report.tables_matched(), filter.term);
            }
        }
        Command::Tag { file, rows } => set_tags(&mut workspace, &file, &rows, true)?,
        Command::Untag { file, rows } => set_tags(&mut workspace, &file, &rows, false)?,
        Command::Tags { file } => {
            let table = open(&mut workspace, &file)?;
            for row in table.tagged_rows() {
                println!("{}", row);
            }
        }
    }

    Ok(())
}

fn open<'a>(workspace: &'a mut Workspace, file: &Path) -> Result<&'a TimelineTable> {
    let index = workspace
        .open(file)
        .with_context(|| format!("Failed to load the timeline file {}", file.display()))?;
    workspace
        .get(index)
        .context("opened table missing from workspace")
}

fn resolve_column(table: &TimelineTable, column: &str) -> Result<usize> {
    if let Ok(index) = column.parse::<usize>() {
        if index < table.column_count() {
            return Ok(index);
        }
        bail!("column {} out of range (0..{})", index, table.column_count());
    }
    table
        .column_index(column)
        .with_context(|| format!("no column named '{}'", column))
}

fn set_tags(workspace: &mut Workspace, file: &Path, rows: &[usize], tagged: bool) -> Result<()> {
    let table = open(workspace, file)?;
    if let Some(&row) = rows.iter().find(|&&r| r >= table.row_count()) {
        bail!("row {} out of range (0..{})", row, table.row_count());
    }
    let changed = rows.iter().filter(|&&row| table.set_tag(row, tagged)).count();
    if table.is_dirty() {
        table
            .save()
            .context("Failed to save tags. Please check file permissions.")?;
    }
    println!("{} row(s) changed, tags saved to {}", changed, table.tag_path().display());
    Ok(())
}

/// Collapse a cell to one line for tabular output
fn single_line(cell: &Cell) -> String {
    cell.to_string()
        .chars()
        .map(|c| if c == '\n' || c == '\t' || c == '\r' { ' ' } else { c })
        .collect()
}
