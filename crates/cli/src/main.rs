// gsheets - headless driver for the grid projection engine

mod exit_codes;
mod render;

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use gqlsheets_config::Settings;
use gqlsheets_core::{
    build_columns, column_address, column_index, history, project_indexed, CellIndex,
    ColumnLayout, EditSession, GridSession,
};
use gqlsheets_protocol::{to_jsonl, CellRecord, InboundReader, ProtocolError};

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};
use render::RenderFormat;

#[derive(Parser)]
#[command(name = "gsheets")]
#[command(about = "Project remote cell records into a grid and replay live edit sessions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the letter address of each column index
    #[command(after_help = "\
Examples:
  gsheets address 0 25 26 701    # A Z AA ZZ
  gsheets address -1             # empty line")]
    Address {
        /// Zero-based column indices (negative indices have no address)
        #[arg(required = true, allow_negative_numbers = true)]
        indices: Vec<i64>,
    },

    /// Print the zero-based column index of each letter address
    Index {
        /// Uppercase column addresses, e.g. A, Z, AA
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Print the column schema for a sheet with COUNT declared columns
    Columns {
        /// Declared column count
        count: usize,

        /// Output descriptors as JSON
        #[arg(long)]
        json: bool,

        /// Settings file (defaults to the platform config dir)
        #[arg(long, env = "GSHEETS_SETTINGS")]
        settings: Option<PathBuf>,
    },

    /// Project a JSON array of cell records into rows
    #[command(after_help = "\
Input is a JSON array of records:
  [{\"rowIndex\":0,\"columnIndex\":0,\"rawValue\":\"=1+1\",\"computedValue\":\"2\"}]")]
    Project {
        /// JSON file with cell records
        file: PathBuf,

        /// Declared row count (rows past the last record are padded)
        #[arg(long, default_value_t = 0)]
        rows: usize,

        /// Declared column count (defaults to the widest record)
        #[arg(long)]
        columns: Option<usize>,

        /// Output format
        #[arg(long, short = 'f', value_enum, default_value = "table")]
        format: RenderFormat,

        /// Settings file (defaults to the platform config dir)
        #[arg(long, env = "GSHEETS_SETTINGS")]
        settings: Option<PathBuf>,
    },

    /// Feed a JSONL event log through a grid session
    #[command(after_help = "\
Each input line is one inbound event, e.g.
  {\"type\":\"sheet_loaded\",\"sheet\":{\"id\":\"1\",\"rowCount\":3,\"columnCount\":3}}
Outbound requests are written to stdout, one JSON object per line.")]
    Replay {
        /// Event log (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Sheet id to follow (defaults to the `sheet.id` setting)
        #[arg(long)]
        sheet: Option<String>,

        /// Settings file (defaults to the platform config dir)
        #[arg(long, env = "GSHEETS_SETTINGS")]
        settings: Option<PathBuf>,

        /// Render the final grid after the requests
        #[arg(long, value_enum)]
        render: Option<RenderFormat>,

        /// Suppress the summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Show the effective settings
    Config {
        /// Print only the settings file path
        #[arg(long)]
        path: bool,

        /// Write the default settings file if none exists
        #[arg(long, conflicts_with = "path")]
        init: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Address { indices } => cmd_address(indices),
        Commands::Index { addresses } => cmd_index(addresses),
        Commands::Columns { count, json, settings } => cmd_columns(count, json, settings),
        Commands::Project { file, rows, columns, format, settings } => {
            cmd_project(file, rows, columns, format, settings)
        }
        Commands::Replay { file, sheet, settings, render, quiet } => {
            cmd_replay(file, sheet, settings, render, quiet)
        }
        Commands::Config { path, init } => cmd_config(path, init),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    /// Map a wire error to its exit code.
    pub fn protocol(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Json { .. } => Self::parse(err.to_string())
                .with_hint("each line must be one JSON event with a \"type\" field"),
            ProtocolError::Io(_) => Self::io(err.to_string()),
            ProtocolError::Encode(_) => {
                Self { code: EXIT_ERROR, message: err.to_string(), hint: None }
            }
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn write_err(e: io::Error) -> CliError {
    CliError::io(format!("write failed: {}", e))
}

// ============================================================================
// settings
// ============================================================================

/// Settings from an explicit file, else the platform file if present, else defaults.
///
/// An explicit file that cannot be read or parsed is an error; the platform
/// file falls back to defaults like the rest of the client does.
fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
            Settings::parse(&contents)
                .map_err(|e| CliError::parse(format!("{}: {}", path.display(), e)))
        }
        None => {
            let path = Settings::config_path();
            if path.exists() {
                Ok(Settings::load_from(&path))
            } else {
                Ok(Settings::default())
            }
        }
    }
}

fn column_layout(settings: &Settings) -> ColumnLayout {
    ColumnLayout {
        row_index_width: settings.effective_row_index_width(),
        placeholder_columns: settings.placeholder_columns,
    }
}

// ============================================================================
// address / index
// ============================================================================

fn cmd_address(indices: Vec<i64>) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for index in indices {
        writeln!(out, "{}", column_address(index)).map_err(write_err)?;
    }
    Ok(())
}

fn cmd_index(addresses: Vec<String>) -> Result<(), CliError> {
    let indices = addresses
        .iter()
        .map(|addr| {
            column_index(addr).ok_or_else(|| {
                CliError::parse(format!("invalid column address: {:?}", addr))
                    .with_hint("addresses are uppercase letters, e.g. A, Z, AA")
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for index in indices {
        writeln!(out, "{}", index).map_err(write_err)?;
    }
    Ok(())
}

// ============================================================================
// columns
// ============================================================================

fn cmd_columns(count: usize, json: bool, settings: Option<PathBuf>) -> Result<(), CliError> {
    let settings = load_settings(settings.as_deref())?;
    let columns = build_columns(count, &column_layout(&settings));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &columns)
            .map_err(|e| CliError::io(e.to_string()))?;
        writeln!(out).map_err(write_err)?;
        return Ok(());
    }

    for col in &columns {
        let index = col.column_index.map_or_else(|| "-".to_string(), |i| i.to_string());
        let width = col.width.map_or_else(|| "auto".to_string(), |w| w.to_string());
        writeln!(out, "{}\t{}\t{}", col.field, index, width).map_err(write_err)?;
    }
    Ok(())
}

// ============================================================================
// project
// ============================================================================

fn cmd_project(
    file: PathBuf,
    rows: usize,
    columns: Option<usize>,
    format: RenderFormat,
    settings: Option<PathBuf>,
) -> Result<(), CliError> {
    let settings = load_settings(settings.as_deref())?;

    let contents = fs::read_to_string(&file)
        .map_err(|e| CliError::io(format!("{}: {}", file.display(), e)))?;
    let records: Vec<CellRecord> = serde_json::from_str(&contents).map_err(|e| {
        CliError::parse(format!("{}: {}", file.display(), e))
            .with_hint("expected a JSON array of {rowIndex, columnIndex, rawValue, computedValue}")
    })?;

    let index = CellIndex::build(&records);
    if index.skipped() > 0 {
        eprintln!("warning: skipped {} record(s) with negative coordinates", index.skipped());
    }

    let column_count = columns.unwrap_or_else(|| index.max_col().unwrap_or(0));
    let schema = build_columns(column_count, &column_layout(&settings));
    let grid = project_indexed(&index, rows, &EditSession::Idle);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render::write_grid(&mut out, format, &schema, &grid, settings.effective_max_column_width())
        .map_err(write_err)
}

// ============================================================================
// replay
// ============================================================================

fn cmd_replay(
    file: Option<PathBuf>,
    sheet: Option<String>,
    settings: Option<PathBuf>,
    render: Option<RenderFormat>,
    quiet: bool,
) -> Result<(), CliError> {
    let settings = load_settings(settings.as_deref())?;
    let sheet_id = sheet.unwrap_or_else(|| settings.sheet_id.clone());
    if sheet_id.is_empty() {
        return Err(CliError::args("sheet id must not be empty")
            .with_hint("pass --sheet or set \"sheet.id\" in settings.json"));
    }

    let input: Box<dyn BufRead> = match &file {
        Some(path) => {
            let f = File::open(path)
                .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
            Box::new(BufReader::new(f))
        }
        None => Box::new(io::stdin().lock()),
    };

    let mut session = GridSession::new(sheet_id, column_layout(&settings));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut events = 0usize;
    let mut requests = 0usize;

    for event in InboundReader::new(input) {
        let event = event.map_err(CliError::protocol)?;
        events += 1;
        for request in session.handle(event) {
            let line = to_jsonl(&request).map_err(CliError::protocol)?;
            writeln!(out, "{}", line).map_err(write_err)?;
            requests += 1;
        }
    }

    if let Some(format) = render {
        render::write_grid(
            &mut out,
            format,
            session.columns(),
            session.rows(),
            settings.effective_max_column_width(),
        )
        .map_err(write_err)?;
    }
    out.flush().map_err(write_err)?;

    if !quiet {
        eprintln!("{}", replay_summary(&session, events, requests));
    }
    Ok(())
}

fn replay_summary(session: &GridSession, events: usize, requests: usize) -> String {
    let data_columns = session.columns().iter().filter(|c| c.is_editable()).count();
    let edit = match session.edit_session() {
        EditSession::Idle => "idle".to_string(),
        EditSession::Armed => "armed".to_string(),
        EditSession::Editing(cursor) => format!("editing {}{}", cursor.column, cursor.row + 1),
    };

    let mut summary = format!(
        "{} event(s), {} request(s); {} row(s) x {} column(s); edit {}",
        events,
        requests,
        session.rows().len(),
        data_columns,
        edit,
    );
    if session.is_stale() {
        summary.push_str("; stale");
    }
    if let Some(version) = session.latest_version() {
        let label = history::version_label(version).unwrap_or_else(|| version.version.clone());
        summary.push_str(&format!("; latest version {}", label));
    }
    summary
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(path: bool, init: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if path {
        writeln!(out, "{}", Settings::config_path_display()).map_err(write_err)?;
        return Ok(());
    }

    let settings = if init { Settings::load() } else { load_settings(None)? };
    serde_json::to_writer_pretty(&mut out, &settings).map_err(|e| CliError::io(e.to_string()))?;
    writeln!(out).map_err(write_err)
}
