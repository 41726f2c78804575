//! airtracker CLI - query the flight database from the terminal
//!
//! Usage:
//!   airtracker summary
//!   airtracker filters
//!   airtracker explore [--airline <name>] [--status <status>] [--origin <iata>] [--limit <n>]
//!   airtracker catalog list
//!   airtracker catalog run <id> [--format table|csv|json]
//!   airtracker sql explore|catalog ... [--dialect sqlite|postgres]
//!
//! Examples:
//!   airtracker --db air_tracker.db explore --airline IndiGo --status Delayed
//!   airtracker catalog run airports-no-arrivals --format csv > no_arrivals.csv
//!   airtracker sql catalog status-by-airline --dialect postgres

use clap::{Parser, Subcommand, ValueEnum};
use airtracker::catalog;
use airtracker::compose::{compose_explorer_for_dialect, ExplorerOptions, FilterSet, Selection};
use airtracker::config::{Settings, SettingsError};
use airtracker::report::{self, ReportError};
use airtracker::sql::Dialect;
use airtracker::store::{BoundQuery, ResultSet, Session, Value};
use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "AIRTRACKER_LOG";

#[derive(Parser)]
#[command(name = "airtracker")]
#[command(about = "airtracker - read-only reports over a flights, aircraft and airports database")]
#[command(version)]
struct Cli {
    /// Path to the SQLite database (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Path to a config file (default: search AIRTRACKER_CONFIG, ./airtracker.toml, user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show flight, aircraft, airport and airline totals
    Summary,

    /// List the options of each explorer selector
    Filters,

    /// Browse flights, most recent first
    Explore {
        #[command(flatten)]
        filters: FilterArgs,

        /// Maximum rows to return (1-200, default from config)
        #[arg(short, long)]
        limit: Option<u64>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Pre-authored report queries
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },

    /// Print the SQL a view would run, without executing it
    Sql {
        #[command(subcommand)]
        target: SqlTarget,
    },
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// List catalog entries
    List,

    /// Run a catalog entry by id or title
    Run {
        /// Entry id (see `catalog list`) or exact title
        id: String,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum SqlTarget {
    /// The explorer query for the given filters
    Explore {
        #[command(flatten)]
        filters: FilterArgs,

        /// Maximum rows (1-200, default from config)
        #[arg(short, long)]
        limit: Option<u64>,

        /// SQL dialect to render
        #[arg(short, long, default_value = "sqlite")]
        dialect: DialectArg,
    },

    /// A catalog entry's query
    Catalog {
        /// Entry id or exact title
        id: String,

        /// SQL dialect to render
        #[arg(short, long, default_value = "sqlite")]
        dialect: DialectArg,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Airline name, or "All"
    #[arg(long)]
    airline: Option<String>,

    /// Flight status, or "All"
    #[arg(long)]
    status: Option<String>,

    /// Origin IATA code, or "All"
    #[arg(long)]
    origin: Option<String>,
}

impl From<FilterArgs> for FilterSet {
    fn from(args: FilterArgs) -> Self {
        FilterSet {
            airline: Selection::from(args.airline),
            status: Selection::from(args.status),
            origin: Selection::from(args.origin),
        }
    }
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Sqlite,
    Postgres,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Postgres => Dialect::Postgres,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Aligned columns
    Table,
    /// Delimited text with a header row
    Csv,
    /// JSON object with columns and rows
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&settings.logging.level);

    match cli.command {
        Commands::Summary => with_session(&cli.db, &settings, cmd_summary),
        Commands::Filters => with_session(&cli.db, &settings, cmd_filters),
        Commands::Explore {
            filters,
            limit,
            format,
        } => with_session(&cli.db, &settings, |session| {
            cmd_explore(session, &settings, filters.into(), limit, format)
        }),
        Commands::Catalog {
            command: CatalogCommand::List,
        } => cmd_catalog_list(),
        Commands::Catalog {
            command: CatalogCommand::Run { id, format },
        } => with_session(&cli.db, &settings, |session| {
            cmd_catalog_run(session, &settings, &id, format)
        }),
        Commands::Sql { target } => cmd_sql(&settings, target),
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, SettingsError> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
}

fn init_tracing(default_level: &str) {
    let directive = std::env::var(LOG_ENV).unwrap_or_else(|_| default_level.to_string());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(directive))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Open the database and run `f` against it.
fn with_session<F>(db: &Option<PathBuf>, settings: &Settings, f: F) -> ExitCode
where
    F: FnOnce(&Session) -> Result<(), ReportError>,
{
    let path = match db {
        Some(path) => path.clone(),
        None => match settings.database.resolved_path() {
            Ok(path) => path,
            Err(e) => return fail("Error resolving database path", e),
        },
    };

    let session = match Session::open(&path) {
        Ok(session) => session,
        Err(e) => return fail("Error", e),
    };

    match f(&session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_fatal() => {
            eprintln!("Fatal: {}", e);
            ExitCode::from(2)
        }
        Err(e) => fail("Error", e),
    }
}

fn fail(context: &str, error: impl Display) -> ExitCode {
    eprintln!("{}: {}", context, error);
    ExitCode::FAILURE
}

fn cmd_summary(session: &Session) -> Result<(), ReportError> {
    let summary = report::summary(session)?;
    println!("Flights:  {}", summary.flights);
    println!("Aircraft: {}", summary.aircraft);
    println!("Airports: {}", summary.airports);
    println!("Airlines: {}", summary.airlines);
    Ok(())
}

fn cmd_filters(session: &Session) -> Result<(), ReportError> {
    for domain in report::explorer_filters(session)? {
        println!("{} ({} values)", domain.column, domain.values.len());
        for option in domain.options() {
            println!("  {}", option);
        }
        println!();
    }
    Ok(())
}

fn explorer_options(settings: &Settings, limit: Option<u64>) -> Result<ExplorerOptions, ReportError> {
    match limit {
        Some(limit) => Ok(ExplorerOptions::with_row_cap(limit)?),
        None => Ok(settings.explorer.options()),
    }
}

fn cmd_explore(
    session: &Session,
    settings: &Settings,
    filters: FilterSet,
    limit: Option<u64>,
    format: OutputFormat,
) -> Result<(), ReportError> {
    let options = explorer_options(settings, limit)?;
    let result = report::explore(session, &filters, &options)?;
    if matches!(format, OutputFormat::Table) {
        println!("Showing {} flights", result.len());
        println!();
    }
    print_result(&result, format, delimiter(settings))
}

fn cmd_catalog_list() -> ExitCode {
    let width = catalog::entries()
        .iter()
        .map(|e| e.id.len())
        .max()
        .unwrap_or(0);
    for (i, entry) in catalog::entries().iter().enumerate() {
        println!("{:>2}) {:<width$}  {}", i + 1, entry.id, entry.title, width = width);
    }
    ExitCode::SUCCESS
}

fn cmd_catalog_run(
    session: &Session,
    settings: &Settings,
    id: &str,
    format: OutputFormat,
) -> Result<(), ReportError> {
    let report = report::run_catalog(session, id)?;
    match format {
        OutputFormat::Csv => {
            print!("{}", report.export_delimited(delimiter(settings)));
            Ok(())
        }
        OutputFormat::Table => {
            println!("{} - {} rows", report.title, report.result.len());
            println!();
            print_result(&report.result, format, delimiter(settings))
        }
        OutputFormat::Json => print_result(&report.result, format, delimiter(settings)),
    }
}

fn cmd_sql(settings: &Settings, target: SqlTarget) -> ExitCode {
    match target {
        SqlTarget::Explore {
            filters,
            limit,
            dialect,
        } => {
            let options = match explorer_options(settings, limit) {
                Ok(options) => options,
                Err(e) => return fail("Error", e),
            };
            match compose_explorer_for_dialect(&filters.into(), &options, dialect.into()) {
                Ok(bound) => {
                    print_bound(&bound);
                    ExitCode::SUCCESS
                }
                Err(e) => fail("Error", e),
            }
        }
        SqlTarget::Catalog { id, dialect } => match catalog::query_text(&id, dialect.into()) {
            Ok(sql) => {
                println!("{}", sql);
                ExitCode::SUCCESS
            }
            Err(e) => fail("Error", e),
        },
    }
}

fn delimiter(settings: &Settings) -> char {
    // validate() already ran when the settings were loaded
    settings.export.delimiter_char().unwrap_or(',')
}

fn print_bound(bound: &BoundQuery) {
    println!("{}", bound.sql);
    if !bound.params.is_empty() {
        println!();
        for (i, value) in bound.params.iter().enumerate() {
            println!("-- ${} = {:?}", i + 1, value.to_string());
        }
    }
}

fn print_result(
    result: &ResultSet,
    format: OutputFormat,
    delimiter: char,
) -> Result<(), ReportError> {
    match format {
        OutputFormat::Table => print_table(result),
        OutputFormat::Csv => print!("{}", result.to_delimited(delimiter)),
        OutputFormat::Json => println!("{}", report::render_json(result)?),
    }
    Ok(())
}

fn cell_text(value: &Value) -> String {
    if value.is_missing() {
        "NULL".to_string()
    } else {
        value.to_string()
    }
}

fn print_table(result: &ResultSet) {
    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |fields: &[String]| {
        fields
            .iter()
            .zip(&widths)
            .map(|(f, w)| format!("{:<w$}", f, w = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", line(result.columns.as_slice()).trim_end());
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in &cells {
        println!("{}", line(row.as_slice()).trim_end());
    }
}
