use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use ldar_sheet::search::ColumnSelector;
use ldar_sheet::search::HighlightStyle;
use ldar_sheet::spreadsheet::Criteria;
use ldar_sheet::Column;
use ldar_sheet::Config;
use ldar_sheet::Event;
use ldar_sheet::Outcome;
use ldar_sheet::Payload;
use ldar_sheet::Session;
use std::collections::HashMap;
use std::io::BufRead;
use std::io::Write;
use std::path::PathBuf;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing_subscriber::EnvFilter;

/// Load an LDAR component register from a spreadsheet and search it.
#[derive(Parser, Debug)]
#[command(name = "ldar-sheet", version, about)]
struct Args {
    /// Spreadsheet to import (.xlsx, .xlsm or .ods); first sheet only
    file: Option<PathBuf>,

    /// Search text, matched case-insensitively and literally
    #[arg(short, long, default_value = "")]
    query: String,

    /// Column to search: all, drawing, building, unit, area, tag, component,
    /// subtype, floor, regulation, chemical or description
    #[arg(short, long, default_value = "all")]
    column: String,

    /// Marker written before each match
    #[arg(long, default_value = "<mark>", env = "LDAR_MARK_OPEN")]
    mark_open: String,

    /// Marker written after each match
    #[arg(long, default_value = "</mark>", env = "LDAR_MARK_CLOSE")]
    mark_close: String,

    /// Maximum number of data rows read from the sheet
    #[arg(long, env = "LDAR_ROWS_LIMIT")]
    rows_limit: Option<usize>,

    /// Fail the import on error cells instead of reading them as blank
    #[arg(long, default_value_t = false, env = "LDAR_STRICT_CELLS")]
    strict_cells: bool,

    /// Records fetched per store query
    #[arg(long, default_value_t = ldar_sheet::database::DEFAULT_SCAN_BATCH_SIZE)]
    batch_size: usize,

    /// Log filter; overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Read commands from standard input after the initial import
    #[arg(short, long, default_value_t = false)]
    interactive: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            criteria: Criteria {
                rows_limit: self.rows_limit,
                error_as_null: !self.strict_cells,
            },
            highlight: HighlightStyle {
                open: self.mark_open.to_owned(),
                close: self.mark_close.to_owned(),
            },
            scan_batch_size: self.batch_size,
        }
    }
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).with_context(|| format!("Invalid log filter '{level}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref())?;

    let mut session = Session::new(args.config()).context("Failed to open the record store")?;
    let mut failed = false;
    if let Some(path) = &args.file {
        let payload = Payload::from_path(path).with_context(|| format!("Failed to read '{}'", path.display()))?;
        let outcome = session.dispatch(Event::ImportRequested(Some(payload)))?;
        failed = report(&outcome);
    }
    session.dispatch(Event::QueryChanged {
        query: args.query.to_owned(),
        selector: args.column.to_owned(),
    })?;

    if args.interactive {
        run_interactive(&mut session)?;
    } else {
        print_table(&session);
    }
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Prints the status line, if any, and returns whether it reports an error.
fn report(outcome: &Outcome) -> bool {
    match &outcome.status {
        Some(status) if status.is_error() => {
            eprintln!("{status}");
            true
        }
        Some(status) => {
            println!("{status}");
            false
        }
        None => false,
    }
}

fn print_table(session: &Session) {
    if let Some(message) = session.empty_state() {
        println!("{message}");
        return;
    }
    let style = &session.config().highlight;
    let mut table = Builder::default();
    table.push_record(std::iter::once("#".to_owned()).chain(Column::ALL.iter().map(|column| column.title().to_owned())));
    let mut shown = 0usize;
    for row in session.visible_rows() {
        table.push_record(std::iter::once(row.id.to_string()).chain(row.cells.iter().map(|cell| cell.markup(style))));
        shown += 1;
    }
    println!("{}", table.build().with(Style::markdown()));
    println!("{shown} of {} components shown", session.rows().len());
}

const HELP: &str = "\
commands:
  import <path>                  replace the register with a spreadsheet
  add <field>=<value>; ...       add one component (drawing, building, unit, area, tag,
                                 component_type, sub_type, floor, regulation,
                                 chemical_state, description)
  search <column> [text]         search one column or 'all'
  clear                          clear the search
  show                           print the table
  help                           show this help
  quit                           leave";

fn run_interactive(session: &mut Session) -> Result<()> {
    println!("{HELP}");
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim_end_matches(['\r', '\n']);
        let (command, rest) = input.trim_start().split_once(' ').unwrap_or((input.trim(), ""));
        let event = match command {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                println!("{HELP}");
                continue;
            }
            "show" => {
                print_table(session);
                continue;
            }
            "import" if rest.trim().is_empty() => Event::ImportRequested(None),
            "import" => match Payload::from_path(rest.trim()) {
                Ok(payload) => Event::ImportRequested(Some(payload)),
                Err(error) => {
                    eprintln!("Failed to read '{}': {error}", rest.trim());
                    continue;
                }
            },
            "add" => Event::ManualSubmit(parse_fields(rest)),
            "search" => {
                let (column, query) = rest.split_once(' ').unwrap_or((rest, ""));
                Event::QueryChanged {
                    query: query.to_owned(),
                    selector: column.to_owned(),
                }
            }
            "clear" => Event::ClearRequested,
            other => {
                eprintln!("Unknown command '{other}'; known columns: {}", ColumnSelector::keys().collect::<Vec<_>>().join(", "));
                continue;
            }
        };
        let outcome = session.dispatch(event)?;
        report(&outcome);
        print_table(session);
    }
    Ok(())
}

/// Parses `key=value; key=value` pairs; keys are trimmed, values kept as typed.
fn parse_fields(text: &str) -> HashMap<String, String> {
    text.split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.trim().to_owned(), value.to_owned()))
        .collect()
}
