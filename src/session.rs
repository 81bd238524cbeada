//! Event dispatcher tying the importer, the entry form, the store and the search engine together.

use crate::config::Config;
use crate::database::RecordStore;
use crate::entry;
use crate::error::LdarError;
use crate::helpers::reader::Payload;
use crate::importer;
use crate::search::apply_search;
use crate::search::clear_search;
use crate::search::ColumnSelector;
use crate::search::RenderedRow;
use std::collections::HashMap;
use std::fmt::Display;
use tracing::debug;
use tracing::warn;

const FILE_MISSING_MESSAGE: &str = "Please select a file first!";
const FORMAT_ERROR_MESSAGE: &str = "Error reading file. Please check the format.";
const EMPTY_STATE_MESSAGE: &str = "Database ready. Upload Excel file or add components manually.";

/// User actions the session reacts to.
#[derive(Clone, Debug)]
pub enum Event {
    /// Replace the register with the rows of a spreadsheet; `None` when no file was chosen
    ImportRequested(Option<Payload>),
    /// Add one record from the entry form, keyed by field name
    ManualSubmit(HashMap<String, String>),
    /// Search text or column selector changed
    QueryChanged { query: String, selector: String },
    ClearRequested,
}

/// Status line shown after an action.
#[derive(Clone, Debug, PartialEq)]
pub enum Status {
    Info(String),
    Success(String),
    Error(String),
}

impl Status {
    pub fn message(&self) -> &str {
        match self {
            Status::Info(message) | Status::Success(message) | Status::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of dispatching one event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
    pub status: Option<Status>,
    /// The entry form should be emptied
    pub clear_form: bool,
}

impl Outcome {
    fn status(status: Status) -> Self {
        Outcome {
            status: Some(status),
            clear_form: false,
        }
    }
}

/// One user session: the record store plus the rendered table and current search.
pub struct Session {
    config: Config,
    store: RecordStore,
    rows: Vec<RenderedRow>,
    query: String,
    selector: ColumnSelector,
}

impl Session {
    pub fn new(config: Config) -> Result<Self, LdarError> {
        let store = RecordStore::with_batch_size(config.scan_batch_size)?;
        Ok(Session {
            config,
            store,
            rows: Vec::new(),
            query: String::new(),
            selector: ColumnSelector::All,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Every rendered row, in insertion order.
    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    /// Placeholder shown in place of the table while the register holds no records.
    pub fn empty_state(&self) -> Option<&'static str> {
        self.rows.is_empty().then_some(EMPTY_STATE_MESSAGE)
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &RenderedRow> {
        self.rows.iter().filter(|row| row.visible)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selector(&self) -> &ColumnSelector {
        &self.selector
    }

    /// Handles one event. Format and validation problems are reported through the
    /// returned status; store failures are returned as errors.
    pub fn dispatch(&mut self, event: Event) -> Result<Outcome, LdarError> {
        match event {
            Event::ImportRequested(None) => Ok(Outcome::status(Status::Error(FILE_MISSING_MESSAGE.to_owned()))),
            Event::ImportRequested(Some(payload)) => self.import(payload),
            Event::ManualSubmit(input) => self.submit(&input),
            Event::QueryChanged { query, selector } => {
                self.query = query;
                self.selector = ColumnSelector::lenient(&selector);
                apply_search(&mut self.rows, &self.query, &self.selector)?;
                debug!(query = %self.query, selector = %self.selector, visible = self.visible_rows().count(), "search applied");
                Ok(Outcome::default())
            }
            Event::ClearRequested => {
                self.query.clear();
                clear_search(&mut self.rows);
                Ok(Outcome::default())
            }
        }
    }

    fn import(&mut self, payload: Payload) -> Result<Outcome, LdarError> {
        let criteria = self.config.criteria;
        match importer::import_payload(&mut self.store, payload, &criteria) {
            Ok(count) => {
                self.refresh()?;
                Ok(Outcome::status(Status::Success(format!(
                    "SUCCESS! Loaded {count} LDAR components into your database!"
                ))))
            }
            Err(LdarError::FormatError(error)) => {
                warn!(%error, "import rejected");
                Ok(Outcome::status(Status::Error(format!("{FORMAT_ERROR_MESSAGE} {error}"))))
            }
            Err(error) => Err(error),
        }
    }

    fn submit(&mut self, input: &HashMap<String, String>) -> Result<Outcome, LdarError> {
        match entry::submit(&mut self.store, input) {
            Ok(record) => {
                self.refresh()?;
                Ok(Outcome {
                    status: Some(Status::Info(format!("Added component {}", record.tag))),
                    clear_form: true,
                })
            }
            Err(LdarError::ValidationError(error)) => Ok(Outcome::status(Status::Error(error.to_string()))),
            Err(error) => Err(error),
        }
    }

    /// Rebuilds the rendered rows from the store and reapplies the current search.
    fn refresh(&mut self) -> Result<(), LdarError> {
        let mut rows = Vec::new();
        for record in self.store.scan_all_ordered() {
            rows.push(RenderedRow::from_record(&record?));
        }
        apply_search(&mut rows, &self.query, &self.selector)?;
        self.rows = rows;
        Ok(())
    }
}
