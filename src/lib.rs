//! # LDAR Component Register
//!
//! Session-scoped register of leak detection and repair (LDAR) components.
//!
//! ## Features
//!
//! - **Spreadsheet import**: the first sheet of an Excel (`.xlsx`, `.xlsm`) or OpenDocument
//!   (`.ods`) workbook replaces the register; headers map onto the component schema
//! - **In-memory store**: records live in an in-memory DuckDB table with stable, increasing identities
//! - **Manual entry**: single records validated from a flat field map
//! - **Search**: case-insensitive literal search over all display columns or a single one,
//!   with reversible match highlighting
//!
//! [`Session`] drives all of it from a closed set of [`Event`]s.
pub mod config;
pub mod database;
pub mod entry;
pub mod error;
pub mod helpers;
pub mod importer;
pub mod record;
pub mod search;
pub mod session;
pub mod spreadsheet;

pub use config::Config;
pub use database::RecordStore;
pub use error::LdarError;
pub use helpers::reader::Payload;
pub use record::Column;
pub use record::ComponentRecord;
pub use record::Field;
pub use record::NewRecord;
pub use session::Event;
pub use session::Outcome;
pub use session::Session;
pub use session::Status;
