//! # Spreadsheet Payload Decoding
//!
//! Turns an uploaded workbook into header-keyed rows. Office Open XML (`.xlsx`, `.xlsm`)
//! and OpenDocument (`.ods`) payloads are read; only the first worksheet is used and
//! its first non-empty row supplies the field names of every later row.
pub(crate) mod cell;
pub mod criteria;
pub(crate) mod excel;
pub(crate) mod ods;
pub(crate) mod reference;
pub mod row;
pub(crate) mod sheet;
pub(crate) mod xlsx;

#[cfg(test)]
pub(crate) mod testing;

use crate::error::LdarError;
use crate::error::ResultMessage;
use crate::helpers::reader::Container;
use crate::helpers::reader::Payload;
use crate::helpers::zip::ZipHelper;
use crate::spreadsheet::ods::OdsSpreadsheet;
use crate::spreadsheet::row::sheet_to_rows;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

pub use criteria::Criteria;
pub use row::RawRow;
pub use row::RawValue;

/// Zip archive over an in-memory payload.
pub(crate) type PayloadArchive = ZipArchive<Cursor<Vec<u8>>>;

/// Reasons a payload cannot be decoded into rows.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Cannot detect spreadsheet format of '{0}'")]
    UnrecognizedContainer(String),

    #[error("Unsupported spreadsheet '{name}': {kind}")]
    UnsupportedContainer { name: String, kind: &'static str },

    #[error("Spreadsheet '{0}' is password protected")]
    PasswordProtected(String),

    #[error("Spreadsheet '{0}' contains no worksheet")]
    WorkbookEmpty(String),

    #[error("Missing workbook part '{0}'")]
    MissingPart(String),

    #[error("Invalid cell value at {reference}: {value}")]
    CellValueError { reference: String, value: String },

    #[error("Invalid ODS MIME type")]
    OdsMimeType,

    #[error("Cannot read '{name}': {reason}")]
    Malformed { name: String, reason: String },
}

/// Common interface of the workbook readers.
pub(crate) trait Spreadsheet {
    /// Shared string table; empty for formats that store text inline.
    fn load_shared_strings(&mut self) -> Result<Vec<String>, LdarError>;

    fn read_first_sheet(&mut self, criteria: &Criteria) -> Result<Sheet, LdarError>;
}

/// Picks a reader from the container signature and the parts inside the archive.
fn open_spreadsheet(payload: Payload) -> Result<Box<dyn Spreadsheet>, LdarError> {
    let name = payload.name.to_owned();
    match payload.container() {
        Container::Zip => (),
        Container::CompoundFile => {
            return Err(FormatError::UnsupportedContainer {
                name,
                kind: "legacy XLS or password protected workbook",
            }
            .into())
        }
        Container::Unknown => return Err(FormatError::UnrecognizedContainer(name).into()),
    }

    let zip = ZipArchive::new(payload.into_reader())?;
    let spreadsheet: Box<dyn Spreadsheet> = if zip.contains("xl/workbook.xml") {
        Box::new(XlsxSpreadsheet::open(&name, zip)?)
    } else if zip.contains("xl/workbook.bin") {
        return Err(FormatError::UnsupportedContainer {
            name,
            kind: "binary XLSB workbook",
        }
        .into());
    } else if zip.contains("content.xml") || zip.contains("mimetype") {
        Box::new(OdsSpreadsheet::open(&name, zip)?)
    } else {
        return Err(FormatError::UnrecognizedContainer(name).into());
    };
    Ok(spreadsheet)
}

fn read_rows(payload: Payload, criteria: &Criteria) -> Result<Vec<RawRow>, LdarError> {
    let mut spreadsheet = open_spreadsheet(payload)?;
    let sheet = spreadsheet.read_first_sheet(criteria)?;
    let shared_strings = spreadsheet.load_shared_strings()?;
    debug!(
        file = %sheet.file_name,
        sheet = %sheet.name,
        cells = sheet.cells.len(),
        shared_strings = shared_strings.len(),
        "read first sheet"
    );
    sheet_to_rows(&sheet, &shared_strings).with_prefix(&sheet.name)
}

/// Decodes the first sheet of `payload` into header-keyed rows.
///
/// Every failure is reported as a [`FormatError`]; lower level zip and XML
/// errors are folded into [`FormatError::Malformed`].
pub fn parse(payload: Payload, criteria: &Criteria) -> Result<Vec<RawRow>, FormatError> {
    let name = payload.name.to_owned();
    read_rows(payload, criteria).map_err(|error| match error {
        LdarError::FormatError(error) => error,
        error => FormatError::Malformed {
            name,
            reason: error.to_string(),
        },
    })
}
