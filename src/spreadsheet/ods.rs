use crate::error::LdarError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::FormatError;
use crate::spreadsheet::PayloadArchive;
use crate::spreadsheet::Spreadsheet;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::io::Read;

/// ODS file MIME type identifier
const MIME_TYPE: &[u8] = b"application/vnd.oasis.opendocument.spreadsheet";
/// XML element name for table (sheet)
const TABLE: QName = QName(b"table:table");
/// XML element name for table row
const TABLE_ROW: QName = QName(b"table:table-row");
/// XML element name for table cell
const TABLE_CELL: QName = QName(b"table:table-cell");
/// XML element name for covered table cell (merged cells)
const TABLE_COVERED_CELL: QName = QName(b"table:covered-table-cell");
/// XML element name for annotations (comments)
const ANNOTATION: QName = QName(b"office:annotation");
/// XML element name for paragraph text
const PARAGRAPH: QName = QName(b"text:p");
/// XML element name for string (space) text
const STRING: QName = QName(b"text:s");

const CONTENT_PATH: &str = "content.xml";
const MANIFEST_PATH: &str = "META-INF/manifest.xml";

/// OpenDocument spreadsheet held in memory.
pub(crate) struct OdsSpreadsheet {
    name: String,
    zip: PayloadArchive,
}

impl OdsSpreadsheet {
    /// Validates the MIME type and rejects encrypted documents.
    pub(crate) fn open(name: &str, mut zip: PayloadArchive) -> Result<Self, LdarError> {
        check_mime(&mut zip)?;
        if is_password_protected(&mut zip)? {
            Err(FormatError::PasswordProtected(name.to_owned()))?;
        }
        Ok(OdsSpreadsheet {
            name: name.to_owned(),
            zip,
        })
    }
}

impl Spreadsheet for OdsSpreadsheet {
    /// ODS keeps strings inline.
    fn load_shared_strings(&mut self) -> Result<Vec<String>, LdarError> {
        Ok(Vec::new())
    }

    fn read_first_sheet(&mut self, criteria: &Criteria) -> Result<Sheet, LdarError> {
        let mut reader = self.zip
            .xml_reader(CONTENT_PATH)?
            .ok_or_else(|| FormatError::MissingPart(CONTENT_PATH.to_owned()))?;

        let mut sheet_name = None::<String>;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TABLE => {
                sheet_name = Some(event.get_attribute_value("table:name")?.unwrap_or_default().to_string());
                break;
            }
        });
        let Some(sheet_name) = sheet_name else {
            return Err(FormatError::WorkbookEmpty(self.name.to_owned()).into());
        };
        let mut sheet = Sheet::new(&self.name, &sheet_name, criteria.rows_limit);

        let mut row = 0usize;
        let mut col = 0usize;
        let mut row_count = 1usize;
        let mut col_count = 1usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let mut text_context = false;
        let mut comment_context = false;
        match_xml_events!(reader => {
            Event::End(event) if event.name() == TABLE => break,
            Event::Start(event) if event.name() == TABLE_ROW => {
                row_count = event.parse_attribute_value("table:number-rows-repeated")?.unwrap_or(1);
                col = 0;
                if sheet.after_row_limit(row) {
                    break;
                }
            }
            Event::End(event) if event.name() == TABLE_ROW => row += row_count,
            Event::Start(event) if event.name() == TABLE_CELL || event.name() == TABLE_COVERED_CELL => {
                value.clear();
                col_count = event.parse_attribute_value("table:number-columns-repeated")?.unwrap_or(1);
                let value_type = event.get_attribute_value("office:value-type")?;
                let is_error = event.get_attribute_value("calcext:value-type")?
                    .map(|it| it == "error")
                    .unwrap_or(false);
                kind = match value_type.as_deref() {
                    None => CellType::Empty,
                    Some(_) if is_error && criteria.error_as_null => CellType::Empty,
                    Some(_) if is_error => CellType::Error,
                    Some("boolean") => CellType::Boolean,
                    Some("date") => CellType::IsoDateTime,
                    Some("time") => CellType::IsoDuration,
                    Some("string") => CellType::InlineString,
                    Some(_) => CellType::Number,
                };
                let attribute = match kind {
                    CellType::Boolean => Some("office:boolean-value"),
                    CellType::IsoDateTime => Some("office:date-value"),
                    CellType::IsoDuration => Some("office:time-value"),
                    CellType::Number => Some("office:value"),
                    _ => None,
                };
                match attribute {
                    Some(name) => {
                        if let Some(data) = event.get_attribute_value(name)? {
                            value.push_str(&data);
                        }
                    }
                    None => text_context = kind != CellType::Empty,
                }
            }
            Event::End(event) if event.name() == TABLE_CELL || event.name() == TABLE_COVERED_CELL => {
                if kind == CellType::Error {
                    Err(FormatError::CellValueError {
                        reference: index_to_reference(row, col),
                        value: value.to_owned(),
                    })?;
                }
                if kind != CellType::Empty && !value.is_empty() {
                    for row_number in row..row + row_count {
                        if sheet.after_row_limit(row_number) {
                            break;
                        }
                        for col_number in col..col + col_count {
                            sheet.push(Cell {
                                row: row_number,
                                col: col_number,
                                kind,
                                value: value.to_owned(),
                            });
                        }
                    }
                }
                col += col_count;
                kind = CellType::Empty;
                text_context = false;
                comment_context = false;
            }
            Event::Start(event) if text_context && event.name() == ANNOTATION => comment_context = true,
            Event::End(event) if text_context && event.name() == ANNOTATION => comment_context = false,
            Event::Start(event) if text_context && !comment_context && event.name() == PARAGRAPH => {
                if !value.is_empty() {
                    value.push('\n');
                }
            }
            Event::Start(event) if text_context && !comment_context && event.name() == STRING => {
                let count = event.parse_attribute_value("text:c")?.unwrap_or(1usize);
                value.push_str(&" ".repeat(count));
            }
            Event::Text(event) if text_context && !comment_context => value.push_bytes_text(&event)?,
            Event::GeneralRef(event) if text_context && !comment_context => value.push_bytes_ref(&event)?,
        });
        sheet.finish();
        Ok(sheet)
    }
}

/// Fails unless the `mimetype` entry, when present, names an ODS document.
fn check_mime(zip: &mut PayloadArchive) -> Result<(), LdarError> {
    if let Some(mut file) = zip.file("mimetype")? {
        let mut buffer = Vec::with_capacity(MIME_TYPE.len());
        file.read_to_end(&mut buffer)?;
        if buffer.trim_ascii() != MIME_TYPE {
            Err(FormatError::OdsMimeType)?;
        }
    }
    Ok(())
}

/// A manifest entry carrying `manifest:encryption-data` marks an encrypted document.
fn is_password_protected(zip: &mut PayloadArchive) -> Result<bool, LdarError> {
    let Some(mut reader) = zip.xml_reader(MANIFEST_PATH)? else {
        return Ok(false);
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == QName(b"manifest:encryption-data") => return Ok(true),
    });
    Ok(false)
}
