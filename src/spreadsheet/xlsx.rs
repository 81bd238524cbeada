use crate::error::LdarError;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::excel::load_number_formats;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::FormatError;
use crate::spreadsheet::PayloadArchive;
use crate::spreadsheet::Spreadsheet;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::collections::HashMap;
use std::io::BufRead;

// XML tag names for parsing Excel XLSX format
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts"); // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");   // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr"); // Workbook properties
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content

const WORKBOOK_PATH: &str = "xl/workbook.xml";
const WORKBOOK_RELATIONSHIPS_PATH: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";
const STYLES_PATH: &str = "xl/styles.xml";

/// Excel 2007+ workbook (XLSX / XLSM) held in memory.
pub(crate) struct XlsxSpreadsheet {
    name: String,
    zip: PayloadArchive,
    /// Cell type implied by each cell format index
    number_formats: Vec<CellType>,
    /// Worksheets in workbook order as (name, zip path)
    sheets: Vec<(String, String)>,
}

impl XlsxSpreadsheet {
    pub(crate) fn open(name: &str, mut zip: PayloadArchive) -> Result<XlsxSpreadsheet, LdarError> {
        let (sheets, is_1904) = load_workbook(&mut zip)?;
        if sheets.is_empty() {
            Err(FormatError::WorkbookEmpty(name.to_owned()))?;
        }
        let number_formats = load_styles(&mut zip, is_1904)?;
        Ok(XlsxSpreadsheet {
            name: name.to_owned(),
            zip,
            number_formats,
            sheets,
        })
    }
}

impl Spreadsheet for XlsxSpreadsheet {
    fn load_shared_strings(&mut self) -> Result<Vec<String>, LdarError> {
        let mut shared_strings = Vec::<String>::new();
        let Some(mut reader) = self.zip.xml_reader(SHARED_STRINGS_PATH)? else {
            return Ok(shared_strings);
        };
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                shared_strings.push(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
            }
        });
        Ok(shared_strings)
    }

    fn read_first_sheet(&mut self, criteria: &Criteria) -> Result<Sheet, LdarError> {
        let (sheet_name, zip_path) = self.sheets
            .first()
            .cloned()
            .ok_or_else(|| FormatError::WorkbookEmpty(self.name.to_owned()))?;
        let mut sheet = Sheet::new(&self.name, &sheet_name, criteria.rows_limit);
        let mut reader = self.zip.xml_reader(&zip_path)?
            .ok_or_else(|| FormatError::MissingPart(zip_path.to_owned()))?;

        let mut row = 0usize;
        let mut next_row = 0usize;
        let mut next_col = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                row = event.parse_attribute_value::<usize>("r")?
                    .filter(|number| *number > 0)
                    .map(|number| number - 1)
                    .unwrap_or(next_row);
                next_col = 0;
                if sheet.after_row_limit(row) {
                    break;
                }
            }
            Event::End(event) if event.name() == TAG_ROW => next_row = row + 1,
            Event::Start(event) if event.name() == TAG_CELL => {
                let position = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference));
                (row, col) = position.unwrap_or((row, next_col));
                next_col = col + 1;
                value.clear();
                kind = match event.get_attribute_value("t")?.as_deref() {
                    Some("inlineStr") | Some("str") => CellType::InlineString,
                    Some("s") => CellType::SharedString,
                    Some("d") => CellType::IsoDateTime,
                    Some("b") => CellType::Boolean,
                    Some("e") if criteria.error_as_null => CellType::Empty,
                    Some("e") => CellType::Error,
                    _ => CellType::Number,
                };
                if kind == CellType::Number {
                    if let Some(format_id) = event.get_attribute_value("s")?.filter(|id| !id.is_empty()) {
                        let index = format_id.parse::<usize>()?;
                        kind = self.number_formats.get(index).copied().unwrap_or(CellType::Number);
                    }
                }
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                if kind != CellType::Empty && !value.is_empty() {
                    sheet.push(Cell {
                        row,
                        col,
                        kind,
                        value: std::mem::take(&mut value),
                    });
                }
                kind = CellType::Empty;
            }
        });
        sheet.finish();
        Ok(sheet)
    }
}

/// Reads worksheet names and part paths, and whether the 1904 date system is used.
fn load_workbook(zip: &mut PayloadArchive) -> Result<(Vec<(String, String)>, bool), LdarError> {
    let relationships = load_relationships(zip, WORKBOOK_RELATIONSHIPS_PATH)?;
    let mut reader = zip.xml_reader(WORKBOOK_PATH)?
        .ok_or_else(|| FormatError::MissingPart(WORKBOOK_PATH.to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<String>;
            let mut id = None::<String>;
            for result in event.attributes() {
                let attribute = result?;
                // r:id is namespaced; sheetId is a different attribute
                match attribute.key.local_name().as_ref() {
                    b"name" => name = Some(attribute.get_value()?.to_string()),
                    b"id" => id = Some(attribute.get_value()?.to_string()),
                    _ => (),
                }
            }
            if let Some((name, path)) = name.zip(id.and_then(|id| relationships.get(&id))) {
                sheets.push((name, path.to_owned()));
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value == "1" || value == "true")
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Reads styles.xml and resolves the cell type of every cell format.
fn load_styles(zip: &mut PayloadArchive, is_1904: bool) -> Result<Vec<CellType>, LdarError> {
    let Some(mut reader) = zip.xml_reader(STYLES_PATH)? else {
        return Ok(Vec::new());
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();
    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                custom_formats.insert(id.to_string(), CellType::parse_custom_number_format(&format, is_1904));
            }
        }
        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => break,
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            let id = event.get_attribute_value("numFmtId")?.unwrap_or_default();
            format_indexes.push(id.to_string());
        }
    });

    Ok(load_number_formats(format_indexes, custom_formats, is_1904))
}

/// Collects the text of a string item up to `end_tag`, skipping phonetic runs.
/// With `is_text_content`, bare character data counts as text (the `<v>` case).
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, LdarError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_bytes_text(&event)?,
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::row::RawValue;
    use crate::spreadsheet::row::sheet_to_rows;
    use crate::spreadsheet::testing::{xlsx_payload, xlsx_payload_sheets, zip_payload};
    use zip::ZipArchive;

    fn open(payload: crate::helpers::reader::Payload) -> XlsxSpreadsheet {
        let name = payload.name.clone();
        XlsxSpreadsheet::open(&name, ZipArchive::new(payload.into_reader()).unwrap()).unwrap()
    }

    #[test]
    fn reads_first_sheet_with_shared_strings() {
        let mut xlsx = open(xlsx_payload_sheets(&[
            ("Components", &[&["Tag", "Floor"], &["TAG-101", "2"]]),
            ("Archive", &[&["Tag"], &["OLD-1"]]),
        ]));
        let sheet = xlsx.read_first_sheet(&Criteria::default()).unwrap();
        let strings = xlsx.load_shared_strings().unwrap();
        assert_eq!(sheet.name, "Components");
        assert_eq!(strings, vec!["Tag", "Floor", "TAG-101", "Tag", "OLD-1"]);

        let rows = sheet_to_rows(&sheet, &strings).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Tag"), Some(&RawValue::Text("TAG-101".into())));
        assert_eq!(rows[0].get("Floor"), Some(&RawValue::Number(2.0)));
    }

    #[test]
    fn honours_rows_limit() {
        let mut xlsx = open(xlsx_payload(&[&["Tag"], &["A"], &["B"], &["C"]]));
        let criteria = Criteria {
            rows_limit: Some(2),
            ..Criteria::default()
        };
        let sheet = xlsx.read_first_sheet(&criteria).unwrap();
        assert_eq!(sheet.cells.len(), 3);
    }

    fn handmade(sheet_xml: &str, styles_xml: Option<&str>) -> XlsxSpreadsheet {
        let mut parts = vec![
            (
                "xl/workbook.xml",
                r#"<workbook xmlns:r="r"><workbookPr date1904="false"/><sheets><sheet name="S" sheetId="7" r:id="rId1"/></sheets></workbook>"#,
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships><Relationship Id="rId1" Type="x/worksheet" Target="/xl/worksheets/s.xml"/></Relationships>"#,
            ),
            ("xl/worksheets/s.xml", sheet_xml),
        ];
        if let Some(styles) = styles_xml {
            parts.push(("xl/styles.xml", styles));
        }
        open(zip_payload(&parts))
    }

    #[test]
    fn reads_cell_kinds_and_dates() {
        let mut xlsx = handmade(
            r#"<worksheet><sheetData>
                <row r="1"><c t="inlineStr"><is><t>Name</t></is></c><c t="inlineStr"><is><r><t>Wh</t></r><r><t>en</t></r></is></c><c t="inlineStr"><is><t>Ok</t></is></c></row>
                <row r="2"><c r="A2" t="str"><v>f&amp;x</v></c><c r="B2" s="1"><v>45000</v></c><c r="C2" t="b"><v>1</v></c></row>
                <row r="4"><c r="A4" t="e"><v>#DIV/0!</v></c><c r="B4" s="0"><v>7</v></c></row>
            </sheetData></worksheet>"#,
            Some(r#"<styleSheet><numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd"/></numFmts>
                <cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="164"/></cellXfs></styleSheet>"#),
        );
        let sheet = xlsx.read_first_sheet(&Criteria::default()).unwrap();
        let rows = sheet_to_rows(&sheet, &[]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Name"), Some(&RawValue::Text("f&x".into())));
        assert_eq!(rows[0].get("When"), Some(&RawValue::Text("2023-03-15".into())));
        assert_eq!(rows[0].get("Ok"), Some(&RawValue::Boolean(true)));
        assert_eq!(rows[1].get("Name"), None);
        assert_eq!(rows[1].get("When"), Some(&RawValue::Number(7.0)));
    }

    #[test]
    fn error_cells_fail_when_strict() {
        let mut xlsx = handmade(
            r#"<worksheet><sheetData><row r="1"><c r="A1" t="e"><v>#N/A</v></c></row></sheetData></worksheet>"#,
            None,
        );
        let criteria = Criteria {
            error_as_null: false,
            ..Criteria::default()
        };
        let sheet = xlsx.read_first_sheet(&criteria).unwrap();
        assert!(sheet_to_rows(&sheet, &[]).is_err());
    }

    #[test]
    fn rejects_workbook_without_sheets() {
        let payload = zip_payload(&[
            ("xl/workbook.xml", "<workbook><sheets/></workbook>"),
            ("xl/_rels/workbook.xml.rels", "<Relationships/>"),
        ]);
        let result = XlsxSpreadsheet::open("empty.xlsx", ZipArchive::new(payload.into_reader()).unwrap());
        assert!(matches!(result, Err(LdarError::FormatError(FormatError::WorkbookEmpty(_)))));
    }
}
