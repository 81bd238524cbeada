//! In-memory XLSX and ODS payloads for tests.
//!
//! Cell values that parse as numbers are written as numeric cells, empty strings are
//! left out, and everything else becomes text (shared strings for XLSX).

use crate::helpers::reader::Payload;
use std::io::Cursor;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub(crate) fn zip_payload(parts: &[(&str, &str)]) -> Payload {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    let bytes = writer.finish().unwrap().into_inner();
    Payload::new("fixture.zip", bytes)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn worksheet_xml(rows: &[&[&str]], shared_strings: &mut Vec<String>) -> String {
    let mut xml = String::from("<worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\"><sheetData>");
    for (row, values) in rows.iter().enumerate() {
        xml.push_str(&format!("<row r=\"{}\">", row + 1));
        for (col, value) in values.iter().enumerate() {
            let reference = crate::spreadsheet::reference::index_to_reference(row, col);
            if value.is_empty() {
                continue;
            } else if value.parse::<f64>().is_ok() {
                xml.push_str(&format!("<c r=\"{reference}\"><v>{value}</v></c>"));
            } else {
                let index = shared_strings.len();
                shared_strings.push(value.to_string());
                xml.push_str(&format!("<c r=\"{reference}\" t=\"s\"><v>{index}</v></c>"));
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Workbook with one worksheet per entry, in the given order.
pub(crate) fn xlsx_payload_sheets(sheets: &[(&str, &[&[&str]])]) -> Payload {
    let mut shared_strings = Vec::new();
    let mut workbook = String::from(
        "<workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\"><sheets>",
    );
    let mut relationships = String::from("<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">");
    let mut worksheets = Vec::new();
    for (index, (name, rows)) in sheets.iter().enumerate() {
        let id = index + 1;
        workbook.push_str(&format!("<sheet name=\"{}\" sheetId=\"{id}\" r:id=\"rId{id}\"/>", escape(name)));
        relationships.push_str(&format!(
            "<Relationship Id=\"rId{id}\" \
             Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" \
             Target=\"worksheets/sheet{id}.xml\"/>"
        ));
        worksheets.push((format!("xl/worksheets/sheet{id}.xml"), worksheet_xml(rows, &mut shared_strings)));
    }
    workbook.push_str("</sheets></workbook>");
    relationships.push_str("</Relationships>");

    let mut sst = format!("<sst count=\"{0}\" uniqueCount=\"{0}\">", shared_strings.len());
    for text in &shared_strings {
        sst.push_str(&format!("<si><t>{}</t></si>", escape(text)));
    }
    sst.push_str("</sst>");

    let mut parts: Vec<(&str, &str)> = vec![
        ("xl/workbook.xml", workbook.as_str()),
        ("xl/_rels/workbook.xml.rels", relationships.as_str()),
        ("xl/sharedStrings.xml", sst.as_str()),
    ];
    for (path, xml) in &worksheets {
        parts.push((path.as_str(), xml.as_str()));
    }
    let mut payload = zip_payload(&parts);
    payload.name = "fixture.xlsx".to_owned();
    payload
}

pub(crate) fn xlsx_payload(rows: &[&[&str]]) -> Payload {
    xlsx_payload_sheets(&[("Components", rows)])
}

/// OpenDocument spreadsheet with a single table.
pub(crate) fn ods_payload(rows: &[&[&str]]) -> Payload {
    let mut content = String::from(
        "<office:document-content \
         xmlns:office=\"urn:oasis:names:tc:opendocument:xmlns:office:1.0\" \
         xmlns:table=\"urn:oasis:names:tc:opendocument:xmlns:table:1.0\" \
         xmlns:text=\"urn:oasis:names:tc:opendocument:xmlns:text:1.0\">\
         <office:body><office:spreadsheet><table:table table:name=\"Components\">",
    );
    for values in rows {
        content.push_str("<table:table-row>");
        for value in values.iter() {
            if value.is_empty() {
                content.push_str("<table:table-cell/>");
            } else if value.parse::<f64>().is_ok() {
                content.push_str(&format!(
                    "<table:table-cell office:value-type=\"float\" office:value=\"{value}\"><text:p>{value}</text:p></table:table-cell>"
                ));
            } else {
                content.push_str(&format!(
                    "<table:table-cell office:value-type=\"string\"><text:p>{}</text:p></table:table-cell>",
                    escape(value)
                ));
            }
        }
        content.push_str("</table:table-row>");
    }
    content.push_str("<table:table-row table:number-rows-repeated=\"1048000\"><table:table-cell table:number-columns-repeated=\"1024\"/></table:table-row>");
    content.push_str("</table:table></office:spreadsheet></office:body></office:document-content>");

    let mut payload = zip_payload(&[
        ("mimetype", "application/vnd.oasis.opendocument.spreadsheet"),
        ("content.xml", content.as_str()),
    ]);
    payload.name = "fixture.ods".to_owned();
    payload
}

/// The column headers of the component register export, in sheet order.
pub(crate) const REGISTER_HEADER: &[&str] = &[
    "Client",
    "Description",
    "Building",
    "Unit",
    "Area",
    "Tag",
    "Drawing",
    "Floor",
    "Component Type",
    "Sub Type",
    "Regulation",
    "Chemical State",
    "DTM",
    "UTM",
];
