//! Part lookup inside the zip containers used by XLSX and ODS.

use crate::error::LdarError;
use crate::helpers::xml::XmlReader;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::ZipArchive;

pub(crate) trait ZipHelper<RS: Read + Seek> {
    /// Archive entry name matching `name` case-insensitively, with `\` treated as `/`.
    fn find_name(&self, name: &str) -> Option<String>;

    /// Whether the archive holds a part called `name`.
    fn contains(&self, name: &str) -> bool {
        self.find_name(name).is_some()
    }

    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, LdarError>;

    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, LdarError>;
}

impl<RS: Read + Seek> ZipHelper<RS> for ZipArchive<RS> {
    fn find_name(&self, name: &str) -> Option<String> {
        let pattern = name.replace('\\', "/");
        self.file_names()
            .find(|file_name| pattern.eq_ignore_ascii_case(&file_name.replace('\\', "/")))
            .map(|file_name| file_name.to_owned())
    }

    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, LdarError> {
        match self.find_name(name).map(|file_name| self.by_name(&file_name)).transpose() {
            Ok(file) => Ok(file),
            Err(ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error)?,
        }
    }

    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, LdarError> {
        Ok(self
            .file(name)?
            .map(|file| XmlReader::new(BufReader::new(file))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_xml_events;
    use crate::spreadsheet::testing::zip_payload;
    use quick_xml::events::Event;
    use std::io::Cursor;

    fn archive() -> ZipArchive<Cursor<Vec<u8>>> {
        let payload = zip_payload(&[
            ("xl/workbook.xml", "<workbook/>"),
            ("xl/worksheets/sheet1.xml", "<worksheet><row/></worksheet>"),
        ]);
        ZipArchive::new(payload.into_reader()).unwrap()
    }

    #[test]
    fn finds_parts_case_insensitively() {
        let zip = archive();
        assert_eq!(zip.find_name("XL/Workbook.xml").as_deref(), Some("xl/workbook.xml"));
        assert!(zip.contains("xl\\worksheets\\sheet1.xml"));
        assert!(!zip.contains("xl/styles.xml"));
    }

    #[test]
    fn missing_part_is_none() {
        let mut zip = archive();
        assert!(zip.file("xl/sharedStrings.xml").unwrap().is_none());
        assert!(zip.xml_reader("content.xml").unwrap().is_none());
    }

    #[test]
    fn opens_xml_part() -> Result<(), LdarError> {
        let mut zip = archive();
        let mut reader = zip.xml_reader("xl/worksheets/sheet1.xml")?.unwrap();
        let mut elements = 0;
        match_xml_events!(reader => {
            Event::Start(_) => elements += 1,
        });
        assert_eq!(elements, 2);
        Ok(())
    }
}
