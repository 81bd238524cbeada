use crate::error::LdarError;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Local file header signature of a zip archive (XLSX, XLSM, ODS).
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";
/// Signature of an empty zip archive.
const EMPTY_ZIP_SIGNATURE: &[u8] = b"PK\x05\x06";
/// OLE compound file signature (legacy XLS, password protected OOXML).
const COMPOUND_FILE_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Container family detected from the leading bytes of a payload.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Container {
    Zip,
    CompoundFile,
    Unknown,
}

/// Binary spreadsheet payload handed over by the file picker.
#[derive(Clone, Debug)]
pub struct Payload {
    /// Display name, usually the file name
    pub name: String,
    bytes: Vec<u8>,
}

impl Payload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Payload {
            name: name.into(),
            bytes,
        }
    }

    /// Reads a whole file into memory.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LdarError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Ok(Payload::new(name, bytes))
    }

    pub(crate) fn container(&self) -> Container {
        if self.bytes.starts_with(ZIP_SIGNATURE) || self.bytes.starts_with(EMPTY_ZIP_SIGNATURE) {
            Container::Zip
        } else if self.bytes.starts_with(COMPOUND_FILE_SIGNATURE) {
            Container::CompoundFile
        } else {
            Container::Unknown
        }
    }

    /// Seekable reader over the payload bytes.
    pub(crate) fn into_reader(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.bytes)
    }
}
