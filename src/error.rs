use thiserror::Error;

/// Main error type for the LDAR register.
/// Aggregates errors from the standard library, dependencies and every internal module.
#[derive(Error, Debug)]
pub enum LdarError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    #[error("{0}")]
    ParseDateTimeError(#[from] chrono::ParseError),

    // Third-party library errors
    #[error("{0}")]
    DuckDBError(#[from] duckdb::Error),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    RegexError(#[from] regex::Error),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Domain errors
    #[error("{0}")]
    FormatError(#[from] crate::spreadsheet::FormatError),

    #[error("{0}")]
    ValidationError(#[from] crate::entry::ValidationError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, LdarError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| LdarError::WithContextError(format!("{}: {}", message, e)))
    }
}
