/// Options controlling how the first sheet of a payload is read.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Criteria {
    /// Maximum number of rows read below the header row.
    pub rows_limit: Option<usize>,

    /// Read error cells (`#DIV/0!`, `#N/A`, ...) as blank instead of failing the import.
    pub error_as_null: bool,
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria {
            rows_limit: None,
            error_as_null: true,
        }
    }
}
