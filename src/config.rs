use crate::database::DEFAULT_SCAN_BATCH_SIZE;
use crate::search::render::HighlightStyle;
use crate::spreadsheet::Criteria;

/// Session settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// How uploaded spreadsheets are read
    pub criteria: Criteria,
    /// Markers wrapped around search hits
    pub highlight: HighlightStyle,
    /// Records fetched per store query when rebuilding the table
    pub scan_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            criteria: Criteria::default(),
            highlight: HighlightStyle::default(),
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }
}
