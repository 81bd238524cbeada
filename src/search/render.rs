//! Rendered rows and the highlight engine.
//!
//! A rendered row keeps the plain text of each cell next to the byte ranges
//! currently highlighted in it. Markup is produced on demand from those two,
//! so repeated searches never stack markers and clearing restores the text exactly.

use crate::error::LdarError;
use crate::record::ComponentRecord;
use crate::search::matcher::Matcher;
use crate::search::selector::ColumnSelector;
use std::ops::Range;

/// Markers wrapped around each highlighted occurrence.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightStyle {
    pub open: String,
    pub close: String,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        HighlightStyle {
            open: "<mark>".to_owned(),
            close: "</mark>".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderedCell {
    /// Canonical plain text, never modified by searches
    pub text: String,
    pub highlights: Vec<Range<usize>>,
}

impl RenderedCell {
    pub fn new(text: String) -> Self {
        RenderedCell {
            text,
            highlights: Vec::new(),
        }
    }

    pub fn is_highlighted(&self) -> bool {
        !self.highlights.is_empty()
    }

    /// Cell text with every highlighted range wrapped in the style's markers.
    pub fn markup(&self, style: &HighlightStyle) -> String {
        let mut output = String::with_capacity(self.text.len() + self.highlights.len() * (style.open.len() + style.close.len()));
        let mut position = 0;
        for range in &self.highlights {
            output.push_str(&self.text[position..range.start]);
            output.push_str(&style.open);
            output.push_str(&self.text[range.clone()]);
            output.push_str(&style.close);
            position = range.end;
        }
        output.push_str(&self.text[position..]);
        output
    }

    fn reset(&mut self) {
        self.highlights.clear();
    }

    /// Highlights every occurrence and reports whether there was one.
    fn highlight(&mut self, matcher: &Matcher) -> bool {
        self.highlights = matcher.find_all(&self.text);
        self.is_highlighted()
    }
}

/// View state of one record: its display cells and whether the row is shown.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedRow {
    pub id: i64,
    pub cells: Vec<RenderedCell>,
    pub visible: bool,
}

impl RenderedRow {
    pub fn from_record(record: &ComponentRecord) -> Self {
        RenderedRow {
            id: record.id,
            cells: record.cells().into_iter().map(RenderedCell::new).collect(),
            visible: true,
        }
    }

    /// Plain text of every cell, in column order.
    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(|cell| cell.text.as_str()).collect()
    }

    fn apply(&mut self, matcher: &Matcher, selector: &ColumnSelector) {
        let matched = match selector {
            ColumnSelector::All => {
                let mut matched = false;
                for cell in self.cells.iter_mut() {
                    matched |= cell.highlight(matcher);
                }
                matched
            }
            ColumnSelector::Column(column) => {
                self.cells.iter_mut().for_each(RenderedCell::reset);
                self.cells
                    .get_mut(column.index())
                    .map(|cell| cell.highlight(matcher))
                    .unwrap_or(false)
            }
            ColumnSelector::Unresolved(_) => {
                self.cells.iter_mut().for_each(RenderedCell::reset);
                false
            }
        };
        self.visible = matcher.is_empty() || matched;
    }

    fn clear(&mut self) {
        self.cells.iter_mut().for_each(RenderedCell::reset);
        self.visible = true;
    }
}

/// Rendered rows for `records` with `query` applied over `selector`.
pub fn render_state(
    records: &[ComponentRecord],
    query: &str,
    selector: &ColumnSelector,
) -> Result<Vec<RenderedRow>, LdarError> {
    let mut rows: Vec<RenderedRow> = records.iter().map(RenderedRow::from_record).collect();
    apply_search(&mut rows, query, selector)?;
    Ok(rows)
}

/// Recomputes visibility and highlights of `rows` for a new query.
pub fn apply_search(rows: &mut [RenderedRow], query: &str, selector: &ColumnSelector) -> Result<(), LdarError> {
    let matcher = Matcher::new(query)?;
    for row in rows.iter_mut() {
        row.apply(&matcher, selector);
    }
    Ok(())
}

/// Removes every highlight and shows every row.
pub fn clear_search(rows: &mut [RenderedRow]) {
    rows.iter_mut().for_each(RenderedRow::clear);
}
