//! Header-keyed row objects built from the first sheet.

use crate::error::LdarError;
use crate::spreadsheet::sheet::Sheet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt::Display;

/// Header used for columns whose header cell is blank.
const EMPTY_HEADER: &str = "__EMPTY";

/// Loosely-typed cell value of a parsed row.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl RawValue {
    /// True for text that is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        matches!(self, RawValue::Text(text) if text.trim().is_empty())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(number) => Some(*number),
            RawValue::Text(text) => text.trim().parse().ok(),
            RawValue::Boolean(_) => None,
        }
    }
}

impl Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawValue::Text(text) => write!(f, "{text}"),
            RawValue::Number(number) => write!(f, "{number}"),
            RawValue::Boolean(value) => write!(f, "{value}"),
        }
    }
}

/// One data row, keyed by the header text of its column.
/// Blank cells are omitted; key order follows the column order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawRow {
    fields: Vec<(String, RawValue)>,
}

impl RawRow {
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Sets `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: RawValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(name, _)| *name == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, RawValue)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
        let mut row = RawRow::default();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

/// Makes header titles unique: blank titles become `__EMPTY`, repeats get `_1`, `_2`, ...
pub(crate) fn header_keys<I>(titles: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut used = HashSet::<String>::new();
    let mut counters = HashMap::<String, usize>::new();
    titles
        .into_iter()
        .map(|title| {
            let base = title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| EMPTY_HEADER.to_owned());
            let mut counter = counters.get(&base).copied().unwrap_or(0);
            let mut key = base.clone();
            while used.contains(&key) {
                counter += 1;
                key = format!("{base}_{counter}");
            }
            counters.insert(base, counter);
            used.insert(key.clone());
            key
        })
        .collect()
}

/// Turns a sheet into header-keyed rows: the first non-empty row supplies the keys,
/// every later row with at least one non-blank cell becomes one [`RawRow`].
pub(crate) fn sheet_to_rows(sheet: &Sheet, shared_strings: &[String]) -> Result<Vec<RawRow>, LdarError> {
    if sheet.is_empty() {
        return Ok(Vec::new());
    }
    let (Some(col_lower), Some(col_upper)) = (sheet.col_lower_bound, sheet.col_upper_bound) else {
        return Ok(Vec::new());
    };
    let mut rows = sheet.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    let mut titles: Vec<Option<String>> = vec![None; col_upper - col_lower + 1];
    for cell in header {
        titles[cell.col - col_lower] = Some(cell.to_raw_value(shared_strings)?.to_string());
    }
    let keys = header_keys(titles);

    let mut records = Vec::new();
    for cells in rows {
        let mut record = RawRow::default();
        for cell in cells {
            let value = cell.to_raw_value(shared_strings)?;
            if !value.is_blank() {
                record.insert(keys[cell.col - col_lower].as_str(), value);
            }
        }
        if !record.is_empty() {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::{Cell, CellType};

    fn titles(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|value| Some(value.to_string()).filter(|value| !value.is_empty()))
            .collect()
    }

    fn text(row: usize, col: usize, value: &str) -> Cell {
        Cell {
            row,
            col,
            kind: CellType::InlineString,
            value: value.to_owned(),
        }
    }

    #[test]
    fn header_keys_are_unique() {
        assert_eq!(
            header_keys(titles(&["Tag", "", "Tag", "", "Tag_1", "Tag"])),
            vec!["Tag", "__EMPTY", "Tag_1", "__EMPTY_1", "Tag_1_1", "Tag_2"]
        );
    }

    #[test]
    fn raw_row_lookup_is_exact() {
        let row: RawRow = [("Component Type", RawValue::Text("VALVE".into()))].into_iter().collect();
        assert_eq!(row.get("Component Type"), Some(&RawValue::Text("VALVE".into())));
        assert_eq!(row.get("component type"), None);
        assert_eq!(row.get("ComponentType"), None);
    }

    #[test]
    fn raw_value_display_and_numbers() {
        assert_eq!(RawValue::Number(2.0).to_string(), "2");
        assert_eq!(RawValue::Number(2.5).to_string(), "2.5");
        assert_eq!(RawValue::Boolean(true).to_string(), "true");
        assert_eq!(RawValue::Text(" 3 ".into()).as_number(), Some(3.0));
        assert!(RawValue::Text("  ".into()).is_blank());
        assert!(!RawValue::Number(0.0).is_blank());
    }

    #[test]
    fn sheet_rows_skip_blanks() {
        let mut sheet = Sheet::new("t.xlsx", "Sheet1", None);
        sheet.push(text(2, 1, "Tag"));
        sheet.push(text(2, 3, "Unit"));
        sheet.push(text(3, 1, "TAG-1"));
        sheet.push(text(3, 2, "stray"));
        sheet.push(text(5, 1, "   "));
        sheet.push(text(6, 3, "U2"));
        sheet.finish();

        let rows = sheet_to_rows(&sheet, &[]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Tag"), Some(&RawValue::Text("TAG-1".into())));
        assert_eq!(rows[0].get("__EMPTY"), Some(&RawValue::Text("stray".into())));
        assert_eq!(rows[0].get("Unit"), None);
        let only_unit: RawRow = [("Unit", RawValue::Text("U2".into()))].into_iter().collect();
        assert_eq!(rows[1], only_unit);
    }

    #[test]
    fn header_only_sheet_has_no_rows() {
        let mut sheet = Sheet::new("t.xlsx", "Sheet1", None);
        sheet.push(text(0, 0, "Tag"));
        sheet.finish();
        assert!(sheet_to_rows(&sheet, &[]).unwrap().is_empty());

        let empty = Sheet::new("t.xlsx", "Sheet1", None);
        assert!(sheet_to_rows(&empty, &[]).unwrap().is_empty());
    }
}
