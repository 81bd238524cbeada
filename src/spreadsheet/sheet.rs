use crate::spreadsheet::cell::Cell;

/// Non-empty cells of one worksheet, kept in row-major order.
#[derive(Debug)]
pub(crate) struct Sheet {
    /// Source payload name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    pub(crate) cells: Vec<Cell>,
    /// Rows read below the first non-empty row, if limited
    rows_limit: Option<usize>,
    /// Actual data range (determined from cell data)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(super) fn new(file_name: &str, name: &str, rows_limit: Option<usize>) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
            rows_limit,
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True once `row` lies past the row limit, counted from the header row.
    pub(super) fn after_row_limit(&self, row: usize) -> bool {
        self.row_lower_bound
            .zip(self.rows_limit)
            .map(|(row_lower_bound, limit)| row_lower_bound + limit < row)
            .unwrap_or(false)
    }

    pub(super) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|lower| row < lower).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|upper| upper < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|lower| col < lower).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|upper| upper < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Restores row-major order; writers may emit cells out of order.
    pub(super) fn finish(&mut self) {
        self.cells.sort_by_key(|cell| (cell.row, cell.col));
    }

    /// Cells grouped by row, top to bottom. Rows without cells are not yielded.
    pub(crate) fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunk_by(|left, right| left.row == right.row)
    }
}

#[cfg(test)]
mod tests {
    use crate::spreadsheet::cell::{Cell, CellType};
    use crate::spreadsheet::sheet::Sheet;

    fn push(sheet: &mut Sheet, row: usize, col: usize) {
        sheet.push(Cell {
            row,
            col,
            kind: CellType::InlineString,
            value: format!("{row}:{col}"),
        });
    }

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("", "", None);

        assert!(sheet.is_empty());
        assert_eq!(sheet.row_lower_bound, None);
        assert_eq!(sheet.row_upper_bound, None);
        assert_eq!(sheet.col_lower_bound, None);
        assert_eq!(sheet.col_upper_bound, None);
        assert_eq!(sheet.rows().count(), 0);
    }

    #[test]
    fn sheet_update() {
        let mut sheet = Sheet::new("", "", None);
        push(&mut sheet, 1, 3);
        push(&mut sheet, 1, 1);
        push(&mut sheet, 3, 1);
        push(&mut sheet, 3, 3);
        sheet.finish();

        assert_eq!(sheet.cells.len(), 4);
        assert_eq!(sheet.row_lower_bound, Some(1));
        assert_eq!(sheet.row_upper_bound, Some(3));
        assert_eq!(sheet.col_lower_bound, Some(1));
        assert_eq!(sheet.col_upper_bound, Some(3));

        let rows: Vec<Vec<&str>> = sheet
            .rows()
            .map(|row| row.iter().map(|cell| cell.value.as_str()).collect())
            .collect();
        assert_eq!(rows, vec![vec!["1:1", "1:3"], vec!["3:1", "3:3"]]);
    }

    #[test]
    fn sheet_row_limit_counts_from_first_row() {
        let mut sheet = Sheet::new("", "", Some(2));
        assert!(!sheet.after_row_limit(100));

        push(&mut sheet, 4, 0);
        assert!(!sheet.after_row_limit(5));
        assert!(!sheet.after_row_limit(6));
        assert!(sheet.after_row_limit(7));
    }
}
