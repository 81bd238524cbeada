//! A1-style cell references.

/// Converts a 0-based column index to its letters (0 -> "A", 26 -> "AA").
pub(crate) fn col_to_letters(col: usize) -> String {
    let mut col = col + 1;
    let mut letters = Vec::new();
    while col > 0 {
        col -= 1;
        letters.push(b'A' + (col % 26) as u8);
        col /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Converts column letters to a 0-based index. Case-insensitive.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.bytes().try_fold(0usize, |index, byte| {
        let byte = byte.to_ascii_uppercase();
        if byte.is_ascii_uppercase() {
            Some(index * 26 + (byte - b'A') as usize + 1)
        } else {
            None
        }
    }).map(|index| index - 1)
}

/// Converts a 1-based row number to a 0-based index.
pub(crate) fn row_to_index(number: &str) -> Option<usize> {
    number.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Formats a 0-based (row, col) pair as an A1 reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", col_to_letters(col), row + 1)
}

/// Parses an A1 reference (optionally with `$` anchors) into a 0-based (row, col) pair.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_references() {
        assert_eq!(index_to_reference(0, 0), "A1");
        assert_eq!(index_to_reference(9, 25), "Z10");
        assert_eq!(index_to_reference(0, 26), "AA1");
        assert_eq!(index_to_reference(4, 701), "ZZ5");
        assert_eq!(index_to_reference(4, 702), "AAA5");
    }

    #[test]
    fn parses_references() {
        assert_eq!(reference_to_index("A1"), Some((0, 0)));
        assert_eq!(reference_to_index("k12"), Some((11, 10)));
        assert_eq!(reference_to_index("$AA$3"), Some((2, 26)));
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("12"), None);
        assert_eq!(reference_to_index("B"), None);
        assert_eq!(reference_to_index("B-1"), None);
    }

    #[test]
    fn column_letters_round_trip_across_boundaries() {
        for col in [0, 25, 26, 51, 52, 701, 702, 16383] {
            assert_eq!(col_to_index(&col_to_letters(col)), Some(col));
        }
    }
}
