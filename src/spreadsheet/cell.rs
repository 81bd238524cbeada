use crate::error::LdarError;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::row::RawValue;
use crate::spreadsheet::FormatError;
use chrono::NaiveDate;
use chrono::TimeDelta;

/// Types of cell data in spreadsheet files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as "1" / "0"
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// ISO 8601 duration strings (ODS time cells)
    IsoDuration,
    /// Inline string values
    InlineString,
    /// Index into the shared string table
    SharedString,
    /// Error values
    Error,
}

impl CellType {
    /// Cell type implied by a built-in Excel number format id.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Cell type implied by a custom number format code.
    /// Quoted literals, escapes and bracketed sections (colors, conditions) are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut is_date = false;
        let mut is_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// One non-empty cell as read from the sheet XML.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    pub(crate) kind: CellType,
    /// Raw value text; for shared strings, the table index
    pub(crate) value: String,
}

impl Cell {
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Converts the raw cell into a loosely-typed row value.
    /// Dates and times become their ISO text; shared strings are resolved.
    pub(crate) fn to_raw_value(&self, shared_strings: &[String]) -> Result<RawValue, LdarError> {
        let value = match self.kind {
            CellType::Empty => RawValue::Text(String::new()),
            CellType::Boolean => RawValue::Boolean(self.value == "1" || self.value.eq_ignore_ascii_case("true")),
            CellType::Number => RawValue::Number(self.value.trim().parse::<f64>()?),
            CellType::NumberDateTime1900 => self.serial_text(to_datetime_string(&self.value, false))?,
            CellType::NumberDateTime1904 => self.serial_text(to_datetime_string(&self.value, true))?,
            CellType::NumberDate1900 => self.serial_text(to_date_string(&self.value, false))?,
            CellType::NumberDate1904 => self.serial_text(to_date_string(&self.value, true))?,
            CellType::NumberTime1900 | CellType::NumberTime1904 => self.serial_text(to_time_string(&self.value))?,
            CellType::IsoDateTime => RawValue::Text(self.value.replace('T', " ")),
            CellType::IsoDuration => RawValue::Text(iso_duration_to_time(&self.value)),
            CellType::InlineString => RawValue::Text(self.value.to_owned()),
            CellType::SharedString => {
                let index = self.value.trim().parse::<usize>()?;
                let text = shared_strings.get(index).ok_or_else(|| FormatError::CellValueError {
                    reference: self.reference(),
                    value: format!("shared string #{index} not found"),
                })?;
                RawValue::Text(text.to_owned())
            }
            CellType::Error => Err(FormatError::CellValueError {
                reference: self.reference(),
                value: self.value.to_owned(),
            })?,
        };
        Ok(value)
    }

    fn serial_text(&self, text: Option<String>) -> Result<RawValue, FormatError> {
        text.map(RawValue::Text).ok_or_else(|| FormatError::CellValueError {
            reference: self.reference(),
            value: self.value.to_owned(),
        })
    }
}

/// Largest serial Excel accepts, 9999-12-31.
const MAX_SERIAL: f64 = 2_958_465.0;
const MILLISECONDS_PER_DAY: i64 = 86_400_000;

/// Parses a serial day number; non-finite and out-of-range serials are rejected.
fn parse_serial(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|serial| (0.0..=MAX_SERIAL).contains(serial))
}

/// Whole days and milliseconds of the day; a time that rounds up to midnight moves to the next day.
fn split_serial(serial: f64) -> (i64, i64) {
    let days = serial.trunc() as i64;
    let milliseconds = (serial.fract() * MILLISECONDS_PER_DAY as f64).round() as i64;
    if milliseconds >= MILLISECONDS_PER_DAY {
        (days + 1, milliseconds - MILLISECONDS_PER_DAY)
    } else {
        (days, milliseconds)
    }
}

/// Converts an Excel serial day number to an ISO date.
/// Serials below 60 precede the phantom 1900-02-29 kept for Lotus 1-2-3 compatibility.
fn to_date(days: i64, is_1904: bool) -> Option<NaiveDate> {
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let delta = TimeDelta::try_days(days.checked_add(offset)?)?;
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(delta)
}

fn to_date_string(value: &str, is_1904: bool) -> Option<String> {
    let serial = parse_serial(value)?;
    Some(to_date(serial.trunc() as i64, is_1904)?.format("%Y-%m-%d").to_string())
}

/// Formats milliseconds of the day as `HH:MM:SS[.mmm]`.
fn format_time_of_day(mut total: i64) -> String {
    let milliseconds = total % 1_000;
    total /= 1_000;
    let seconds = total % 60;
    total /= 60;
    let minutes = total % 60;
    let hours = total / 60;
    if milliseconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

fn to_time_string(value: &str) -> Option<String> {
    let (_, milliseconds) = split_serial(parse_serial(value)?);
    Some(format_time_of_day(milliseconds))
}

fn to_datetime_string(value: &str, is_1904: bool) -> Option<String> {
    let (days, milliseconds) = split_serial(parse_serial(value)?);
    let date = to_date(days, is_1904)?.format("%Y-%m-%d");
    Some(format!("{date} {}", format_time_of_day(milliseconds)))
}

/// Renders an ODS `PT12H30M05S` duration as `12:30:05`.
fn iso_duration_to_time(value: &str) -> String {
    let Some(body) = value.strip_prefix("PT") else {
        return value.to_owned();
    };
    let mut parts = [0f64; 3];
    let mut number = String::new();
    for character in body.chars() {
        let slot = match character {
            'H' => 0,
            'M' => 1,
            'S' => 2,
            _ => {
                number.push(character);
                continue;
            }
        };
        parts[slot] = number.parse().unwrap_or_default();
        number.clear();
    }
    format!("{:02}:{:02}:{:02}", parts[0] as i64, parts[1] as i64, parts[2].trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            row: 1,
            col: 2,
            kind,
            value: value.to_owned(),
        }
    }

    #[test]
    fn detects_custom_date_formats() {
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("hh:mm", true), CellType::NumberTime1904);
        assert_eq!(CellType::parse_custom_number_format("dd/mm/yy hh:mm", false), CellType::NumberDateTime1900);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("0 \"days\"", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("#,##0_);\\(#,##0\\)", false), CellType::Number);
    }

    #[test]
    fn detects_builtin_date_formats() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("22", true), Some(CellType::NumberDateTime1904));
        assert_eq!(CellType::parse_builtin_number_format_id("2", false), None);
    }

    #[test]
    fn converts_scalars() {
        assert_eq!(cell(CellType::Number, "12").to_raw_value(&[]).unwrap(), RawValue::Number(12.0));
        assert_eq!(cell(CellType::Boolean, "1").to_raw_value(&[]).unwrap(), RawValue::Boolean(true));
        assert_eq!(cell(CellType::Boolean, "0").to_raw_value(&[]).unwrap(), RawValue::Boolean(false));
        assert_eq!(
            cell(CellType::InlineString, "VALVE").to_raw_value(&[]).unwrap(),
            RawValue::Text("VALVE".to_owned())
        );
        assert!(cell(CellType::Number, "abc").to_raw_value(&[]).is_err());
    }

    #[test]
    fn resolves_shared_strings() {
        let strings = vec!["Tag".to_owned(), "Floor".to_owned()];
        assert_eq!(
            cell(CellType::SharedString, "1").to_raw_value(&strings).unwrap(),
            RawValue::Text("Floor".to_owned())
        );
        let error = cell(CellType::SharedString, "9").to_raw_value(&strings).unwrap_err();
        assert!(error.to_string().contains("C2"));
    }

    #[test]
    fn formats_serial_dates() {
        assert_eq!(to_date_string("1", false).unwrap(), "1900-01-01");
        assert_eq!(to_date_string("59", false).unwrap(), "1900-02-28");
        assert_eq!(to_date_string("61", false).unwrap(), "1900-03-01");
        assert_eq!(to_date_string("45000", false).unwrap(), "2023-03-15");
        assert_eq!(to_date_string("0", true).unwrap(), "1904-01-01");
        assert_eq!(to_datetime_string("45000.5", false).unwrap(), "2023-03-15 12:00:00");
        assert_eq!(to_time_string("0.75").unwrap(), "18:00:00");
    }

    #[test]
    fn near_midnight_rolls_over() {
        assert_eq!(to_time_string("0.999999999").unwrap(), "00:00:00");
        assert_eq!(to_datetime_string("45000.999999999", false).unwrap(), "2023-03-16 00:00:00");
        assert_eq!(to_datetime_string("45000.9999", false).unwrap(), "2023-03-15 23:59:51.360");
    }

    #[test]
    fn out_of_range_serials_fail_with_reference() {
        for value in ["1e12", "inf", "-inf", "NaN", "-1", "2958466"] {
            let error = cell(CellType::NumberDate1900, value).to_raw_value(&[]).unwrap_err();
            assert!(matches!(error, LdarError::FormatError(FormatError::CellValueError { .. })), "{value}");
            assert!(error.to_string().starts_with("Invalid cell value at C2"), "{value}");
        }
        assert!(cell(CellType::NumberDateTime1904, "1e300").to_raw_value(&[]).is_err());
        assert!(cell(CellType::NumberTime1900, "inf").to_raw_value(&[]).is_err());
        assert_eq!(
            cell(CellType::NumberDate1900, "2958465").to_raw_value(&[]).unwrap(),
            RawValue::Text("9999-12-31".to_owned())
        );
    }

    #[test]
    fn formats_iso_values() {
        assert_eq!(
            cell(CellType::IsoDateTime, "2024-05-01T08:30:00").to_raw_value(&[]).unwrap(),
            RawValue::Text("2024-05-01 08:30:00".to_owned())
        );
        assert_eq!(iso_duration_to_time("PT12H30M05S"), "12:30:05");
        assert_eq!(iso_duration_to_time("PT01H00M00.5S"), "01:00:00");
    }

    #[test]
    fn error_cells_fail_with_reference() {
        let error = cell(CellType::Error, "#DIV/0!").to_raw_value(&[]).unwrap_err();
        assert!(matches!(error, LdarError::FormatError(FormatError::CellValueError { .. })));
        assert!(error.to_string().contains("#DIV/0!"));
    }
}
