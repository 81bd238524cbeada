//! Spreadsheet import: raw rows to normalized records, then a replace-mode load.

use crate::database::RecordStore;
use crate::error::LdarError;
use crate::helpers::reader::Payload;
use crate::record::Field;
use crate::record::NewRecord;
use crate::spreadsheet;
use crate::spreadsheet::Criteria;
use crate::spreadsheet::RawRow;
use crate::spreadsheet::RawValue;
use tracing::info;
use tracing::warn;

/// Maps a raw row onto the record schema by exact header name.
/// Missing or blank values become empty strings; a non-numeric floor becomes blank.
pub fn normalize(row: &RawRow) -> NewRecord {
    let mut record = NewRecord::default();
    for field in Field::ALL {
        let Some(value) = row.get(field.header()).filter(|value| !value.is_blank()) else {
            continue;
        };
        match field {
            Field::Floor => record.floor = parse_floor(value),
            field => record.set_text(field, value.to_string()),
        }
    }
    record
}

fn parse_floor(value: &RawValue) -> Option<f64> {
    let floor = value.as_number().filter(|number| number.is_finite());
    if floor.is_none() {
        warn!(value = %value, "floor is not numeric, stored blank");
    }
    floor
}

/// Parses `payload` and replaces the store contents with its rows.
///
/// The whole first sheet is decoded before the store is touched, so a
/// payload that fails to parse leaves the existing records in place.
pub fn import_payload(store: &mut RecordStore, payload: Payload, criteria: &Criteria) -> Result<usize, LdarError> {
    let name = payload.name.to_owned();
    let rows = spreadsheet::parse(payload, criteria)?;
    let records: Vec<NewRecord> = rows.iter().map(normalize).collect();
    let inserted = store.replace_all(&records)?;
    info!(file = %name, inserted, "imported component register");
    Ok(inserted)
}
