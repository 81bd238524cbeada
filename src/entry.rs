//! Manual entry of a single component record.

use crate::database::RecordStore;
use crate::error::LdarError;
use crate::record::Column;
use crate::record::Field;
use crate::record::NewRecord;
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Please fill in all fields! Missing: {}", join_names(.0))]
    MissingFields(Vec<Field>),

    #[error("Floor must be a number, got '{0}'")]
    InvalidFloor(String),
}

fn join_names(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| field.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fields collected by the entry form, one per display column.
pub fn form_fields() -> impl Iterator<Item = Field> {
    Column::ALL.into_iter().map(|column| column.field())
}

/// Checks a form submission and builds the record it describes.
///
/// Keys are field names (`tag`, `component_type`, ...); values are trimmed and
/// unknown keys ignored. Every form field must be non-empty.
pub fn validate(input: &HashMap<String, String>) -> Result<NewRecord, ValidationError> {
    let value = |field: Field| input.get(field.name()).map(|value| value.trim()).unwrap_or_default();

    let missing: Vec<Field> = form_fields().filter(|field| value(*field).is_empty()).collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let mut record = NewRecord::default();
    for field in form_fields() {
        match field {
            Field::Floor => {
                let floor = value(field);
                let number = floor
                    .parse::<f64>()
                    .ok()
                    .filter(|number| number.is_finite())
                    .ok_or_else(|| ValidationError::InvalidFloor(floor.to_owned()))?;
                record.floor = Some(number);
            }
            field => record.set_text(field, value(field).to_owned()),
        }
    }
    Ok(record)
}

/// Validates `input` and appends one record. Nothing is stored on failure.
pub fn submit(store: &mut RecordStore, input: &HashMap<String, String>) -> Result<NewRecord, LdarError> {
    let record = validate(input)?;
    store.insert_many(std::slice::from_ref(&record))?;
    info!(tag = %record.tag, "added component manually");
    Ok(record)
}
