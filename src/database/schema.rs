use crate::database::RecordStore;
use crate::error::LdarError;

/// Column list shared by inserts and scans, in table order after `id`.
pub(super) const RECORD_COLUMNS: &str = "client, description, building, unit, area, tag, drawing, floor, \
     component_type, sub_type, regulation, chemical_state, dtm, utm";

impl RecordStore {
    /// Creates the identity sequence and the `components` table.
    pub(super) fn init_schema(&self) -> Result<(), LdarError> {
        self.connection.execute_batch(
            r#"
            -- Identities keep increasing across clears
            CREATE SEQUENCE component_id_seq START 1;

            CREATE TABLE components (
                id BIGINT PRIMARY KEY DEFAULT nextval('component_id_seq'),
                client VARCHAR NOT NULL DEFAULT '',
                description VARCHAR NOT NULL DEFAULT '',
                building VARCHAR NOT NULL DEFAULT '',
                unit VARCHAR NOT NULL DEFAULT '',
                area VARCHAR NOT NULL DEFAULT '',
                tag VARCHAR NOT NULL DEFAULT '',
                drawing VARCHAR NOT NULL DEFAULT '',
                floor DOUBLE,
                component_type VARCHAR NOT NULL DEFAULT '',
                sub_type VARCHAR NOT NULL DEFAULT '',
                regulation VARCHAR NOT NULL DEFAULT '',
                chemical_state VARCHAR NOT NULL DEFAULT '',
                dtm VARCHAR NOT NULL DEFAULT '',
                utm VARCHAR NOT NULL DEFAULT '',
                created_at TIMESTAMP NOT NULL DEFAULT current_timestamp
            );
            "#,
        )?;
        Ok(())
    }
}
