use crate::database::schema::RECORD_COLUMNS;
use crate::database::DEFAULT_SCAN_BATCH_SIZE;
use crate::error::LdarError;
use crate::record::ComponentRecord;
use crate::record::NewRecord;
use chrono::NaiveDateTime;
use duckdb::params;
use duckdb::Connection;
use duckdb::Row;
use std::collections::VecDeque;
use tracing::debug;
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Session-scoped table of component records.
pub struct RecordStore {
    pub(super) connection: Connection,
    batch_size: usize,
}

impl RecordStore {
    pub fn open_in_memory() -> Result<Self, LdarError> {
        Self::with_batch_size(DEFAULT_SCAN_BATCH_SIZE)
    }

    /// Opens an empty store whose scans fetch `batch_size` records per query.
    pub fn with_batch_size(batch_size: usize) -> Result<Self, LdarError> {
        let store = RecordStore {
            connection: Connection::open_in_memory()?,
            batch_size: batch_size.max(1),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Appends `records` in order and returns how many were inserted.
    pub fn insert_many(&mut self, records: &[NewRecord]) -> Result<usize, LdarError> {
        if records.is_empty() {
            return Ok(0);
        }
        let transaction = self.connection.transaction()?;
        let inserted = insert_records(&transaction, records)?;
        transaction.commit()?;
        debug!(inserted, "inserted component records");
        Ok(inserted)
    }

    /// Removes every record. Identities are not reused afterwards.
    pub fn clear(&mut self) -> Result<(), LdarError> {
        let removed = self.connection.execute("DELETE FROM components", [])?;
        debug!(removed, "cleared component records");
        Ok(())
    }

    /// Clears the table and inserts `records` in one transaction.
    pub fn replace_all(&mut self, records: &[NewRecord]) -> Result<usize, LdarError> {
        let transaction = self.connection.transaction()?;
        let removed = transaction.execute("DELETE FROM components", [])?;
        let inserted = insert_records(&transaction, records)?;
        transaction.commit()?;
        info!(removed, inserted, "replaced component records");
        Ok(inserted)
    }

    pub fn count(&self) -> Result<usize, LdarError> {
        let count = self
            .connection
            .query_row("SELECT count(*) FROM components", [], |row| row.get::<_, i64>(0))?;
        Ok(count as usize)
    }

    /// Lazy scan of every record, ascending by identity.
    /// Each call starts over from the first record.
    pub fn scan_all_ordered(&self) -> RecordScan<'_> {
        RecordScan {
            store: self,
            last_id: None,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn fetch_after(&self, last_id: Option<i64>) -> Result<Vec<ComponentRecord>, LdarError> {
        let sql = format!(
            "SELECT id, {RECORD_COLUMNS}, strftime(created_at, '{TIMESTAMP_FORMAT}') \
             FROM components WHERE id > ? ORDER BY id LIMIT {}",
            self.batch_size
        );
        let mut statement = self.connection.prepare_cached(&sql)?;
        let rows = statement.query_map(params![last_id.unwrap_or(0)], |row| {
            Ok((read_record(row)?, row.get::<_, String>(15)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (mut record, created_at) = row?;
            record.created_at = NaiveDateTime::parse_from_str(&created_at, TIMESTAMP_FORMAT)?;
            records.push(record);
        }
        debug!(after = last_id, fetched = records.len(), "scanned component batch");
        Ok(records)
    }
}

fn insert_records(connection: &Connection, records: &[NewRecord]) -> Result<usize, LdarError> {
    let sql = format!("INSERT INTO components ({RECORD_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)");
    let mut statement = connection.prepare(&sql)?;
    for record in records {
        statement.execute(params![
            record.client,
            record.description,
            record.building,
            record.unit,
            record.area,
            record.tag,
            record.drawing,
            record.floor,
            record.component_type,
            record.sub_type,
            record.regulation,
            record.chemical_state,
            record.dtm,
            record.utm,
        ])?;
    }
    Ok(records.len())
}

/// Maps columns 0..=14 of a scan row; `created_at` is filled in by the caller.
fn read_record(row: &Row<'_>) -> duckdb::Result<ComponentRecord> {
    Ok(ComponentRecord {
        id: row.get(0)?,
        values: NewRecord {
            client: row.get(1)?,
            description: row.get(2)?,
            building: row.get(3)?,
            unit: row.get(4)?,
            area: row.get(5)?,
            tag: row.get(6)?,
            drawing: row.get(7)?,
            floor: row.get(8)?,
            component_type: row.get(9)?,
            sub_type: row.get(10)?,
            regulation: row.get(11)?,
            chemical_state: row.get(12)?,
            dtm: row.get(13)?,
            utm: row.get(14)?,
        },
        created_at: NaiveDateTime::default(),
    })
}

/// Finite, ordered scan over a [`RecordStore`], fetched in batches.
pub struct RecordScan<'a> {
    store: &'a RecordStore,
    last_id: Option<i64>,
    buffer: VecDeque<ComponentRecord>,
    exhausted: bool,
}

impl Iterator for RecordScan<'_> {
    type Item = Result<ComponentRecord, LdarError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            match self.store.fetch_after(self.last_id) {
                Ok(batch) => {
                    self.exhausted = batch.len() < self.store.batch_size;
                    self.buffer.extend(batch);
                }
                Err(error) => {
                    self.exhausted = true;
                    return Some(Err(error));
                }
            }
        }
        let record = self.buffer.pop_front()?;
        self.last_id = Some(record.id);
        Some(Ok(record))
    }
}
