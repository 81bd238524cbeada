//! In-memory DuckDB store of component records.
//!
//! The database lives for the session only: nothing is written to disk and
//! every store starts empty.
mod schema;
mod store;

pub use store::RecordScan;
pub use store::RecordStore;

/// Records fetched per query by a [`RecordScan`].
pub const DEFAULT_SCAN_BATCH_SIZE: usize = 256;
