//! Batch loader for the Sparkify song-play warehouse.
//!
//! Reads song-metadata and event-log JSON files and loads them into a SQLite
//! star schema: `songplays` facts with `users`, `songs`, `artists` and `time`
//! dimensions.

pub mod config;
pub mod extract;
pub mod pipeline;
pub mod sqlite_persistence;
pub mod walker;
pub mod warehouse;

pub use config::{AppConfig, CliConfig, FileConfig};
pub use pipeline::{run_pipeline, RunSummary};
pub use walker::{find_data_files, process_data, WalkError, WalkSummary};
pub use warehouse::{SqliteWarehouse, StatementTemplates, TableCounts, WarehouseStore};
