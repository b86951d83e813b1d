//! One full load: songs first, then event logs, over a single connection.

use crate::config::AppConfig;
use crate::extract::{process_log_file, process_song_file};
use crate::walker::{process_data, WalkSummary};
use crate::warehouse::{SqliteWarehouse, StatementTemplates, TableCounts};
use anyhow::{Context, Result};
use tracing::info;

#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub songs: WalkSummary,
    pub logs: WalkSummary,
    pub counts: TableCounts,
}

/// Loads every song file and then every log file into the warehouse at
/// `config.db_path`.
///
/// Song files go first so that plays can be matched against them. The
/// connection is closed when this returns, whether or not the load succeeded.
pub fn run_pipeline(config: &AppConfig) -> Result<RunSummary> {
    let store = SqliteWarehouse::open(&config.db_path, StatementTemplates::sqlite())?;
    if config.reset_schema {
        store.reset_schema()?;
    }

    let songs = process_data(&store, &config.song_data, process_song_file)
        .with_context(|| format!("Failed to load song data from {:?}", config.song_data))?;
    let logs = process_data(&store, &config.log_data, process_log_file)
        .with_context(|| format!("Failed to load log data from {:?}", config.log_data))?;

    let counts = store.table_counts()?;
    info!(
        "Warehouse now holds {} songs, {} artists, {} users, {} time rows, {} songplays",
        counts.songs, counts.artists, counts.users, counts.time, counts.songplays
    );

    Ok(RunSummary {
        songs,
        logs,
        counts,
    })
}
