//! Reading and shaping the two kinds of input files.

mod log_file;
mod records;
mod song_file;
mod time;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use log_file::{
    process_log_file, transform_log_file, transform_log_records, LogFileRows, PlayEvent,
    NEXT_SONG_PAGE,
};
pub use records::{parse_json_lines, LogRecord, SongRecord};
pub use song_file::{process_song_file, transform_song_file, transform_song_records, SongFileRows};
pub use time::{format_start_time, start_time_from_millis, time_row, START_TIME_FORMAT};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Timestamp {0} ms is out of range")]
    TimestampOutOfRange(i64),
}

pub(crate) fn read_data_file(path: &Path) -> Result<String, ExtractError> {
    std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })
}
