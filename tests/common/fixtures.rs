//! Temporary warehouse layouts with data directories and a database path.

#![allow(dead_code)]

use rusqlite::Connection;
use sparkify_etl::{AppConfig, CliConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// One song-metadata line in the shape of the Million Song Dataset subset.
pub fn song_line(
    song_id: &str,
    title: &str,
    artist_id: &str,
    artist_name: &str,
    duration: f64,
) -> String {
    serde_json::json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": duration,
        "year": 0,
    })
    .to_string()
}

/// One event-log line. `user_id` is rendered as a string, as the event
/// simulator does.
pub fn event_line(
    page: &str,
    ts: i64,
    user_id: i64,
    level: &str,
    song: &str,
    artist: &str,
    length: f64,
) -> String {
    serde_json::json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": format!("First{}", user_id),
        "gender": "F",
        "itemInSession": 0,
        "lastName": format!("Last{}", user_id),
        "length": length,
        "level": level,
        "location": "San Jose-Sunnyvale-Santa Clara, CA",
        "method": "PUT",
        "page": page,
        "registration": 1540276059796.0,
        "sessionId": 583,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (X11; Linux x86_64)",
        "userId": user_id.to_string(),
    })
    .to_string()
}

/// A scratch directory holding `song_data/`, `log_data/` and the database
/// path. Removed on drop.
pub struct TestWarehouse {
    _temp_dir: TempDir,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub db_path: PathBuf,
}

impl TestWarehouse {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let song_data = temp_dir.path().join("song_data");
        let log_data = temp_dir.path().join("log_data");
        fs::create_dir_all(&song_data).expect("Failed to create song_data");
        fs::create_dir_all(&log_data).expect("Failed to create log_data");
        let db_path = temp_dir.path().join("sparkify.db");
        Self {
            _temp_dir: temp_dir,
            song_data,
            log_data,
            db_path,
        }
    }

    fn write_lines(root: &Path, relative: &str, lines: &[String]) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create data dir");
        }
        fs::write(&path, lines.join("\n")).expect("Failed to write data file");
        path
    }

    pub fn write_song_file(&self, relative: &str, lines: &[String]) -> PathBuf {
        Self::write_lines(&self.song_data, relative, lines)
    }

    pub fn write_log_file(&self, relative: &str, lines: &[String]) -> PathBuf {
        Self::write_lines(&self.log_data, relative, lines)
    }

    pub fn config(&self) -> AppConfig {
        self.config_with_reset(false)
    }

    pub fn config_with_reset(&self, reset_schema: bool) -> AppConfig {
        let cli = CliConfig {
            db_path: self.db_path.clone(),
            song_data: self.song_data.clone(),
            log_data: self.log_data.clone(),
            reset_schema,
        };
        AppConfig::resolve(&cli, None).expect("Failed to resolve test config")
    }

    pub fn connection(&self) -> Connection {
        Connection::open(&self.db_path).expect("Failed to open warehouse db")
    }

    pub fn count(&self, table: &str) -> i64 {
        self.connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .expect("Failed to count rows")
    }
}
