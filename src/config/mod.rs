mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_PATH: &str = "sparkify.db";
pub const DEFAULT_SONG_DATA: &str = "data/song_data";
pub const DEFAULT_LOG_DATA: &str = "data/log_data";

/// CLI arguments that take part in config resolution.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub reset_schema: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            song_data: PathBuf::from(DEFAULT_SONG_DATA),
            log_data: PathBuf::from(DEFAULT_LOG_DATA),
            reset_schema: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub reset_schema: bool,
}

fn require_dir(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} directory does not exist: {:?}", what, path);
    }
    if !path.is_dir() {
        bail!("{} is not a directory: {:?}", what, path);
    }
    Ok(())
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());
        let song_data = file
            .song_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.song_data.clone());
        let log_data = file
            .log_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.log_data.clone());
        let reset_schema = file.reset_schema.unwrap_or(cli.reset_schema);

        require_dir(&song_data, "Song data")?;
        require_dir(&log_data, "Log data")?;

        // SQLite creates the file but not its directory.
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            require_dir(parent, "Database")?;
        }
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }

        Ok(Self {
            db_path,
            song_data,
            log_data,
            reset_schema,
        })
    }
}
