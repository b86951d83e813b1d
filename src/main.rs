use anyhow::{Context, Result};
use clap::Parser;
use sparkify_etl::config::{DEFAULT_DB_PATH, DEFAULT_LOG_DATA, DEFAULT_SONG_DATA};
use sparkify_etl::{run_pipeline, AppConfig, CliConfig, FileConfig};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Load Sparkify song metadata and user event logs into a SQLite star schema.
#[derive(Parser, Debug)]
#[clap(version, about)]
struct CliArgs {
    /// Path to the SQLite warehouse database file. Created if missing.
    #[clap(long, value_parser = parse_path, default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// Directory holding song-metadata JSON files, searched recursively.
    #[clap(long, value_parser = parse_path, default_value = DEFAULT_SONG_DATA)]
    pub song_data: PathBuf,

    /// Directory holding event-log JSON files, searched recursively.
    #[clap(long, value_parser = parse_path, default_value = DEFAULT_LOG_DATA)]
    pub log_data: PathBuf,

    /// Path to a TOML config file. Values in the file override the flags above.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Drop and recreate all warehouse tables before loading.
    #[clap(long)]
    pub reset_schema: bool,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            song_data: self.song_data.clone(),
            log_data: self.log_data.clone(),
            reset_schema: self.reset_schema,
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Loading songs from {:?}", config.song_data);
    info!("Loading logs from {:?}", config.log_data);
    info!("Warehouse database {:?}", config.db_path);

    let summary = run_pipeline(&config)?;
    info!(
        "Done: {} song files and {} log files loaded",
        summary.songs.files_processed, summary.logs.files_processed
    );
    Ok(())
}
