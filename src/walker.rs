//! Recursive discovery and per-file loading of `.json` input files.

use crate::warehouse::WarehouseStore;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Path not found: {0:?}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("Error walking {root:?}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkSummary {
    pub root: PathBuf,
    pub files_found: usize,
    pub files_processed: usize,
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Lists every `.json` file under `root`, recursively, in lexicographic path
/// order.
pub fn find_data_files(root: &Path) -> Result<Vec<PathBuf>, WalkError> {
    if !root.exists() {
        return Err(WalkError::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(WalkError::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| WalkError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && is_json_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn progress_bar(total: usize) -> Result<ProgressBar> {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    Ok(bar)
}

/// Applies `extractor` to every data file under `root`, committing after each
/// file.
///
/// On the first failure the failing file's writes are rolled back, the
/// remaining files are skipped and the error is returned. Files already
/// committed stay committed.
pub fn process_data<F>(
    store: &dyn WarehouseStore,
    root: &Path,
    mut extractor: F,
) -> Result<WalkSummary>
where
    F: FnMut(&dyn WarehouseStore, &Path) -> Result<()>,
{
    let files = find_data_files(root)?;
    let total = files.len();
    info!("{} files found in {:?}", total, root);

    let bar = progress_bar(total)?;
    for (index, path) in files.iter().enumerate() {
        bar.set_message(
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        store.begin()?;
        if let Err(err) = extractor(store, path.as_path()) {
            bar.abandon();
            error!("Failed to process {:?}: {:#}", path, err);
            store
                .rollback()
                .with_context(|| format!("Failed to roll back after {:?}", path))?;
            return Err(err.context(format!(
                "Failed on file {}/{}: {:?}",
                index + 1,
                total,
                path
            )));
        }
        store
            .commit()
            .with_context(|| format!("Failed to commit {:?}", path))?;

        bar.inc(1);
        info!("{}/{} files processed.", index + 1, total);
    }
    bar.finish_and_clear();

    Ok(WalkSummary {
        root: root.to_path_buf(),
        files_found: total,
        files_processed: total,
    })
}
