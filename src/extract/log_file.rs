//! Event-log files: one user event per line.
//!
//! Only playback events (`page == "NextSong"`) are loaded. Each one yields a
//! time row and a song play; users are collected once per file.

use super::records::{parse_json_lines, LogRecord};
use super::time::{format_start_time, start_time_from_millis, time_row};
use super::{read_data_file, ExtractError};
use crate::warehouse::{SongLookup, SongMatch, SongplayRow, TimeRow, UserRow, WarehouseStore};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

pub const NEXT_SONG_PAGE: &str = "NextSong";

/// A playback event waiting for its song/artist reference to be resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayEvent {
    pub start_time: String,
    pub user_id: Option<i64>,
    pub level: Option<String>,
    pub lookup: SongLookup,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl PlayEvent {
    pub fn into_songplay(self, found: Option<SongMatch>) -> SongplayRow {
        let (song_id, artist_id) = match found {
            Some(m) => (Some(m.song_id), Some(m.artist_id)),
            None => (None, None),
        };
        SongplayRow {
            start_time: self.start_time,
            user_id: self.user_id,
            level: self.level,
            song_id,
            artist_id,
            session_id: self.session_id,
            location: self.location,
            user_agent: self.user_agent,
        }
    }
}

/// Rows produced from a single event-log file, in write order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogFileRows {
    /// One per playback event, duplicates included.
    pub times: Vec<TimeRow>,
    /// Deduplicated by user id, first occurrence wins.
    pub users: Vec<UserRow>,
    /// One per playback event.
    pub plays: Vec<PlayEvent>,
}

pub fn transform_log_records(records: Vec<LogRecord>) -> Result<LogFileRows, ExtractError> {
    let mut rows = LogFileRows::default();
    let mut seen_users = HashSet::new();

    for record in records
        .into_iter()
        .filter(|r| r.page.as_deref() == Some(NEXT_SONG_PAGE))
    {
        let start_time = start_time_from_millis(record.ts)?;
        rows.times.push(time_row(&start_time));

        if let Some(user_id) = record.user_id {
            if seen_users.insert(user_id) {
                rows.users.push(UserRow {
                    user_id,
                    first_name: record.first_name,
                    last_name: record.last_name,
                    gender: record.gender,
                    level: record.level.clone(),
                });
            }
        }

        rows.plays.push(PlayEvent {
            start_time: format_start_time(&start_time),
            user_id: record.user_id,
            level: record.level,
            lookup: SongLookup {
                title: record.song,
                artist_name: record.artist,
                duration: record.length,
            },
            session_id: record.session_id,
            location: record.location,
            user_agent: record.user_agent,
        });
    }

    Ok(rows)
}

pub fn transform_log_file(text: &str) -> Result<LogFileRows, ExtractError> {
    let records: Vec<LogRecord> = parse_json_lines(text)?;
    transform_log_records(records)
}

/// Loads one event-log file: time rows, then users, then song plays. Does not
/// commit.
pub fn process_log_file(store: &dyn WarehouseStore, path: &Path) -> Result<()> {
    let text = read_data_file(path)?;
    let rows = transform_log_file(&text).with_context(|| format!("Failed to parse {:?}", path))?;

    for time in &rows.times {
        store.insert_time(time)?;
    }
    for user in &rows.users {
        store.upsert_user(user)?;
    }

    let mut matched = 0;
    let plays = rows.plays.len();
    for play in rows.plays {
        let found = store.find_song(&play.lookup)?;
        if found.is_some() {
            matched += 1;
        }
        store.insert_songplay(&play.into_songplay(found))?;
    }

    debug!(
        "{:?}: {} plays ({} matched a known song), {} users",
        path,
        plays,
        matched,
        rows.users.len()
    );
    Ok(())
}
