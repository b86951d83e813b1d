//! Song-metadata files: one song per line, each carrying its artist inline.

use super::records::{parse_json_lines, SongRecord};
use super::{read_data_file, ExtractError};
use crate::warehouse::{ArtistRow, SongRow, WarehouseStore};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Rows produced from a single song-metadata file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SongFileRows {
    pub songs: Vec<SongRow>,
    pub artists: Vec<ArtistRow>,
}

/// Projects song records onto song and artist rows.
///
/// Records without a title produce no song; records without an artist name
/// produce no artist. Songs are deduplicated by title and artists by name,
/// keeping the first occurrence.
pub fn transform_song_records(records: &[SongRecord]) -> SongFileRows {
    let mut seen_titles = HashSet::new();
    let songs = records
        .iter()
        .filter_map(|r| r.title.as_deref().map(|title| (r, title)))
        .filter(|(_, title)| seen_titles.insert(*title))
        .map(|(r, title)| SongRow {
            song_id: r.song_id.clone(),
            title: title.to_string(),
            artist_id: r.artist_id.clone(),
            year: r.year,
            duration: r.duration,
        })
        .collect();

    let mut seen_names = HashSet::new();
    let artists = records
        .iter()
        .filter_map(|r| r.artist_name.as_deref().map(|name| (r, name)))
        .filter(|(_, name)| seen_names.insert(*name))
        .map(|(r, name)| ArtistRow {
            artist_id: r.artist_id.clone(),
            name: name.to_string(),
            location: r.artist_location.clone(),
            latitude: r.artist_latitude,
            longitude: r.artist_longitude,
        })
        .collect();

    SongFileRows { songs, artists }
}

pub fn transform_song_file(text: &str) -> Result<SongFileRows, ExtractError> {
    let records: Vec<SongRecord> = parse_json_lines(text)?;
    Ok(transform_song_records(&records))
}

/// Loads one song-metadata file. Does not commit.
pub fn process_song_file(store: &dyn WarehouseStore, path: &Path) -> Result<()> {
    let text = read_data_file(path)?;
    let rows =
        transform_song_file(&text).with_context(|| format!("Failed to parse {:?}", path))?;

    for song in &rows.songs {
        store.insert_song(song)?;
    }
    for artist in &rows.artists {
        store.insert_artist(artist)?;
    }

    debug!(
        "{:?}: {} songs, {} artists",
        path,
        rows.songs.len(),
        rows.artists.len()
    );
    Ok(())
}
