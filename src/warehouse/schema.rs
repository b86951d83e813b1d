//! Star schema for the song-play warehouse.
//!
//! Four dimension tables (users, songs, artists, time) and one fact table
//! (songplays). The fact table is declared last because its foreign keys
//! reference every dimension.

use crate::sqlite_column;
use crate::sqlite_persistence::{ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema};

// =============================================================================
// Dimension Tables
// =============================================================================

const USERS_TABLE: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("user_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("first_name", &SqlType::Text, non_null = true),
        sqlite_column!("last_name", &SqlType::Text, non_null = true),
        sqlite_column!("gender", &SqlType::Text, non_null = true),
        sqlite_column!("level", &SqlType::Text, non_null = true), // 'free' or 'paid'
    ],
};

const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!(
            "song_id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist_id", &SqlType::Text, non_null = true),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("duration", &SqlType::Real),
    ],
};

const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!(
            "artist_id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("latitude", &SqlType::Real),
        sqlite_column!("longitude", &SqlType::Real),
    ],
};

const TIME_TABLE: Table = Table {
    name: "time",
    columns: &[
        // 'YYYY-MM-DD HH:MM:SS.mmm', UTC
        sqlite_column!(
            "start_time",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true
        ),
        sqlite_column!("hour", &SqlType::Integer, non_null = true),
        sqlite_column!("day", &SqlType::Integer, non_null = true),
        sqlite_column!("week", &SqlType::Integer, non_null = true), // ISO-8601 week
        sqlite_column!("month", &SqlType::Integer, non_null = true),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!("weekday", &SqlType::Integer, non_null = true), // Monday = 0
    ],
};

// =============================================================================
// Fact Table
// =============================================================================

const TIME_FK: ForeignKey = ForeignKey {
    foreign_table: "time",
    foreign_column: "start_time",
    on_delete: ForeignKeyOnChange::Cascade,
    on_update: ForeignKeyOnChange::Cascade,
};

const USERS_FK: ForeignKey = ForeignKey {
    foreign_table: "users",
    foreign_column: "user_id",
    on_delete: ForeignKeyOnChange::Cascade,
    on_update: ForeignKeyOnChange::Cascade,
};

const SONGS_FK: ForeignKey = ForeignKey {
    foreign_table: "songs",
    foreign_column: "song_id",
    on_delete: ForeignKeyOnChange::Cascade,
    on_update: ForeignKeyOnChange::Cascade,
};

const ARTISTS_FK: ForeignKey = ForeignKey {
    foreign_table: "artists",
    foreign_column: "artist_id",
    on_delete: ForeignKeyOnChange::Cascade,
    on_update: ForeignKeyOnChange::Cascade,
};

const SONGPLAYS_TABLE: Table = Table {
    name: "songplays",
    columns: &[
        sqlite_column!("songplay_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "start_time",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&TIME_FK)
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USERS_FK)
        ),
        sqlite_column!("level", &SqlType::Text, non_null = true),
        sqlite_column!("song_id", &SqlType::Text, foreign_key = Some(&SONGS_FK)),
        sqlite_column!("artist_id", &SqlType::Text, foreign_key = Some(&ARTISTS_FK)),
        sqlite_column!("session_id", &SqlType::Integer, non_null = true),
        sqlite_column!("location", &SqlType::Text, non_null = true),
        sqlite_column!("user_agent", &SqlType::Text, non_null = true),
    ],
};

// =============================================================================
// Versioned Schema Definition
// =============================================================================

pub const WAREHOUSE_SCHEMA: VersionedSchema = VersionedSchema {
    version: 0,
    tables: &[
        USERS_TABLE,
        SONGS_TABLE,
        ARTISTS_TABLE,
        TIME_TABLE,
        SONGPLAYS_TABLE,
    ],
};

// =============================================================================
// Statement Templates
// =============================================================================

/// Parameterized statements used by the loader.
///
/// Built once at startup and handed to the store, so tests or another SQL
/// dialect can swap in their own text. Insert templates take positional
/// parameters in column order.
#[derive(Debug, Clone)]
pub struct StatementTemplates {
    pub song_insert: &'static str,
    pub artist_insert: &'static str,
    pub time_insert: &'static str,
    pub user_upsert: &'static str,
    pub songplay_insert: &'static str,
    /// (title, artist name, duration) -> at most one (song_id, artist_id)
    pub song_select: &'static str,
}

impl StatementTemplates {
    pub fn sqlite() -> Self {
        Self {
            song_insert: "INSERT INTO songs (song_id, title, artist_id, year, duration)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(song_id) DO NOTHING",
            artist_insert: "INSERT INTO artists (artist_id, name, location, latitude, longitude)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(artist_id) DO NOTHING",
            time_insert: "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(start_time) DO NOTHING",
            user_upsert: "INSERT INTO users (user_id, first_name, last_name, gender, level)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(user_id) DO UPDATE SET
                    first_name = excluded.first_name,
                    last_name = excluded.last_name,
                    gender = excluded.gender,
                    level = excluded.level",
            songplay_insert: "INSERT INTO songplays
                    (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(songplay_id) DO NOTHING",
            song_select: "SELECT songs.song_id, songs.artist_id FROM songs
                JOIN artists USING (artist_id)
                WHERE songs.title = ?1 AND artists.name = ?2 AND songs.duration = ?3
                LIMIT 1",
        }
    }
}

impl Default for StatementTemplates {
    fn default() -> Self {
        Self::sqlite()
    }
}
