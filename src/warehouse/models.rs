//! Rows written to the warehouse tables.
//!
//! Field order matches column order in the schema; each row maps onto the
//! positional parameters of its insert template.

#[derive(Clone, Debug, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: Option<i64>,
    pub duration: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeRow {
    pub start_time: String,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SongplayRow {
    pub start_time: String,
    pub user_id: Option<i64>,
    pub level: Option<String>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

/// Key used to resolve a play event to a known song and artist.
#[derive(Clone, Debug, PartialEq)]
pub struct SongLookup {
    pub title: Option<String>,
    pub artist_name: Option<String>,
    pub duration: Option<f64>,
}

/// A (song_id, artist_id) pair found by [`SongLookup`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongMatch {
    pub song_id: String,
    pub artist_id: String,
}

/// Row counts per warehouse table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub songs: usize,
    pub artists: usize,
    pub users: usize,
    pub time: usize,
    pub songplays: usize,
}
