//! SQLite-backed warehouse store.
//!
//! `SqliteWarehouse` owns the single connection used for a load run. The
//! connection is closed when the store is dropped; an open transaction is
//! rolled back by SQLite at that point.

use super::models::*;
use super::schema::{StatementTemplates, WAREHOUSE_SCHEMA};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use tracing::{debug, info};

/// Write, lookup and transaction surface used by the extractors and the
/// file walker.
pub trait WarehouseStore {
    /// Start the unit of work for one input file.
    fn begin(&self) -> Result<()>;

    /// Commit the current unit of work.
    fn commit(&self) -> Result<()>;

    /// Discard the current unit of work.
    fn rollback(&self) -> Result<()>;

    /// Insert a song; an existing song_id is left untouched.
    fn insert_song(&self, song: &SongRow) -> Result<()>;

    /// Insert an artist; an existing artist_id is left untouched.
    fn insert_artist(&self, artist: &ArtistRow) -> Result<()>;

    /// Insert a time row; an existing start_time is left untouched.
    fn insert_time(&self, time: &TimeRow) -> Result<()>;

    /// Insert a user, or overwrite name, gender and level of an existing one.
    fn upsert_user(&self, user: &UserRow) -> Result<()>;

    /// Find the song/artist pair matching title, artist name and duration exactly.
    fn find_song(&self, lookup: &SongLookup) -> Result<Option<SongMatch>>;

    /// Insert a song play; songplay_id is generated by the database.
    fn insert_songplay(&self, songplay: &SongplayRow) -> Result<()>;
}

pub struct SqliteWarehouse {
    conn: Connection,
    statements: StatementTemplates,
}

impl SqliteWarehouse {
    /// Open (or create) the warehouse database at `db_path`.
    ///
    /// A database without tables gets the schema created; an existing one is
    /// validated against it.
    pub fn open<P: AsRef<Path>>(db_path: P, statements: StatementTemplates) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open warehouse database {:?}", db_path))?;
        Self::from_connection(conn, statements)
    }

    pub fn from_connection(conn: Connection, statements: StatementTemplates) -> Result<Self> {
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        prepare_schema(&conn)?;
        Ok(Self { conn, statements })
    }

    /// Drop every warehouse table and create them again, empty.
    pub fn reset_schema(&self) -> Result<()> {
        info!("Dropping and recreating warehouse tables");
        WAREHOUSE_SCHEMA.reset(&self.conn)
    }

    pub fn table_counts(&self) -> Result<TableCounts> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
            Ok(n as usize)
        };
        Ok(TableCounts {
            songs: count("songs")?,
            artists: count("artists")?,
            users: count("users")?,
            time: count("time")?,
            songplays: count("songplays")?,
        })
    }
}

fn prepare_schema(conn: &Connection) -> Result<()> {
    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating warehouse schema at version {}", WAREHOUSE_SCHEMA.version);
        return WAREHOUSE_SCHEMA.create(conn);
    }

    WAREHOUSE_SCHEMA
        .validate(conn)
        .context("Existing database does not match the warehouse schema")
}

impl WarehouseStore for SqliteWarehouse {
    fn begin(&self) -> Result<()> {
        self.conn.execute("BEGIN", [])?;
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute("ROLLBACK", [])?;
        }
        Ok(())
    }

    fn insert_song(&self, song: &SongRow) -> Result<()> {
        self.conn
            .prepare_cached(self.statements.song_insert)?
            .execute(params![
                &song.song_id,
                &song.title,
                &song.artist_id,
                song.year,
                song.duration
            ])
            .with_context(|| format!("Failed to insert song {}", song.song_id))?;
        Ok(())
    }

    fn insert_artist(&self, artist: &ArtistRow) -> Result<()> {
        self.conn
            .prepare_cached(self.statements.artist_insert)?
            .execute(params![
                &artist.artist_id,
                &artist.name,
                &artist.location,
                artist.latitude,
                artist.longitude
            ])
            .with_context(|| format!("Failed to insert artist {}", artist.artist_id))?;
        Ok(())
    }

    fn insert_time(&self, time: &TimeRow) -> Result<()> {
        self.conn
            .prepare_cached(self.statements.time_insert)?
            .execute(params![
                &time.start_time,
                time.hour,
                time.day,
                time.week,
                time.month,
                time.year,
                time.weekday
            ])
            .with_context(|| format!("Failed to insert time {}", time.start_time))?;
        Ok(())
    }

    fn upsert_user(&self, user: &UserRow) -> Result<()> {
        self.conn
            .prepare_cached(self.statements.user_upsert)?
            .execute(params![
                user.user_id,
                &user.first_name,
                &user.last_name,
                &user.gender,
                &user.level
            ])
            .with_context(|| format!("Failed to upsert user {}", user.user_id))?;
        Ok(())
    }

    fn find_song(&self, lookup: &SongLookup) -> Result<Option<SongMatch>> {
        let mut stmt = self.conn.prepare_cached(self.statements.song_select)?;
        match stmt.query_row(
            params![&lookup.title, &lookup.artist_name, lookup.duration],
            |r| {
                Ok(SongMatch {
                    song_id: r.get(0)?,
                    artist_id: r.get(1)?,
                })
            },
        ) {
            Ok(found) => Ok(Some(found)),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                debug!("No song matches {:?}", lookup);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn insert_songplay(&self, songplay: &SongplayRow) -> Result<()> {
        self.conn
            .prepare_cached(self.statements.songplay_insert)?
            .execute(params![
                &songplay.start_time,
                songplay.user_id,
                &songplay.level,
                &songplay.song_id,
                &songplay.artist_id,
                songplay.session_id,
                &songplay.location,
                &songplay.user_agent
            ])
            .with_context(|| format!("Failed to insert songplay at {}", songplay.start_time))?;
        Ok(())
    }
}
