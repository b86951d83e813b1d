//! In-memory `WarehouseStore` that records every call, for tests that check
//! what the loaders write without a database.

use super::models::*;
use super::store::WarehouseStore;
use anyhow::Result;
use std::cell::{Cell, RefCell};

#[derive(Clone, Debug, PartialEq)]
pub enum Write {
    Song(SongRow),
    Artist(ArtistRow),
    Time(TimeRow),
    User(UserRow),
    Lookup(SongLookup),
    Songplay(SongplayRow),
}

#[derive(Default)]
pub struct RecordingStore {
    writes: RefCell<Vec<Write>>,
    known_songs: Vec<(SongLookup, SongMatch)>,
    begins: Cell<usize>,
    commits: Cell<usize>,
    rollbacks: Cell<usize>,
}

impl RecordingStore {
    pub fn with_known_song(mut self, lookup: SongLookup, found: SongMatch) -> Self {
        self.known_songs.push((lookup, found));
        self
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.borrow().clone()
    }

    pub fn begins(&self) -> usize {
        self.begins.get()
    }

    pub fn commits(&self) -> usize {
        self.commits.get()
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.get()
    }

    fn record(&self, write: Write) {
        self.writes.borrow_mut().push(write);
    }
}

impl WarehouseStore for RecordingStore {
    fn begin(&self) -> Result<()> {
        self.begins.set(self.begins.get() + 1);
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        self.commits.set(self.commits.get() + 1);
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        self.rollbacks.set(self.rollbacks.get() + 1);
        Ok(())
    }

    fn insert_song(&self, song: &SongRow) -> Result<()> {
        self.record(Write::Song(song.clone()));
        Ok(())
    }

    fn insert_artist(&self, artist: &ArtistRow) -> Result<()> {
        self.record(Write::Artist(artist.clone()));
        Ok(())
    }

    fn insert_time(&self, time: &TimeRow) -> Result<()> {
        self.record(Write::Time(time.clone()));
        Ok(())
    }

    fn upsert_user(&self, user: &UserRow) -> Result<()> {
        self.record(Write::User(user.clone()));
        Ok(())
    }

    fn find_song(&self, lookup: &SongLookup) -> Result<Option<SongMatch>> {
        self.record(Write::Lookup(lookup.clone()));
        Ok(self
            .known_songs
            .iter()
            .find(|(known, _)| known == lookup)
            .map(|(_, found)| found.clone()))
    }

    fn insert_songplay(&self, songplay: &SongplayRow) -> Result<()> {
        self.record(Write::Songplay(songplay.clone()));
        Ok(())
    }
}
