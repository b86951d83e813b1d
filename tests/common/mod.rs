//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{song_line, TestWarehouse, SONG_1_ID};
//!
//! #[test]
//! fn test_load_songs() {
//!     let warehouse = TestWarehouse::new();
//!     let line = song_line(SONG_1_ID, "Title", "AR1", "Band", 1.0);
//!     warehouse.write_song_file("A/A/A/song.json", &[line]);
//!     sparkify_etl::run_pipeline(&warehouse.config()).unwrap();
//! }
//! ```

mod constants;
mod fixtures;

pub use constants::*;
pub use fixtures::{event_line, song_line, TestWarehouse};
