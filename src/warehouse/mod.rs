mod models;
#[cfg(test)]
pub(crate) mod recording_store;
mod schema;
mod store;

pub use models::{
    ArtistRow, SongLookup, SongMatch, SongRow, SongplayRow, TableCounts, TimeRow, UserRow,
};
pub use schema::{StatementTemplates, WAREHOUSE_SCHEMA};
pub use store::{SqliteWarehouse, WarehouseStore};
