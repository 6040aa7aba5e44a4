//! Download history.
//!
//! An append-only log of every torrent already fetched, one comma-separated
//! line per download: `id,name,type,sizeGB,seeders,snatched`.

mod store;
mod types;

pub use store::HistoryStore;
pub use types::*;
