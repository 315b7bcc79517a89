pub mod error;
pub mod metadata;
pub mod infohash;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::TorrentError;
pub use infohash::calculate_info_hash;
pub use metadata::{FileInfo, LoadOptions, Torrent, TorrentInfo, HASH_LENGTH};
