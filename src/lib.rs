// lib.rs - Library interface for the bencode codec and its torrent tooling

pub mod bencode;
pub mod config;
pub mod engine;
pub mod progress;
pub mod torrent;
pub mod tracker;
pub mod utils;
pub mod verify;

// Re-export commonly used types for easier testing
pub use bencode::{
    bvalue_to_json, decode_all, decode_bencode, encode_bvalue, encode_canonical, parse, parse_at,
    to_json_string, BValue, BValueKind, BencodeError, Dictionary, ErrorKind,
};
pub use torrent::{FileInfo, LoadOptions, Torrent, TorrentError, TorrentInfo};
pub use tracker::{parse_tracker_response, AnnounceRequest, PeerInfo, TrackerError, TrackerReply};
pub use utils::{url_encode_bytes, OrderedMap, OrderedMapError};
pub use verify::{verify_content, VerifyError, VerifyReport};
