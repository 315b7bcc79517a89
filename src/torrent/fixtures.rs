//! Small in-memory torrents for tests.

use sha1::{Digest, Sha1};

use crate::bencode::{encode_bvalue, BValue};

pub(crate) const ANNOUNCE: &str = "http://tracker.example.com/announce";

fn piece_hashes(content: &[u8], piece_length: usize) -> Vec<u8> {
    let mut pieces = Vec::new();
    for chunk in content.chunks(piece_length) {
        let mut hasher = Sha1::new();
        hasher.update(chunk);
        pieces.extend_from_slice(&hasher.finalize());
    }
    pieces
}

fn wrap(info: BValue) -> Vec<u8> {
    let mut root = BValue::dict();
    root.set("announce", BValue::from(ANNOUNCE)).unwrap();
    root.set("info", info).unwrap();
    encode_bvalue(&root)
}

pub(crate) fn single_file_torrent(name: &str, content: &[u8], piece_length: usize) -> Vec<u8> {
    let mut info = BValue::dict();
    info.set("length", BValue::from(content.len() as i64)).unwrap();
    info.set("name", BValue::from(name)).unwrap();
    info.set("piece length", BValue::from(piece_length as i64)).unwrap();
    info.set("pieces", BValue::from(piece_hashes(content, piece_length))).unwrap();
    wrap(info)
}

/// `files` holds (path below the torrent name, content) pairs.
pub(crate) fn multi_file_torrent(
    name: &str,
    files: &[(&[&str], &[u8])],
    piece_length: usize,
) -> Vec<u8> {
    let mut all_content = Vec::new();
    let mut entries = Vec::new();
    for (path, content) in files {
        all_content.extend_from_slice(content);
        let mut entry = BValue::dict();
        entry.set("length", BValue::from(content.len() as i64)).unwrap();
        entry
            .set(
                "path",
                BValue::List(path.iter().map(|c| BValue::from(*c)).collect()),
            )
            .unwrap();
        entries.push(entry);
    }

    let mut info = BValue::dict();
    info.set("files", BValue::List(entries)).unwrap();
    info.set("name", BValue::from(name)).unwrap();
    info.set("piece length", BValue::from(piece_length as i64)).unwrap();
    info.set("pieces", BValue::from(piece_hashes(&all_content, piece_length))).unwrap();
    wrap(info)
}
