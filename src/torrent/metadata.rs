use std::path::Path;

use log::{debug, warn};

use crate::bencode::{decode_bencode, BValue};
use crate::torrent::calculate_info_hash;
use crate::torrent::error::TorrentError;

/// A single un-encoded SHA-1 is 20 bytes long.
pub const HASH_LENGTH: usize = 20;

/// Knobs for how a torrent is loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Hash the `info` dictionary with sorted keys instead of document order.
    pub canonical_info_hash: bool,
}

/// Represents a .torrent file, including the announce URL and the associated info.
#[derive(Debug, Clone)]
pub struct Torrent {
    pub announce: String,                         // The tracker URL
    pub announce_list: Option<Vec<Vec<String>>>,  // Tiers of alternative trackers
    pub creation_date: Option<i64>,               // Unix seconds
    pub comment: Option<String>,
    pub created_by: Option<String>,
    pub info: TorrentInfo,
    pub info_hash: [u8; 20],
}

/// Contains detailed metadata about the torrent's content.
#[derive(Debug, Clone)]
pub struct TorrentInfo {
    pub name: String,           // Name of the file or folder
    pub piece_length: u64,      // Size of each piece
    pub pieces: Vec<[u8; 20]>,  // SHA-1 hashes are 20 bytes each
    pub files: Vec<FileInfo>,
    pub total_length: u64,      // Total size of the file(s)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub length: u64,
    pub path: Vec<String>, // the first segment is the torrent name, the last the file name
}

impl Torrent {
    /// Reads a .torrent file from disk and parses its contents.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TorrentError> {
        Self::from_file_with(path, LoadOptions::default())
    }

    pub fn from_file_with<P: AsRef<Path>>(
        path: P,
        options: LoadOptions,
    ) -> Result<Self, TorrentError> {
        let path = path.as_ref();
        debug!("loading torrent file {}", path.display());
        let buf = std::fs::read(path)?;
        Self::from_bytes_with(&buf, options)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TorrentError> {
        Self::from_bytes_with(bytes, LoadOptions::default())
    }

    pub fn from_bytes_with(bytes: &[u8], options: LoadOptions) -> Result<Self, TorrentError> {
        let (consumed, bvalue) = decode_bencode(bytes)?;
        if consumed < bytes.len() {
            warn!(
                "ignoring {} trailing bytes after torrent document",
                bytes.len() - consumed
            );
        }
        Self::from_bvalue_with(&bvalue, options)
    }

    /// Creates a `Torrent` from a `BValue` (the result of a bencode parse).
    pub fn from_bvalue(value: &BValue) -> Result<Self, TorrentError> {
        Self::from_bvalue_with(value, LoadOptions::default())
    }

    pub fn from_bvalue_with(value: &BValue, options: LoadOptions) -> Result<Self, TorrentError> {
        if value.as_dict().is_none() {
            return Err(TorrentError::invalid("root", "not a dictionary"));
        }

        let announce = get_string(value, "announce")?;

        let announce_list = match value.get("announce-list") {
            None => None,
            Some(tiers) => {
                let tiers = tiers
                    .as_list()
                    .ok_or_else(|| TorrentError::invalid("announce-list", "not a list"))?;
                let groups = tiers
                    .iter()
                    .map(|tier| {
                        let tier = tier.as_list().ok_or_else(|| {
                            TorrentError::invalid("announce-list", "tier is not a list")
                        })?;
                        string_list(tier, "announce-list")
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Some(groups)
            }
        };

        let info_value = value.get("info").ok_or(TorrentError::MissingField("info"))?;
        let info = TorrentInfo::from_bvalue(info_value)?;
        let info_hash = calculate_info_hash(info_value, options.canonical_info_hash);

        Ok(Torrent {
            announce,
            announce_list,
            creation_date: value.get_integer("creation date"),
            comment: value.get_str("comment").map(str::to_string),
            created_by: value.get_str("created by").map(str::to_string),
            info,
            info_hash,
        })
    }

    pub fn info_hex_hash(&self) -> String {
        hex::encode(self.info_hash)
    }

    /// Every tracker URL, primary first, without duplicates.
    pub fn trackers(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = vec![self.announce.as_str()];
        for url in self.announce_list.iter().flatten().flatten() {
            if !urls.contains(&url.as_str()) {
                urls.push(url);
            }
        }
        urls
    }
}

impl TorrentInfo {
    pub fn from_bvalue(info: &BValue) -> Result<Self, TorrentError> {
        if info.as_dict().is_none() {
            return Err(TorrentError::invalid("info", "not a dictionary"));
        }

        let piece_length = non_negative(get_integer(info, "piece length")?, "piece length")?;
        if piece_length == 0 {
            return Err(TorrentError::invalid("piece length", "must be positive"));
        }

        let pieces_bytes = lookup_bytestring(info, "pieces")?;
        if pieces_bytes.len() % HASH_LENGTH != 0 {
            return Err(TorrentError::invalid(
                "pieces",
                format!("{} is not a multiple of {}", pieces_bytes.len(), HASH_LENGTH),
            ));
        }

        // Chunk the pieces bytes into 20-byte pieces.
        let pieces = pieces_bytes
            .chunks_exact(HASH_LENGTH)
            .map(|chunk| {
                let mut hash = [0u8; 20];
                hash.copy_from_slice(chunk);
                hash
            })
            .collect::<Vec<_>>();

        let name = get_string(info, "name")?;

        let files = match info.get_integer("length") {
            // single file mode
            Some(length) => vec![FileInfo {
                length: non_negative(length, "length")?,
                path: vec![name.clone()],
            }],
            // multi file mode
            None => {
                let entries = info
                    .get("files")
                    .ok_or(TorrentError::MissingField("files"))?
                    .as_list()
                    .ok_or_else(|| TorrentError::invalid("files", "not a list"))?;
                entries
                    .iter()
                    .map(|entry| file_from_bvalue(entry, &name))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        let total_length = files
            .iter()
            .try_fold(0u64, |total, f| total.checked_add(f.length))
            .ok_or_else(|| TorrentError::invalid("length", "total length overflows"))?;

        let expected_pieces = total_length / piece_length + u64::from(total_length % piece_length != 0);
        if expected_pieces != pieces.len() as u64 {
            return Err(TorrentError::PieceCountMismatch {
                total: total_length,
                piece_length,
                hashes: pieces.len(),
            });
        }

        Ok(TorrentInfo {
            name,
            piece_length,
            pieces,
            files,
            total_length,
        })
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn piece_hash(&self, index: usize) -> Option<&[u8; 20]> {
        self.pieces.get(index)
    }

    pub fn piece_hex_hash(&self, index: usize) -> Option<String> {
        self.piece_hash(index).map(hex::encode)
    }

    /// Size of piece `index`; the last piece holds whatever remains.
    pub fn piece_size(&self, index: usize) -> Option<u64> {
        let count = self.piece_count();
        if index >= count {
            return None;
        }
        if index == count - 1 {
            return Some(self.total_length - (count as u64 - 1) * self.piece_length);
        }
        Some(self.piece_length)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn file(&self, index: usize) -> Option<&FileInfo> {
        self.files.get(index)
    }

    pub fn is_single_file(&self) -> bool {
        self.files.len() == 1 && self.files[0].path.len() == 1
    }
}

fn file_from_bvalue(entry: &BValue, name: &str) -> Result<FileInfo, TorrentError> {
    if entry.as_dict().is_none() {
        return Err(TorrentError::invalid("files", "element is not a dictionary"));
    }
    let length = non_negative(get_integer(entry, "length")?, "length")?;
    let components = entry
        .get("path")
        .ok_or(TorrentError::MissingField("path"))?
        .as_list()
        .ok_or_else(|| TorrentError::invalid("path", "not a list"))?;
    if components.is_empty() {
        return Err(TorrentError::invalid("path", "empty"));
    }

    let mut path = vec![name.to_string()];
    path.extend(string_list(components, "path")?);
    Ok(FileInfo { length, path })
}

fn string_list(items: &[BValue], field: &'static str) -> Result<Vec<String>, TorrentError> {
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| TorrentError::invalid(field, "element is not a UTF-8 string"))
        })
        .collect()
}

fn non_negative(value: i64, field: &'static str) -> Result<u64, TorrentError> {
    u64::try_from(value).map_err(|_| TorrentError::invalid(field, format!("negative value {value}")))
}

/// Looks up a key in the dictionary and returns a byte slice if the value is a ByteString.
pub fn lookup_bytestring<'a>(dict: &'a BValue, key: &'static str) -> Result<&'a [u8], TorrentError> {
    let val = dict.get(key).ok_or(TorrentError::MissingField(key))?;
    val.as_byte_string()
        .ok_or_else(|| TorrentError::invalid(key, "must be a byte string"))
}

/// Gets a ByteString from the dictionary and converts it into a UTF-8 String.
pub fn get_string(dict: &BValue, key: &'static str) -> Result<String, TorrentError> {
    let bytes = lookup_bytestring(dict, key)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| TorrentError::invalid(key, "not valid UTF-8"))
}

/// Retrieves an integer value from the dictionary.
pub fn get_integer(dict: &BValue, key: &'static str) -> Result<i64, TorrentError> {
    let val = dict.get(key).ok_or(TorrentError::MissingField(key))?;
    val.as_integer()
        .ok_or_else(|| TorrentError::invalid(key, "must be a number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bencode::{encode_bvalue, parse};
    use crate::torrent::fixtures;
    use sha1::{Digest, Sha1};

    #[test]
    fn test_single_file_torrent() {
        let content = vec![7u8; 40_000];
        let bytes = fixtures::single_file_torrent("file.bin", &content, 16384);
        let torrent = Torrent::from_bytes(&bytes).unwrap();

        assert_eq!(torrent.announce, fixtures::ANNOUNCE);
        assert_eq!(torrent.info.name, "file.bin");
        assert_eq!(torrent.info.total_length, 40_000);
        assert_eq!(torrent.info.piece_count(), 3);
        assert_eq!(torrent.info.piece_size(0), Some(16384));
        assert_eq!(torrent.info.piece_size(2), Some(40_000 - 2 * 16384));
        assert_eq!(torrent.info.piece_size(3), None);
        assert_eq!(torrent.info.file_count(), 1);
        assert_eq!(torrent.info.file(0).unwrap().path, vec!["file.bin".to_string()]);
        assert!(torrent.info.is_single_file());
        assert_eq!(torrent.info.piece_hex_hash(0).unwrap().len(), 40);
        assert_eq!(torrent.creation_date, None);
        assert_eq!(torrent.announce_list, None);
    }

    #[test]
    fn test_info_hash_is_hash_of_info_bytes() {
        let bytes = fixtures::single_file_torrent("file.bin", b"hello", 16384);
        let torrent = Torrent::from_bytes(&bytes).unwrap();

        // the info dictionary as it sits in the file
        let root = parse(&bytes).unwrap();
        let raw_info = encode_bvalue(root.get("info").unwrap());
        let start = bytes
            .windows(raw_info.len())
            .position(|w| w == raw_info.as_slice())
            .unwrap();
        let mut hasher = Sha1::new();
        hasher.update(&bytes[start..start + raw_info.len()]);
        assert_eq!(torrent.info_hash.to_vec(), hasher.finalize().to_vec());
        assert_eq!(torrent.info_hex_hash(), hex::encode(torrent.info_hash));
    }

    #[test]
    fn test_multi_file_torrent() {
        let bytes = fixtures::multi_file_torrent(
            "album",
            &[
                (&["cd1", "a.txt"][..], &b"aaaa"[..]),
                (&["b.txt"][..], &b"bbbbbb"[..]),
            ],
            4,
        );
        let torrent = Torrent::from_bytes(&bytes).unwrap();
        assert_eq!(torrent.info.file_count(), 2);
        assert_eq!(torrent.info.total_length, 10);
        assert_eq!(torrent.info.piece_count(), 3);
        assert_eq!(torrent.info.piece_size(2), Some(2));
        assert_eq!(
            torrent.info.file(0).unwrap().path,
            vec!["album".to_string(), "cd1".to_string(), "a.txt".to_string()]
        );
        assert!(!torrent.info.is_single_file());
    }

    #[test]
    fn test_optional_fields() {
        let mut root = parse(&fixtures::single_file_torrent("x", b"x", 16384)).unwrap();
        root.set("comment", BValue::from("a comment")).unwrap();
        root.set("created by", BValue::from("tests")).unwrap();
        root.set("creation date", BValue::from(1_700_000_000i64)).unwrap();
        root.set(
            "announce-list",
            BValue::List(vec![
                BValue::List(vec![BValue::from("http://a/announce"), BValue::from(fixtures::ANNOUNCE)]),
                BValue::List(vec![BValue::from("udp://b:80")]),
            ]),
        )
        .unwrap();

        let torrent = Torrent::from_bvalue(&root).unwrap();
        assert_eq!(torrent.comment.as_deref(), Some("a comment"));
        assert_eq!(torrent.created_by.as_deref(), Some("tests"));
        assert_eq!(torrent.creation_date, Some(1_700_000_000));
        assert_eq!(torrent.announce_list.as_ref().unwrap().len(), 2);
        assert_eq!(
            torrent.trackers(),
            vec![fixtures::ANNOUNCE, "http://a/announce", "udp://b:80"]
        );
    }

    #[test]
    fn test_missing_info() {
        let err = Torrent::from_bytes(b"d8:announce3:urle").unwrap_err();
        assert!(matches!(err, TorrentError::MissingField("info")));
    }

    #[test]
    fn test_root_not_a_dict() {
        let err = Torrent::from_bytes(b"li1ee").unwrap_err();
        assert!(matches!(err, TorrentError::InvalidField { field: "root", .. }));
    }

    #[test]
    fn test_bencode_error_propagates() {
        let err = Torrent::from_bytes(b"d8:announce").unwrap_err();
        assert!(matches!(err, TorrentError::Bencode(_)));
    }

    #[test]
    fn test_pieces_not_multiple_of_hash_length() {
        let mut root = parse(&fixtures::single_file_torrent("x", b"x", 16384)).unwrap();
        root.get_mut("info")
            .unwrap()
            .set("pieces", BValue::ByteString(vec![0; 19]))
            .unwrap();
        let err = Torrent::from_bvalue(&root).unwrap_err();
        assert!(matches!(err, TorrentError::InvalidField { field: "pieces", .. }));
    }

    #[test]
    fn test_piece_count_mismatch() {
        let mut root = parse(&fixtures::single_file_torrent("x", b"x", 16384)).unwrap();
        root.get_mut("info")
            .unwrap()
            .set("length", BValue::from(16385i64))
            .unwrap();
        let err = Torrent::from_bvalue(&root).unwrap_err();
        assert!(matches!(err, TorrentError::PieceCountMismatch { hashes: 1, .. }));
    }

    #[test]
    fn test_total_length_overflow() {
        let file = b"d6:lengthi9223372036854775807e4:pathl1:aee";
        let mut doc = b"d8:announce3:url4:infod5:filesl".to_vec();
        for _ in 0..3 {
            doc.extend_from_slice(file);
        }
        doc.extend_from_slice(b"e4:name1:x12:piece lengthi1e6:pieces0:ee");

        let err = Torrent::from_bytes(&doc).unwrap_err();
        assert!(matches!(err, TorrentError::InvalidField { field: "length", .. }));
    }

    #[test]
    fn test_canonical_info_hash_option() {
        let unsorted = b"d8:announce3:url4:infod4:name1:x12:piece lengthi1e6:pieces20:\
aaaaaaaaaaaaaaaaaaaa6:lengthi1eee";
        let plain = Torrent::from_bytes(unsorted).unwrap();
        let canonical = Torrent::from_bytes_with(
            unsorted,
            LoadOptions {
                canonical_info_hash: true,
            },
        )
        .unwrap();
        assert_ne!(plain.info_hash, canonical.info_hash);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.torrent");
        std::fs::write(&path, fixtures::single_file_torrent("f", b"abc", 16384)).unwrap();
        assert_eq!(Torrent::from_file(&path).unwrap().info.total_length, 3);

        let missing = Torrent::from_file(dir.path().join("nope.torrent")).unwrap_err();
        assert!(matches!(missing, TorrentError::Io(_)));
    }
}
