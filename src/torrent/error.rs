use thiserror::Error;

use crate::bencode::BencodeError;

#[derive(Debug, Error)]
pub enum TorrentError {
    #[error("I/O error while reading torrent file: {0}")]
    Io(#[from] std::io::Error),

    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    #[error("torrent missing '{0}'")]
    MissingField(&'static str),

    #[error("torrent field '{field}' is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("torrent piece count does not match: total {total} piece length {piece_length} hashes {hashes}")]
    PieceCountMismatch {
        total: u64,
        piece_length: u64,
        hashes: usize,
    },
}

impl TorrentError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        TorrentError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
