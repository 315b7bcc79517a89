use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use sha1::{Digest, Sha1};
use thiserror::Error;

use crate::progress::ProgressTracker;
use crate::torrent::TorrentInfo;

const READ_CHUNK: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is {actual} bytes, expected {expected}")]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("content runs past the last piece (piece {0})")]
    PieceOutOfRange(usize),
}

/// Outcome per piece, in piece order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub pieces: Vec<bool>,
}

impl VerifyReport {
    pub fn passed(&self) -> usize {
        self.pieces.iter().filter(|ok| **ok).count()
    }

    pub fn failed_pieces(&self) -> Vec<usize> {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, ok)| !**ok)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.pieces.iter().all(|ok| *ok)
    }
}

/// On-disk location of every file of the torrent.
///
/// A single-file torrent is `root` itself. A multi-file torrent lives under `root`,
/// which stands in for the torrent name.
pub fn content_paths(info: &TorrentInfo, root: &Path) -> Vec<PathBuf> {
    if info.is_single_file() {
        return vec![root.to_path_buf()];
    }
    info.files
        .iter()
        .map(|file| {
            let mut path = root.to_path_buf();
            path.extend(file.path.iter().skip(1));
            path
        })
        .collect()
}

/// Reads the files as one stream and checks each piece against its SHA-1.
pub fn verify_content(
    info: &TorrentInfo,
    root: &Path,
    progress: &ProgressTracker,
) -> Result<VerifyReport, VerifyError> {
    let mut pieces = Vec::with_capacity(info.piece_count());
    let mut hasher = Sha1::new();
    let mut filled = 0u64;
    let mut buf = vec![0u8; READ_CHUNK];

    for (file, path) in info.files.iter().zip(content_paths(info, root)) {
        let io_err = |source| VerifyError::Io {
            path: path.clone(),
            source,
        };
        let mut handle = File::open(&path).map_err(io_err)?;
        let actual = handle.metadata().map_err(io_err)?.len();
        if actual != file.length {
            return Err(VerifyError::SizeMismatch {
                path: path.clone(),
                expected: file.length,
                actual,
            });
        }
        debug!("hashing {} ({} bytes)", path.display(), file.length);

        let mut remaining = file.length;
        while remaining > 0 {
            let index = pieces.len();
            let piece_size = info
                .piece_size(index)
                .ok_or(VerifyError::PieceOutOfRange(index))?;
            let want = remaining.min(piece_size - filled).min(READ_CHUNK as u64) as usize;
            handle.read_exact(&mut buf[..want]).map_err(io_err)?;
            hasher.update(&buf[..want]);
            filled += want as u64;
            remaining -= want as u64;

            if filled == piece_size {
                let digest = hasher.finalize_reset();
                let ok = info.piece_hash(index).map_or(false, |expected| digest[..] == expected[..]);
                if !ok {
                    warn!("piece {index} does not match its hash");
                }
                progress.record(ok);
                pieces.push(ok);
                filled = 0;
            }
        }
    }

    // Hashes past the end of the content can never match.
    while pieces.len() < info.piece_count() {
        progress.record(false);
        pieces.push(false);
    }

    Ok(VerifyReport { pieces })
}
