// src/engine.rs
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::{debug, info};
use reqwest::Client;

use crate::bencode::{decode_bencode, to_json_string};
use crate::config::Config;
use crate::progress::ProgressTracker;
use crate::torrent::{LoadOptions, Torrent};
use crate::tracker::{self, AnnounceRequest, TrackerEvent};
use crate::utils;
use crate::verify::{self, VerifyReport};

const NO_DATA: &str = "(-- no data --)";
const MB: f64 = 1024.0 * 1024.0;
const KB: f64 = 1024.0;

pub fn load_options(config: &Config) -> LoadOptions {
    LoadOptions {
        canonical_info_hash: config.canonical_info_hash,
    }
}

/// `decode <bencoded_string>`: prints the value as JSON.
pub fn decode(input: &str, out: &mut impl Write) -> Result<()> {
    let (_consumed, value) = decode_bencode(input.as_bytes()).context("invalid bencoded value")?;
    writeln!(out, "{}", to_json_string(&value))?;
    Ok(())
}

/// `dump-json <file>`: prints a whole bencoded file as JSON.
pub fn dump_json(path: &Path, out: &mut impl Write) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("failed to open {}", path.display()))?;
    let (consumed, value) =
        decode_bencode(&data).with_context(|| format!("unable to parse {}", path.display()))?;
    if consumed < data.len() {
        debug!("{} trailing bytes not shown", data.len() - consumed);
    }
    writeln!(out, "{}", to_json_string(&value))?;
    Ok(())
}

/// `info <file>`: human-readable summary of a torrent.
pub fn info(path: &Path, options: LoadOptions, show_piece_hash: bool, out: &mut impl Write) -> Result<()> {
    let torrent = Torrent::from_file_with(path, options)
        .with_context(|| format!("unable to load torrent file {}", path.display()))?;
    let info = &torrent.info;

    writeln!(out, "Torrent name: {}", info.name)?;
    writeln!(out, "Announce URLs:")?;
    for url in torrent.trackers() {
        writeln!(out, "  - {url}")?;
    }
    match torrent.creation_date {
        Some(seconds) => writeln!(out, "Created: {seconds} (unix time)")?,
        None => writeln!(out, "Created: {NO_DATA}")?,
    }
    writeln!(out, "Created by: {}", torrent.created_by.as_deref().unwrap_or(NO_DATA))?;
    writeln!(out, "Comment: {}", torrent.comment.as_deref().unwrap_or(NO_DATA))?;
    writeln!(out, "Info Hash: {}", torrent.info_hex_hash())?;
    writeln!(
        out,
        "There are {}({:.2}MB) files, {} pieces. Piece size {:.2}KB",
        info.file_count(),
        info.total_length as f64 / MB,
        info.piece_count(),
        info.piece_length as f64 / KB
    )?;
    for (i, file) in info.files.iter().enumerate() {
        writeln!(
            out,
            "File #{:03} {:8.2}MB {}",
            i + 1,
            file.length as f64 / MB,
            file.path.join("/")
        )?;
    }

    if show_piece_hash {
        for i in 0..info.piece_count() {
            let size = info.piece_size(i).unwrap_or(0);
            let hash = info.piece_hex_hash(i).unwrap_or_default();
            writeln!(out, "Piece #{:04} {:8.2}KB HASH={}", i + 1, size as f64 / KB, hash)?;
        }
    }
    Ok(())
}

/// `peers <file> [--tracker N]`: announces to the Nth tracker and lists its peers.
pub async fn peers(path: &Path, tracker_index: usize, config: &Config, out: &mut impl Write) -> Result<()> {
    let torrent = Torrent::from_file_with(path, load_options(config))
        .with_context(|| format!("unable to load torrent file {}", path.display()))?;

    let trackers = torrent.trackers();
    let Some(announce) = trackers.get(tracker_index).copied() else {
        bail!(
            "tracker #{tracker_index} does not exist, the torrent lists {}",
            trackers.len()
        );
    };

    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout))
        .build()?;
    let peer_id = utils::generate_peer_id(&config.peer_id_prefix);
    let mut request = AnnounceRequest::new(
        announce,
        torrent.info_hash,
        peer_id,
        torrent.info.total_length,
    );
    request.port = config.listen_port;
    request.event = Some(TrackerEvent::Started);

    writeln!(out, "Querying: {announce}")?;
    let reply = tracker::announce(&client, &request)
        .await
        .with_context(|| format!("announce to {announce} failed"))?;

    writeln!(out, "Tracker interval: {}", reply.interval)?;
    for (i, peer) in reply.peers.iter().enumerate() {
        let peer_id = peer
            .peer_id
            .as_deref()
            .map(|id| String::from_utf8_lossy(id).into_owned())
            .unwrap_or_else(|| "(----no-peer-id----)".to_string());
        writeln!(out, "Peer #{:03} {} port={:5} {}", i + 1, peer_id, peer.port, peer.ip)?;
    }

    // Let the tracker drop us again; its answer does not matter.
    request.event = Some(TrackerEvent::Stopped);
    if let Err(e) = tracker::announce(&client, &request).await {
        debug!("stop announce to {announce} failed: {e}");
    }
    Ok(())
}

/// `verify <file> <path>`: checks on-disk content against the piece hashes.
///
/// Every piece is reported; any mismatch makes the command fail.
pub fn verify(
    path: &Path,
    content: &Path,
    options: LoadOptions,
    progress: Option<ProgressTracker>,
    out: &mut impl Write,
) -> Result<VerifyReport> {
    let torrent = Torrent::from_file_with(path, options)
        .with_context(|| format!("unable to load torrent file {}", path.display()))?;
    let info = &torrent.info;
    let progress = progress.unwrap_or_else(|| ProgressTracker::new(info.piece_count()));

    info!("verifying {} against {}", content.display(), info.name);
    let report = verify::verify_content(info, content, &progress)
        .with_context(|| format!("unable to verify {}", content.display()))?;
    progress.finish();

    for index in report.failed_pieces() {
        writeln!(out, "Piece #{:04} MISMATCH", index + 1)?;
    }
    writeln!(out, "{}/{} pieces OK", report.passed(), report.pieces.len())?;

    if !report.is_complete() {
        bail!(
            "{} of {} pieces failed verification",
            report.pieces.len() - report.passed(),
            report.pieces.len()
        );
    }
    Ok(report)
}
