use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use bytes::Bytes;
use log::{debug, warn};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::bencode::{decode_bencode, BValue, BencodeError};
use crate::utils::url_encode_bytes;

const COMPACT_V4_LEN: usize = 6;
const COMPACT_V6_LEN: usize = 18;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("tracker answered with HTTP status {0}")]
    Status(u16),

    #[error("tracker response is not valid bencode: {0}")]
    Bencode(#[from] BencodeError),

    #[error("could not build announce query: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),

    #[error("tracker failure: {0}")]
    Failure(String),

    #[error("invalid tracker response: {0}")]
    InvalidResponse(String),

    #[error("unsupported tracker url: {0}")]
    InvalidUrl(String),
}

fn invalid(reason: impl Into<String>) -> TrackerError {
    TrackerError::InvalidResponse(reason.into())
}

/// A peer as announced by a tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub peer_id: Option<Vec<u8>>, // absent in compact lists
    pub ip: String,               // dotted quad, IPv6 text, or a hostname
    pub port: u16,
}

impl PeerInfo {
    fn from_compact_v4(bytes: &[u8]) -> Self {
        let ip = Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]);
        Self {
            peer_id: None,
            ip: ip.to_string(),
            port: u16::from_be_bytes([bytes[4], bytes[5]]),
        }
    }

    fn from_compact_v6(bytes: &[u8]) -> Self {
        let mut octets = [0u8; 16];
        octets.copy_from_slice(&bytes[..16]);
        Self {
            peer_id: None,
            ip: Ipv6Addr::from(octets).to_string(),
            port: u16::from_be_bytes([bytes[16], bytes[17]]),
        }
    }

    fn from_dict(peer: &BValue) -> Result<Self, TrackerError> {
        if peer.as_dict().is_none() {
            return Err(invalid("peer list contains a non-dictionary entry"));
        }
        let ip = peer
            .get_bytes("ip")
            .ok_or_else(|| invalid("peer entry missing ip"))?;
        let port = peer
            .get_integer("port")
            .ok_or_else(|| invalid("peer entry missing port"))?;
        let port = u16::try_from(port)
            .map_err(|_| invalid(format!("peer port out of range: {port}")))?;

        Ok(Self {
            peer_id: peer.get_bytes("peer id").map(<[u8]>::to_vec),
            ip: String::from_utf8_lossy(ip).into_owned(),
            port,
        })
    }

    /// The peer as a socket address, when `ip` is a literal address.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.ip
            .parse::<IpAddr>()
            .ok()
            .map(|ip| SocketAddr::new(ip, self.port))
    }
}

/// Decoded announce reply. When `failure_reason` is set the other fields carry defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerReply {
    pub failure_reason: Option<String>,
    pub warning_message: Option<String>,
    pub interval: i64, // seconds
    pub min_interval: Option<i64>,
    pub complete: Option<i64>,   // seeders
    pub incomplete: Option<i64>, // leechers
    pub peers: Vec<PeerInfo>,
}

/// Parses an announce reply body.
///
/// `peers` may be a compact string of 6-byte records or a list of dictionaries;
/// `peers6` is compact only, 18-byte records.
pub fn parse_tracker_response(body: &[u8]) -> Result<TrackerReply, TrackerError> {
    let (consumed, reply) = decode_bencode(body)?;
    if consumed != body.len() {
        warn!(
            "ignoring {} trailing bytes after tracker reply",
            body.len() - consumed
        );
    }
    if reply.as_dict().is_none() {
        return Err(invalid("reply is not a dictionary"));
    }

    if let Some(reason) = reply.get("failure reason") {
        let reason = reason
            .as_byte_string()
            .ok_or_else(|| invalid("failure reason is not a string"))?;
        return Ok(TrackerReply {
            failure_reason: Some(String::from_utf8_lossy(reason).into_owned()),
            ..TrackerReply::default()
        });
    }

    let interval = reply
        .get_integer("interval")
        .ok_or_else(|| invalid("missing interval"))?;

    Ok(TrackerReply {
        failure_reason: None,
        warning_message: reply
            .get_bytes("warning message")
            .map(|w| String::from_utf8_lossy(w).into_owned()),
        interval,
        min_interval: reply.get_integer("min interval"),
        complete: reply.get_integer("complete"),
        incomplete: reply.get_integer("incomplete"),
        peers: parse_peer_list(&reply)?,
    })
}

fn parse_peer_list(reply: &BValue) -> Result<Vec<PeerInfo>, TrackerError> {
    let mut peers = match reply.get("peers") {
        Some(BValue::ByteString(compact)) => {
            if compact.len() % COMPACT_V4_LEN != 0 {
                return Err(invalid(format!(
                    "compact peer list length {} is not a multiple of {COMPACT_V4_LEN}",
                    compact.len()
                )));
            }
            compact
                .chunks_exact(COMPACT_V4_LEN)
                .map(PeerInfo::from_compact_v4)
                .collect::<Vec<_>>()
        }
        Some(BValue::List(entries)) => entries
            .iter()
            .map(PeerInfo::from_dict)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(invalid("peers is neither a string nor a list")),
        None => return Err(invalid("missing peers")),
    };

    match reply.get("peers6") {
        None => {}
        Some(BValue::ByteString(compact)) => {
            if compact.len() % COMPACT_V6_LEN != 0 {
                return Err(invalid(format!(
                    "compact peers6 length {} is not a multiple of {COMPACT_V6_LEN}",
                    compact.len()
                )));
            }
            peers.extend(
                compact
                    .chunks_exact(COMPACT_V6_LEN)
                    .map(PeerInfo::from_compact_v6),
            );
        }
        Some(_) => return Err(invalid("peers6 is not a string")),
    }

    Ok(peers)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerEvent {
    Started,
    Stopped,
    Completed,
}

/// Parameters of one HTTP announce.
#[derive(Debug, Clone)]
pub struct AnnounceRequest {
    pub announce: String,
    pub info_hash: [u8; 20],
    pub peer_id: [u8; 20],
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub event: Option<TrackerEvent>,
}

#[derive(Serialize)]
struct AnnounceQuery {
    port: u16,
    uploaded: u64,
    downloaded: u64,
    left: u64,
    compact: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<TrackerEvent>,
}

impl AnnounceRequest {
    pub fn new(announce: &str, info_hash: [u8; 20], peer_id: [u8; 20], left: u64) -> Self {
        Self {
            announce: announce.to_string(),
            info_hash,
            peer_id,
            port: 6881,
            uploaded: 0,
            downloaded: 0,
            left,
            event: None,
        }
    }

    /// Full announce URL. Binary fields are percent-encoded byte by byte.
    pub fn url(&self) -> Result<String, TrackerError> {
        if !self.announce.starts_with("http://") && !self.announce.starts_with("https://") {
            return Err(TrackerError::InvalidUrl(self.announce.clone()));
        }

        let rest = serde_urlencoded::to_string(AnnounceQuery {
            port: self.port,
            uploaded: self.uploaded,
            downloaded: self.downloaded,
            left: self.left,
            compact: 1,
            event: self.event,
        })?;
        let separator = if self.announce.contains('?') { '&' } else { '?' };

        Ok(format!(
            "{}{separator}info_hash={}&peer_id={}&{rest}",
            self.announce,
            url_encode_bytes(&self.info_hash),
            url_encode_bytes(&self.peer_id),
        ))
    }
}

/// Announces to the tracker and parses its reply. A tracker-side failure reason
/// becomes `TrackerError::Failure`.
pub async fn announce(client: &Client, request: &AnnounceRequest) -> Result<TrackerReply, TrackerError> {
    let url = request.url()?;
    debug!("announcing to {}", request.announce);

    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(TrackerError::Status(status.as_u16()));
    }
    let body: Bytes = response.bytes().await?;
    debug!("tracker replied with {} bytes", body.len());

    let reply = parse_tracker_response(&body)?;
    if let Some(reason) = reply.failure_reason {
        return Err(TrackerError::Failure(reason));
    }
    if let Some(warning) = &reply.warning_message {
        warn!("tracker warning: {warning}");
    }
    Ok(reply)
}
