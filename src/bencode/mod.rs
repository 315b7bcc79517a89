//! Bencode: the length-prefixed format used for metainfo files and tracker replies.
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` |
//! | Byte string | `<length>:<data>` | `4:spam` |
//! | List | `l<items>e` | `l4:spami42ee` |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` |
//!
//! Dictionaries keep the order their keys first appeared in, and encoding writes
//! them back in that order. [`encode_canonical`] is there for callers that need
//! sorted keys instead.

pub mod bvalue;
pub mod decode;
pub mod encode;
pub mod error;

pub use bvalue::{BValue, BValueKind, Dictionary};   // re-export
pub use decode::{decode_all, decode_bencode, parse, parse_at, MAX_DEPTH};   // re-export
pub use encode::{bvalue_to_json, encode_bvalue, encode_canonical, encode_into, to_json_string};   // re-export
pub use error::{BencodeError, ErrorKind};   // re-export
