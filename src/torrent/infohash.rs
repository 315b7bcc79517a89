// infohash.rs
use crate::bencode::{encode_bvalue, encode_canonical, BValue};

use sha1::{Sha1, Digest};

/// SHA-1 over the encoded `info` sub-tree.
///
/// By default the sub-tree is encoded in its own dictionary order, which for a parsed
/// document reproduces the original bytes. `canonical` sorts keys first.
pub fn calculate_info_hash(info: &BValue, canonical: bool) -> [u8; 20] {
    let encoded = if canonical {
        encode_canonical(info)
    } else {
        encode_bvalue(info)
    };

    let mut hasher = Sha1::new();
    hasher.update(&encoded);
    let result = hasher.finalize();

    let mut hash_bytes = [0u8; 20];
    hash_bytes.copy_from_slice(&result);
    hash_bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bencode::parse;

    #[test]
    fn test_hash_of_parsed_info_matches_raw_bytes() {
        let raw_info = b"d6:lengthi3e4:name1:a12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaae";
        let info = parse(raw_info).unwrap();

        let mut hasher = Sha1::new();
        hasher.update(raw_info);
        let expected: Vec<u8> = hasher.finalize().to_vec();

        assert_eq!(calculate_info_hash(&info, false).to_vec(), expected);
        assert_eq!(calculate_info_hash(&info, true).to_vec(), expected);
    }

    #[test]
    fn test_canonical_hash_ignores_insertion_order() {
        let forward = parse(b"d1:ai1e1:bi2ee").unwrap();
        let backward = parse(b"d1:bi2e1:ai1ee").unwrap();
        assert_ne!(
            calculate_info_hash(&forward, false),
            calculate_info_hash(&backward, false)
        );
        assert_eq!(
            calculate_info_hash(&forward, true),
            calculate_info_hash(&backward, true)
        );
    }
}
