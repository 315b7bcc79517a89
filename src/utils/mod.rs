pub mod ordered_map;
mod url_encode;

pub use ordered_map::{OrderedMap, OrderedMapError};
pub use url_encode::url_encode_bytes;
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Builds a 20-byte peer id: `prefix` (truncated to 20 bytes) followed by random
/// alphanumeric filler.
pub fn generate_peer_id(prefix: &str) -> [u8; 20] {
	let mut peer_id = [0u8; 20];
	let prefix = &prefix.as_bytes()[..prefix.len().min(20)];
	peer_id[..prefix.len()].copy_from_slice(prefix);

	let mut rng = rand::thread_rng();
	for byte in peer_id[prefix.len()..].iter_mut() {
		*byte = rng.sample(Alphanumeric);
	}
	peer_id
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_peer_id_prefix() {
		let id = generate_peer_id("-TC0001-");
		assert_eq!(&id[..8], b"-TC0001-");
		assert!(id[8..].iter().all(u8::is_ascii_alphanumeric));
	}

	#[test]
	fn test_peer_id_long_prefix_is_truncated() {
		let id = generate_peer_id("0123456789abcdefghijXYZ");
		assert_eq!(&id[..], b"0123456789abcdefghij");
	}
}
