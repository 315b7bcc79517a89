use serde_json::{Value, json};
use super::BValue;

#[derive(Clone, Copy)]
enum KeyOrder {
	Insertion,
	Sorted,
}

/// Encode a `BValue` back into a bencoded `Vec<u8>`.
///
/// Dictionaries are written in their current iteration order, so a tree that came
/// out of the parser encodes back to exactly the bytes it was parsed from.
pub fn encode_bvalue(value: &BValue) -> Vec<u8> {
	let mut out: Vec<u8> = Vec::new();
	encode_into(value, &mut out);
	out
}

/// Appends the encoding of `value` to `out`.
pub fn encode_into(value: &BValue, out: &mut Vec<u8>) {
	write_value(value, out, KeyOrder::Insertion);
}

/// Encodes with every dictionary's keys sorted by raw bytes.
///
/// Insertion order is not touched; this is opt-in for consumers that need the
/// canonical form regardless of how the tree was built.
pub fn encode_canonical(value: &BValue) -> Vec<u8> {
	let mut out: Vec<u8> = Vec::new();
	write_value(value, &mut out, KeyOrder::Sorted);
	out
}

fn write_value(value: &BValue, out: &mut Vec<u8>, order: KeyOrder) {
	match value {
		BValue::Integer(i) => {
			out.push(b'i');
			out.extend_from_slice(i.to_string().as_bytes());
			out.push(b'e');
		}
		BValue::ByteString(bytes) => write_bytes(bytes, out),
		BValue::List(items) => {
			out.push(b'l');
			for item in items {
				write_value(item, out, order);
			}
			out.push(b'e');
		}
		BValue::Dict(dict) => {
			out.push(b'd');
			let mut entries: Vec<(&Vec<u8>, &BValue)> = dict.iter().collect();
			if let KeyOrder::Sorted = order {
				entries.sort_by(|a, b| a.0.cmp(b.0));
			}
			for (key, val) in entries {
				write_bytes(key, out);
				write_value(val, out, order);
			}
			out.push(b'e');
		}
	}
}

fn write_bytes(bytes: &[u8], out: &mut Vec<u8>) {
	out.extend_from_slice(bytes.len().to_string().as_bytes());
	out.push(b':');
	out.extend_from_slice(bytes);
}

/// Convert a `BValue` into JSON (using Serde JSON `Value`).
///
/// - `Integer(i)` => JSON number
/// - `ByteString(bytes)` => JSON string if UTF-8; otherwise hex in `"_bytes_hex"`.
/// - `List(...)` => JSON array
/// - `Dict(...)` => JSON object, keys in dictionary order. See [`json_key`].
///
/// The output is for display only. A dictionary that really holds a single
/// `_bytes_hex` entry projects the same way as a binary byte string.
pub fn bvalue_to_json(bv: &BValue) -> Value {
	match bv {
		BValue::Integer(i) => json!(i),

		BValue::ByteString(bytes) => match std::str::from_utf8(bytes) {
			Ok(utf8_str) => Value::String(utf8_str.to_string()),
			Err(_) => json!({ "_bytes_hex": hex::encode(bytes) }),
		},

		BValue::List(list_items) => {
			Value::Array(list_items.iter().map(bvalue_to_json).collect())
		}

		BValue::Dict(map) => {
			let mut json_map = serde_json::Map::new();
			for (k, v) in map {
				json_map.insert(json_key(k), bvalue_to_json(v));
			}
			Value::Object(json_map)
		}
	}
}

const HEX_KEY_PREFIX: &str = "_bytes_hex:";

/// Object key for a dictionary key. UTF-8 keys are used as they are; binary keys,
/// and text keys that already start with `_bytes_hex:`, become that prefix followed
/// by the hex of the raw bytes. Distinct keys therefore never share a JSON key.
fn json_key(key: &[u8]) -> String {
	match std::str::from_utf8(key) {
		Ok(text) if !text.starts_with(HEX_KEY_PREFIX) => text.to_string(),
		_ => format!("{HEX_KEY_PREFIX}{}", hex::encode(key)),
	}
}

/// Compact JSON text for display.
pub fn to_json_string(bv: &BValue) -> String {
	bvalue_to_json(bv).to_string()
}
