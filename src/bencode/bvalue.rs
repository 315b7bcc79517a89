use crate::utils::OrderedMap;

/// Dictionary node: raw byte-string keys, iterated in first-insertion order.
pub type Dictionary = OrderedMap<Vec<u8>, BValue>;

/// One node of a decoded (or hand-built) document. Each node owns its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BValue {
	ByteString(Vec<u8>), // raw bytes for any string
	Integer(i64),
	List(Vec<BValue>),
	Dict(Dictionary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BValueKind {
	Integer,
	ByteString,
	List,
	Dict,
}

impl BValue {
	pub fn dict() -> Self {
		BValue::Dict(Dictionary::new())
	}

	pub fn list() -> Self {
		BValue::List(Vec::new())
	}

	pub fn string(s: &str) -> Self {
		BValue::ByteString(s.as_bytes().to_vec())
	}

	pub fn kind(&self) -> BValueKind {
		match self {
			BValue::Integer(_) => BValueKind::Integer,
			BValue::ByteString(_) => BValueKind::ByteString,
			BValue::List(_) => BValueKind::List,
			BValue::Dict(_) => BValueKind::Dict,
		}
	}

	pub fn as_integer(&self) -> Option<i64> {
		match self {
			BValue::Integer(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_byte_string(&self) -> Option<&[u8]> {
		match self {
			BValue::ByteString(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// The byte string as text, if it is one and holds valid UTF-8.
	pub fn as_str(&self) -> Option<&str> {
		self.as_byte_string()
			.and_then(|bytes| std::str::from_utf8(bytes).ok())
	}

	pub fn as_list(&self) -> Option<&[BValue]> {
		match self {
			BValue::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_list_mut(&mut self) -> Option<&mut Vec<BValue>> {
		match self {
			BValue::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_dict(&self) -> Option<&Dictionary> {
		match self {
			BValue::Dict(map) => Some(map),
			_ => None,
		}
	}

	pub fn as_dict_mut(&mut self) -> Option<&mut Dictionary> {
		match self {
			BValue::Dict(map) => Some(map),
			_ => None,
		}
	}

	/// Element count of a list or key count of a dictionary.
	/// Scalars have no length.
	pub fn len(&self) -> Option<usize> {
		match self {
			BValue::List(items) => Some(items.len()),
			BValue::Dict(map) => Some(map.len()),
			_ => None,
		}
	}

	pub fn is_empty(&self) -> Option<bool> {
		self.len().map(|len| len == 0)
	}

	pub fn element_at(&self, index: usize) -> Option<&BValue> {
		self.as_list().and_then(|items| items.get(index))
	}

	/// Appends to a list. A non-list hands the value back untouched.
	pub fn append(&mut self, value: BValue) -> Result<(), BValue> {
		match self {
			BValue::List(items) => {
				items.push(value);
				Ok(())
			}
			_ => Err(value),
		}
	}

	pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
		self.as_dict()
			.map_or(false, |map| map.contains_key(key.as_ref()))
	}

	pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&BValue> {
		self.as_dict().and_then(|map| map.get(key.as_ref()))
	}

	pub fn get_mut(&mut self, key: impl AsRef<[u8]>) -> Option<&mut BValue> {
		self.as_dict_mut().and_then(|map| map.get_mut(key.as_ref()))
	}

	/// Sets `key` on a dictionary, returning whatever it replaced.
	/// A non-dictionary hands the value back untouched.
	pub fn set(&mut self, key: impl Into<Vec<u8>>, value: BValue) -> Result<Option<BValue>, BValue> {
		match self {
			BValue::Dict(map) => Ok(map.insert(key.into(), value)),
			_ => Err(value),
		}
	}

	pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Option<BValue> {
		self.as_dict_mut().and_then(|map| map.remove(key.as_ref()))
	}

	pub fn get_integer(&self, key: impl AsRef<[u8]>) -> Option<i64> {
		self.get(key).and_then(BValue::as_integer)
	}

	pub fn get_bytes(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
		self.get(key).and_then(BValue::as_byte_string)
	}

	pub fn get_str(&self, key: impl AsRef<[u8]>) -> Option<&str> {
		self.get(key).and_then(BValue::as_str)
	}

	pub fn get_list(&self, key: impl AsRef<[u8]>) -> Option<&[BValue]> {
		self.get(key).and_then(BValue::as_list)
	}

	pub fn get_dict(&self, key: impl AsRef<[u8]>) -> Option<&Dictionary> {
		self.get(key).and_then(BValue::as_dict)
	}
}

impl From<i64> for BValue {
	fn from(i: i64) -> Self {
		BValue::Integer(i)
	}
}

impl From<&str> for BValue {
	fn from(s: &str) -> Self {
		BValue::string(s)
	}
}

impl From<String> for BValue {
	fn from(s: String) -> Self {
		BValue::ByteString(s.into_bytes())
	}
}

impl From<Vec<u8>> for BValue {
	fn from(bytes: Vec<u8>) -> Self {
		BValue::ByteString(bytes)
	}
}

impl From<&[u8]> for BValue {
	fn from(bytes: &[u8]) -> Self {
		BValue::ByteString(bytes.to_vec())
	}
}

impl From<Vec<BValue>> for BValue {
	fn from(items: Vec<BValue>) -> Self {
		BValue::List(items)
	}
}

impl From<Dictionary> for BValue {
	fn from(map: Dictionary) -> Self {
		BValue::Dict(map)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_scalar_accessors() {
		let int = BValue::from(42i64);
		assert_eq!(int.kind(), BValueKind::Integer);
		assert_eq!(int.as_integer(), Some(42));
		assert_eq!(int.as_byte_string(), None);
		assert_eq!(int.len(), None);

		let s = BValue::from("spam");
		assert_eq!(s.kind(), BValueKind::ByteString);
		assert_eq!(s.as_byte_string(), Some(&b"spam"[..]));
		assert_eq!(s.as_str(), Some("spam"));
		assert_eq!(s.as_integer(), None);
		assert_eq!(s.len(), None);
	}

	#[test]
	fn test_non_utf8_bytes_have_no_str() {
		let s = BValue::from(vec![0xffu8, 0x00]);
		assert_eq!(s.as_byte_string(), Some(&[0xff, 0x00][..]));
		assert_eq!(s.as_str(), None);
	}

	#[test]
	fn test_list_operations() {
		let mut list = BValue::list();
		assert_eq!(list.len(), Some(0));
		assert_eq!(list.is_empty(), Some(true));
		list.append(BValue::from(1i64)).unwrap();
		list.append(BValue::from("two")).unwrap();
		assert_eq!(list.len(), Some(2));
		assert_eq!(list.element_at(0), Some(&BValue::Integer(1)));
		assert_eq!(list.element_at(1).and_then(BValue::as_str), Some("two"));
		assert_eq!(list.element_at(2), None);
	}

	#[test]
	fn test_append_on_non_list_returns_value() {
		let mut int = BValue::from(3i64);
		assert_eq!(int.append(BValue::from(4i64)), Err(BValue::Integer(4)));
		assert_eq!(int, BValue::Integer(3));
	}

	#[test]
	fn test_dict_set_get_remove() {
		let mut dict = BValue::dict();
		assert_eq!(dict.set("foo", BValue::from(16i64)), Ok(None));
		assert_eq!(dict.set("bar", BValue::from("buz")), Ok(None));
		assert_eq!(dict.set("foo", BValue::from(17i64)), Ok(Some(BValue::Integer(16))));

		assert_eq!(dict.len(), Some(2));
		assert!(dict.contains_key("foo"));
		assert_eq!(dict.get_integer("foo"), Some(17));
		assert_eq!(dict.get_str("bar"), Some("buz"));
		assert_eq!(dict.get_str("foo"), None);
		assert_eq!(dict.get("missing"), None);

		assert_eq!(dict.remove("foo"), Some(BValue::Integer(17)));
		assert_eq!(dict.remove("foo"), None);
		assert_eq!(dict.len(), Some(1));
	}

	#[test]
	fn test_dict_accessors_on_non_dict_are_absent() {
		let mut list = BValue::list();
		assert!(!list.contains_key("a"));
		assert_eq!(list.get("a"), None);
		assert_eq!(list.remove("a"), None);
		assert_eq!(list.set("a", BValue::from(1i64)), Err(BValue::Integer(1)));
	}

	#[test]
	fn test_nested_mutation() {
		let mut root = BValue::dict();
		root.set("info", BValue::dict()).unwrap();
		root.get_mut("info")
			.unwrap()
			.set("name", BValue::from("file.txt"))
			.unwrap();
		let info = root.get_dict("info").unwrap();
		assert_eq!(info.get(&b"name"[..]).and_then(BValue::as_str), Some("file.txt"));
	}
}
