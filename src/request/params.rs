//! Insertion-ordered request parameters.

// crates.io
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// Named request parameters.
///
/// Order is preserved so query strings come out in the order callers declared them. Inserting an
/// existing name replaces its value in place. `null` values are skipped on insert.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, JsonValue)>);
impl Params {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds (or replaces) a parameter and returns the set.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		self.insert(name, value);

		self
	}

	/// Adds (or replaces) a parameter.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
		let name = name.into();
		let value = value.into();

		if value.is_null() {
			self.0.retain(|(existing, _)| existing != &name);

			return;
		}

		match self.0.iter_mut().find(|(existing, _)| existing == &name) {
			Some((_, slot)) => *slot = value,
			None => self.0.push((name, value)),
		}
	}

	/// Looks up a parameter value.
	pub fn get(&self, name: &str) -> Option<&JsonValue> {
		self.0.iter().find(|(existing, _)| existing == name).map(|(_, value)| value)
	}

	/// Iterates parameters in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value))
	}

	/// Returns `true` when no parameters are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Name-sorted, form-urlencoded rendering used as a stable identity.
	///
	/// Names and values are escaped, so distinct parameter sets never render alike and the
	/// output never contains `|`.
	pub fn canonical(&self) -> String {
		let sorted =
			self.0.iter().map(|(name, value)| (name, render(value))).collect::<BTreeMap<_, _>>();
		let mut serializer = form_urlencoded::Serializer::new(String::new());

		for (name, value) in &sorted {
			serializer.append_pair(name, value);
		}

		serializer.finish()
	}
}
impl<K, V> FromIterator<(K, V)> for Params
where
	K: Into<String>,
	V: Into<JsonValue>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		let mut params = Self::new();

		for (name, value) in iter {
			params.insert(name, value);
		}

		params
	}
}

/// Renders a parameter value the way it appears in paths and query strings.
pub fn render(value: &JsonValue) -> String {
	match value {
		JsonValue::String(s) => s.clone(),
		other => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn insert_replaces_and_skips_null() {
		let params = Params::new()
			.with("page", 1)
			.with("c", "Cosplay")
			.with("page", 2)
			.with("missing", JsonValue::Null);

		assert_eq!(params.len(), 2);
		assert_eq!(params.get("page"), Some(&JsonValue::from(2)));
		assert_eq!(params.iter().map(|(name, _)| name).collect::<Vec<_>>(), ["page", "c"]);
	}

	#[test]
	fn null_clears_existing_value() {
		let params = Params::new().with("a", "x").with("a", JsonValue::Null);

		assert!(params.is_empty());
	}

	#[test]
	fn canonical_form_ignores_insertion_order() {
		let first = Params::new().with("id", "x").with("page", 2);
		let second: Params = [("page", JsonValue::from(2)), ("id", JsonValue::from("x"))]
			.into_iter()
			.collect();

		assert_eq!(first.canonical(), "id=x&page=2");
		assert_eq!(first.canonical(), second.canonical());
	}

	#[test]
	fn canonical_form_escapes_separators() {
		let packed = Params::new().with("a", "1&b=2");
		let split = Params::new().with("a", "1").with("b", "2");

		assert_ne!(packed.canonical(), split.canonical());
		assert_eq!(Params::new().with("a", "x|y").canonical(), "a=x%7Cy");
	}
}
