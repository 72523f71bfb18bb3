//! Response cache contracts and the built-in in-memory store.
//!
//! Caching is composed explicitly: every named operation carries a [`CachePolicy`], and the
//! client consults a [`CacheStore`] keyed by [`CacheKey`] before dispatching. Keys cover the
//! operation identity and its arguments only; per-call header context such as the image quality
//! never reaches the key. Entries expire lazily on lookup, and [`CacheStore::purge_expired`] is
//! available for callers that want an explicit sweep.

pub mod memory;

pub use memory::MemoryCache;

// self
use crate::{_prelude::*, request::Params};

/// Whether and for how long an operation's responses are cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CachePolicy {
	/// Always dispatch; never store.
	Disabled,
	/// Cache for the given time-to-live.
	Ttl(Duration),
}
impl CachePolicy {
	/// Returns the TTL, if caching is enabled.
	pub fn ttl(self) -> Option<Duration> {
		match self {
			Self::Disabled => None,
			Self::Ttl(ttl) => Some(ttl),
		}
	}
}

/// Identity of a cached response.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
	/// Operation label.
	pub operation: &'static str,
	/// Canonical rendering of the call arguments.
	pub args: String,
}
impl CacheKey {
	/// Builds a key from an operation label and its arguments.
	///
	/// Parameters and body object keys are rendered in name order, so equal arguments always
	/// yield equal keys.
	pub fn new(operation: &'static str, params: &Params, body: Option<&JsonValue>) -> Self {
		// Form-encoded params never contain a raw `|`.
		let mut args = params.canonical();

		if let Some(body) = body {
			args.push('|');
			write_canonical_json(body, &mut args);
		}

		Self { operation, args }
	}
}

fn write_canonical_json(value: &JsonValue, out: &mut String) {
	match value {
		JsonValue::Object(map) => {
			let mut entries = map.iter().collect::<Vec<_>>();

			entries.sort_by(|(a, _), (b, _)| a.cmp(b));
			out.push('{');

			for (idx, (name, value)) in entries.into_iter().enumerate() {
				if idx > 0 {
					out.push(',');
				}

				out.push_str(&JsonValue::from(name.as_str()).to_string());
				out.push(':');
				write_canonical_json(value, out);
			}

			out.push('}');
		},
		JsonValue::Array(items) => {
			out.push('[');

			for (idx, item) in items.iter().enumerate() {
				if idx > 0 {
					out.push(',');
				}

				write_canonical_json(item, out);
			}

			out.push(']');
		},
		scalar => out.push_str(&scalar.to_string()),
	}
}

/// Cached value together with its expiry.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
	/// Stored response.
	pub value: JsonValue,
	/// Instant after which the entry is stale.
	pub expires_at: OffsetDateTime,
}
impl CacheEntry {
	/// Returns `true` while the entry is still fresh at `now`.
	pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
		now < self.expires_at
	}
}

/// Storage backend contract for cached responses.
///
/// Implementations must be safe for concurrent use by every in-flight request and must never
/// block across I/O; the client calls them synchronously between awaits.
pub trait CacheStore
where
	Self: Send + Sync,
{
	/// Returns the value for `key` if it is still fresh at `now`, evicting it otherwise.
	fn get(&self, key: &CacheKey, now: OffsetDateTime) -> Option<JsonValue>;

	/// Inserts or replaces the value for `key`.
	fn insert(&self, key: CacheKey, entry: CacheEntry);

	/// Removes `key`, returning its entry when present.
	fn remove(&self, key: &CacheKey) -> Option<CacheEntry>;

	/// Drops every entry that is stale at `now` and returns how many were removed.
	fn purge_expired(&self, now: OffsetDateTime) -> usize;

	/// Drops every entry.
	fn clear(&self);

	/// Number of stored entries, fresh or not.
	fn len(&self) -> usize;

	/// Returns `true` when the store holds no entries.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
