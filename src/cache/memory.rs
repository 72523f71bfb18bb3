//! Thread-safe in-memory [`CacheStore`] implementation.

// self
use crate::{
	_prelude::*,
	cache::{CacheEntry, CacheKey, CacheStore},
};

type CacheMap = Arc<RwLock<HashMap<CacheKey, CacheEntry>>>;

/// Process-local response cache with lazy expiry.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache(CacheMap);
impl MemoryCache {
	fn evict_if_stale(map: &CacheMap, key: &CacheKey, now: OffsetDateTime) {
		let mut guard = map.write();

		if guard.get(key).is_some_and(|entry| !entry.is_fresh_at(now)) {
			guard.remove(key);
		}
	}
}
impl CacheStore for MemoryCache {
	fn get(&self, key: &CacheKey, now: OffsetDateTime) -> Option<JsonValue> {
		{
			let guard = self.0.read();

			match guard.get(key) {
				Some(entry) if entry.is_fresh_at(now) => return Some(entry.value.clone()),
				Some(_) => {},
				None => return None,
			}
		}

		Self::evict_if_stale(&self.0, key, now);

		None
	}

	fn insert(&self, key: CacheKey, entry: CacheEntry) {
		self.0.write().insert(key, entry);
	}

	fn remove(&self, key: &CacheKey) -> Option<CacheEntry> {
		self.0.write().remove(key)
	}

	fn purge_expired(&self, now: OffsetDateTime) -> usize {
		let mut guard = self.0.write();
		let before = guard.len();

		guard.retain(|_, entry| entry.is_fresh_at(now));

		before - guard.len()
	}

	fn clear(&self) {
		self.0.write().clear();
	}

	fn len(&self) -> usize {
		self.0.read().len()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros::datetime;
	// self
	use super::*;
	use crate::request::Params;

	const NOW: OffsetDateTime = datetime!(2024-01-01 00:00 UTC);

	fn key(id: &str) -> CacheKey {
		CacheKey::new("comic_detail", &Params::new().with("id", id), None)
	}

	fn entry(value: JsonValue, ttl: Duration) -> CacheEntry {
		CacheEntry { value, expires_at: NOW + ttl }
	}

	#[test]
	fn fresh_entries_are_returned() {
		let cache = MemoryCache::default();

		cache.insert(key("a"), entry(json!({ "id": "a" }), Duration::minutes(5)));

		assert_eq!(cache.get(&key("a"), NOW + Duration::minutes(4)), Some(json!({ "id": "a" })));
		assert_eq!(cache.get(&key("b"), NOW), None);
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn stale_entries_are_evicted_on_lookup() {
		let cache = MemoryCache::default();

		cache.insert(key("a"), entry(json!(1), Duration::minutes(5)));

		assert_eq!(cache.get(&key("a"), NOW + Duration::minutes(5)), None);
		assert!(cache.is_empty());
	}

	#[test]
	fn purge_sweeps_only_stale_entries() {
		let cache = MemoryCache::default();

		cache.insert(key("short"), entry(json!(1), Duration::minutes(1)));
		cache.insert(key("long"), entry(json!(2), Duration::hours(1)));

		assert_eq!(cache.purge_expired(NOW + Duration::minutes(2)), 1);
		assert_eq!(cache.len(), 1);
		assert_eq!(cache.remove(&key("long")).map(|entry| entry.value), Some(json!(2)));

		cache.insert(key("again"), entry(json!(3), Duration::hours(1)));
		cache.clear();

		assert!(cache.is_empty());
	}

	#[test]
	fn clones_share_storage() {
		let cache = MemoryCache::default();
		let clone = cache.clone();

		clone.insert(key("a"), entry(json!(true), Duration::minutes(1)));

		assert_eq!(cache.get(&key("a"), NOW), Some(json!(true)));
	}
}
