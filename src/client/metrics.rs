// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for client activity.
#[derive(Debug, Default)]
pub struct ClientMetrics {
	dispatches: AtomicU64,
	failures: AtomicU64,
	logins: AtomicU64,
	cache_hits: AtomicU64,
	cache_misses: AtomicU64,
}
impl ClientMetrics {
	/// Returns the number of requests sent to the transport.
	pub fn dispatches(&self) -> u64 {
		self.dispatches.load(Ordering::Relaxed)
	}

	/// Returns the number of dispatches that ended in an error.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Returns the number of login attempts started.
	pub fn logins(&self) -> u64 {
		self.logins.load(Ordering::Relaxed)
	}

	/// Returns the number of calls served from the cache.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of cacheable calls that had to dispatch.
	pub fn cache_misses(&self) -> u64 {
		self.cache_misses.load(Ordering::Relaxed)
	}

	pub(crate) fn record_dispatch(&self) {
		self.dispatches.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_login(&self) {
		self.logins.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cache_miss(&self) {
		self.cache_misses.fetch_add(1, Ordering::Relaxed);
	}
}
