// self
use crate::obs::{CacheOutcome, RequestOutcome};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_request_outcome(operation: &'static str, outcome: RequestOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"bika_client_request_total",
			"operation" => operation,
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, outcome);
	}
}

/// Records a cache outcome via the global metrics recorder (when enabled).
pub fn record_cache_outcome(operation: &'static str, outcome: CacheOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"bika_client_cache_total",
			"operation" => operation,
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_request_outcome("collections", RequestOutcome::Failure);
		record_cache_outcome("collections", CacheOutcome::Hit);
	}
}
