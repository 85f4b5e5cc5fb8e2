// self
use crate::{obs::AttemptOutcome, provider::ProviderKind};

/// Counter incremented once per attempt event.
pub const ATTEMPT_COUNTER: &str = "login_broker_attempt_total";
/// Gauge tracking how many attempts are waiting for a result.
pub const PENDING_GAUGE: &str = "login_broker_pending_attempts";

/// Counts an attempt event, labeled by provider kind and outcome.
///
/// `kind` is `None` for results that could not be tied to any provider. No-op unless
/// the `metrics` feature is enabled.
pub fn record_attempt_outcome(kind: Option<ProviderKind>, outcome: AttemptOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			ATTEMPT_COUNTER,
			"provider_kind" => kind.map_or("unknown", ProviderKind::as_str),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Publishes the number of pending attempts.
pub fn record_pending(count: usize) {
	#[cfg(feature = "metrics")]
	{
		metrics::gauge!(PENDING_GAUGE).set(count as f64);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = count;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recording_without_an_installed_recorder_is_harmless() {
		for outcome in [AttemptOutcome::Attempt, AttemptOutcome::Dropped, AttemptOutcome::Abandoned] {
			record_attempt_outcome(Some(ProviderKind::ExternalApp), outcome);
		}

		record_attempt_outcome(None, AttemptOutcome::Dropped);
		record_pending(0);
		record_pending(3);
	}
}
