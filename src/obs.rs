//! Observability helpers for login attempts.
//!
//! - Spans named `login_broker.attempt` carry the `provider_kind`, `stage`, and `tag`
//!   fields; install any `tracing` subscriber to collect them.
//! - Enable the `metrics` feature to increment the `login_broker_attempt_total` counter
//!   for every attempt/success/failure/dropped/abandoned event, labeled by
//!   `provider_kind` + `outcome`, and to publish the `login_broker_pending_attempts`
//!   gauge.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each attempt event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttemptOutcome {
	/// A login attempt was opened.
	Attempt,
	/// `on_success` fired.
	Success,
	/// `on_failure` fired.
	Failure,
	/// A result matched no pending attempt and was discarded.
	Dropped,
	/// A pending attempt was abandoned without a callback.
	Abandoned,
}
impl AttemptOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AttemptOutcome::Attempt => "attempt",
			AttemptOutcome::Success => "success",
			AttemptOutcome::Failure => "failure",
			AttemptOutcome::Dropped => "dropped",
			AttemptOutcome::Abandoned => "abandoned",
		}
	}
}
impl Display for AttemptOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
