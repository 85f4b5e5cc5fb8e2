// crates.io
use tracing::{Span, field, span::EnteredSpan};
// self
use crate::{_prelude::*, correlator::CorrelationTag, provider::ProviderKind};

/// Span wrapping one correlator entry point.
#[derive(Clone, Debug)]
pub struct AttemptSpan {
	span: Span,
}
impl AttemptSpan {
	/// Creates a span for `stage`; provider fields are filled in once known.
	pub fn new(stage: &'static str) -> Self {
		let span = tracing::info_span!(
			"login_broker.attempt",
			stage,
			provider_kind = field::Empty,
			tag = field::Empty
		);

		Self { span }
	}

	/// Records the provider kind handling the attempt.
	pub fn record_kind(&self, kind: ProviderKind) -> &Self {
		self.span.record("provider_kind", kind.as_str());

		self
	}

	/// Records the attempt's correlation tag.
	pub fn record_tag(&self, tag: CorrelationTag) -> &Self {
		self.span.record("tag", tag.get());

		self
	}

	/// Enters the span until the returned guard drops.
	pub fn entered(self) -> AttemptSpanGuard {
		AttemptSpanGuard { guard: self.span.entered() }
	}
}

/// RAII guard returned by [`AttemptSpan::entered`].
pub struct AttemptSpanGuard {
	guard: EnteredSpan,
}
impl AttemptSpanGuard {
	/// Records the provider kind on the entered span.
	pub fn record_kind(&self, kind: ProviderKind) {
		self.guard.record("provider_kind", kind.as_str());
	}

	/// Records the correlation tag on the entered span.
	pub fn record_tag(&self, tag: CorrelationTag) {
		self.guard.record("tag", tag.get());
	}
}
impl Debug for AttemptSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("AttemptSpanGuard(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn span_records_fields_without_subscriber() {
		let span = AttemptSpan::new("begin");

		span.record_kind(ProviderKind::Embedded).record_tag(CorrelationTag::new(7));

		let guard = span.entered();

		guard.record_tag(CorrelationTag::new(8));
	}
}
