// std
use std::sync::Weak;
// self
use crate::{
	_prelude::*,
	correlator::{AttemptCorrelator, CorrelationTag, Delivery, Inner},
	outcome::RawProviderResult,
};

/// Handle providers and grant exchangers use to deliver results.
///
/// The sink holds a weak reference, so keeping one around never keeps a dropped
/// correlator alive; deliveries after that point are dropped.
#[derive(Clone)]
pub struct ResultSink(Weak<Inner>);
impl ResultSink {
	pub(super) fn new(inner: &Arc<Inner>) -> Self {
		Self(Arc::downgrade(inner))
	}

	/// Sink connected to nothing; every delivery is dropped.
	pub fn detached() -> Self {
		Self(Weak::new())
	}

	/// Returns `true` while the correlator is still alive.
	pub fn is_connected(&self) -> bool {
		self.0.strong_count() > 0
	}

	/// Routes `result` to the attempt registered under `tag`.
	pub fn deliver(&self, tag: CorrelationTag, result: RawProviderResult) -> Delivery {
		match self.0.upgrade() {
			Some(inner) => AttemptCorrelator { inner }.deliver(tag, result),
			None => {
				tracing::warn!(%tag, "Correlator is gone; dropping result.");

				Delivery::Dropped
			},
		}
	}
}
impl Debug for ResultSink {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResultSink").field("connected", &self.is_connected()).finish()
	}
}
