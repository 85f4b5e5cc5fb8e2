//! Process-wide landing point for results returned by external applications.
//!
//! An external app answers through a standalone OS entry point that runs outside
//! the host session's call stack. The entry point deposits the response into a
//! [`CallbackBridge`] and terminates; the correlator later takes it out with
//! [`AttemptCorrelator::poll_bridge`](crate::correlator::AttemptCorrelator::poll_bridge).
//!
//! The slot holds a single response. A second deposit before the slot is read
//! overwrites the first (last write wins).
//!
//! External apps send no correlation tag back, so at most one external attempt may
//! wait on a bridge at a time. The correlator owning that attempt holds the bridge's
//! claim until the attempt completes or is abandoned, even when several correlators
//! share the bridge.

mod entry;

pub use entry::*;

// std
use std::sync::LazyLock;
// self
use crate::{_prelude::*, outcome::ExternalResponse};

static GLOBAL: LazyLock<Arc<CallbackBridge>> = LazyLock::new(|| Arc::new(CallbackBridge::new()));

/// Single-slot handoff cell between an external entry point and the correlator.
#[derive(Debug, Default)]
pub struct CallbackBridge {
	slot: Mutex<Slot>,
}
impl CallbackBridge {
	/// Creates an empty, unclaimed bridge.
	pub const fn new() -> Self {
		Self { slot: Mutex::new(Slot { response: None, claimed: false }) }
	}

	/// Process-wide bridge shared by entry points and correlators that do not
	/// configure their own.
	pub fn global() -> Arc<Self> {
		GLOBAL.clone()
	}

	/// Stores `response`, replacing anything not yet taken.
	///
	/// Returns `true` when an unread response was overwritten.
	pub fn deposit(&self, response: ExternalResponse) -> bool {
		let replaced = self.slot.lock().response.replace(response).is_some();

		if replaced {
			tracing::warn!("Callback bridge overwrote an unread external response.");
		}

		replaced
	}

	/// Atomically reads and clears the slot.
	pub fn take_if_ready(&self) -> Option<ExternalResponse> {
		self.slot.lock().response.take()
	}

	/// Like [`take_if_ready`](Self::take_if_ready), but leaves the response in place
	/// while an external attempt holds the claim.
	pub fn take_unclaimed(&self) -> Option<ExternalResponse> {
		let mut slot = self.slot.lock();

		if slot.claimed { None } else { slot.response.take() }
	}

	/// Returns `true` if a response is waiting.
	pub fn is_ready(&self) -> bool {
		self.slot.lock().response.is_some()
	}

	/// Claims the bridge for a new external attempt.
	///
	/// Returns `false` if another attempt already holds the claim. A fresh claim
	/// discards any response left over from before the attempt started.
	pub fn try_claim(&self) -> bool {
		let mut slot = self.slot.lock();

		if slot.claimed {
			return false;
		}

		slot.claimed = true;

		if slot.response.take().is_some() {
			tracing::warn!("Discarded a stale external response left in the callback bridge.");
		}

		true
	}

	/// Releases the claim taken by [`try_claim`](Self::try_claim).
	pub fn release(&self) {
		self.slot.lock().claimed = false;
	}

	/// Returns `true` while an external attempt holds the claim.
	pub fn is_claimed(&self) -> bool {
		self.slot.lock().claimed
	}
}

#[derive(Debug, Default)]
struct Slot {
	response: Option<ExternalResponse>,
	claimed: bool,
}
