// self
use crate::{
	_prelude::*,
	bridge::CallbackBridge,
	outcome::{ExternalResponse, ExternalStatus},
};

/// Adapter invoked from the OS entry point an external app returns to.
///
/// Each method consumes the entry point: once the response is deposited there is
/// nothing left for it to do, and it never waits for the reader.
#[derive(Clone, Debug)]
pub struct ExternalEntryPoint {
	bridge: Arc<CallbackBridge>,
}
impl ExternalEntryPoint {
	/// Entry point writing into `bridge`.
	pub fn new(bridge: Arc<CallbackBridge>) -> Self {
		Self { bridge }
	}

	/// Entry point writing into [`CallbackBridge::global`].
	pub fn global() -> Self {
		Self::new(CallbackBridge::global())
	}

	/// Maps a raw transport code and deposits the response.
	pub fn respond(self, error_code: i32, code: Option<String>, message: Option<String>) {
		self.respond_with(ExternalResponse {
			status: ExternalStatus::from_transport_code(error_code),
			code,
			message,
		});
	}

	/// Deposits an already mapped response.
	pub fn respond_with(self, response: ExternalResponse) {
		tracing::debug!(status = ?response.status, "External application returned.");

		self.bridge.deposit(response);
	}
}
