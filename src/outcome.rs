//! Raw provider results and the normalized [`Outcome`] they collapse into.
//!
//! Raw results arrive through one of three channels: the host's in-process
//! result delivery (embedded and SDK providers), the [`CallbackBridge`] (external
//! apps), or the host's identity backend after a grant exchange. Each raw result is
//! consumed exactly once and never persisted.
//!
//! [`CallbackBridge`]: crate::bridge::CallbackBridge

// self
use crate::{
	_prelude::*,
	auth::AuthToken,
	error::{AuthError, AuthErrorKind},
	provider::ProviderFailure,
};

/// Opaque payload produced by a provider flow.
#[derive(Clone, Debug, PartialEq)]
pub enum RawProviderResult {
	/// Result forwarded from the host's in-process result delivery channel.
	InProcess {
		/// Platform result code that accompanied the payload.
		result_code: ResultCode,
		/// Provider-specific payload.
		payload: Value,
	},
	/// Response deposited by an external application.
	External(ExternalResponse),
	/// Identity backend response to a grant exchange.
	Backend(BackendResponse),
}
impl RawProviderResult {
	/// Convenience constructor for in-process results.
	pub fn in_process(result_code: ResultCode, payload: Value) -> Self {
		Self::InProcess { result_code, payload }
	}

	/// Stable label naming the delivery channel.
	pub fn channel(&self) -> &'static str {
		match self {
			Self::InProcess { .. } => "in_process",
			Self::External(_) => "external",
			Self::Backend(_) => "backend",
		}
	}
}

/// Platform result code delivered alongside in-process results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
	/// The flow completed and produced a payload.
	Ok,
	/// The user closed the flow.
	Cancelled,
	/// Any other platform-defined code.
	Other(i32),
}
impl ResultCode {
	/// Raw platform value for [`ResultCode::Cancelled`].
	pub const RAW_CANCELLED: i32 = 0;
	/// Raw platform value for [`ResultCode::Ok`].
	pub const RAW_OK: i32 = -1;

	/// Maps a raw platform code.
	pub fn from_raw(code: i32) -> Self {
		match code {
			Self::RAW_OK => Self::Ok,
			Self::RAW_CANCELLED => Self::Cancelled,
			other => Self::Other(other),
		}
	}

	/// Returns the raw platform code.
	pub fn as_raw(self) -> i32 {
		match self {
			Self::Ok => Self::RAW_OK,
			Self::Cancelled => Self::RAW_CANCELLED,
			Self::Other(code) => code,
		}
	}
}

/// Result envelope produced by a first-party provider SDK.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SdkResponse {
	/// The SDK authorized the user and returned a provider token.
	Success {
		/// Provider-issued access token to exchange with the backend.
		access_token: String,
		/// Provider-issued id token, when the SDK exposes one.
		#[serde(default, skip_serializing_if = "Option::is_none")]
		id_token: Option<String>,
	},
	/// The user dismissed the SDK flow.
	Cancel,
	/// The SDK reported an error.
	Error {
		/// SDK error code, when available.
		#[serde(default, skip_serializing_if = "Option::is_none")]
		code: Option<String>,
		/// SDK error message.
		message: String,
	},
}
impl SdkResponse {
	/// Reads an envelope out of an in-process payload.
	pub fn from_payload(payload: &Value) -> Option<Self> {
		Self::deserialize(payload).ok()
	}

	/// Serializes the envelope into an in-process payload.
	pub fn into_payload(self) -> Value {
		serde_json::to_value(self).unwrap_or(Value::Null)
	}
}

/// Outcome category reported by an external application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExternalStatus {
	/// The app authorized the request.
	Success,
	/// The user cancelled inside the app.
	UserCancelled,
	/// The user denied the request.
	Denied,
	/// Any other transport code.
	Other(i32),
}
impl ExternalStatus {
	/// Transport code for [`ExternalStatus::Denied`].
	pub const ERR_AUTH_DENIED: i32 = -4;
	/// Transport code for [`ExternalStatus::Success`].
	pub const ERR_OK: i32 = 0;
	/// Transport code for [`ExternalStatus::UserCancelled`].
	pub const ERR_USER_CANCEL: i32 = -2;

	/// Maps a transport error code.
	pub fn from_transport_code(code: i32) -> Self {
		match code {
			Self::ERR_OK => Self::Success,
			Self::ERR_USER_CANCEL => Self::UserCancelled,
			Self::ERR_AUTH_DENIED => Self::Denied,
			other => Self::Other(other),
		}
	}
}
impl FromStr for ExternalStatus {
	type Err = UnknownStatusError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"ERR_OK" => Ok(Self::Success),
			"ERR_COMM" => Ok(Self::Other(-1)),
			"ERR_USER_CANCEL" => Ok(Self::UserCancelled),
			"ERR_SENT_FAILED" => Ok(Self::Other(-3)),
			"ERR_AUTH_DENIED" => Ok(Self::Denied),
			"ERR_UNSUPPORT" => Ok(Self::Other(-5)),
			"ERR_BAN" => Ok(Self::Other(-6)),
			other => other
				.parse::<i32>()
				.map(Self::from_transport_code)
				.map_err(|_| UnknownStatusError { value: other.to_owned() }),
		}
	}
}

/// Error returned when an external status name is neither known nor numeric.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("External status `{value}` is not recognized.")]
pub struct UnknownStatusError {
	/// Rejected input.
	pub value: String,
}

/// Response an external application hands back through the OS entry point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalResponse {
	/// Mapped transport status.
	pub status: ExternalStatus,
	/// Authorization code, present on success.
	pub code: Option<String>,
	/// Error string supplied by the app, if any.
	pub message: Option<String>,
}
impl ExternalResponse {
	/// Creates a response with the provided status and no payload.
	pub fn new(status: ExternalStatus) -> Self {
		Self { status, code: None, message: None }
	}

	/// Successful response carrying an authorization code.
	pub fn success(code: impl Into<String>) -> Self {
		Self { status: ExternalStatus::Success, code: Some(code.into()), message: None }
	}

	/// Attaches an error message.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());

		self
	}
}

/// Identity backend reply to a grant exchange.
#[derive(Clone, Debug, PartialEq)]
pub enum BackendResponse {
	/// Token endpoint payload (access token, id token, user, ...).
	Token(Value),
	/// The exchange failed.
	Failure(ProviderFailure),
}

/// Normalized result of one login attempt.
#[derive(Clone, Debug)]
pub enum Outcome {
	/// The login succeeded.
	Success(AuthToken),
	/// The login failed.
	Failure(AuthError),
}
impl Outcome {
	/// Returns `true` for [`Outcome::Success`].
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success(_))
	}

	/// Returns the failure kind, if any.
	pub fn error_kind(&self) -> Option<AuthErrorKind> {
		match self {
			Self::Success(_) => None,
			Self::Failure(err) => Some(err.kind),
		}
	}
}
impl From<Result<AuthToken, AuthError>> for Outcome {
	fn from(result: Result<AuthToken, AuthError>) -> Self {
		match result {
			Ok(token) => Self::Success(token),
			Err(err) => Self::Failure(err),
		}
	}
}
