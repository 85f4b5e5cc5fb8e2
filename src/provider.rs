//! Provider capabilities (behavior) and the request/extraction types they exchange
//! with the correlator.
//!
//! A [`Provider`] knows how to start a login, recognize results that belong to it,
//! and turn those results into an [`Extraction`]. Three built-in variants cover the
//! supported delivery channels:
//!
//! - [`EmbeddedFlowProvider`] presents an in-process authorization surface (PKCE).
//! - [`SdkProvider`] delegates to a native first-party SDK.
//! - [`ExternalAppProvider`] launches a separate installed application that answers
//!   through the [`CallbackBridge`](crate::bridge::CallbackBridge).

pub mod embedded;
pub mod external;
pub mod failure;
pub mod sdk;

pub use embedded::*;
pub use external::*;
pub use failure::*;
pub use sdk::*;

// std
use std::any::Any;
// self
use crate::{
	_prelude::*,
	auth::{ProviderName, ScopeSet},
	config::ConnectionConfig,
	correlator::{CorrelationTag, ResultSink},
	error::{AuthError, AuthErrorKind},
	exchange::ProviderGrant,
	outcome::{Outcome, RawProviderResult},
};

/// Delivery channel a provider uses to hand its result back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
	/// In-process authorization surface.
	Embedded,
	/// Native first-party SDK using the in-process result channel.
	FirstPartySdk,
	/// Separate application answering through the callback bridge.
	ExternalApp,
}
impl ProviderKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::Embedded => "embedded",
			ProviderKind::FirstPartySdk => "first_party_sdk",
			ProviderKind::ExternalApp => "external_app",
		}
	}

	/// Returns `true` when results arrive through the callback bridge.
	pub const fn uses_bridge(self) -> bool {
		matches!(self, ProviderKind::ExternalApp)
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Provider capability registered with a [`ProviderRegistry`](crate::registry::ProviderRegistry).
///
/// Implementations must be `Send + Sync`; the correlator never holds its own locks
/// while calling into a provider, so a provider may deliver through the
/// [`ResultSink`] before `start_login` returns.
pub trait Provider: Send + Sync {
	/// Unique name within a registry.
	fn name(&self) -> &ProviderName;

	/// Delivery channel used by this provider.
	fn kind(&self) -> ProviderKind;

	/// Starts an authorization attempt.
	///
	/// Returning an error fails the attempt through `on_failure`.
	fn start_login(&self, request: LoginRequest) -> Result<(), AuthError>;

	/// Returns `true` if `result` has a shape this provider understands.
	fn can_handle(&self, result: &RawProviderResult) -> bool;

	/// Turns a result into either a final outcome or a grant the backend must exchange.
	fn extract_outcome(&self, result: RawProviderResult) -> Extraction;

	/// Provider-specific failure classification consulted before the defaults.
	///
	/// The default implementation defers to [`default_classification`].
	fn classify_failure(&self, _failure: &ProviderFailure) -> Option<AuthErrorKind> {
		None
	}
}

/// Result of [`Provider::extract_outcome`].
#[derive(Clone, Debug)]
pub enum Extraction {
	/// The attempt is finished.
	Outcome(Outcome),
	/// The provider produced a grant the identity backend must turn into a token.
	Exchange(ProviderGrant),
}
impl From<Outcome> for Extraction {
	fn from(outcome: Outcome) -> Self {
		Self::Outcome(outcome)
	}
}
impl From<AuthError> for Extraction {
	fn from(error: AuthError) -> Self {
		Self::Outcome(Outcome::Failure(error))
	}
}

/// Opaque host handle passed through to providers unchanged.
///
/// The correlator never inspects it; host-side provider collaborators downcast it
/// to whatever they need to present UI.
#[derive(Clone)]
pub struct HostContext(Option<Arc<dyn Any + Send + Sync>>);
impl HostContext {
	/// Wraps a host value.
	pub fn new<T>(value: T) -> Self
	where
		T: Any + Send + Sync,
	{
		Self(Some(Arc::new(value)))
	}

	/// Context carrying nothing.
	pub fn empty() -> Self {
		Self(None)
	}

	/// Returns the wrapped value if it has type `T`.
	pub fn downcast_ref<T>(&self) -> Option<&T>
	where
		T: Any,
	{
		self.0.as_deref().and_then(|value| value.downcast_ref())
	}
}
impl Default for HostContext {
	fn default() -> Self {
		Self::empty()
	}
}
impl Debug for HostContext {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(if self.0.is_some() { "HostContext(..)" } else { "HostContext(empty)" })
	}
}

/// Everything a provider receives when asked to start a login.
#[derive(Clone, Debug)]
pub struct LoginRequest {
	/// Correlation tag of the attempt.
	pub tag: CorrelationTag,
	/// Requested scopes; empty means provider default.
	pub scope: ScopeSet,
	/// Host handle used to present UI.
	pub host: HostContext,
	/// Backend connection parameters.
	pub connection: Arc<ConnectionConfig>,
	/// Channel for delivering results straight back to the correlator.
	pub sink: ResultSink,
}
impl LoginRequest {
	/// Platform request code for the in-process result channel.
	pub fn request_code(&self) -> i32 {
		self.tag.request_code()
	}
}
