// self
use crate::{
	_prelude::*,
	auth::{AuthToken, ProviderName, ScopeSet},
	correlator::CorrelationTag,
	error::AuthError,
	outcome::Outcome,
	provider::{Provider, ProviderKind},
};

type SuccessFn = Box<dyn FnOnce(AuthToken) + Send>;
type FailureFn = Box<dyn FnOnce(AuthError) + Send>;

/// Two-continuation completion contract for one login attempt.
///
/// Exactly one of the callbacks runs, exactly once, for every attempt that
/// completes. Abandoned attempts drop both without running either.
pub struct LoginCallbacks {
	on_success: SuccessFn,
	on_failure: FailureFn,
}
impl LoginCallbacks {
	/// Bundles the success and failure continuations.
	pub fn new<S, F>(on_success: S, on_failure: F) -> Self
	where
		S: 'static + FnOnce(AuthToken) + Send,
		F: 'static + FnOnce(AuthError) + Send,
	{
		Self { on_success: Box::new(on_success), on_failure: Box::new(on_failure) }
	}

	/// Runs the continuation matching `outcome`.
	pub fn complete(self, outcome: Outcome) {
		match outcome {
			Outcome::Success(token) => (self.on_success)(token),
			Outcome::Failure(error) => (self.on_failure)(error),
		}
	}

	pub(crate) fn fail(self, error: AuthError) {
		(self.on_failure)(error)
	}
}
impl Debug for LoginCallbacks {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("LoginCallbacks(..)")
	}
}

/// Stage a pending attempt is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptPhase {
	/// Waiting for the provider flow to produce a result.
	AwaitingProvider,
	/// Waiting for the identity backend to exchange the provider grant.
	AwaitingExchange,
}

/// Read-only view of a pending attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingAttempt {
	/// Correlation tag of the attempt.
	pub tag: CorrelationTag,
	/// Provider handling the attempt.
	pub provider: ProviderName,
	/// Delivery channel of the provider.
	pub kind: ProviderKind,
	/// Current stage.
	pub phase: AttemptPhase,
}

pub(super) struct Attempt {
	pub(super) provider: Arc<dyn Provider>,
	pub(super) scope: ScopeSet,
	pub(super) phase: AttemptPhase,
	pub(super) callbacks: LoginCallbacks,
}
impl Attempt {
	pub(super) fn new(
		provider: Arc<dyn Provider>,
		scope: ScopeSet,
		callbacks: LoginCallbacks,
	) -> Self {
		Self { provider, scope, phase: AttemptPhase::AwaitingProvider, callbacks }
	}

	pub(super) fn kind(&self) -> ProviderKind {
		self.provider.kind()
	}

	pub(super) fn view(&self, tag: CorrelationTag) -> PendingAttempt {
		PendingAttempt {
			tag,
			provider: self.provider.name().clone(),
			kind: self.kind(),
			phase: self.phase,
		}
	}
}
