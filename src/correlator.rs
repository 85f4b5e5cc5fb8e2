//! Attempt correlation: tags, pending state, and exactly-once completion.
//!
//! [`AttemptCorrelator`] opens an attempt per [`begin`](AttemptCorrelator::begin),
//! routes every inbound result to the attempt that owns its tag, and fires exactly
//! one of the attempt's callbacks exactly once. Results for unknown, completed, or
//! abandoned tags are dropped.
//!
//! The correlator never holds its internal lock while calling a provider, a grant
//! exchanger, or a callback. Providers can therefore deliver synchronously from
//! inside `start_login`, and callbacks can start new attempts.

/// Attempt bookkeeping and completion callbacks.
pub mod attempt;
/// Delivery handle shared with providers and exchangers.
pub mod sink;
/// Correlation tags and their allocator.
pub mod tag;

pub use attempt::*;
pub use sink::*;
pub use tag::*;

// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	bridge::CallbackBridge,
	config::{ConnectionConfig, TagRange},
	error::AuthError,
	exchange::{ExchangeRequest, GrantExchange, ProviderGrant},
	obs::{self, AttemptOutcome, AttemptSpan},
	outcome::{Outcome, RawProviderResult, ResultCode},
	provider::{Extraction, HostContext, LoginRequest, Provider, ProviderKind},
	registry::ProviderRegistry,
};

/// What happened to a delivered result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
	/// The attempt completed and one callback fired.
	Completed {
		/// Tag of the completed attempt.
		tag: CorrelationTag,
		/// `true` if `on_success` fired.
		success: bool,
	},
	/// The result produced a grant that was handed to the exchanger.
	Exchanging {
		/// Tag of the attempt now awaiting the backend.
		tag: CorrelationTag,
	},
	/// No pending attempt accepted the result.
	Dropped,
}

/// Builder for [`AttemptCorrelator`].
pub struct AttemptCorrelatorBuilder {
	registry: ProviderRegistry,
	connection: ConnectionConfig,
	bridge: Option<Arc<CallbackBridge>>,
	exchange: Option<Arc<dyn GrantExchange>>,
	tag_range: TagRange,
}
impl AttemptCorrelatorBuilder {
	/// Uses `bridge` instead of [`CallbackBridge::global`].
	pub fn bridge(mut self, bridge: Arc<CallbackBridge>) -> Self {
		self.bridge = Some(bridge);

		self
	}

	/// Installs the collaborator that exchanges provider grants with the backend.
	pub fn exchange<E>(mut self, exchange: E) -> Self
	where
		E: 'static + GrantExchange,
	{
		self.exchange = Some(Arc::new(exchange));

		self
	}

	/// Draws tags from `range` instead of the default.
	pub fn tag_range(mut self, range: TagRange) -> Self {
		self.tag_range = range;

		self
	}

	/// Finishes construction.
	pub fn build(self) -> AttemptCorrelator {
		let inner = Inner {
			registry: self.registry,
			connection: Arc::new(self.connection),
			bridge: self.bridge.unwrap_or_else(CallbackBridge::global),
			exchange: self.exchange,
			tag_range: self.tag_range,
			state: Mutex::new(State {
				tags: TagAllocator::new(self.tag_range),
				attempts: BTreeMap::new(),
			}),
		};

		AttemptCorrelator { inner: Arc::new(inner) }
	}
}
impl Debug for AttemptCorrelatorBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AttemptCorrelatorBuilder")
			.field("registry", &self.registry)
			.field("connection", &self.connection)
			.field("exchange", &self.exchange.is_some())
			.field("tag_range", &self.tag_range)
			.finish()
	}
}

/// Owns the pending login attempts of one host session.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct AttemptCorrelator {
	inner: Arc<Inner>,
}
impl AttemptCorrelator {
	/// Starts building a correlator that owns `registry`.
	pub fn builder(
		registry: ProviderRegistry,
		connection: ConnectionConfig,
	) -> AttemptCorrelatorBuilder {
		AttemptCorrelatorBuilder {
			registry,
			connection,
			bridge: None,
			exchange: None,
			tag_range: TagRange::default(),
		}
	}

	/// Providers available to the host, in registration order.
	pub fn registry(&self) -> &ProviderRegistry {
		&self.inner.registry
	}

	/// Bridge this correlator reads external responses from.
	pub fn bridge(&self) -> &Arc<CallbackBridge> {
		&self.inner.bridge
	}

	/// Sink that delivers into this correlator.
	pub fn sink(&self) -> ResultSink {
		ResultSink::new(&self.inner)
	}

	/// Opens a login attempt against `provider` and asks it to start.
	///
	/// Returns the attempt's tag, or `None` if the attempt could not be opened; in
	/// that case `on_failure` has already fired with `ProviderUnavailable`. A tag is
	/// returned even when the provider fails to start, since the failure is then
	/// delivered through `on_failure` like any other outcome.
	pub fn begin(
		&self,
		provider: &str,
		scope: ScopeSet,
		host: HostContext,
		callbacks: LoginCallbacks,
	) -> Option<CorrelationTag> {
		let guard = AttemptSpan::new("begin").entered();
		let provider = match self.inner.registry.lookup(provider) {
			Ok(provider) => provider.clone(),
			Err(e) => {
				tracing::warn!(error = %e, "Login requested for an unregistered provider.");
				obs::record_attempt_outcome(None, AttemptOutcome::Failure);
				callbacks.fail(e.into());

				return None;
			},
		};
		let kind = provider.kind();

		guard.record_kind(kind);
		obs::record_attempt_outcome(Some(kind), AttemptOutcome::Attempt);

		let tag = match self.open(&provider, scope.clone(), callbacks) {
			Ok(tag) => tag,
			Err((callbacks, error)) => {
				tracing::warn!(provider = %provider.name(), error = %error, "Login attempt refused.");
				obs::record_attempt_outcome(Some(kind), AttemptOutcome::Failure);
				callbacks.fail(error);

				return None;
			},
		};

		guard.record_tag(tag);
		tracing::debug!(provider = %provider.name(), "Dispatching login attempt.");

		let request = LoginRequest {
			tag,
			scope,
			host,
			connection: self.inner.connection.clone(),
			sink: self.sink(),
		};

		if let Err(error) = provider.start_login(request) {
			self.finish(tag, AttemptPhase::AwaitingProvider, Outcome::Failure(error));
		}

		Some(tag)
	}

	/// Routes `result` to the pending attempt registered under `tag`.
	pub fn deliver(&self, tag: CorrelationTag, result: RawProviderResult) -> Delivery {
		let guard = AttemptSpan::new("deliver").entered();

		guard.record_tag(tag);

		let Some((provider, phase)) = self.lookup(tag) else {
			tracing::warn!(%tag, channel = result.channel(), "No pending attempt; dropping result.");
			obs::record_attempt_outcome(None, AttemptOutcome::Dropped);

			return Delivery::Dropped;
		};
		let kind = provider.kind();

		guard.record_kind(kind);

		let is_backend = matches!(result, RawProviderResult::Backend(_));

		match phase {
			AttemptPhase::AwaitingExchange if !is_backend => {
				tracing::warn!(%tag, "Duplicate provider result while awaiting exchange; dropping.");
				obs::record_attempt_outcome(Some(kind), AttemptOutcome::Dropped);

				return Delivery::Dropped;
			},
			AttemptPhase::AwaitingProvider if is_backend => {
				let error =
					AuthError::malformed("Backend response arrived before the provider finished.");

				return self.finish(tag, phase, Outcome::Failure(error));
			},
			_ => (),
		}

		if !provider.can_handle(&result) {
			let error = AuthError::malformed(format!(
				"Provider `{}` cannot handle a result from the {} channel.",
				provider.name(),
				result.channel()
			));

			return self.finish(tag, phase, Outcome::Failure(error));
		}

		match provider.extract_outcome(result) {
			Extraction::Outcome(outcome) => self.finish(tag, phase, outcome),
			Extraction::Exchange(grant) => self.exchange(tag, provider, grant),
		}
	}

	/// In-process result channel: maps `request_code` to a tag and delivers.
	///
	/// Request codes outside this correlator's tag range belong to someone else
	/// and are dropped.
	pub fn on_in_process_result(
		&self,
		request_code: i32,
		result_code: i32,
		payload: Value,
	) -> Delivery {
		let tag = CorrelationTag::from_request_code(request_code)
			.filter(|tag| self.inner.tag_range.contains(tag.get()));

		match tag {
			Some(tag) => self.deliver(
				tag,
				RawProviderResult::in_process(ResultCode::from_raw(result_code), payload),
			),
			None => {
				tracing::debug!(request_code, "Request code is not a correlation tag; ignoring.");

				Delivery::Dropped
			},
		}
	}

	/// Takes the callback bridge's content, if any, and routes it to the pending
	/// external attempt.
	///
	/// Returns `None` when the bridge is empty, or when its content belongs to an
	/// external attempt owned by another correlator sharing the bridge.
	pub fn poll_bridge(&self) -> Option<Delivery> {
		let _guard = AttemptSpan::new("poll_bridge").entered();
		let (owned, tag) = {
			let state = self.inner.state.lock();
			let external =
				state.attempts.iter().find(|(_, attempt)| attempt.kind().uses_bridge());

			(
				external.is_some(),
				external
					.filter(|(_, attempt)| attempt.phase == AttemptPhase::AwaitingProvider)
					.map(|(tag, _)| *tag),
			)
		};
		let response = if owned {
			self.inner.bridge.take_if_ready()?
		} else {
			self.inner.bridge.take_unclaimed()?
		};

		match tag {
			Some(tag) => Some(self.deliver(tag, RawProviderResult::External(response))),
			None => {
				tracing::warn!(
					status = ?response.status,
					"External response with no pending external attempt; dropping."
				);
				obs::record_attempt_outcome(Some(ProviderKind::ExternalApp), AttemptOutcome::Dropped);

				Some(Delivery::Dropped)
			},
		}
	}

	/// Abandons every pending attempt without running any callback.
	///
	/// Returns the number of attempts abandoned.
	pub fn abandon_all(&self) -> usize {
		let abandoned = std::mem::take(&mut self.inner.state.lock().attempts);

		if abandoned.values().any(|attempt| attempt.kind().uses_bridge()) {
			self.inner.bridge.release();
		}

		obs::record_pending(0);

		for (tag, attempt) in &abandoned {
			tracing::debug!(%tag, provider = %attempt.provider.name(), "Login attempt abandoned.");
			obs::record_attempt_outcome(Some(attempt.kind()), AttemptOutcome::Abandoned);
		}

		abandoned.len()
	}

	/// Pending attempts in tag order.
	pub fn pending(&self) -> Vec<PendingAttempt> {
		self.inner.state.lock().attempts.iter().map(|(tag, attempt)| attempt.view(*tag)).collect()
	}

	/// Returns `true` if `tag` belongs to a pending attempt.
	pub fn is_pending(&self, tag: CorrelationTag) -> bool {
		self.inner.state.lock().attempts.contains_key(&tag)
	}

	fn open(
		&self,
		provider: &Arc<dyn Provider>,
		scope: ScopeSet,
		callbacks: LoginCallbacks,
	) -> Result<CorrelationTag, (LoginCallbacks, AuthError)> {
		let mut state = self.inner.state.lock();
		let state = &mut *state;
		let claims_bridge = provider.kind().uses_bridge();

		if claims_bridge && !self.inner.bridge.try_claim() {
			return Err((
				callbacks,
				AuthError::unavailable("An external application login is already in progress."),
			));
		}

		let attempts = &state.attempts;
		let Some(tag) = state.tags.allocate(|tag| attempts.contains_key(&tag)) else {
			if claims_bridge {
				self.inner.bridge.release();
			}

			return Err((callbacks, AuthError::unavailable("No correlation tag is available.")));
		};

		state.attempts.insert(tag, Attempt::new(provider.clone(), scope, callbacks));
		obs::record_pending(state.attempts.len());

		Ok(tag)
	}

	fn lookup(&self, tag: CorrelationTag) -> Option<(Arc<dyn Provider>, AttemptPhase)> {
		self.inner
			.state
			.lock()
			.attempts
			.get(&tag)
			.map(|attempt| (attempt.provider.clone(), attempt.phase))
	}

	fn exchange(
		&self,
		tag: CorrelationTag,
		provider: Arc<dyn Provider>,
		grant: ProviderGrant,
	) -> Delivery {
		let Some(exchange) = self.inner.exchange.clone() else {
			let error = AuthError::unavailable(format!(
				"Provider `{}` needs a grant exchange but none is configured.",
				provider.name()
			));

			return self.finish(tag, AttemptPhase::AwaitingProvider, Outcome::Failure(error));
		};
		let scope = {
			let mut state = self.inner.state.lock();
			let Some(attempt) = state
				.attempts
				.get_mut(&tag)
				.filter(|attempt| attempt.phase == AttemptPhase::AwaitingProvider)
			else {
				return Delivery::Dropped;
			};

			attempt.phase = AttemptPhase::AwaitingExchange;

			attempt.scope.clone()
		};

		tracing::debug!(
			%tag,
			grant = grant.as_str(),
			fingerprint = %grant.secret().fingerprint(),
			"Handing provider grant to the exchanger."
		);

		let request = ExchangeRequest {
			tag,
			provider: provider.name().clone(),
			kind: provider.kind(),
			grant,
			scope,
		};

		exchange.exchange(request, self.sink());

		Delivery::Exchanging { tag }
	}

	fn finish(&self, tag: CorrelationTag, phase: AttemptPhase, outcome: Outcome) -> Delivery {
		let attempt = {
			let mut state = self.inner.state.lock();
			let current = state.attempts.get(&tag).is_some_and(|attempt| attempt.phase == phase);
			let removed = if current { state.attempts.remove(&tag) } else { None };

			if removed.as_ref().is_some_and(|attempt| attempt.kind().uses_bridge()) {
				self.inner.bridge.release();
			}

			obs::record_pending(state.attempts.len());

			removed
		};
		let Some(attempt) = attempt else {
			tracing::warn!(%tag, "Attempt finished concurrently; dropping outcome.");
			obs::record_attempt_outcome(None, AttemptOutcome::Dropped);

			return Delivery::Dropped;
		};
		let kind = attempt.kind();
		let success = outcome.is_success();

		match &outcome {
			Outcome::Success(_) => {
				tracing::debug!(%tag, provider = %attempt.provider.name(), "Login succeeded.");
				obs::record_attempt_outcome(Some(kind), AttemptOutcome::Success);
			},
			Outcome::Failure(error) => {
				tracing::debug!(
					%tag,
					provider = %attempt.provider.name(),
					kind = %error.kind,
					"Login failed."
				);
				obs::record_attempt_outcome(Some(kind), AttemptOutcome::Failure);
			},
		}

		attempt.callbacks.complete(outcome);

		Delivery::Completed { tag, success }
	}
}
impl Debug for AttemptCorrelator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AttemptCorrelator")
			.field("registry", &self.inner.registry)
			.field("pending", &self.pending())
			.finish()
	}
}

pub(crate) struct Inner {
	registry: ProviderRegistry,
	connection: Arc<ConnectionConfig>,
	bridge: Arc<CallbackBridge>,
	exchange: Option<Arc<dyn GrantExchange>>,
	tag_range: TagRange,
	state: Mutex<State>,
}

impl Drop for Inner {
	fn drop(&mut self) {
		if self.state.get_mut().attempts.values().any(|attempt| attempt.kind().uses_bridge()) {
			self.bridge.release();
		}
	}
}

struct State {
	tags: TagAllocator,
	attempts: BTreeMap<CorrelationTag, Attempt>,
}
