#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use login_broker::{
	auth::{AuthToken, ProviderName, ScopeSet},
	bridge::CallbackBridge,
	config::ConnectionConfig,
	correlator::{AttemptCorrelator, AttemptCorrelatorBuilder, LoginCallbacks, ResultSink},
	error::AuthError,
	exchange::{ExchangeRequest, GrantExchange},
	outcome::RawProviderResult,
	provider::{
		AppLauncher, AuthorizationRequest, EmbeddedFlowProvider, EmbeddedSurface,
		ExternalAppProvider, LoginRequest, SdkClient, SdkProvider,
	},
	registry::ProviderRegistry,
	url::Url,
};
use parking_lot::Mutex;

pub const EMBEDDED: &str = "embedded";
pub const SDK: &str = "facebook";
pub const EXTERNAL: &str = "external";

pub fn name(value: &str) -> ProviderName {
	ProviderName::new(value).expect("Provider name fixture should be valid.")
}

pub fn scope<const N: usize>(scopes: [&str; N]) -> ScopeSet {
	ScopeSet::new(scopes).expect("Scope fixture should be valid.")
}

pub fn connection() -> ConnectionConfig {
	ConnectionConfig::builder()
		.backend(Url::parse("https://auth.example.com").expect("Backend fixture should parse."))
		.client_id("demo-client")
		.redirect_scheme("demo://callback")
		.build()
		.expect("Connection fixture should be valid.")
}

/// Records every callback an attempt fires.
#[derive(Clone, Default)]
pub struct Recorder {
	successes: Arc<Mutex<Vec<AuthToken>>>,
	failures: Arc<Mutex<Vec<AuthError>>>,
}
impl Recorder {
	pub fn callbacks(&self) -> LoginCallbacks {
		let successes = self.successes.clone();
		let failures = self.failures.clone();

		LoginCallbacks::new(
			move |token| successes.lock().push(token),
			move |error| failures.lock().push(error),
		)
	}

	pub fn successes(&self) -> Vec<AuthToken> {
		self.successes.lock().clone()
	}

	pub fn failures(&self) -> Vec<AuthError> {
		self.failures.lock().clone()
	}

	pub fn calls(&self) -> usize {
		self.successes.lock().len() + self.failures.lock().len()
	}
}

/// Embedded surface that keeps every presented authorization request.
#[derive(Clone, Default)]
pub struct RecordingSurface(Arc<Mutex<Vec<(AuthorizationRequest, i32)>>>);
impl RecordingSurface {
	pub fn presented(&self) -> Vec<(AuthorizationRequest, i32)> {
		self.0.lock().clone()
	}
}
impl EmbeddedSurface for RecordingSurface {
	fn present(
		&self,
		authorization: AuthorizationRequest,
		request: &LoginRequest,
	) -> Result<(), AuthError> {
		self.0.lock().push((authorization, request.request_code()));

		Ok(())
	}
}

/// SDK client that keeps the request codes it was launched with.
#[derive(Clone, Default)]
pub struct RecordingSdk(Arc<Mutex<Vec<i32>>>);
impl RecordingSdk {
	pub fn launches(&self) -> Vec<i32> {
		self.0.lock().clone()
	}
}
impl SdkClient for RecordingSdk {
	fn launch(&self, request: &LoginRequest) -> Result<(), AuthError> {
		self.0.lock().push(request.request_code());

		Ok(())
	}
}

/// Launcher that counts launches.
#[derive(Clone, Default)]
pub struct RecordingLauncher(Arc<Mutex<usize>>);
impl RecordingLauncher {
	pub fn launches(&self) -> usize {
		*self.0.lock()
	}
}
impl AppLauncher for RecordingLauncher {
	fn launch(&self, _app_id: &str, _request: &LoginRequest) -> Result<(), AuthError> {
		*self.0.lock() += 1;

		Ok(())
	}
}

/// Collaborators behind the standard three-provider registry.
#[derive(Clone, Default)]
pub struct Fixture {
	pub surface: RecordingSurface,
	pub sdk: RecordingSdk,
	pub launcher: RecordingLauncher,
	pub bridge: Arc<CallbackBridge>,
}
impl Fixture {
	pub fn registry(&self) -> ProviderRegistry {
		let mut registry = ProviderRegistry::new();

		registry
			.register(EmbeddedFlowProvider::new(name(EMBEDDED), self.surface.clone()))
			.expect("Embedded provider should register.");
		registry
			.register(SdkProvider::new(name(SDK), self.sdk.clone()))
			.expect("SDK provider should register.");
		registry
			.register(ExternalAppProvider::new(
				name(EXTERNAL),
				"com.example.wallet",
				self.launcher.clone(),
			))
			.expect("External provider should register.");

		registry
	}

	pub fn builder(&self) -> AttemptCorrelatorBuilder {
		AttemptCorrelator::builder(self.registry(), connection()).bridge(self.bridge.clone())
	}

	pub fn correlator(&self) -> AttemptCorrelator {
		self.builder().build()
	}
}

/// Exchanger that parks requests until the test answers them.
#[derive(Clone, Default)]
pub struct ParkedExchange(Arc<Mutex<Vec<(ExchangeRequest, ResultSink)>>>);
impl ParkedExchange {
	pub fn parked(&self) -> usize {
		self.0.lock().len()
	}

	pub fn take(&self) -> (ExchangeRequest, ResultSink) {
		self.0.lock().pop().expect("An exchange request should be parked.")
	}

	pub fn answer(&self, result: RawProviderResult) {
		let (request, sink) = self.take();

		sink.deliver(request.tag, result);
	}
}
impl GrantExchange for ParkedExchange {
	fn exchange(&self, request: ExchangeRequest, sink: ResultSink) {
		self.0.lock().push((request, sink));
	}
}
