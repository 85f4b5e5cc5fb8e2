//! Walks through the three provider channels against a simulated host:
//!
//! 1. An embedded authorization surface whose redirect is reported in-process.
//! 2. A first-party SDK whose provider token is exchanged with the identity backend.
//! 3. An external application answering through the callback bridge.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use parking_lot::Mutex;
use serde_json::json;
// self
use login_broker::{
	auth::{ProviderName, ScopeSet},
	bridge::{CallbackBridge, ExternalEntryPoint},
	config::ConnectionConfig,
	correlator::{AttemptCorrelator, LoginCallbacks, ResultSink},
	error::AuthError,
	exchange::{ExchangeRequest, ProviderGrant},
	outcome::{BackendResponse, ExternalStatus, RawProviderResult, ResultCode, SdkResponse},
	provider::{
		AppLauncher, AuthorizationRequest, EmbeddedFlowProvider, EmbeddedSurface,
		ExternalAppProvider, HostContext, LoginRequest, SdkClient, SdkProvider,
	},
	registry::ProviderRegistry,
	url::Url,
};

/// Stands in for the in-process browser: keeps the request so `main` can play the redirect.
#[derive(Clone, Default)]
struct DemoSurface(Arc<Mutex<Option<(AuthorizationRequest, i32)>>>);
impl EmbeddedSurface for DemoSurface {
	fn present(
		&self,
		authorization: AuthorizationRequest,
		request: &LoginRequest,
	) -> Result<(), AuthError> {
		println!("embedded: loading {}", authorization.authorize_url);

		*self.0.lock() = Some((authorization, request.request_code()));

		Ok(())
	}
}

/// SDK that finishes immediately through the in-process channel.
struct DemoSdk;
impl SdkClient for DemoSdk {
	fn launch(&self, request: &LoginRequest) -> Result<(), AuthError> {
		println!("sdk: requesting {:?}", request.scope.normalized());

		let payload = SdkResponse::Success { access_token: "fb-access".into(), id_token: None };

		request.sink.deliver(
			request.tag,
			RawProviderResult::in_process(ResultCode::Ok, payload.into_payload()),
		);

		Ok(())
	}
}

struct DemoLauncher;
impl AppLauncher for DemoLauncher {
	fn launch(&self, app_id: &str, _request: &LoginRequest) -> Result<(), AuthError> {
		println!("external: switching to {app_id}");

		Ok(())
	}
}

fn backend(request: ExchangeRequest, sink: ResultSink) {
	println!("backend: exchanging {} from {}", request.grant.as_str(), request.provider);

	let user = match &request.grant {
		ProviderGrant::AuthorizationCode { .. } =>
			json!({ "id": "user-code", "phoneNumber": "+10000000000" }),
		ProviderGrant::ProviderToken { .. } =>
			json!({ "id": "user-sdk", "email": "jane@example.com" }),
	};

	sink.deliver(
		request.tag,
		RawProviderResult::Backend(BackendResponse::Token(json!({
			"access_token": format!("broker-{}", request.tag),
			"expires_in": 3600,
			"user": user,
		}))),
	);
}

fn callbacks(label: &'static str) -> LoginCallbacks {
	LoginCallbacks::new(
		move |token| println!("{label}: signed in as {} until {:?}", token.user.id, token.expires_at),
		move |error| println!("{label}: {error}"),
	)
}

fn main() -> Result<()> {
	color_eyre::install()?;

	let connection = ConnectionConfig::builder()
		.backend(Url::parse("https://auth.example.com")?)
		.client_id("demo-client")
		.redirect_scheme("demo://callback")
		.build()?;
	let surface = DemoSurface::default();
	let registry = ProviderRegistry::new()
		.with(
			EmbeddedFlowProvider::new(ProviderName::new("embedded")?, surface.clone())
				.with_default_scope(ScopeSet::new(["openid", "email"])?),
		)?
		.with(SdkProvider::new(ProviderName::new("facebook")?, DemoSdk))?
		.with(ExternalAppProvider::new(
			ProviderName::new("wechat")?,
			"com.tencent.mm",
			DemoLauncher,
		))?;
	let bridge = Arc::new(CallbackBridge::new());
	let correlator = AttemptCorrelator::builder(registry, connection)
		.bridge(bridge.clone())
		.exchange(backend)
		.build();

	correlator.begin("embedded", ScopeSet::default(), HostContext::empty(), callbacks("embedded"));

	if let Some((authorization, request_code)) = surface.0.lock().take() {
		let mut redirect = authorization.redirect_uri.clone();

		redirect
			.query_pairs_mut()
			.append_pair("code", "embedded-code")
			.append_pair("state", &authorization.state);

		let delivery = correlator.on_in_process_result(
			request_code,
			ResultCode::RAW_OK,
			authorization.redirect_payload(&redirect),
		);

		println!("embedded: {delivery:?}");
	}

	correlator.begin("facebook", ScopeSet::default(), HostContext::empty(), callbacks("sdk"));
	correlator.begin("wechat", ScopeSet::default(), HostContext::empty(), callbacks("external"));
	ExternalEntryPoint::new(bridge).respond(ExternalStatus::ERR_OK, Some("wx-code".into()), None);

	println!("external: {:?}", correlator.poll_bridge());

	correlator.begin("google", ScopeSet::default(), HostContext::empty(), callbacks("google"));

	println!("pending after demo: {}", correlator.pending().len());

	Ok(())
}
