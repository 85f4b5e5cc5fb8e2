mod support;

// crates.io
use login_broker::{
	auth::ScopeSet,
	correlator::{AttemptPhase, Delivery, ResultSink},
	error::AuthErrorKind,
	exchange::{ExchangeRequest, ProviderGrant},
	outcome::{BackendResponse, ExternalResponse, RawProviderResult, ResultCode, SdkResponse},
	provider::{HostContext, ProviderFailure, ProviderKind},
};
use serde_json::json;
// self
use support::*;

fn sdk_success() -> serde_json::Value {
	SdkResponse::Success { access_token: "fb-token".into(), id_token: None }.into_payload()
}

#[test]
fn sdk_token_is_exchanged_before_completion() {
	let fixture = Fixture::default();
	let exchange = ParkedExchange::default();
	let correlator = fixture.builder().exchange(exchange.clone()).build();
	let recorder = Recorder::default();
	let tag = correlator
		.begin(SDK, scope(["email"]), HostContext::empty(), recorder.callbacks())
		.expect("SDK attempt should open.");

	assert_eq!(fixture.sdk.launches(), [tag.request_code()]);
	assert_eq!(
		correlator.on_in_process_result(tag.request_code(), ResultCode::RAW_OK, sdk_success()),
		Delivery::Exchanging { tag }
	);
	assert_eq!(recorder.calls(), 0);
	assert_eq!(correlator.pending()[0].phase, AttemptPhase::AwaitingExchange);

	let (request, sink) = exchange.take();

	assert_eq!(request.tag, tag);
	assert_eq!(request.kind, ProviderKind::FirstPartySdk);
	assert_eq!(request.provider.as_ref(), SDK);
	assert_eq!(request.scope, scope(["email"]));
	assert!(matches!(
		request.grant,
		ProviderGrant::ProviderToken { ref access_token, id_token: None }
			if access_token.expose() == "fb-token"
	));

	let backend = json!({
		"access_token": "broker-token",
		"refresh_token": "refresh",
		"expires_in": 3600,
		"user": { "sub": 42, "email": "jane@example.com" }
	});

	assert_eq!(
		sink.deliver(tag, RawProviderResult::Backend(BackendResponse::Token(backend))),
		Delivery::Completed { tag, success: true }
	);

	let successes = recorder.successes();

	assert_eq!(successes.len(), 1);
	assert_eq!(successes[0].access_token.expose(), "broker-token");
	assert_eq!(successes[0].user.id, "42");
	assert_eq!(successes[0].user.email.as_deref(), Some("jane@example.com"));
	assert!(successes[0].expires_at.is_some());
	assert!(!correlator.is_pending(tag));
}

#[test]
fn backend_failures_are_classified() {
	let fixture = Fixture::default();
	let exchange = ParkedExchange::default();
	let correlator = fixture.builder().exchange(exchange.clone()).build();
	let recorder = Recorder::default();
	let tag = correlator
		.begin(SDK, ScopeSet::default(), HostContext::empty(), recorder.callbacks())
		.expect("SDK attempt should open.");

	correlator.on_in_process_result(tag.request_code(), ResultCode::RAW_OK, sdk_success());
	exchange.answer(RawProviderResult::Backend(BackendResponse::Failure(
		ProviderFailure::new().with_http_status(503).with_description("Backend is down."),
	)));

	let failures = recorder.failures();

	assert_eq!(failures.len(), 1);
	assert_eq!(failures[0].kind, AuthErrorKind::NetworkFailure);
	assert!(failures[0].message.contains("Backend is down."));
}

#[test]
fn grants_without_an_exchanger_fail_as_unavailable() {
	let fixture = Fixture::default();
	let correlator = fixture.correlator();
	let recorder = Recorder::default();
	let tag = correlator
		.begin(SDK, ScopeSet::default(), HostContext::empty(), recorder.callbacks())
		.expect("SDK attempt should open.");

	assert_eq!(
		correlator.on_in_process_result(tag.request_code(), ResultCode::RAW_OK, sdk_success()),
		Delivery::Completed { tag, success: false }
	);
	assert_eq!(
		recorder.failures().iter().map(|error| error.kind).collect::<Vec<_>>(),
		[AuthErrorKind::ProviderUnavailable]
	);
}

#[test]
fn provider_results_during_exchange_are_dropped() {
	let fixture = Fixture::default();
	let exchange = ParkedExchange::default();
	let correlator = fixture.builder().exchange(exchange.clone()).build();
	let recorder = Recorder::default();
	let tag = correlator
		.begin(SDK, ScopeSet::default(), HostContext::empty(), recorder.callbacks())
		.expect("SDK attempt should open.");

	correlator.on_in_process_result(tag.request_code(), ResultCode::RAW_OK, sdk_success());

	assert_eq!(
		correlator.on_in_process_result(tag.request_code(), ResultCode::RAW_CANCELLED, json!(null)),
		Delivery::Dropped
	);
	assert_eq!(exchange.parked(), 1);
	assert_eq!(recorder.calls(), 0);

	exchange.answer(RawProviderResult::Backend(BackendResponse::Token(
		json!({ "accessToken": "t", "user": { "id": "7" } }),
	)));

	assert_eq!(recorder.successes().len(), 1);
}

#[test]
fn backend_result_before_provider_result_is_malformed() {
	let fixture = Fixture::default();
	let correlator = fixture.builder().exchange(ParkedExchange::default()).build();
	let recorder = Recorder::default();
	let tag = correlator
		.begin(SDK, ScopeSet::default(), HostContext::empty(), recorder.callbacks())
		.expect("SDK attempt should open.");
	let delivery = correlator.deliver(
		tag,
		RawProviderResult::Backend(BackendResponse::Token(json!({ "accessToken": "t" }))),
	);

	assert_eq!(delivery, Delivery::Completed { tag, success: false });
	assert_eq!(
		recorder.failures().iter().map(|error| error.kind).collect::<Vec<_>>(),
		[AuthErrorKind::MalformedResponse]
	);
}

#[test]
fn external_code_is_exchanged_synchronously() {
	let fixture = Fixture::default();
	let correlator = fixture
		.builder()
		.exchange(|request: ExchangeRequest, sink: ResultSink| {
			let ProviderGrant::AuthorizationCode { code, code_verifier: None } = request.grant else {
				panic!("External apps should yield a bare authorization code.");
			};

			assert_eq!(code.expose(), "wx-code");

			sink.deliver(
				request.tag,
				RawProviderResult::Backend(BackendResponse::Token(json!({
					"accessToken": "broker-token",
					"user": { "userId": "wx-user", "phoneNumber": "+10000000000" }
				}))),
			);
		})
		.build();
	let recorder = Recorder::default();
	let tag = correlator
		.begin(EXTERNAL, ScopeSet::default(), HostContext::empty(), recorder.callbacks())
		.expect("External attempt should open.");

	fixture.bridge.deposit(ExternalResponse::success("wx-code"));

	// The exchanger answered before `deliver` returned, so the attempt is already gone.
	assert_eq!(correlator.poll_bridge(), Some(Delivery::Exchanging { tag }));
	assert!(!correlator.is_pending(tag));

	let successes = recorder.successes();

	assert_eq!(successes.len(), 1);
	assert_eq!(successes[0].user.id, "wx-user");
	assert_eq!(successes[0].user.phone_number.as_deref(), Some("+10000000000"));
}

#[test]
fn embedded_code_redirect_carries_the_pkce_verifier() {
	let fixture = Fixture::default();
	let exchange = ParkedExchange::default();
	let correlator = fixture.builder().exchange(exchange.clone()).build();
	let recorder = Recorder::default();
	let tag = correlator
		.begin(EMBEDDED, scope(["openid", "email"]), HostContext::empty(), recorder.callbacks())
		.expect("Embedded attempt should open.");
	let (authorization, request_code) =
		fixture.surface.presented().pop().expect("The surface should have been presented.");
	let mut redirect = authorization.redirect_uri.clone();

	redirect
		.query_pairs_mut()
		.append_pair("code", "auth-code")
		.append_pair("state", &authorization.state);

	let payload = authorization.redirect_payload(&redirect);

	assert_eq!(
		correlator.on_in_process_result(request_code, ResultCode::RAW_OK, payload),
		Delivery::Exchanging { tag }
	);

	let (request, _sink) = exchange.take();

	assert!(matches!(
		request.grant,
		ProviderGrant::AuthorizationCode { ref code, code_verifier: Some(_) }
			if code.expose() == "auth-code"
	));
}

#[test]
fn exchange_answer_after_abandon_is_dropped() {
	let fixture = Fixture::default();
	let exchange = ParkedExchange::default();
	let correlator = fixture.builder().exchange(exchange.clone()).build();
	let recorder = Recorder::default();
	let tag = correlator
		.begin(SDK, ScopeSet::default(), HostContext::empty(), recorder.callbacks())
		.expect("SDK attempt should open.");

	correlator.on_in_process_result(tag.request_code(), ResultCode::RAW_OK, sdk_success());
	correlator.abandon_all();

	let (request, sink) = exchange.take();

	assert_eq!(
		sink.deliver(
			request.tag,
			RawProviderResult::Backend(BackendResponse::Token(json!({ "accessToken": "t" })))
		),
		Delivery::Dropped
	);
	assert_eq!(recorder.calls(), 0);

	drop(correlator);

	assert!(!sink.is_connected());
	assert_eq!(
		sink.deliver(tag, RawProviderResult::Backend(BackendResponse::Token(json!({})))),
		Delivery::Dropped
	);
}
