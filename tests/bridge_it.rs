mod support;

// std
use std::sync::Arc;
// crates.io
use login_broker::{
	auth::ScopeSet,
	bridge::{CallbackBridge, ExternalEntryPoint},
	correlator::{AttemptPhase, Delivery},
	error::AuthErrorKind,
	outcome::{ExternalResponse, ExternalStatus},
	provider::{HostContext, ProviderKind},
};
// self
use support::*;

fn kinds(recorder: &Recorder) -> Vec<AuthErrorKind> {
	recorder.failures().iter().map(|error| error.kind).collect()
}

#[test]
fn second_external_attempt_is_refused_while_one_is_pending() {
	let fixture = Fixture::default();
	let correlator = fixture.correlator();
	let first = Recorder::default();
	let second = Recorder::default();
	let tag = correlator
		.begin(EXTERNAL, ScopeSet::default(), HostContext::empty(), first.callbacks())
		.expect("First external attempt should open.");

	assert_eq!(fixture.launcher.launches(), 1);
	assert_eq!(
		correlator.begin(EXTERNAL, ScopeSet::default(), HostContext::empty(), second.callbacks()),
		None
	);
	assert_eq!(kinds(&second), [AuthErrorKind::ProviderUnavailable]);
	assert_eq!(first.calls(), 0);
	assert_eq!(fixture.launcher.launches(), 1);

	let pending = correlator.pending();

	assert_eq!(pending.len(), 1);
	assert_eq!(pending[0].tag, tag);
	assert_eq!(pending[0].kind, ProviderKind::ExternalApp);
	assert_eq!(pending[0].phase, AttemptPhase::AwaitingProvider);
}

#[test]
fn entry_point_cancel_reaches_the_pending_external_attempt() {
	let fixture = Fixture::default();
	let correlator = fixture.correlator();
	let recorder = Recorder::default();
	let tag = correlator
		.begin(EXTERNAL, ScopeSet::default(), HostContext::empty(), recorder.callbacks())
		.expect("External attempt should open.");
	let status = "ERR_USER_CANCEL".parse::<ExternalStatus>().expect("Status name should parse.");

	ExternalEntryPoint::new(fixture.bridge.clone()).respond_with(ExternalResponse::new(status));

	assert_eq!(correlator.poll_bridge(), Some(Delivery::Completed { tag, success: false }));
	assert_eq!(kinds(&recorder), [AuthErrorKind::UserCancelled]);
	assert_eq!(correlator.poll_bridge(), None);
	assert!(!correlator.is_pending(tag));
}

#[test]
fn raw_transport_codes_map_through_the_entry_point() {
	let fixture = Fixture::default();
	let correlator = fixture.correlator();
	let recorder = Recorder::default();

	correlator.begin(EXTERNAL, ScopeSet::default(), HostContext::empty(), recorder.callbacks());
	ExternalEntryPoint::new(fixture.bridge.clone()).respond(
		ExternalStatus::ERR_AUTH_DENIED,
		None,
		Some("The user refused.".into()),
	);
	correlator.poll_bridge();

	let failures = recorder.failures();

	assert_eq!(failures.len(), 1);
	assert_eq!(failures[0].kind, AuthErrorKind::Denied);
	assert_eq!(failures[0].message, "The user refused.");
}

#[test]
fn only_the_last_deposit_survives() {
	let bridge = Arc::new(CallbackBridge::new());

	ExternalEntryPoint::new(bridge.clone()).respond(0, Some("first".into()), None);
	ExternalEntryPoint::new(bridge.clone()).respond(0, Some("second".into()), None);

	assert_eq!(bridge.take_if_ready(), Some(ExternalResponse::success("second")));
	assert_eq!(bridge.take_if_ready(), None);
}

#[test]
fn stale_bridge_content_is_discarded_when_an_attempt_opens() {
	let fixture = Fixture::default();
	let correlator = fixture.correlator();
	let recorder = Recorder::default();

	fixture.bridge.deposit(ExternalResponse::success("left-over"));

	let tag = correlator
		.begin(EXTERNAL, ScopeSet::default(), HostContext::empty(), recorder.callbacks())
		.expect("External attempt should open.");

	assert!(!fixture.bridge.is_ready());
	assert_eq!(correlator.poll_bridge(), None);
	assert!(correlator.is_pending(tag));
	assert_eq!(recorder.calls(), 0);
}

#[test]
fn responses_without_a_pending_external_attempt_are_dropped() {
	let fixture = Fixture::default();
	let correlator = fixture.correlator();
	let recorder = Recorder::default();
	let embedded = correlator
		.begin(EMBEDDED, ScopeSet::default(), HostContext::empty(), recorder.callbacks())
		.expect("Embedded attempt should open.");

	assert_eq!(correlator.poll_bridge(), None);

	fixture.bridge.deposit(ExternalResponse::success("orphan"));

	assert_eq!(correlator.poll_bridge(), Some(Delivery::Dropped));
	assert!(!fixture.bridge.is_ready());
	assert!(correlator.is_pending(embedded));
	assert_eq!(recorder.calls(), 0);
}

#[test]
fn abandoned_external_attempt_frees_the_slot() {
	let fixture = Fixture::default();
	let correlator = fixture.correlator();
	let recorder = Recorder::default();

	correlator.begin(EXTERNAL, ScopeSet::default(), HostContext::empty(), recorder.callbacks());

	assert_eq!(correlator.abandon_all(), 1);

	fixture.bridge.deposit(ExternalResponse::new(ExternalStatus::UserCancelled));

	assert_eq!(correlator.poll_bridge(), Some(Delivery::Dropped));

	let tag = correlator
		.begin(EXTERNAL, ScopeSet::default(), HostContext::empty(), recorder.callbacks())
		.expect("A new external attempt should open after abandonment.");

	assert!(correlator.is_pending(tag));
	assert_eq!(recorder.calls(), 0);
}

#[test]
fn separate_bridges_isolate_correlators() {
	let left = Fixture::default();
	let right = Fixture::default();
	let left_correlator = left.correlator();
	let right_correlator = right.correlator();
	let left_recorder = Recorder::default();
	let right_recorder = Recorder::default();

	left_correlator.begin(
		EXTERNAL,
		ScopeSet::default(),
		HostContext::empty(),
		left_recorder.callbacks(),
	);
	right_correlator.begin(
		EXTERNAL,
		ScopeSet::default(),
		HostContext::empty(),
		right_recorder.callbacks(),
	);
	ExternalEntryPoint::new(left.bridge.clone()).respond(ExternalStatus::ERR_USER_CANCEL, None, None);

	assert_eq!(right_correlator.poll_bridge(), None);
	assert!(matches!(left_correlator.poll_bridge(), Some(Delivery::Completed { success: false, .. })));
	assert_eq!(kinds(&left_recorder), [AuthErrorKind::UserCancelled]);
	assert_eq!(right_recorder.calls(), 0);
}

#[test]
fn correlators_sharing_a_bridge_allow_one_external_attempt() {
	let fixture = Fixture::default();
	let first = fixture.correlator();
	let second = fixture.correlator();
	let first_recorder = Recorder::default();
	let second_recorder = Recorder::default();
	let tag = first
		.begin(EXTERNAL, ScopeSet::default(), HostContext::empty(), first_recorder.callbacks())
		.expect("First external attempt should open.");

	ExternalEntryPoint::new(fixture.bridge.clone()).respond(
		ExternalStatus::ERR_AUTH_DENIED,
		None,
		None,
	);

	assert_eq!(
		second.begin(
			EXTERNAL,
			ScopeSet::default(),
			HostContext::empty(),
			second_recorder.callbacks()
		),
		None
	);
	assert_eq!(kinds(&second_recorder), [AuthErrorKind::ProviderUnavailable]);
	assert_eq!(second.poll_bridge(), None);
	assert!(fixture.bridge.is_ready());
	assert_eq!(first.poll_bridge(), Some(Delivery::Completed { tag, success: false }));
	assert_eq!(kinds(&first_recorder), [AuthErrorKind::Denied]);

	let retry = Recorder::default();

	assert!(
		second
			.begin(EXTERNAL, ScopeSet::default(), HostContext::empty(), retry.callbacks())
			.is_some()
	);
	assert_eq!(retry.calls(), 0);
}

#[test]
fn dropping_a_correlator_releases_its_bridge_claim() {
	let fixture = Fixture::default();
	let recorder = Recorder::default();
	let correlator = fixture.correlator();

	correlator.begin(EXTERNAL, ScopeSet::default(), HostContext::empty(), recorder.callbacks());

	assert!(fixture.bridge.is_claimed());

	drop(correlator);

	assert!(!fixture.bridge.is_claimed());
	assert!(
		fixture
			.correlator()
			.begin(EXTERNAL, ScopeSet::default(), HostContext::empty(), recorder.callbacks())
			.is_some()
	);
}
