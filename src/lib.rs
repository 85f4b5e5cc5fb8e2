//! Provider-agnostic login orchestration for native apps: correlate embedded, SDK, and
//! external-app login attempts and normalize their results into one token model.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod bridge;
pub mod config;
pub mod correlator;
pub mod error;
pub mod exchange;
pub mod normalize;
pub mod obs;
pub mod outcome;
pub mod provider;
pub mod registry;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{ProviderName, ScopeSet},
		config::ConnectionConfig,
		correlator::{CorrelationTag, ResultSink},
		error::{AuthError, AuthErrorKind},
		normalize,
		outcome::{Outcome, RawProviderResult},
		provider::{
			Extraction, HostContext, LoginRequest, Provider, ProviderFailure, ProviderKind,
		},
	};

	/// Client identifier used by [`test_connection`].
	pub const TEST_CLIENT_ID: &str = "test-client";
	/// Redirect URI used by [`test_connection`].
	pub const TEST_REDIRECT: &str = "demo://callback";

	type Classifier = Box<dyn Fn(&ProviderFailure) -> Option<AuthErrorKind> + Send + Sync>;

	/// Provider fixture that accepts every result of its channel and normalizes in-process
	/// payloads as token payloads.
	pub struct StubProvider {
		name: ProviderName,
		kind: ProviderKind,
		classifier: Option<Classifier>,
	}
	impl StubProvider {
		/// Embedded-kind stub.
		pub fn embedded(name: &str) -> Self {
			Self::new(name, ProviderKind::Embedded)
		}

		/// SDK-kind stub.
		pub fn sdk(name: &str) -> Self {
			Self::new(name, ProviderKind::FirstPartySdk)
		}

		/// External-app-kind stub.
		pub fn external(name: &str) -> Self {
			Self::new(name, ProviderKind::ExternalApp)
		}

		/// Installs a custom failure classifier.
		pub fn with_classifier<F>(mut self, classifier: F) -> Self
		where
			F: 'static + Fn(&ProviderFailure) -> Option<AuthErrorKind> + Send + Sync,
		{
			self.classifier = Some(Box::new(classifier));

			self
		}

		fn new(name: &str, kind: ProviderKind) -> Self {
			Self { name: provider_name(name), kind, classifier: None }
		}
	}
	impl Provider for StubProvider {
		fn name(&self) -> &ProviderName {
			&self.name
		}

		fn kind(&self) -> ProviderKind {
			self.kind
		}

		fn start_login(&self, _request: LoginRequest) -> Result<(), AuthError> {
			Ok(())
		}

		fn can_handle(&self, _result: &RawProviderResult) -> bool {
			true
		}

		fn extract_outcome(&self, result: RawProviderResult) -> Extraction {
			match result {
				RawProviderResult::InProcess { payload, .. } =>
					Extraction::Outcome(normalize::normalize_success(self, &payload).into()),
				RawProviderResult::Backend(response) =>
					Extraction::Outcome(normalize::backend_outcome(self, &response)),
				RawProviderResult::External(_) =>
					Extraction::Outcome(Outcome::Failure(AuthError::unknown("Stub external result."))),
			}
		}

		fn classify_failure(&self, failure: &ProviderFailure) -> Option<AuthErrorKind> {
			self.classifier.as_ref().and_then(|classifier| classifier(failure))
		}
	}

	/// Builds a provider name, panicking on invalid fixtures.
	pub fn provider_name(name: &str) -> ProviderName {
		ProviderName::new(name).expect("Provider name fixture should be valid.")
	}

	/// Builds a scope set, panicking on invalid fixtures.
	pub fn scope<const N: usize>(scopes: [&str; N]) -> ScopeSet {
		ScopeSet::new(scopes).expect("Scope fixture should be valid.")
	}

	/// Connection config pointing at a fake HTTPS backend.
	pub fn test_connection() -> ConnectionConfig {
		ConnectionConfig::builder()
			.backend(Url::parse("https://auth.example.com").expect("Backend fixture should parse."))
			.client_id(TEST_CLIENT_ID)
			.redirect_scheme(TEST_REDIRECT)
			.build()
			.expect("Connection fixture should be valid.")
	}

	/// Login request carrying `tag` and `scope`, with a detached sink.
	pub fn login_request(tag: CorrelationTag, scope: ScopeSet) -> LoginRequest {
		LoginRequest {
			tag,
			scope,
			host: HostContext::empty(),
			connection: Arc::new(test_connection()),
			sink: ResultSink::detached(),
		}
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::Error;
}

pub use url;
#[cfg(test)] use color_eyre as _;
