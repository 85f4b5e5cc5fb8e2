//! First-party provider SDKs (social login) using the in-process result channel.

// self
use crate::{
	_prelude::*,
	auth::{ProviderName, ScopeSet, TokenSecret},
	error::AuthError,
	exchange::ProviderGrant,
	normalize,
	outcome::{RawProviderResult, ResultCode, SdkResponse},
	provider::{Extraction, LoginRequest, Provider, ProviderFailure, ProviderKind},
};

/// Host collaborator wrapping the native SDK.
///
/// The SDK reports through the host's in-process result channel with
/// [`LoginRequest::request_code`] and an [`SdkResponse`] payload.
pub trait SdkClient: Send + Sync {
	/// Launches the SDK login flow; `request.scope` already has defaults applied.
	fn launch(&self, request: &LoginRequest) -> Result<(), AuthError>;
}

/// Provider delegating to a first-party SDK.
///
/// A successful SDK login yields a provider token the identity backend exchanges
/// for a broker token.
pub struct SdkProvider {
	name: ProviderName,
	client: Arc<dyn SdkClient>,
	default_scope: ScopeSet,
}
impl SdkProvider {
	/// Creates a provider launching `client`.
	pub fn new<C>(name: ProviderName, client: C) -> Self
	where
		C: 'static + SdkClient,
	{
		Self { name, client: Arc::new(client), default_scope: ScopeSet::default() }
	}

	/// Permissions requested when an attempt asks for none.
	pub fn with_default_scope(mut self, scope: ScopeSet) -> Self {
		self.default_scope = scope;

		self
	}
}
impl Debug for SdkProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SdkProvider")
			.field("name", &self.name)
			.field("default_scope", &self.default_scope)
			.finish()
	}
}
impl Provider for SdkProvider {
	fn name(&self) -> &ProviderName {
		&self.name
	}

	fn kind(&self) -> ProviderKind {
		ProviderKind::FirstPartySdk
	}

	fn start_login(&self, mut request: LoginRequest) -> Result<(), AuthError> {
		request.scope = request.scope.or_default(&self.default_scope).clone();

		self.client.launch(&request)
	}

	fn can_handle(&self, result: &RawProviderResult) -> bool {
		matches!(result, RawProviderResult::InProcess { .. } | RawProviderResult::Backend(_))
	}

	fn extract_outcome(&self, result: RawProviderResult) -> Extraction {
		match result {
			RawProviderResult::InProcess { result_code: ResultCode::Cancelled, .. } =>
				AuthError::user_cancelled("User cancel").into(),
			RawProviderResult::InProcess { payload, .. } => match SdkResponse::from_payload(&payload) {
				Some(SdkResponse::Success { access_token, id_token }) =>
					Extraction::Exchange(ProviderGrant::ProviderToken {
						access_token: TokenSecret::new(access_token),
						id_token: id_token.map(TokenSecret::new),
					}),
				Some(SdkResponse::Cancel) => AuthError::user_cancelled("User cancel").into(),
				Some(SdkResponse::Error { code, message }) => {
					let mut failure = ProviderFailure::new().with_description(message);

					failure.code = code;

					normalize::normalize_failure(self, &failure).into()
				},
				None => AuthError::malformed(format!(
					"Provider `{}` returned an unrecognized SDK payload.",
					self.name
				))
				.into(),
			},
			RawProviderResult::Backend(response) =>
				Extraction::Outcome(normalize::backend_outcome(self, &response)),
			RawProviderResult::External(_) =>
				AuthError::malformed("SDK providers do not use the callback bridge.").into(),
		}
	}
}
