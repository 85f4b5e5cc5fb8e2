//! Embedded authorization surface driven by Authorization Code + PKCE.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{ProviderName, ScopeSet, TokenSecret},
	correlator::CorrelationTag,
	error::{AuthError, AuthErrorKind},
	exchange::ProviderGrant,
	normalize,
	outcome::{RawProviderResult, ResultCode},
	provider::{Extraction, LoginRequest, Provider, ProviderFailure, ProviderKind},
};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;
const DEFAULT_AUTHORIZE_PATH: &str = "/oauth/authorize";
const INVALID_STATE: &str = "invalid_state";

/// Host collaborator that renders the in-process authorization surface.
///
/// The surface loads [`AuthorizationRequest::authorize_url`] and, once the flow ends,
/// reports through the host's in-process result channel using
/// [`LoginRequest::request_code`]. [`AuthorizationRequest::redirect_payload`] turns
/// the final redirect into the payload to report.
pub trait EmbeddedSurface: Send + Sync {
	/// Presents the surface.
	fn present(
		&self,
		authorization: AuthorizationRequest,
		request: &LoginRequest,
	) -> Result<(), AuthError>;
}

/// Supported PKCE challenge methods surfaced via [`AuthorizationRequest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Authorization request handed to the [`EmbeddedSurface`].
#[derive(Clone)]
pub struct AuthorizationRequest {
	/// Tag of the attempt this request belongs to.
	pub tag: CorrelationTag,
	/// Scope sent to the backend.
	pub scope: ScopeSet,
	/// Opaque state value that must round-trip via the redirect.
	pub state: String,
	/// Redirect URI announced to the backend.
	pub redirect_uri: Url,
	/// Fully-formed authorize URL the surface should load.
	pub authorize_url: Url,
	pkce: PkcePair,
}
impl AuthorizationRequest {
	/// PKCE code challenge derived from the secret verifier.
	pub fn code_challenge(&self) -> &str {
		&self.pkce.challenge
	}

	/// PKCE challenge method (currently always `S256`).
	pub fn code_challenge_method(&self) -> PkceCodeChallengeMethod {
		self.pkce.method
	}

	/// Validates the returned `state` parameter after the redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<(), AuthError> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(AuthError::malformed("Authorization state mismatch."))
		}
	}

	/// Returns `true` if `url` targets this request's redirect URI.
	pub fn is_redirect(&self, url: &Url) -> bool {
		url.scheme() == self.redirect_uri.scheme()
			&& url.host_str() == self.redirect_uri.host_str()
			&& url.path() == self.redirect_uri.path()
	}

	/// Converts the final redirect into the payload to report in-process.
	///
	/// Success yields `{code, code_verifier}`; provider errors and state mismatches
	/// yield `{error, error_description}`.
	pub fn redirect_payload(&self, redirect: &Url) -> Value {
		let params = redirect.query_pairs().collect::<HashMap<_, _>>();

		if let Some(error) = params.get("error") {
			let mut payload = serde_json::json!({ "error": error });

			if let Some(description) = params.get("error_description") {
				payload["error_description"] = Value::from(description.as_ref());
			}

			return payload;
		}

		let returned_state = params.get("state").map_or("", |state| state.as_ref());

		if let Err(e) = self.validate_state(returned_state) {
			return serde_json::json!({ "error": INVALID_STATE, "error_description": e.message });
		}

		match params.get("code") {
			Some(code) => serde_json::json!({
				"code": code,
				"code_verifier": self.pkce.verifier.expose(),
			}),
			None => serde_json::json!({
				"error": "invalid_request",
				"error_description": "The redirect carried neither a code nor an error.",
			}),
		}
	}
}
impl Debug for AuthorizationRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationRequest")
			.field("tag", &self.tag)
			.field("scope", &self.scope)
			.field("state", &self.state)
			.field("redirect_uri", &self.redirect_uri)
			.field("authorize_url", &self.authorize_url)
			.field("code_challenge", &self.pkce.challenge)
			.field("code_challenge_method", &self.pkce.method)
			.finish()
	}
}

#[derive(Clone)]
struct PkcePair {
	verifier: TokenSecret,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	fn generate() -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_pkce_challenge(&verifier);

		Self {
			verifier: TokenSecret::new(verifier),
			challenge,
			method: PkceCodeChallengeMethod::S256,
		}
	}
}

/// Provider backed by an in-process authorization surface.
///
/// Results arrive through the in-process channel as a token payload, a
/// `{code, code_verifier}` pair (exchanged by the backend), an OAuth error payload,
/// or a `Cancelled` result code.
pub struct EmbeddedFlowProvider {
	name: ProviderName,
	surface: Arc<dyn EmbeddedSurface>,
	authorize_path: String,
	default_scope: ScopeSet,
	origin: Option<String>,
}
impl EmbeddedFlowProvider {
	/// Creates a provider presenting through `surface`.
	pub fn new<S>(name: ProviderName, surface: S) -> Self
	where
		S: 'static + EmbeddedSurface,
	{
		Self {
			name,
			surface: Arc::new(surface),
			authorize_path: DEFAULT_AUTHORIZE_PATH.into(),
			default_scope: ScopeSet::default(),
			origin: None,
		}
	}

	/// Overrides the authorize endpoint path on the backend.
	pub fn with_authorize_path(mut self, path: impl Into<String>) -> Self {
		self.authorize_path = path.into();

		self
	}

	/// Scope used when an attempt requests none.
	pub fn with_default_scope(mut self, scope: ScopeSet) -> Self {
		self.default_scope = scope;

		self
	}

	/// Adds an `origin` parameter identifying the calling application.
	pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
		self.origin = Some(origin.into());

		self
	}

	/// Builds the authorization request for `request`.
	pub fn authorization_request(&self, request: &LoginRequest) -> AuthorizationRequest {
		let scope = request.scope.or_default(&self.default_scope).clone();
		let state = random_string(STATE_LEN);
		let pkce = PkcePair::generate();
		let redirect_uri = request.connection.redirect_uri.clone();
		let mut authorize_url = request.connection.endpoint(&self.authorize_path);
		let mut pairs = authorize_url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &request.connection.client_id);
		pairs.append_pair("redirect_uri", redirect_uri.as_str());

		if !scope.is_empty() {
			pairs.append_pair("scope", &scope.normalized());
		}

		pairs.append_pair("state", &state);
		pairs.append_pair("code_challenge", &pkce.challenge);
		pairs.append_pair("code_challenge_method", pkce.method.as_str());

		if let Some(origin) = &self.origin {
			pairs.append_pair("origin", origin);
		}

		drop(pairs);

		AuthorizationRequest { tag: request.tag, scope, state, redirect_uri, authorize_url, pkce }
	}
}
impl Debug for EmbeddedFlowProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("EmbeddedFlowProvider")
			.field("name", &self.name)
			.field("authorize_path", &self.authorize_path)
			.field("default_scope", &self.default_scope)
			.field("origin", &self.origin)
			.finish()
	}
}
impl Provider for EmbeddedFlowProvider {
	fn name(&self) -> &ProviderName {
		&self.name
	}

	fn kind(&self) -> ProviderKind {
		ProviderKind::Embedded
	}

	fn start_login(&self, request: LoginRequest) -> Result<(), AuthError> {
		let authorization = self.authorization_request(&request);

		self.surface.present(authorization, &request)
	}

	fn can_handle(&self, result: &RawProviderResult) -> bool {
		matches!(result, RawProviderResult::InProcess { .. } | RawProviderResult::Backend(_))
	}

	fn extract_outcome(&self, result: RawProviderResult) -> Extraction {
		match result {
			RawProviderResult::InProcess { result_code: ResultCode::Cancelled, .. } =>
				AuthError::user_cancelled("User cancel").into(),
			RawProviderResult::InProcess { result_code, payload } => {
				if let Some(failure) = ProviderFailure::from_oauth_payload(&payload) {
					return normalize::normalize_failure(self, &failure).into();
				}
				if let ResultCode::Other(code) = result_code {
					return AuthError::unknown(format!(
						"Embedded flow finished with unexpected result code {code}."
					))
					.into();
				}

				match grant_from_payload(&payload) {
					Some(grant) => Extraction::Exchange(grant),
					None => Extraction::Outcome(normalize::normalize_success(self, &payload).into()),
				}
			},
			RawProviderResult::Backend(response) =>
				Extraction::Outcome(normalize::backend_outcome(self, &response)),
			RawProviderResult::External(_) =>
				AuthError::malformed("Embedded flows do not use the callback bridge.").into(),
		}
	}

	fn classify_failure(&self, failure: &ProviderFailure) -> Option<AuthErrorKind> {
		(failure.code.as_deref() == Some(INVALID_STATE)).then_some(AuthErrorKind::MalformedResponse)
	}
}

fn grant_from_payload(payload: &Value) -> Option<ProviderGrant> {
	let code = payload.get("code").and_then(Value::as_str)?;
	let code_verifier = payload
		.get("code_verifier")
		.or_else(|| payload.get("codeVerifier"))
		.and_then(Value::as_str)
		.map(TokenSecret::new);

	Some(ProviderGrant::AuthorizationCode { code: TokenSecret::new(code), code_verifier })
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let digest = Sha256::digest(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(digest)
}
