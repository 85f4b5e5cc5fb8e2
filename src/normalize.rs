//! Token/identity normalization.
//!
//! Pure functions that shape heterogeneous provider and backend payloads into
//! [`AuthToken`] and [`AuthError`]. Token payloads may use either snake_case or
//! camelCase keys. When no `user` object is present the profile is read from the
//! (unverified) claims of the `id_token`.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{
	_prelude::*,
	auth::{AuthToken, UserProfile},
	error::AuthError,
	outcome::{BackendResponse, Outcome},
	provider::{Provider, ProviderFailure, default_classification},
};

#[derive(Debug, Deserialize)]
struct TokenPayload {
	#[serde(default, alias = "accessToken")]
	access_token: Option<String>,
	#[serde(default, alias = "refreshToken")]
	refresh_token: Option<String>,
	#[serde(default, alias = "idToken")]
	id_token: Option<String>,
	#[serde(default, alias = "tokenType")]
	token_type: Option<String>,
	#[serde(default, alias = "expiresIn")]
	expires_in: Option<i64>,
	#[serde(default)]
	user: Option<UserPayload>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
	#[serde(default, alias = "sub", alias = "userId", alias = "user_id")]
	id: Option<Value>,
	#[serde(default)]
	email: Option<String>,
	#[serde(default, alias = "phoneNumber")]
	phone_number: Option<String>,
	#[serde(default, alias = "displayName", alias = "name")]
	display_name: Option<String>,
}
impl UserPayload {
	fn into_profile(self) -> UserProfile {
		let mut profile = UserProfile::new(self.id.and_then(scalar_string).unwrap_or_default());

		profile.email = self.email;
		profile.phone_number = self.phone_number;
		profile.display_name = self.display_name;

		profile
	}
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
	sub: Option<Value>,
	#[serde(default)]
	email: Option<String>,
	#[serde(default)]
	phone_number: Option<String>,
	#[serde(default)]
	name: Option<String>,
}

/// Builds an [`AuthToken`] out of a token payload.
///
/// Fails with `MalformedResponse` when the payload is not an object, a field has the
/// wrong type, or the access token or user identifier is missing.
pub fn normalize_success<P>(provider: &P, payload: &Value) -> Result<AuthToken, AuthError>
where
	P: ?Sized + Provider,
{
	if !payload.is_object() {
		return Err(AuthError::malformed("Token payload must be a JSON object."));
	}

	let parsed: TokenPayload = serde_path_to_error::deserialize(payload).map_err(|e| {
		AuthError::malformed(format!(
			"Token payload is malformed at `{}`: {}.",
			e.path(),
			e.inner()
		))
	})?;
	let user = match (parsed.user, parsed.id_token.as_deref()) {
		(Some(user), _) => Some(user.into_profile()),
		(None, Some(id_token)) => Some(decode_id_token_profile(id_token)?),
		(None, None) => None,
	};
	let mut builder = AuthToken::builder(provider.name().clone());

	if let Some(access_token) = parsed.access_token {
		builder = builder.access_token(access_token);
	}
	if let Some(refresh_token) = parsed.refresh_token {
		builder = builder.refresh_token(refresh_token);
	}
	if let Some(id_token) = parsed.id_token {
		builder = builder.id_token(id_token);
	}
	if let Some(token_type) = parsed.token_type {
		builder = builder.token_type(token_type);
	}
	if let Some(expires_in) = parsed.expires_in {
		builder = builder.expires_in(Duration::seconds(expires_in));
	}
	if let Some(user) = user {
		builder = builder.user(user);
	}

	builder.build()
}

/// Maps a provider failure onto the canonical taxonomy.
///
/// The provider's own [`Provider::classify_failure`] hook is consulted first; the
/// original wording is preserved in the message.
pub fn normalize_failure<P>(provider: &P, failure: &ProviderFailure) -> AuthError
where
	P: ?Sized + Provider,
{
	let kind =
		provider.classify_failure(failure).unwrap_or_else(|| default_classification(failure));

	AuthError::new(kind, failure.message())
}

/// Normalizes an identity backend reply into a final outcome.
pub fn backend_outcome<P>(provider: &P, response: &BackendResponse) -> Outcome
where
	P: ?Sized + Provider,
{
	match response {
		BackendResponse::Token(payload) => normalize_success(provider, payload).into(),
		BackendResponse::Failure(failure) => Outcome::Failure(normalize_failure(provider, failure)),
	}
}

fn decode_id_token_profile(id_token: &str) -> Result<UserProfile, AuthError> {
	let claims = id_token
		.split('.')
		.nth(1)
		.and_then(|segment| URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')).ok())
		.and_then(|bytes| serde_json::from_slice::<IdTokenClaims>(&bytes).ok())
		.ok_or_else(|| AuthError::malformed("The id_token claims could not be decoded."))?;
	let mut profile = UserProfile::new(claims.sub.and_then(scalar_string).unwrap_or_default());

	profile.email = claims.email;
	profile.phone_number = claims.phone_number;
	profile.display_name = claims.name;

	Ok(profile)
}

fn scalar_string(value: Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}
