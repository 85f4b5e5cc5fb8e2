//! Immutable [`AuthToken`] plus the builder the normalizer uses to create it.

// self
use crate::{
	_prelude::*,
	auth::{
		ProviderName,
		token::{profile::UserProfile, secret::TokenSecret},
	},
	error::AuthError,
};

const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Canonical token + identity returned to `on_success`.
///
/// The broker never persists tokens; their lifetime is managed by the caller.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthToken {
	/// Provider that handled the login attempt.
	pub provider: ProviderName,
	/// Access token secret.
	pub access_token: TokenSecret,
	/// Refresh token secret, if one was issued.
	pub refresh_token: Option<TokenSecret>,
	/// OpenID Connect id token, if one was issued.
	pub id_token: Option<TokenSecret>,
	/// Token type announced by the backend (`Bearer` when omitted).
	pub token_type: Option<String>,
	/// Instant the token was normalized.
	pub issued_at: OffsetDateTime,
	/// Expiry derived from `expires_in`, when provided.
	pub expires_at: Option<OffsetDateTime>,
	/// Identity of the authenticated user.
	pub user: UserProfile,
}
impl AuthToken {
	/// Returns a builder for the provided provider name.
	pub fn builder(provider: ProviderName) -> AuthTokenBuilder {
		AuthTokenBuilder::new(provider)
	}

	/// Renders the `Authorization` header value (`"{token_type} {access_token}"`).
	pub fn auth_header(&self) -> String {
		format!(
			"{} {}",
			self.token_type.as_deref().unwrap_or(DEFAULT_TOKEN_TYPE),
			self.access_token.expose()
		)
	}

	/// Returns `true` if the token carries an expiry that is at or before `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}
}
impl Debug for AuthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthToken")
			.field("provider", &self.provider)
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("user", &self.user)
			.finish()
	}
}

/// Builder for [`AuthToken`].
#[derive(Clone, Debug)]
pub struct AuthTokenBuilder {
	provider: ProviderName,
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	id_token: Option<TokenSecret>,
	token_type: Option<String>,
	issued_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
	user: Option<UserProfile>,
}
impl AuthTokenBuilder {
	fn new(provider: ProviderName) -> Self {
		Self {
			provider,
			access_token: None,
			refresh_token: None,
			id_token: None,
			token_type: None,
			issued_at: None,
			expires_in: None,
			user: None,
		}
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the id token value.
	pub fn id_token(mut self, token: impl Into<String>) -> Self {
		self.id_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the token type.
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the issued-at instant (defaults to now).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets a relative expiry from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Attaches the user profile.
	pub fn user(mut self, user: UserProfile) -> Self {
		self.user = Some(user);

		self
	}

	/// Consumes the builder, failing with `MalformedResponse` when required fields are absent.
	pub fn build(self) -> Result<AuthToken, AuthError> {
		let access_token = self
			.access_token
			.filter(|token| !token.expose().is_empty())
			.ok_or_else(|| AuthError::malformed("No access_token returned."))?;
		let user = self
			.user
			.filter(|user| !user.id.is_empty())
			.ok_or_else(|| AuthError::malformed("No user identifier returned."))?;

		if self.expires_in.is_some_and(|delta| !delta.is_positive()) {
			return Err(AuthError::malformed("The expires_in value must be positive."));
		}

		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match self.expires_in {
			Some(delta) => Some(
				issued_at
					.checked_add(delta)
					.ok_or_else(|| AuthError::malformed("The expires_in value is out of range."))?,
			),
			None => None,
		};

		Ok(AuthToken {
			provider: self.provider,
			access_token,
			refresh_token: self.refresh_token,
			id_token: self.id_token,
			token_type: self.token_type,
			issued_at,
			expires_at,
			user,
		})
	}
}
