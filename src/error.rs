//! Broker-level error types shared by the registry, providers, and the correlator.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical broker error exposed by synchronous public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem surfaced during setup.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Normalized login failure.
	#[error(transparent)]
	Auth(#[from] AuthError),
}

/// Configuration and validation failures raised while wiring the broker.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// A provider with the same name is already registered.
	#[error("Provider `{name}` is already registered.")]
	DuplicateProvider {
		/// Conflicting provider name.
		name: String,
	},
	/// No provider is registered under the requested name.
	#[error("Provider `{name}` is not registered.")]
	ProviderNotFound {
		/// Requested provider name.
		name: String,
	},
	/// No backend URL was supplied.
	#[error("Backend URL is required.")]
	MissingBackend,
	/// Backend endpoints must use HTTPS.
	#[error("The backend must use HTTPS: {url}.")]
	InsecureBackend {
		/// Backend URL that failed validation.
		url: String,
	},
	/// Redirect scheme cannot be used as a redirect URI.
	#[error("Redirect scheme `{scheme}` is not a valid redirect URI.")]
	InvalidRedirectScheme {
		/// Offending scheme string.
		scheme: String,
	},
	/// Client identifier is required.
	#[error("Client identifier cannot be empty.")]
	MissingClientId,
	/// Correlation tag range is empty, starts at zero, or exceeds the request-code space.
	#[error("Correlation tag range {min}..={max} is invalid.")]
	InvalidTagRange {
		/// Lower bound supplied by the caller.
		min: u32,
		/// Upper bound supplied by the caller.
		max: u32,
	},
	/// Identifier validation failed.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Scope validation failed.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
}

/// Canonical login failure categories delivered through `on_failure`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
	/// The user backed out of the provider flow.
	UserCancelled,
	/// The user or the provider refused the authorization.
	Denied,
	/// The provider or backend could not be reached.
	NetworkFailure,
	/// The provider returned a payload that cannot be normalized.
	MalformedResponse,
	/// The provider cannot start a login right now.
	ProviderUnavailable,
	/// Anything the classifiers do not recognize.
	Unknown,
}
impl AuthErrorKind {
	/// Returns a stable label suitable for logs and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthErrorKind::UserCancelled => "user_cancelled",
			AuthErrorKind::Denied => "denied",
			AuthErrorKind::NetworkFailure => "network_failure",
			AuthErrorKind::MalformedResponse => "malformed_response",
			AuthErrorKind::ProviderUnavailable => "provider_unavailable",
			AuthErrorKind::Unknown => "unknown",
		}
	}
}
impl Display for AuthErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Normalized login failure.
///
/// `message` keeps the provider's original wording whenever one was supplied so
/// hosts can surface it for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
#[error("Login failed ({kind}): {message}")]
pub struct AuthError {
	/// Failure category.
	pub kind: AuthErrorKind,
	/// Human-readable detail.
	pub message: String,
}
impl AuthError {
	/// Creates an error of the provided kind.
	pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
		Self { kind, message: message.into() }
	}

	/// Shorthand for [`AuthErrorKind::UserCancelled`].
	pub fn user_cancelled(message: impl Into<String>) -> Self {
		Self::new(AuthErrorKind::UserCancelled, message)
	}

	/// Shorthand for [`AuthErrorKind::Denied`].
	pub fn denied(message: impl Into<String>) -> Self {
		Self::new(AuthErrorKind::Denied, message)
	}

	/// Shorthand for [`AuthErrorKind::NetworkFailure`].
	pub fn network_failure(message: impl Into<String>) -> Self {
		Self::new(AuthErrorKind::NetworkFailure, message)
	}

	/// Shorthand for [`AuthErrorKind::MalformedResponse`].
	pub fn malformed(message: impl Into<String>) -> Self {
		Self::new(AuthErrorKind::MalformedResponse, message)
	}

	/// Shorthand for [`AuthErrorKind::ProviderUnavailable`].
	pub fn unavailable(message: impl Into<String>) -> Self {
		Self::new(AuthErrorKind::ProviderUnavailable, message)
	}

	/// Shorthand for [`AuthErrorKind::Unknown`].
	pub fn unknown(message: impl Into<String>) -> Self {
		Self::new(AuthErrorKind::Unknown, message)
	}
}
impl From<ConfigError> for AuthError {
	fn from(e: ConfigError) -> Self {
		match e {
			ConfigError::ProviderNotFound { .. } | ConfigError::DuplicateProvider { .. } =>
				Self::unavailable(e.to_string()),
			_ => Self::unknown(e.to_string()),
		}
	}
}
