//! Connection parameters handed to providers and the correlation tag range.
//!
//! Both are validated at construction time. Loading them from files or the
//! environment is the host's job; every type here derives serde so that is a
//! one-liner on the host side.

// self
use crate::{_prelude::*, auth::ClientId, error::ConfigError};

/// Backend connection parameters supplied by the host at construction time.
///
/// The broker itself never dereferences them; providers use them to build
/// authorization requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
	/// Identity backend base URL (HTTPS only).
	pub backend: Url,
	/// Client identifier issued by the backend.
	pub client_id: ClientId,
	/// Redirect URI built from the application's custom scheme.
	pub redirect_uri: Url,
}
impl ConnectionConfig {
	/// Creates a new builder.
	pub fn builder() -> ConnectionConfigBuilder {
		ConnectionConfigBuilder::default()
	}

	/// Re-checks invariants, e.g. after deserializing a host-provided file.
	pub fn validate(&self) -> Result<(), ConfigError> {
		validate_backend(&self.backend)?;
		validate_redirect(&self.redirect_uri)
	}

	/// Resolves `path` against the backend base URL.
	pub fn endpoint(&self, path: &str) -> Url {
		let mut url = self.backend.clone();

		url.set_path(path);
		url.set_query(None);

		url
	}
}

/// Builder for [`ConnectionConfig`].
#[derive(Debug, Default)]
pub struct ConnectionConfigBuilder {
	backend: Option<Url>,
	client_id: Option<String>,
	redirect_scheme: Option<String>,
}
impl ConnectionConfigBuilder {
	/// Sets the identity backend base URL.
	pub fn backend(mut self, url: Url) -> Self {
		self.backend = Some(url);

		self
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the redirect scheme (e.g. `reachfive-abc://callback`).
	pub fn redirect_scheme(mut self, scheme: impl Into<String>) -> Self {
		self.redirect_scheme = Some(scheme.into());

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<ConnectionConfig, ConfigError> {
		let backend = self.backend.ok_or(ConfigError::MissingBackend)?;
		let client_id = self
			.client_id
			.filter(|id| !id.is_empty())
			.ok_or(ConfigError::MissingClientId)?;
		let client_id = ClientId::new(client_id)?;
		let scheme = self.redirect_scheme.unwrap_or_default();
		let redirect_uri = Url::parse(&scheme)
			.map_err(|_| ConfigError::InvalidRedirectScheme { scheme: scheme.clone() })?;
		let config = ConnectionConfig { backend, client_id, redirect_uri };

		config.validate()?;

		Ok(config)
	}
}

/// Inclusive range correlation tags are drawn from.
///
/// The default keeps tags within the 16-bit request-code space most platforms
/// accept for in-process result delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(u32, u32)", into = "(u32, u32)")]
pub struct TagRange {
	min: u32,
	max: u32,
}
impl TagRange {
	/// Creates a range, rejecting `min == 0`, `min > max`, and bounds that do not fit a
	/// platform request code.
	pub fn new(min: u32, max: u32) -> Result<Self, ConfigError> {
		if min == 0 || min > max || max > i32::MAX as u32 {
			return Err(ConfigError::InvalidTagRange { min, max });
		}

		Ok(Self { min, max })
	}

	/// Lowest tag in the range.
	pub fn min(self) -> u32 {
		self.min
	}

	/// Highest tag in the range.
	pub fn max(self) -> u32 {
		self.max
	}

	/// Returns `true` if `value` falls inside the range.
	pub fn contains(self, value: u32) -> bool {
		(self.min..=self.max).contains(&value)
	}

	/// Number of distinct tags in the range.
	pub fn capacity(self) -> u64 {
		u64::from(self.max - self.min) + 1
	}
}
impl TryFrom<(u32, u32)> for TagRange {
	type Error = ConfigError;

	fn try_from((min, max): (u32, u32)) -> Result<Self, Self::Error> {
		Self::new(min, max)
	}
}
impl From<TagRange> for (u32, u32) {
	fn from(range: TagRange) -> Self {
		(range.min, range.max)
	}
}
impl Default for TagRange {
	fn default() -> Self {
		Self { min: 1, max: 0xFFFF }
	}
}

fn validate_backend(url: &Url) -> Result<(), ConfigError> {
	if url.scheme() != "https" || url.host_str().is_none() {
		Err(ConfigError::InsecureBackend { url: url.to_string() })
	} else {
		Ok(())
	}
}

fn validate_redirect(url: &Url) -> Result<(), ConfigError> {
	if url.cannot_be_a_base() || url.scheme().is_empty() {
		Err(ConfigError::InvalidRedirectScheme { scheme: url.to_string() })
	} else {
		Ok(())
	}
}
