//! Provider failure context and the default classification heuristics.
//!
//! Providers and grant exchangers describe failures with plain data (status codes,
//! OAuth fields, body preview) so classification stays independent of whichever SDK
//! or HTTP client produced them.

// self
use crate::{_prelude::*, error::AuthErrorKind};

/// Raw failure reported by a provider flow or by the identity backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
	/// Provider error code (OAuth `error`, SDK code, transport name).
	pub code: Option<String>,
	/// Provider-supplied description.
	pub description: Option<String>,
	/// HTTP status returned by the backend, when available.
	pub http_status: Option<u16>,
	/// Preview of a non-JSON response body.
	pub body_preview: Option<String>,
	/// Indicates whether the failure originated from the network layer.
	pub network_error: bool,
}
impl ProviderFailure {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates an empty failure context.
	pub fn new() -> Self {
		Self {
			code: None,
			description: None,
			http_status: None,
			body_preview: None,
			network_error: false,
		}
	}

	/// Convenience constructor for transport-level failures.
	pub fn network(description: impl Into<String>) -> Self {
		let mut failure = Self::new().with_description(description);

		failure.network_error = true;

		failure
	}

	/// Reads `error` / `error_description` out of an OAuth-style payload.
	///
	/// Returns `None` when the payload carries no `error` field.
	pub fn from_oauth_payload(payload: &Value) -> Option<Self> {
		let code = payload.get("error").and_then(Value::as_str)?;
		let mut failure = Self::new().with_code(code);

		if let Some(description) = payload
			.get("error_description")
			.or_else(|| payload.get("errorDescription"))
			.and_then(Value::as_str)
		{
			failure = failure.with_description(description);
		}

		Some(failure)
	}

	/// Adds the provider error code.
	pub fn with_code(mut self, code: impl Into<String>) -> Self {
		self.code = Some(code.into());

		self
	}

	/// Adds the provider description.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());

		self
	}

	/// Adds an HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds a body preview for backends that return non-JSON payloads.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}

	/// Best human-readable message, preferring the provider's own wording.
	pub fn message(&self) -> String {
		if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
			return description.to_owned();
		}
		if let Some(code) = self.code.as_deref() {
			return code.to_owned();
		}
		if let Some(body) = self.body_preview.as_deref() {
			return body.to_owned();
		}

		match self.http_status {
			Some(status) => format!("Provider responded with HTTP {status}."),
			None => "Provider reported an unspecified failure.".into(),
		}
	}
}
impl Default for ProviderFailure {
	fn default() -> Self {
		Self::new()
	}
}

/// Default heuristics applied when a provider does not classify a failure itself.
///
/// Network failures win, then structured codes, then body hints, and finally the HTTP
/// status. Anything unrecognized is [`AuthErrorKind::Unknown`].
pub fn default_classification(failure: &ProviderFailure) -> AuthErrorKind {
	if failure.network_error {
		return AuthErrorKind::NetworkFailure;
	}

	if let Some(kind) = failure.code.as_deref().and_then(match_exact_value) {
		return kind;
	}
	if let Some(kind) = classify_body(failure.body_preview.as_deref()) {
		return kind;
	}

	classify_status(failure.http_status)
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ProviderFailure::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= ProviderFailure::BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

fn match_exact_value(value: &str) -> Option<AuthErrorKind> {
	const CANCELLED: [&str; 4] = ["user_cancel", "cancelled", "canceled", "err_user_cancel"];
	const DENIED: [&str; 4] =
		["access_denied", "err_auth_denied", "consent_required", "login_required"];
	const TRANSIENT: [&str; 2] = ["temporarily_unavailable", "server_error"];

	let matches = |set: &[&str]| set.iter().any(|candidate| value.eq_ignore_ascii_case(candidate));

	if matches(&CANCELLED) {
		Some(AuthErrorKind::UserCancelled)
	} else if matches(&DENIED) {
		Some(AuthErrorKind::Denied)
	} else if matches(&TRANSIENT) {
		Some(AuthErrorKind::NetworkFailure)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<AuthErrorKind> {
	let lowered = body?.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("access_denied") => Some(AuthErrorKind::Denied),
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(AuthErrorKind::NetworkFailure),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> AuthErrorKind {
	match status {
		Some(401 | 403) => AuthErrorKind::Denied,
		Some(408 | 429) => AuthErrorKind::NetworkFailure,
		Some(code) if code >= 500 => AuthErrorKind::NetworkFailure,
		_ => AuthErrorKind::Unknown,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn codes_take_priority_over_status() {
		let failure = ProviderFailure::new().with_code("ACCESS_DENIED").with_http_status(500);

		assert_eq!(default_classification(&failure), AuthErrorKind::Denied);
		assert_eq!(
			default_classification(&ProviderFailure::new().with_code("err_user_cancel")),
			AuthErrorKind::UserCancelled
		);
	}

	#[test]
	fn network_flag_and_status_fallbacks() {
		assert_eq!(
			default_classification(&ProviderFailure::network("offline").with_code("access_denied")),
			AuthErrorKind::NetworkFailure
		);
		assert_eq!(
			default_classification(&ProviderFailure::new().with_http_status(401)),
			AuthErrorKind::Denied
		);
		assert_eq!(
			default_classification(&ProviderFailure::new().with_http_status(503)),
			AuthErrorKind::NetworkFailure
		);
		assert_eq!(
			default_classification(&ProviderFailure::new().with_body_preview("please retry later")),
			AuthErrorKind::NetworkFailure
		);
		assert_eq!(
			default_classification(&ProviderFailure::new().with_http_status(400)),
			AuthErrorKind::Unknown
		);
	}

	#[test]
	fn message_prefers_description_and_truncates_bodies() {
		let failure = ProviderFailure::new().with_code("weird").with_description("Weird thing.");

		assert_eq!(failure.message(), "Weird thing.");
		assert_eq!(ProviderFailure::new().with_code("weird").message(), "weird");

		let preview = ProviderFailure::new().with_body_preview("x".repeat(300));

		assert_eq!(preview.body_preview.map(|body| body.chars().count()), Some(257));
	}

	#[test]
	fn oauth_payload_requires_error_field() {
		let payload = serde_json::json!({ "error": "access_denied", "errorDescription": "Nope." });
		let failure =
			ProviderFailure::from_oauth_payload(&payload).expect("Payload carries an error field.");

		assert_eq!(failure.code.as_deref(), Some("access_denied"));
		assert_eq!(failure.description.as_deref(), Some("Nope."));
		assert!(ProviderFailure::from_oauth_payload(&serde_json::json!({ "code": "x" })).is_none());
	}
}
