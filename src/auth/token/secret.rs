//! Credentials that must never reach logs verbatim.

// crates.io
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

const FINGERPRINT_BYTES: usize = 6;

/// Access tokens, authorization codes, and PKCE verifiers.
///
/// Formatting always redacts the value. Use [`TokenSecret::fingerprint`] when two
/// log lines need to be tied to the same credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps `value`.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Raw credential. Do not log the result.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Unwraps the raw credential.
	pub fn into_inner(self) -> String {
		self.0
	}

	/// Returns `true` if the credential is the empty string.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Short hex prefix of the SHA-256 digest, safe to log.
	pub fn fingerprint(&self) -> String {
		Sha256::digest(self.0.as_bytes())
			.iter()
			.take(FINGERPRINT_BYTES)
			.map(|byte| format!("{byte:02x}"))
			.collect()
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "TokenSecret(sha256:{})", self.fingerprint())
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatting_never_leaks_the_value() {
		let secret = TokenSecret::new("wx-auth-code");
		let debug = format!("{secret:?}");

		assert!(!debug.contains("wx-auth-code"));
		assert!(debug.starts_with("TokenSecret(sha256:"));
		assert_eq!(secret.to_string(), "<redacted>");
		assert_eq!(secret.expose(), "wx-auth-code");
	}

	#[test]
	fn fingerprints_identify_without_revealing() {
		let a = TokenSecret::new("code-a");

		assert_eq!(a.fingerprint().len(), FINGERPRINT_BYTES * 2);
		assert_eq!(a.fingerprint(), TokenSecret::from(String::from("code-a")).fingerprint());
		assert_ne!(a.fingerprint(), TokenSecret::new("code-b").fingerprint());
		assert!(TokenSecret::new("").is_empty());
		assert_eq!(a.into_inner(), "code-a");
	}
}
