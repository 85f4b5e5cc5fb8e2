//! Validated names for providers and the backend client.
//!
//! Provider names are lowercase slugs (`facebook`, `wechat`, `sign-in-with-apple`) so
//! that host lookups and metric labels stay stable. Client identifiers are opaque
//! strings issued by the identity backend and only need to be non-empty and free of
//! whitespace.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const PROVIDER_NAME_MAX_LEN: usize = 64;
const CLIENT_ID_MAX_LEN: usize = 256;

/// Reasons a provider name or client identifier is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// Nothing was supplied.
	#[error("{kind} cannot be empty.")]
	Empty {
		/// What was being validated.
		kind: &'static str,
	},
	/// A character outside the allowed alphabet was found.
	#[error("{kind} contains the disallowed character {found:?}.")]
	InvalidCharacter {
		/// What was being validated.
		kind: &'static str,
		/// First offending character.
		found: char,
	},
	/// The value is longer than allowed.
	#[error("{kind} exceeds {max} bytes.")]
	TooLong {
		/// What was being validated.
		kind: &'static str,
		/// Maximum permitted length in bytes.
		max: usize,
	},
}

macro_rules! validated_name {
	($(#[$meta:meta])* $name:ident, $check:path) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Validates `value` and wraps it.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				$check(&value)?;

				Ok(Self(value))
			}

			/// Borrows the validated string.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, IdentifierError> {
				Self::new(value)
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, IdentifierError> {
				Self::new(s)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, "{}({:?})", stringify!($name), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

validated_name! {
	/// Registry key of an identity provider, e.g. `facebook`.
	///
	/// Lowercase ASCII letters, digits, `-`, `_`, and `.`, starting with a letter.
	ProviderName, check_provider_name
}
validated_name! {
	/// Client identifier issued by the identity backend.
	ClientId, check_client_id
}

fn check_provider_name(value: &str) -> Result<(), IdentifierError> {
	const KIND: &str = "Provider name";

	let mut chars = value.chars();
	let Some(first) = chars.next() else {
		return Err(IdentifierError::Empty { kind: KIND });
	};

	if !first.is_ascii_lowercase() {
		return Err(IdentifierError::InvalidCharacter { kind: KIND, found: first });
	}
	let allowed = |c: &char| c.is_ascii_lowercase() || c.is_ascii_digit() || "-_.".contains(*c);

	if let Some(found) = chars.find(|c| !allowed(c)) {
		return Err(IdentifierError::InvalidCharacter { kind: KIND, found });
	}
	if value.len() > PROVIDER_NAME_MAX_LEN {
		return Err(IdentifierError::TooLong { kind: KIND, max: PROVIDER_NAME_MAX_LEN });
	}

	Ok(())
}

fn check_client_id(value: &str) -> Result<(), IdentifierError> {
	const KIND: &str = "Client identifier";

	if value.is_empty() {
		return Err(IdentifierError::Empty { kind: KIND });
	}
	if let Some(found) = value.chars().find(|c| c.is_whitespace() || c.is_control()) {
		return Err(IdentifierError::InvalidCharacter { kind: KIND, found });
	}
	if value.len() > CLIENT_ID_MAX_LEN {
		return Err(IdentifierError::TooLong { kind: KIND, max: CLIENT_ID_MAX_LEN });
	}

	Ok(())
}
