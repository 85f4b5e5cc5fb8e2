//! User identity attached to normalized tokens.

// self
use crate::_prelude::*;

/// Identity attached to a normalized token.
///
/// Only `id` is guaranteed; the remaining fields depend on the provider and on
/// whether the account signed up with an email address or a phone number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Stable user identifier issued by the identity backend.
	pub id: String,
	/// Email address, when the provider shared one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Phone number, when the account was created with one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone_number: Option<String>,
	/// Name suitable for display.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
}
impl UserProfile {
	/// Creates a profile carrying only the identifier.
	pub fn new(id: impl Into<String>) -> Self {
		Self { id: id.into(), email: None, phone_number: None, display_name: None }
	}

	/// Attaches an email address.
	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());

		self
	}

	/// Attaches a phone number.
	pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
		self.phone_number = Some(phone_number.into());

		self
	}

	/// Attaches a display name.
	pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
		self.display_name = Some(display_name.into());

		self
	}
}
