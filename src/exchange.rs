//! Identity backend boundary: turning provider grants into broker tokens.
//!
//! SDK and external-app providers finish with a provider credential rather than a
//! broker token. The correlator hands that credential to the host's
//! [`GrantExchange`] implementation and keeps the attempt pending until the
//! exchanger answers through the supplied [`ResultSink`] with a
//! [`RawProviderResult::Backend`](crate::outcome::RawProviderResult::Backend).

// self
use crate::{
	_prelude::*,
	auth::{ProviderName, ScopeSet, TokenSecret},
	correlator::{CorrelationTag, ResultSink},
	provider::ProviderKind,
};

/// Credential a provider produced that the backend must exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderGrant {
	/// OAuth authorization code, optionally bound to a PKCE verifier.
	AuthorizationCode {
		/// Authorization code returned by the provider.
		code: TokenSecret,
		/// PKCE verifier generated when the attempt started.
		code_verifier: Option<TokenSecret>,
	},
	/// Access token issued by a provider SDK.
	ProviderToken {
		/// Provider access token.
		access_token: TokenSecret,
		/// Provider id token, when the SDK exposes one.
		id_token: Option<TokenSecret>,
	},
}
impl ProviderGrant {
	/// Returns a stable label for logs.
	pub const fn as_str(&self) -> &'static str {
		match self {
			ProviderGrant::AuthorizationCode { .. } => "authorization_code",
			ProviderGrant::ProviderToken { .. } => "provider_token",
		}
	}

	/// Primary credential carried by the grant.
	pub fn secret(&self) -> &TokenSecret {
		match self {
			ProviderGrant::AuthorizationCode { code, .. } => code,
			ProviderGrant::ProviderToken { access_token, .. } => access_token,
		}
	}
}

/// Exchange job handed to the host's [`GrantExchange`].
#[derive(Clone, Debug)]
pub struct ExchangeRequest {
	/// Tag the backend response must be delivered under.
	pub tag: CorrelationTag,
	/// Provider that produced the grant.
	pub provider: ProviderName,
	/// Delivery channel of the provider.
	pub kind: ProviderKind,
	/// Credential to exchange.
	pub grant: ProviderGrant,
	/// Scope requested when the attempt started.
	pub scope: ScopeSet,
}

/// Host collaborator that talks to the identity backend.
///
/// Implementations may answer synchronously (inside `exchange`) or later from the
/// host's event loop; either way they call [`ResultSink::deliver`] with
/// `request.tag` exactly once.
pub trait GrantExchange: Send + Sync {
	/// Starts exchanging `request.grant` for a broker token.
	fn exchange(&self, request: ExchangeRequest, sink: ResultSink);
}
impl<F> GrantExchange for F
where
	F: Fn(ExchangeRequest, ResultSink) + Send + Sync,
{
	fn exchange(&self, request: ExchangeRequest, sink: ResultSink) {
		self(request, sink)
	}
}
