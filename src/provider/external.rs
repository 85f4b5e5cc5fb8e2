//! Providers whose flow leaves the application and returns through the bridge.

// self
use crate::{
	_prelude::*,
	auth::{ProviderName, ScopeSet, TokenSecret},
	error::AuthError,
	exchange::ProviderGrant,
	normalize,
	outcome::{ExternalResponse, ExternalStatus, RawProviderResult},
	provider::{Extraction, LoginRequest, Provider, ProviderKind},
};

/// Host collaborator that hands control to another installed application.
pub trait AppLauncher: Send + Sync {
	/// Returns `true` if `app_id` can be launched on this device.
	fn is_installed(&self, _app_id: &str) -> bool {
		true
	}

	/// Launches `app_id`; `request.scope` already has defaults applied.
	fn launch(&self, app_id: &str, request: &LoginRequest) -> Result<(), AuthError>;
}

/// Provider backed by a separate application (e.g. a messaging app).
///
/// The app carries no correlation tag of its own, so at most one attempt per
/// callback bridge may be pending. Its authorization code is exchanged by the
/// identity backend.
pub struct ExternalAppProvider {
	name: ProviderName,
	app_id: String,
	launcher: Arc<dyn AppLauncher>,
	default_scope: ScopeSet,
}
impl ExternalAppProvider {
	/// Creates a provider launching `app_id` through `launcher`.
	pub fn new<L>(name: ProviderName, app_id: impl Into<String>, launcher: L) -> Self
	where
		L: 'static + AppLauncher,
	{
		Self {
			name,
			app_id: app_id.into(),
			launcher: Arc::new(launcher),
			default_scope: ScopeSet::default(),
		}
	}

	/// Scope requested when an attempt asks for none.
	pub fn with_default_scope(mut self, scope: ScopeSet) -> Self {
		self.default_scope = scope;

		self
	}

	/// Identifier of the launched application.
	pub fn app_id(&self) -> &str {
		&self.app_id
	}

	fn extract_external(&self, response: ExternalResponse) -> Extraction {
		let ExternalResponse { status, code, message } = response;

		match status {
			ExternalStatus::Success => match code.filter(|code| !code.is_empty()) {
				Some(code) => Extraction::Exchange(ProviderGrant::AuthorizationCode {
					code: TokenSecret::new(code),
					code_verifier: None,
				}),
				None =>
					AuthError::malformed("No code delivered by the external application.").into(),
			},
			ExternalStatus::UserCancelled =>
				AuthError::user_cancelled(message.unwrap_or_else(|| "User cancel".into())).into(),
			ExternalStatus::Denied => AuthError::denied(
				message.unwrap_or_else(|| "The external application denied the request.".into()),
			)
			.into(),
			ExternalStatus::Other(error_code) => AuthError::unknown(message.unwrap_or_else(|| {
				format!("The external application returned error code {error_code}.")
			}))
			.into(),
		}
	}
}
impl Debug for ExternalAppProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ExternalAppProvider")
			.field("name", &self.name)
			.field("app_id", &self.app_id)
			.field("default_scope", &self.default_scope)
			.finish()
	}
}
impl Provider for ExternalAppProvider {
	fn name(&self) -> &ProviderName {
		&self.name
	}

	fn kind(&self) -> ProviderKind {
		ProviderKind::ExternalApp
	}

	fn start_login(&self, mut request: LoginRequest) -> Result<(), AuthError> {
		if !self.launcher.is_installed(&self.app_id) {
			return Err(AuthError::unavailable(format!("`{}` is not installed.", self.app_id)));
		}

		request.scope = request.scope.or_default(&self.default_scope).clone();

		self.launcher
			.launch(&self.app_id, &request)
			.map_err(|e| AuthError::unavailable(e.message))
	}

	fn can_handle(&self, result: &RawProviderResult) -> bool {
		matches!(result, RawProviderResult::External(_) | RawProviderResult::Backend(_))
	}

	fn extract_outcome(&self, result: RawProviderResult) -> Extraction {
		match result {
			RawProviderResult::External(response) => self.extract_external(response),
			RawProviderResult::Backend(response) =>
				Extraction::Outcome(normalize::backend_outcome(self, &response)),
			RawProviderResult::InProcess { .. } => AuthError::malformed(
				"External application results must arrive through the callback bridge.",
			)
			.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, correlator::CorrelationTag, error::AuthErrorKind};

	struct Launcher {
		installed: bool,
		fail: bool,
	}
	impl AppLauncher for Launcher {
		fn is_installed(&self, _app_id: &str) -> bool {
			self.installed
		}

		fn launch(&self, _app_id: &str, request: &LoginRequest) -> Result<(), AuthError> {
			assert_eq!(request.scope, scope(["snsapi_userinfo"]));

			if self.fail { Err(AuthError::unknown("Intent rejected.")) } else { Ok(()) }
		}
	}

	fn wechat(installed: bool, fail: bool) -> ExternalAppProvider {
		ExternalAppProvider::new(provider_name("wechat"), "com.tencent.mm", Launcher {
			installed,
			fail,
		})
		.with_default_scope(scope(["snsapi_userinfo"]))
	}

	fn kind_of(extraction: Extraction) -> Option<AuthErrorKind> {
		match extraction {
			Extraction::Outcome(outcome) => outcome.error_kind(),
			Extraction::Exchange(_) => None,
		}
	}

	#[test]
	fn launch_failures_are_unavailable() {
		let request = || login_request(CorrelationTag::new(1), ScopeSet::default());

		assert!(wechat(true, false).start_login(request()).is_ok());
		assert_eq!(
			wechat(false, false).start_login(request()).map_err(|e| e.kind),
			Err(AuthErrorKind::ProviderUnavailable)
		);
		assert_eq!(
			wechat(true, true).start_login(request()),
			Err(AuthError::unavailable("Intent rejected."))
		);
	}

	#[test]
	fn bridge_responses_map_to_extraction() {
		let provider = wechat(true, false);

		assert!(matches!(
			provider.extract_outcome(RawProviderResult::External(ExternalResponse::success("wx"))),
			Extraction::Exchange(ProviderGrant::AuthorizationCode { ref code, code_verifier: None })
				if code.expose() == "wx"
		));

		for (status, expected) in [
			(ExternalStatus::Success, AuthErrorKind::MalformedResponse),
			(ExternalStatus::UserCancelled, AuthErrorKind::UserCancelled),
			(ExternalStatus::Denied, AuthErrorKind::Denied),
			(ExternalStatus::Other(-5), AuthErrorKind::Unknown),
		] {
			let extraction =
				provider.extract_outcome(RawProviderResult::External(ExternalResponse::new(status)));

			assert_eq!(kind_of(extraction), Some(expected), "status: {status:?}");
		}

		assert!(!provider.can_handle(&RawProviderResult::in_process(
			crate::outcome::ResultCode::Ok,
			Value::Null
		)));
	}
}
