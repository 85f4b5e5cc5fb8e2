//! Ordered collection of configured providers.
//!
//! Mutation happens during setup only: the registry is moved into the
//! [`AttemptCorrelator`](crate::correlator::AttemptCorrelator) when it is built, and
//! from then on it is read-only.

// self
use crate::{
	_prelude::*,
	auth::ProviderName,
	error::ConfigError,
	provider::Provider,
};

/// Providers in registration order, unique by name.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
	providers: Vec<Arc<dyn Provider>>,
}
impl ProviderRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a provider, rejecting a duplicate name.
	pub fn register<P>(&mut self, provider: P) -> Result<(), ConfigError>
	where
		P: 'static + Provider,
	{
		self.register_shared(Arc::new(provider))
	}

	/// Adds an already shared provider, rejecting a duplicate name.
	pub fn register_shared(&mut self, provider: Arc<dyn Provider>) -> Result<(), ConfigError> {
		if self.contains(provider.name()) {
			return Err(ConfigError::DuplicateProvider { name: provider.name().to_string() });
		}

		tracing::debug!(provider = %provider.name(), kind = %provider.kind(), "Provider registered.");

		self.providers.push(provider);

		Ok(())
	}

	/// Builder-style variant of [`ProviderRegistry::register`].
	pub fn with<P>(mut self, provider: P) -> Result<Self, ConfigError>
	where
		P: 'static + Provider,
	{
		self.register(provider)?;

		Ok(self)
	}

	/// Registered providers in registration order.
	pub fn list(&self) -> &[Arc<dyn Provider>] {
		&self.providers
	}

	/// Registered provider names in registration order.
	pub fn names(&self) -> impl Iterator<Item = &ProviderName> {
		self.providers.iter().map(|provider| provider.name())
	}

	/// Looks a provider up by name.
	pub fn lookup(&self, name: &str) -> Result<&Arc<dyn Provider>, ConfigError> {
		self.providers
			.iter()
			.find(|provider| provider.name().as_ref() == name)
			.ok_or_else(|| ConfigError::ProviderNotFound { name: name.to_owned() })
	}

	/// Returns `true` if a provider named `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.lookup(name).is_ok()
	}

	/// Number of registered providers.
	pub fn len(&self) -> usize {
		self.providers.len()
	}

	/// Returns `true` if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}
}
impl Debug for ProviderRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_list()
			.entries(self.providers.iter().map(|provider| (provider.name(), provider.kind())))
			.finish()
	}
}
