//! Permission scopes requested from a provider.

// std
use std::collections::BTreeSet;
// crates.io
use serde::{Deserializer, de::Error as DeError};
// self
use crate::_prelude::*;

/// Scope validation failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// An entry was empty.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// An entry contains whitespace or a comma.
	#[error("Scope `{scope}` contains a separator character.")]
	ContainsSeparator {
		/// Offending entry.
		scope: String,
	},
}

/// Sorted, deduplicated set of scopes (OAuth scopes or SDK permissions).
///
/// The empty set is meaningful: it asks the provider for its own default scope, see
/// [`ScopeSet::or_default`].
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "Vec<String>")]
pub struct ScopeSet(Arc<[String]>);
impl ScopeSet {
	/// Validates and normalizes `scopes`.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut set = BTreeSet::new();

		for scope in scopes {
			let scope = scope.into();

			if scope.is_empty() {
				return Err(ScopeValidationError::Empty);
			}
			if scope.chars().any(is_separator) {
				return Err(ScopeValidationError::ContainsSeparator { scope });
			}

			set.insert(scope);
		}

		Ok(Self(set.into_iter().collect()))
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no scope was requested.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns `true` if `scope` is part of the set.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.binary_search_by(|candidate| candidate.as_str().cmp(scope)).is_ok()
	}

	/// Scopes in sorted order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Space-delimited form used in authorization URLs.
	pub fn normalized(&self) -> String {
		self.0.join(" ")
	}

	/// `self`, or `fallback` when nothing was requested.
	pub fn or_default<'a>(&'a self, fallback: &'a ScopeSet) -> &'a ScopeSet {
		if self.is_empty() { fallback } else { self }
	}

	/// Scopes present in either set.
	pub fn union(&self, other: &ScopeSet) -> ScopeSet {
		let merged = self.iter().chain(other.iter()).collect::<BTreeSet<_>>();

		Self(merged.into_iter().map(str::to_owned).collect())
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_set().entries(self.iter()).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	/// Parses space- or comma-delimited scopes (`"email public_profile"`,
	/// `"email,public_profile"`).
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s.split(is_separator).filter(|scope| !scope.is_empty()))
	}
}
impl From<ScopeSet> for Vec<String> {
	fn from(scopes: ScopeSet) -> Self {
		scopes.0.to_vec()
	}
}
impl<'de> Deserialize<'de> for ScopeSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let parsed = match ScopeRepr::deserialize(deserializer)? {
			ScopeRepr::Delimited(s) => s.parse(),
			ScopeRepr::List(list) => Self::new(list),
		};

		parsed.map_err(DeError::custom)
	}
}

// Accepted serialized forms: a delimited string or a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScopeRepr {
	Delimited(String),
	List(Vec<String>),
}

fn is_separator(c: char) -> bool {
	c.is_whitespace() || c == ','
}
