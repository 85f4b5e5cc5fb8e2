//! Identity vocabulary shared by providers and the normalizer: names, scopes, and tokens.

pub mod id;
pub mod scope;
pub mod token;

pub use id::*;
pub use scope::*;
pub use token::{profile::*, record::*, secret::*};
