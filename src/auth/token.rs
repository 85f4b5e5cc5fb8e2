//! Normalized token model produced for every successful login.

pub mod profile;
pub mod record;
pub mod secret;
