//! # hospital_core
//!
//! Core domain logic for the hospital backend: credentials, tokens, and the
//! doctor / specialty / medication / patient records.

pub mod auth;
pub mod migrate;
pub mod models;
pub mod records;
pub mod store;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
