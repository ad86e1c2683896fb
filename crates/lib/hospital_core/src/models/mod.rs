//! Domain models shared by the auth and record services.

pub mod auth;
pub mod records;
