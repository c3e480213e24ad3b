//! Storage-service authentication.
//!
//! The storage API is gated by a bearer token obtained from its login
//! endpoint. `CredentialCache` owns that token and hands out copies.

mod cache;
mod types;

pub use cache::CredentialCache;
pub use types::*;
