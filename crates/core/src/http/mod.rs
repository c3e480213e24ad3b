//! Outbound HTTP adapter.
//!
//! Every upstream call (search, auth, storage) goes through the
//! `HttpTransport` trait so that the pipeline can run against scripted
//! responses in tests.

mod reqwest_transport;
mod types;

pub use reqwest_transport::ReqwestTransport;
pub use types::*;
