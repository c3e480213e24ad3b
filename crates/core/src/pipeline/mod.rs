//! Per-request pipeline: identifier in, `Outcome` out.

mod runner;
mod types;

pub use runner::Pipeline;
pub use types::{Outcome, Stage};
