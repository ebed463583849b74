//! Domain primitives for the one-shot question-answering task client.
//!
//! This crate owns parameter resolution, task submission, polling, and result
//! lookup against narrow synchronous store/backend traits. It intentionally
//! excludes AWS SDK and async runtime concerns; those live in `qabot_aws`.

pub mod error;
pub mod launch;
pub mod params;
pub mod poll;
pub mod problems;
pub mod record;
pub mod results;
pub mod workflow;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use error::QaBotError;
