//! Credit scoring and loan eligibility decisions.
//!
//! The `lending` module holds the decision engine and its store contract; the
//! remaining modules carry the configuration, logging and error plumbing
//! shared with the API service.

pub mod config;
pub mod error;
pub mod lending;
pub mod telemetry;
