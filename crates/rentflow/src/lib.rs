//! Contract lifecycle engine for rental property management.
//!
//! The [`workflows::contracts`] module carries the engine itself; the
//! rest of the crate is the ambient plumbing (configuration, telemetry,
//! application errors) a deployed instance needs.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
