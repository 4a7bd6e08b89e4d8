//! Shared utilities for the gratia workspace.

pub mod logging;

pub use logging::init_tracing;
