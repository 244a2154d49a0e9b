//! Infrastructure layer: configuration loading and tracing setup.

pub mod config;
pub mod logging;
