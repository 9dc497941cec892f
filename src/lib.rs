pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;

// Layered boundaries: the verification port and its HTTP adapter
pub mod app;
pub mod infra;

pub use error::{ListError, Result};
pub use pipeline::{Pipeline, RunSummary};
