//! Pharmapub Core - Common infrastructure for the PubMed affiliation pipeline
//!
//! This crate provides the shared HTTP plumbing, retry policy, logging
//! and progress reporting used by the fetcher, the classifiers and the CLI.

pub mod http;
pub mod logging;
pub mod progress;
pub mod retry;

// Re-exports for convenience
pub use http::{
    FetchError, HttpConfig, SHARED_RUNTIME, get_text, http_client, http_config, set_http_config,
};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::ProgressContext;
pub use retry::{RetryPolicy, retry_with_backoff};
