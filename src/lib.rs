//! `request-runner` performs a single HTTP request on behalf of an
//! automation pipeline, with bounded retry on failure statuses.
//!
//! The crate wraps the request/retry/report sequence with:
//! - [`RequestConfig`]: the configuration record, buildable from the
//!   hosting runner's `INPUT_*` environment surface
//! - [`RequestRunner::run`]: up to `retry_count + 1` attempts, exactly one
//!   [`ResponseOutcome`] reported per run
//! - [`PipelineContext`]: the injected logging/output/failure capability,
//!   with [`ActionsContext`] as the production implementation

mod config;
mod context;
mod error;
mod extract;
mod outcome;
mod runner;

pub use config::RequestConfig;
pub use context::{ActionsContext, PipelineContext};
pub use error::RunnerError;
pub use outcome::ResponseOutcome;
pub use runner::RequestRunner;

pub type Result<T> = std::result::Result<T, RunnerError>;
