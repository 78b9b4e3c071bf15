/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Network or request execution error from `reqwest`.
    ///
    /// Not retried: the retry policy covers failure statuses only, and a
    /// transport error aborts the run before any outputs are reported.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Invalid configuration detected before the first attempt.
    #[error("invalid configuration: {0}")]
    Config(String),
}
