use std::collections::BTreeMap;
use std::env;

use serde::Serialize;

use crate::{Result, RunnerError};

/// Configuration for one run, immutable once constructed.
///
/// Serializes with camelCase field names so the `Inputs:` log line shows
/// the same names the pipeline configuration uses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    /// Target URL, required non-empty.
    pub url: String,
    /// HTTP verb; an empty string sends GET.
    pub method: String,
    /// Request headers; a later duplicate name overwrites an earlier one.
    pub headers: BTreeMap<String, String>,
    /// Raw request payload, sent as-is.
    pub body: Option<String>,
    /// Maximum additional attempts after the first.
    pub retry_count: u64,
    /// Fixed wait before each retry, in milliseconds.
    pub retry_delay: u64,
    /// Whether exhausting retries on a failure status marks the run failed.
    pub fail_on_error: bool,
}

impl RequestConfig {
    /// Reads the configuration from the hosting runner's environment.
    ///
    /// Each input name is looked up as `INPUT_<NAME>` (uppercased, spaces
    /// replaced by underscores, dashes kept), which is how the hosting
    /// runner exposes step inputs:
    ///
    /// - `url` (required)
    /// - `method`
    /// - `headers` (multi-line, one `name: value` per line)
    /// - `body`
    /// - `retry-count`
    /// - `retry-delay` (milliseconds)
    /// - `fail-on-error`
    pub fn from_env() -> Result<Self> {
        let url = input("url");
        if url.is_empty() {
            return Err(RunnerError::Config("url input is required".to_owned()));
        }

        Ok(Self {
            url,
            method: input("method"),
            headers: parse_header_lines(&raw_input("headers")),
            body: non_empty(input("body")),
            retry_count: parse_non_negative(&input("retry-count")),
            retry_delay: parse_non_negative(&input("retry-delay")),
            fail_on_error: parse_bool("fail-on-error", &input("fail-on-error"))?,
        })
    }
}

fn input(name: &str) -> String {
    raw_input(name).trim().to_owned()
}

fn raw_input(name: &str) -> String {
    let key = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
    env::var(key).unwrap_or_default()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parses a multi-line `name: value` block into a header map.
///
/// Each non-blank line splits at its first `:`, both sides trimmed. A line
/// without `:` becomes a key with an empty value; nothing is rejected here.
pub(crate) fn parse_header_lines(raw: &str) -> BTreeMap<String, String> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match line.split_once(':') {
            Some((name, value)) => (name.trim().to_owned(), value.trim().to_owned()),
            None => (line.trim().to_owned(), String::new()),
        })
        .collect()
}

/// Parses a numeric input, treating empty or non-numeric text as zero.
///
/// Zero disables retrying (for `retry-count`) or the inter-retry wait (for
/// `retry-delay`), so a malformed value degrades the run instead of
/// rejecting it.
fn parse_non_negative(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else {
        Err(RunnerError::Config(format!(
            "input '{name}' is not a boolean: '{raw}'"
        )))
    }
}
