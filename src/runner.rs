use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use tokio::time::sleep;

use crate::{extract, PipelineContext, RequestConfig, ResponseOutcome, Result, RunnerError};

/// Executes the request/retry/report sequence for one run.
pub struct RequestRunner {
    http: reqwest::Client,
    config: RequestConfig,
}

impl RequestRunner {
    /// Creates a runner for the given configuration.
    ///
    /// No timeout is set on the client; whatever the client's default is
    /// applies to each attempt.
    pub fn new(config: RequestConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Performs up to `retry_count + 1` attempts and reports exactly one
    /// outcome through the context.
    ///
    /// A failure status (≥ 400) with retries remaining is warned about and
    /// retried after the configured delay. Once attempts are exhausted the
    /// run is either marked failed (`fail_on_error`) or warned about, and
    /// the last response is still read and reported either way. A transport
    /// error aborts the run before any outputs are reported.
    pub async fn run<C: PipelineContext>(&self, ctx: &mut C) -> Result<ResponseOutcome> {
        ctx.info(&format!("Inputs: {}", to_json(&self.config)));

        let method = parse_method(&self.config.method)?;
        let request_headers = build_header_map(&self.config.headers)?;

        let mut remaining = self.config.retry_count;
        loop {
            let mut request = self
                .http
                .request(method.clone(), &self.config.url)
                .headers(request_headers.clone());
            if let Some(body) = &self.config.body {
                request = request.body(body.clone());
            }
            let response = request.send().await?;

            let status = response.status().as_u16();
            let success = status < 400;

            if !success {
                if remaining > 0 {
                    ctx.warning(&format!(
                        "Request failed with status code {status}. Retries remaining: {remaining}."
                    ));
                    if self.config.retry_delay > 0 {
                        ctx.info(&format!("Delaying for {}ms...", self.config.retry_delay));
                        #[cfg(feature = "tracing")]
                        tracing::debug!("retrying request after {} ms", self.config.retry_delay);
                        sleep(Duration::from_millis(self.config.retry_delay)).await;
                    }
                    remaining -= 1;
                    continue;
                }

                let message =
                    format!("Request failed with status code {status}. No retries remaining.");
                if self.config.fail_on_error {
                    ctx.set_failed(&message);
                } else {
                    ctx.warning(&message);
                }
            }

            // Headers must be captured before the body read consumes the
            // response.
            let headers = collect_headers(response.headers());
            let body = response.text().await?;

            let id = match extract::extract_id(&body) {
                Some(id) => id,
                None => {
                    ctx.info(&format!("Failed to parse response body as JSON: {body}"));
                    String::new()
                }
            };

            let outcome = ResponseOutcome {
                status,
                success,
                headers,
                body,
                id,
            };
            ctx.info(&format!("Outputs: {}", to_json(&outcome)));

            ctx.set_output("status", &outcome.status.to_string());
            ctx.set_output("success", &outcome.success.to_string());
            ctx.set_output("headers", &to_json(&outcome.headers));
            ctx.set_output("body", &outcome.body);
            ctx.set_output("id", &outcome.id);

            return Ok(outcome);
        }
    }
}

fn parse_method(method: &str) -> Result<Method> {
    let trimmed = method.trim();
    if trimmed.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(trimmed.to_ascii_uppercase().as_bytes())
        .map_err(|_| RunnerError::Config(format!("invalid HTTP method '{method}'")))
}

fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RunnerError::Config(format!("invalid header name '{name}'")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| RunnerError::Config(format!("invalid value for header '{name}'")))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Flattens response headers into an ordered map, joining duplicate names
/// with `", "` and lossily decoding non-UTF-8 values.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match map.entry(name.as_str().to_owned()) {
            Entry::Occupied(mut entry) => {
                let joined = entry.get_mut();
                joined.push_str(", ");
                joined.push_str(&value);
            }
            Entry::Vacant(entry) => {
                entry.insert(value.into_owned());
            }
        }
    }
    map
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_owned())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use reqwest::header::{HeaderMap, HeaderValue};
    use reqwest::Method;

    use super::{build_header_map, collect_headers, parse_method};
    use crate::RunnerError;

    #[test]
    fn empty_method_defaults_to_get() {
        assert_eq!(parse_method("").expect("must parse"), Method::GET);
        assert_eq!(parse_method("  ").expect("must parse"), Method::GET);
    }

    #[test]
    fn method_is_uppercased() {
        assert_eq!(parse_method("post").expect("must parse"), Method::POST);
        assert_eq!(parse_method("Delete").expect("must parse"), Method::DELETE);
    }

    #[test]
    fn method_with_spaces_is_rejected() {
        let err = parse_method("GET STUFF").expect_err("must fail");
        assert!(matches!(err, RunnerError::Config(_)));
    }

    #[test]
    fn header_name_with_spaces_is_rejected() {
        let headers: BTreeMap<String, String> =
            [("not a header".to_owned(), String::new())].into();
        let err = build_header_map(&headers).expect_err("must fail");
        assert!(matches!(err, RunnerError::Config(_)));
    }

    #[test]
    fn duplicate_response_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        let map = collect_headers(&headers);
        assert_eq!(map.get("set-cookie").map(String::as_str), Some("a=1, b=2"));
    }
}
