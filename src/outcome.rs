use std::collections::BTreeMap;

use serde::Serialize;

/// Final result of a run, describing the last attempt made.
///
/// Exactly one outcome is produced per run, whether or not the run was
/// marked failed in the hosting pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResponseOutcome {
    /// HTTP status code of the last attempt.
    pub status: u16,
    /// `true` iff `status < 400`.
    pub success: bool,
    /// Response headers; duplicate names are joined with `", "`.
    pub headers: BTreeMap<String, String>,
    /// Raw response body text.
    pub body: String,
    /// Identifier extracted from a JSON body, or empty.
    pub id: String,
}
