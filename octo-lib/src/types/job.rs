use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use url::Url;

/// A single HTTP job of a batch.
///
/// The payload is sent as the JSON-encoded body of a `POST` request to `url`.
///
/// ```
/// use octo_lib::Job;
///
/// let job: Job = serde_json::from_str(
///     r#"{"url": "http://127.0.0.1:8001", "payload": {"title": "title number 1"}}"#,
/// )
/// .unwrap();
/// assert_eq!(job.url.as_str(), "http://127.0.0.1:8001/");
/// assert!(job.headers.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Target of the request
    pub url: Url,
    /// Body of the request, encoded as JSON
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Extra headers sent with the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

impl Job {
    #[must_use]
    /// Create a job without extra headers
    pub const fn new(url: Url, payload: serde_json::Value) -> Self {
        Self {
            url,
            payload,
            headers: None,
        }
    }
}

impl Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "POST {}", self.url)
    }
}

/// What a successful HTTP job returns
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobResponse {
    /// HTTP status code of the response
    pub status: u16,
    /// Body of the response, decoded as text
    pub body: String,
}
