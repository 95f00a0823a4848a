pub mod compile;
pub mod panels;

use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("compilation timed out after {attempts} status checks")]
    PollTimeout { attempts: usize },

    #[error("malformed response: missing `{0}`")]
    Shape(&'static str),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Client for the manuscript backend's JSON routes under
/// `/writer/api/project/{id}/`. One compilation may be in flight at a time;
/// a second request is rejected, not queued.
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    project_id: u64,
    compiling: AtomicBool,
    poll_interval: Duration,
    max_poll_attempts: usize,
}

impl ApiClient {
    pub fn new(base_url: &str, project_id: u64) -> ApiResult<Self> {
        let http = reqwest::blocking::Client::builder().build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id,
            compiling: AtomicBool::new(false),
            poll_interval: Duration::from_secs(1),
            max_poll_attempts: 300,
        })
    }

    pub(crate) fn http(&self) -> &reqwest::blocking::Client {
        &self.http
    }

    pub(crate) fn url(&self, tail: &str) -> String {
        format!(
            "{}/writer/api/project/{}/{}",
            self.base_url, self.project_id, tail
        )
    }

    pub fn is_compiling(&self) -> bool {
        self.compiling.load(Ordering::SeqCst)
    }

    /// Claim the compile slot. None when a compilation is already running.
    pub(crate) fn begin_compile(&self) -> Option<CompileGuard<'_>> {
        if self.compiling.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(CompileGuard { client: self })
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub(crate) fn max_poll_attempts(&self) -> usize {
        self.max_poll_attempts
    }

    #[cfg(test)]
    pub(crate) fn set_poll_budget(&mut self, interval: Duration, attempts: usize) {
        self.poll_interval = interval;
        self.max_poll_attempts = attempts;
    }
}

/// Releases the busy flag when the compilation call returns.
pub(crate) struct CompileGuard<'a> {
    client: &'a ApiClient,
}

impl Drop for CompileGuard<'_> {
    fn drop(&mut self) {
        self.client.compiling.store(false, Ordering::SeqCst);
    }
}

/// Shape-validation helpers. Malformed bodies are reported as values so
/// callers can log and no-op instead of unwinding into the UI.
pub(crate) fn get_bool(value: &Value, key: &'static str) -> ApiResult<bool> {
    value
        .get(key)
        .and_then(Value::as_bool)
        .ok_or(ApiError::Shape(key))
}

pub(crate) fn get_str(value: &Value, key: &'static str) -> ApiResult<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ApiError::Shape(key))
}

pub(crate) fn opt_str(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_construction() {
        let client = ApiClient::new("http://localhost:8000/", 42).unwrap();
        assert_eq!(
            client.url("compile_preview/"),
            "http://localhost:8000/writer/api/project/42/compile_preview/"
        );
    }

    #[test]
    fn test_compile_guard_releases_on_drop() {
        let client = ApiClient::new("http://localhost:8000", 1).unwrap();

        let guard = client.begin_compile().unwrap();
        assert!(client.is_compiling());
        // Second claim is rejected outright while one is in flight.
        assert!(client.begin_compile().is_none());

        drop(guard);
        assert!(!client.is_compiling());
        assert!(client.begin_compile().is_some());
    }

    #[test]
    fn test_shape_helpers() {
        let body = json!({"success": true, "output_pdf": "main.pdf"});
        assert!(get_bool(&body, "success").unwrap());
        assert_eq!(get_str(&body, "output_pdf").unwrap(), "main.pdf");
        assert!(matches!(
            get_bool(&body, "missing"),
            Err(ApiError::Shape("missing"))
        ));
        assert_eq!(opt_str(&body, "log"), None);
    }
}
