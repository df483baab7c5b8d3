//! Sortscope Client
//!
//! HTTP implementation of [`ExecutionService`] against the
//! algorithm-execution service:
//!
//! - `POST {base}/api/sort` with `{array, algorithm}` returns `{steps}`
//! - `POST {base}/api/time-trial` with `{array}` returns ranked measurements
//!
//! Transport errors, non-success statuses and undecodable bodies are all
//! reported as [`EngineError::RunRequestFailed`]. Nothing is retried.
//!
//! # Example
//!
//! ```ignore
//! use sortscope_client::{ClientConfig, HttpExecutionService};
//! use sortscope_core::{Algorithm, ExecutionService, RunRequest};
//!
//! let service = HttpExecutionService::new(ClientConfig::new("http://localhost:8000"))?;
//! let steps = service.run(&RunRequest::new(vec![5, 3, 8], Algorithm::Quick)).await?;
//! ```

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use sortscope_core::{
    EngineError, ExecutionService, Result, RunRequest, RunResponse, Step, TrialRequest,
    TrialResponse,
};

/// Path of the run endpoint.
pub const SORT_PATH: &str = "/api/sort";
/// Path of the comparative trial endpoint.
pub const TRIAL_PATH: &str = "/api/time-trial";

/// Configuration for the HTTP client.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Service origin, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Transport timeout. `None` waits for the transport to give up.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Set a transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Algorithm-execution service reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpExecutionService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExecutionService {
    /// Build a client for the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| EngineError::run_failed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the service origin.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Vec<u8>> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "posting request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| EngineError::run_failed(format!("{url}: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| EngineError::run_failed(format!("{url}: {e}")))?;

        ensure_success(status, &bytes)?;
        Ok(bytes.to_vec())
    }
}

impl ExecutionService for HttpExecutionService {
    async fn run(&self, request: &RunRequest) -> Result<Vec<Step>> {
        let body = self.post(SORT_PATH, request).await?;
        let response = RunResponse::from_json(&body)?;
        tracing::debug!(
            algorithm = %request.algorithm,
            steps = response.steps.len(),
            "run response received"
        );
        Ok(response.steps)
    }

    async fn time_trial(&self, request: &TrialRequest) -> Result<TrialResponse> {
        let body = self.post(TRIAL_PATH, request).await?;
        TrialResponse::from_json(&body)
    }
}

/// Turn a non-success status into a run failure, quoting the service's
/// `detail` message when it sends one.
fn ensure_success(status: StatusCode, body: &[u8]) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    #[derive(serde::Deserialize)]
    struct ErrorBody {
        detail: String,
    }

    let reason = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(error) => format!("HTTP {status}: {}", error.detail),
        Err(_) => format!("HTTP {status}"),
    };
    Err(EngineError::RunRequestFailed(reason))
}
