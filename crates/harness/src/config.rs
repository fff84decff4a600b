//! Benchmark configuration
//!
//! Workload parameters and endpoint locations for one benchmark run.

use std::time::Duration;

use crate::error::{BenchError, Result};

/// Path of the ingestion endpoint relative to the base URL
pub const INGEST_PATH: &str = "/api/v1/ingest";

/// Path of the server metrics endpoint relative to the base URL
pub const METRICS_PATH: &str = "/api/v1/metrics/overview";

/// Default base URL of the service under test
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Default number of measured requests
pub const DEFAULT_REQUESTS: u64 = 100;

/// Default base UNIX timestamp for deterministic payload generation
pub const DEFAULT_BASE_TIMESTAMP: i64 = 1_700_002_000;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default report label
pub const DEFAULT_BENCHMARK_LABEL: &str = "backend-cpp ingest success-rate/latency baseline";

/// Default server mode label
pub const DEFAULT_MODE: &str = "mock";

/// Configuration for a benchmark run
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Base URL of the ingestion service (trailing slashes are ignored)
    pub base_url: String,
    /// Number of measured requests, must be > 0
    pub requests: u64,
    /// Timestamp of packet 0; packet `i` carries `base_timestamp + i`
    pub base_timestamp: i64,
    /// Timeout applied to every request, including the metrics fetch
    pub timeout: Duration,
    /// Free-form report label
    pub benchmark: String,
    /// Label for the server mode under test (e.g. "mock", "ethereum")
    pub mode: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            requests: DEFAULT_REQUESTS,
            base_timestamp: DEFAULT_BASE_TIMESTAMP,
            timeout: DEFAULT_TIMEOUT,
            benchmark: DEFAULT_BENCHMARK_LABEL.to_string(),
            mode: DEFAULT_MODE.to_string(),
        }
    }
}

impl BenchmarkConfig {
    /// Create a configuration targeting `base_url` with default workload
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the request count
    pub fn with_requests(mut self, requests: u64) -> Self {
        self.requests = requests;
        self
    }

    /// Set the base timestamp
    pub fn with_base_timestamp(mut self, base_timestamp: i64) -> Self {
        self.base_timestamp = base_timestamp;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the server mode label
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Convert a timeout given in (possibly fractional) seconds
    pub fn timeout_from_secs(secs: f64) -> Result<Duration> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(BenchError::config(format!(
                "--timeout-sec must be a positive number, got {}",
                secs
            )));
        }
        Duration::try_from_secs_f64(secs)
            .map_err(|e| BenchError::config(format!("invalid timeout {}: {}", secs, e)))
    }

    /// Check the configuration before any network activity
    pub fn validate(&self) -> Result<()> {
        if self.requests == 0 {
            return Err(BenchError::config("--requests must be > 0"));
        }
        if self.timeout.is_zero() {
            return Err(BenchError::config("timeout must be greater than zero"));
        }

        let base = self.trimmed_base_url();
        if base.is_empty() {
            return Err(BenchError::config("base URL must not be empty"));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(BenchError::config(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }

        Ok(())
    }

    /// URL of the ingestion endpoint
    pub fn ingest_url(&self) -> String {
        format!("{}{}", self.trimmed_base_url(), INGEST_PATH)
    }

    /// URL of the server metrics endpoint
    pub fn metrics_url(&self) -> String {
        format!("{}{}", self.trimmed_base_url(), METRICS_PATH)
    }

    fn trimmed_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}
