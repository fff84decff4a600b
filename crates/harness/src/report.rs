//! Benchmark report
//!
//! The JSON artifact is the stable output of a run. Key names and key order
//! are part of the schema consumed by downstream tooling. An HTML rendering
//! of the same data can be produced alongside it for humans.

use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::BenchmarkConfig;
use crate::error::{BenchError, Result};
use crate::executor::{ExecutorError, JsonObject, PostOutcome};
use crate::metrics::{round_to_3, round_to_6, BenchmarkMetrics, LatencySummary};
use crate::payload::{BATCH_CODE, PUB_KEY_ID};

/// Outcome of one measured request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResult {
    pub index: u64,
    /// HTTP status, 0 when no response was received
    pub status: u16,
    pub accepted: bool,
    /// Latency rounded to 3 decimals
    pub latency_ms: f64,
    pub message: String,
}

impl RequestResult {
    pub fn from_outcome(index: u64, outcome: &PostOutcome) -> Self {
        Self {
            index,
            status: outcome.status,
            accepted: outcome.is_accepted(),
            latency_ms: round_to_3(outcome.latency_ms),
            message: outcome.message(),
        }
    }
}

/// Parameters that make the workload reproducible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadParameters {
    pub requests: u64,
    pub base_timestamp: i64,
    pub pub_key_id: String,
    pub batch_code: String,
}

/// Client-observed aggregate results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResults {
    pub total_requests: u64,
    pub accepted_requests: u64,
    pub rejected_requests: u64,
    /// accepted / total, rounded to 6 decimals
    pub success_rate: f64,
    pub latency_ms: LatencySummary,
}

/// Final benchmark artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReport {
    pub benchmark: String,
    pub mode: String,
    pub deterministic_workload: WorkloadParameters,
    pub client_results: ClientResults,
    /// Opaque server snapshot, or `{"error": ...}` when it could not be fetched
    pub server_metrics: Value,
    pub per_request: Vec<RequestResult>,
}

/// Turn the metrics fetch outcome into the report section
pub fn server_metrics_section(fetch: std::result::Result<JsonObject, ExecutorError>) -> Value {
    match fetch {
        Ok(snapshot) => Value::Object(snapshot),
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    }
}

/// Assembles a [`BenchmarkReport`] from a finished run
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    benchmark: String,
    mode: String,
    workload: WorkloadParameters,
}

impl ReportBuilder {
    pub fn new(config: &BenchmarkConfig) -> Self {
        Self {
            benchmark: config.benchmark.clone(),
            mode: config.mode.clone(),
            workload: WorkloadParameters {
                requests: config.requests,
                base_timestamp: config.base_timestamp,
                pub_key_id: PUB_KEY_ID.to_string(),
                batch_code: BATCH_CODE.to_string(),
            },
        }
    }

    /// Build the report; fails only if no request was recorded
    pub fn build(
        self,
        metrics: &BenchmarkMetrics,
        per_request: Vec<RequestResult>,
        server_metrics: Value,
    ) -> Result<BenchmarkReport> {
        let latency = metrics
            .latency_summary()
            .ok_or_else(|| BenchError::config("no requests were recorded"))?;

        debug_assert_eq!(per_request.len() as u64, metrics.total());

        Ok(BenchmarkReport {
            benchmark: self.benchmark,
            mode: self.mode,
            deterministic_workload: self.workload,
            client_results: ClientResults {
                total_requests: metrics.total(),
                accepted_requests: metrics.accepted(),
                rejected_requests: metrics.rejected(),
                success_rate: round_to_6(metrics.success_rate()),
                latency_ms: latency.rounded(),
            },
            server_metrics,
            per_request,
        })
    }
}

impl BenchmarkReport {
    /// Pretty-printed, ASCII-only JSON with a trailing newline
    pub fn to_json_string(&self) -> Result<String> {
        let mut json = escape_non_ascii(&serde_json::to_string_pretty(self)?);
        json.push('\n');
        Ok(json)
    }

    /// Write the JSON artifact, creating parent directories as needed
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        write_creating_parents(path, &self.to_json_string()?)?;
        Ok(path.to_path_buf())
    }

    /// Render the HTML companion report
    pub fn render_html(&self) -> Result<String> {
        let mut env = Environment::new();
        env.add_template("report.html", REPORT_TEMPLATE)?;
        let template = env.get_template("report.html")?;

        let results = &self.client_results;
        let server_metrics = serde_json::to_string_pretty(&self.server_metrics)?;
        let rendered = template.render(context! {
            benchmark => self.benchmark,
            mode => self.mode,
            generated_at => chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            workload => self.deterministic_workload,
            total => results.total_requests,
            accepted => results.accepted_requests,
            rejected => results.rejected_requests,
            success_pct => format!("{:.2}", results.success_rate * 100.0),
            latency => results.latency_ms,
            per_request => self.per_request,
            server_metrics => server_metrics,
        })?;
        Ok(rendered)
    }

    /// Write the HTML companion report, creating parent directories as needed
    pub fn write_html(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        write_creating_parents(path, &self.render_html()?)?;
        Ok(path.to_path_buf())
    }
}

/// Replace every non-ASCII character with `\uXXXX` escapes (UTF-16 units)
///
/// Non-ASCII can only occur inside JSON string literals, so the result is the
/// same document with a byte-stable ASCII encoding.
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        for unit in c.encode_utf16(&mut units) {
            out.push_str(&format!("\\u{:04x}", unit));
        }
    }
    out
}

fn write_creating_parents(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;
    Ok(())
}

const REPORT_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{{ benchmark }}</title>
    <style>
        body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; background: #1a1a2e; color: #eee; margin: 0; }
        .container { max-width: 1100px; margin: 0 auto; padding: 20px; }
        header, .card, .panel { background: #1f2940; border-radius: 10px; padding: 20px; margin-bottom: 20px; }
        .cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 20px; }
        .value { font-size: 2rem; font-weight: bold; color: #00d26a; }
        .label, .subtitle { color: #888; }
        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 8px; text-align: left; border-bottom: 1px solid #0f3460; }
        td { font-family: monospace; }
        .rejected { color: #e74c3c; }
        pre { white-space: pre-wrap; font-size: 0.85rem; }
    </style>
</head>
<body>
<div class="container">
    <header>
        <h1>{{ benchmark }}</h1>
        <div class="subtitle">mode: {{ mode }} | requests: {{ workload.requests }} | base timestamp: {{ workload.baseTimestamp }} | key: {{ workload.pubKeyId }} | batch: {{ workload.batchCode }} | generated {{ generated_at }}</div>
    </header>

    <div class="cards">
        <div class="card"><div class="value">{{ total }}</div><div class="label">Total requests</div></div>
        <div class="card"><div class="value">{{ accepted }}</div><div class="label">Accepted</div></div>
        <div class="card"><div class="value">{{ rejected }}</div><div class="label">Rejected</div></div>
        <div class="card"><div class="value">{{ success_pct }}%</div><div class="label">Success rate</div></div>
    </div>

    <div class="panel">
        <h2>Latency (ms)</h2>
        <table>
            <thead><tr><th>Min</th><th>Avg</th><th>P50</th><th>P95</th><th>Max</th></tr></thead>
            <tbody><tr><td>{{ latency.min }}</td><td>{{ latency.avg }}</td><td>{{ latency.p50 }}</td><td>{{ latency.p95 }}</td><td>{{ latency.max }}</td></tr></tbody>
        </table>
    </div>

    <div class="panel">
        <h2>Server metrics</h2>
        <pre>{{ server_metrics }}</pre>
    </div>

    <div class="panel">
        <h2>Requests</h2>
        <table>
            <thead><tr><th>#</th><th>Status</th><th>Accepted</th><th>Latency (ms)</th><th>Message</th></tr></thead>
            <tbody>
            {% for r in per_request %}
                <tr{% if not r.accepted %} class="rejected"{% endif %}><td>{{ r.index }}</td><td>{{ r.status }}</td><td>{{ r.accepted }}</td><td>{{ r.latencyMs }}</td><td>{{ r.message }}</td></tr>
            {% endfor %}
            </tbody>
        </table>
    </div>
</div>
</body>
</html>
"##;
