// Ingest benchmark CLI
//
// Design Decision: Use clap derive with env fallbacks so CI jobs can configure runs without flags.
// Design Decision: Logs go to stderr; stdout carries only the run summary.
// Design Decision: Support text/json/yaml summary formats for scripting.

mod output;
mod run;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "ingestbench=info,ingestbench_harness=info";

#[derive(Parser, Debug)]
#[command(name = "ingestbench")]
#[command(about = "Deterministic success-rate/latency benchmark for a signed telemetry ingest endpoint")]
#[command(version)]
pub struct Cli {
    /// Ingestion service base URL
    #[arg(
        long,
        env = "INGESTBENCH_BASE_URL",
        default_value = ingestbench_harness::config::DEFAULT_BASE_URL
    )]
    pub base_url: String,

    /// Number of packets to send
    #[arg(long, env = "INGESTBENCH_REQUESTS", default_value_t = ingestbench_harness::config::DEFAULT_REQUESTS)]
    pub requests: u64,

    /// Timestamp of packet 0; packet i carries base + i
    #[arg(long, default_value_t = ingestbench_harness::config::DEFAULT_BASE_TIMESTAMP)]
    pub base_timestamp: i64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 3.0)]
    pub timeout_sec: f64,

    /// Path of the JSON report artifact
    #[arg(
        long,
        env = "INGESTBENCH_OUTPUT",
        default_value = "tools/qa/artifacts/ingest_mock_baseline.json"
    )]
    pub output: PathBuf,

    /// PEM private key used for signing
    #[arg(
        long,
        env = "INGESTBENCH_PRIVATE_KEY",
        default_value = "tools/qa/artifacts/keys/pubkey-1-test-private.pem"
    )]
    pub private_key: PathBuf,

    /// openssl executable
    #[arg(long, env = "INGESTBENCH_OPENSSL", default_value = "openssl")]
    pub openssl_bin: String,

    /// Mode label recorded in the report
    #[arg(long, default_value = ingestbench_harness::config::DEFAULT_MODE)]
    pub mode: String,

    /// Also write an HTML view of the report to this path
    #[arg(long)]
    pub html_report: Option<PathBuf>,

    /// Summary format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub format: String,

    /// Suppress the summary and progress logs
    #[arg(long, short)]
    pub quiet: bool,
}

fn init_tracing(quiet: bool) {
    let default_filter = if quiet { "warn" } else { DEFAULT_LOG_FILTER };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);
    run::run(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["ingestbench"]).unwrap();
        assert_eq!(cli.requests, 100);
        assert_eq!(cli.base_timestamp, 1_700_002_000);
        assert_eq!(cli.timeout_sec, 3.0);
        assert_eq!(cli.mode, "mock");
        assert_eq!(cli.format, "text");
        assert!(cli.html_report.is_none());
        assert!(!cli.quiet);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "ingestbench",
            "--base-url",
            "http://10.0.0.5:9000",
            "--requests",
            "3",
            "--timeout-sec",
            "0.5",
            "--html-report",
            "out/report.html",
            "-f",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.base_url, "http://10.0.0.5:9000");
        assert_eq!(cli.requests, 3);
        assert_eq!(cli.timeout_sec, 0.5);
        assert_eq!(cli.html_report, Some(PathBuf::from("out/report.html")));
        assert_eq!(cli.format, "json");
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["ingestbench", "--format", "xml"]).is_err());
    }
}
