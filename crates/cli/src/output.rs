// Output formatting for CLI

use std::path::{Path, PathBuf};

use ingestbench_harness::BenchmarkReport;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            "yaml" => OutputFormat::Yaml,
            _ => OutputFormat::Text,
        }
    }

    pub fn print_value<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        match self {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
            OutputFormat::Text => {
                // Text format is handled by the caller
            }
        }
        Ok(())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, OutputFormat::Text)
    }
}

/// What the run produced, as printed on stdout
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub artifact: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_report: Option<PathBuf>,
    pub success_rate: f64,
    pub accepted: u64,
    pub rejected: u64,
    pub avg_ms: f64,
    pub p95_ms: f64,
}

impl RunSummary {
    pub fn new(report: &BenchmarkReport, artifact: &Path, html_report: Option<&Path>) -> Self {
        let results = &report.client_results;
        Self {
            artifact: artifact.to_path_buf(),
            html_report: html_report.map(Path::to_path_buf),
            success_rate: results.success_rate,
            accepted: results.accepted_requests,
            rejected: results.rejected_requests,
            avg_ms: results.latency_ms.avg,
            p95_ms: results.latency_ms.p95,
        }
    }

    /// The one-line text summary, e.g. `successRate=66.67% accepted=2 ...`
    pub fn headline(&self) -> String {
        format!(
            "successRate={:.2}% accepted={} rejected={} avgMs={} p95Ms={}",
            self.success_rate * 100.0,
            self.accepted,
            self.rejected,
            self.avg_ms,
            self.p95_ms
        )
    }

    pub fn print(&self, format: OutputFormat) -> anyhow::Result<()> {
        if !format.is_text() {
            return format.print_value(self);
        }
        print_field("artifact", &self.artifact.display().to_string());
        if let Some(html) = &self.html_report {
            print_field("html", &html.display().to_string());
        }
        println!("{}", self.headline());
        Ok(())
    }
}

/// Print a simple key-value pair for text output
pub fn print_field(label: &str, value: &str) {
    println!("{}: {}", label, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        RunSummary {
            artifact: PathBuf::from("artifacts/baseline.json"),
            html_report: None,
            success_rate: 0.666667,
            accepted: 2,
            rejected: 1,
            avg_ms: 4.125,
            p95_ms: 7.9,
        }
    }

    #[test]
    fn test_headline() {
        assert_eq!(
            summary().headline(),
            "successRate=66.67% accepted=2 rejected=1 avgMs=4.125 p95Ms=7.9"
        );
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("yaml"), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_str("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("anything"), OutputFormat::Text);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let value = serde_json::to_value(summary()).unwrap();
        assert_eq!(value["successRate"], 0.666667);
        assert_eq!(value["p95Ms"], 7.9);
        assert!(value.get("htmlReport").is_none());
    }
}
