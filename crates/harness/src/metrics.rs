//! Metrics collection for benchmark runs
//!
//! Collects per-request latency samples and acceptance counts, and reduces
//! them to the summary statistics published in the report.

use serde::{Deserialize, Serialize};

use crate::executor::RequestOutcome;

/// Percentile thresholds published in the report
pub const P50: f64 = 50.0;
pub const P95: f64 = 95.0;

/// Summary statistics for latency, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub p50: f64,
    pub p95: f64,
}

impl LatencySummary {
    /// Compute statistics over unsorted samples; `None` when there are none
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let sum: f64 = sorted.iter().sum();
        Some(Self {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            avg: sum / sorted.len() as f64,
            p50: percentile(&sorted, P50),
            p95: percentile(&sorted, P95),
        })
    }

    /// Copy with every figure rounded to 3 decimals
    pub fn rounded(&self) -> Self {
        Self {
            min: round_to_3(self.min),
            max: round_to_3(self.max),
            avg: round_to_3(self.avg),
            p50: round_to_3(self.p50),
            p95: round_to_3(self.p95),
        }
    }
}

/// Percentile of ascending samples by linear interpolation between closest ranks
///
/// `p` is in `[0, 100]`. The fractional rank is `(n - 1) * p / 100`; a rank
/// that lands on an index returns that sample unchanged. Returns 0.0 for an
/// empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let position = (sorted.len() - 1) as f64 * (p / 100.0);
    let low = position.floor() as usize;
    let high = position.ceil() as usize;
    if low == high {
        return sorted[low];
    }

    let weight = position - low as f64;
    sorted[low] * (1.0 - weight) + sorted[high] * weight
}

/// Round to `decimals` places from the exact binary value, ties to even
///
/// Goes through decimal formatting instead of `(v * 10^n).round() / 10^n`,
/// whose inexact multiply and ties-away rounding drift in the last digit.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

pub fn round_to_3(value: f64) -> f64 {
    round_to(value, 3)
}

pub fn round_to_6(value: f64) -> f64 {
    round_to(value, 6)
}

/// Aggregated request metrics for one run
#[derive(Debug, Default)]
pub struct BenchmarkMetrics {
    /// Raw latency samples in request order (for percentile calculation)
    samples: Vec<f64>,
    accepted: u64,
    protocol_failures: u64,
    transport_failures: u64,
}

impl BenchmarkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(requests: usize) -> Self {
        Self {
            samples: Vec::with_capacity(requests),
            ..Self::default()
        }
    }

    /// Record one attempt; every attempt contributes a latency sample
    pub fn record(&mut self, latency_ms: f64, outcome: RequestOutcome) {
        self.samples.push(latency_ms);
        match outcome {
            RequestOutcome::Accepted => self.accepted += 1,
            RequestOutcome::ProtocolFailure => self.protocol_failures += 1,
            RequestOutcome::TransportFailure => self.transport_failures += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.samples.len() as u64
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Everything that was not accepted, whatever the reason
    pub fn rejected(&self) -> u64 {
        self.total() - self.accepted
    }

    pub fn protocol_failures(&self) -> u64 {
        self.protocol_failures
    }

    pub fn transport_failures(&self) -> u64 {
        self.transport_failures
    }

    /// Accepted / total, 0.0 before any attempt
    pub fn success_rate(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.accepted as f64 / self.samples.len() as f64
    }

    /// Latency statistics over all attempts
    pub fn latency_summary(&self) -> Option<LatencySummary> {
        LatencySummary::from_samples(&self.samples)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}
