//! Benchmark runner
//!
//! Drives the measured loop: generate → sign → POST → record, one request at a
//! time, then fetches server metrics and assembles the report.

use crate::config::BenchmarkConfig;
use crate::error::{BenchError, Result};
use crate::executor::{HttpExecutor, RequestOutcome};
use crate::metrics::BenchmarkMetrics;
use crate::payload::{self, Packet};
use crate::report::{server_metrics_section, BenchmarkReport, ReportBuilder, RequestResult};
use crate::signer::Signer;

/// Upper bound for pre-allocated sample storage
const MAX_PREALLOCATED_SAMPLES: u64 = 100_000;

/// Generate, hash and sign the packet for `index`
pub async fn signed_packet<S>(signer: &S, index: u64, base_timestamp: i64) -> Result<Packet>
where
    S: Signer + ?Sized,
{
    let (unsigned, hash_hex) = payload::generate(index, base_timestamp);
    let signature = signer.sign(&hash_hex).await?;
    Ok(unsigned.into_signed(hex::encode(signature)))
}

/// Runs one deterministic benchmark against an ingestion endpoint
pub struct BenchmarkRunner<S: Signer> {
    config: BenchmarkConfig,
    signer: S,
    executor: HttpExecutor,
}

impl<S: Signer> BenchmarkRunner<S> {
    /// Validate the configuration and prepare the HTTP client
    pub fn new(config: BenchmarkConfig, signer: S) -> Result<Self> {
        Self::try_new(config, || Ok(signer))
    }

    /// Like [`BenchmarkRunner::new`], building the signer only once the
    /// configuration is known to be valid
    pub fn try_new<F>(config: BenchmarkConfig, make_signer: F) -> Result<Self>
    where
        F: FnOnce() -> Result<S>,
    {
        config.validate()?;
        let signer = make_signer()?;
        let executor = HttpExecutor::new()
            .map_err(|e| BenchError::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            signer,
            executor,
        })
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run the benchmark to completion
    ///
    /// Request failures are recorded and never abort the run. Only signer
    /// problems are fatal.
    pub async fn run(&self) -> Result<BenchmarkReport> {
        self.signer.probe().await?;

        let requests = self.config.requests;
        let ingest_url = self.config.ingest_url();
        tracing::info!(
            requests,
            base_url = %self.config.base_url,
            base_timestamp = self.config.base_timestamp,
            timeout_ms = self.config.timeout.as_millis() as u64,
            "Starting benchmark"
        );

        let mut metrics =
            BenchmarkMetrics::with_capacity(requests.min(MAX_PREALLOCATED_SAMPLES) as usize);
        let mut per_request = Vec::with_capacity(requests.min(MAX_PREALLOCATED_SAMPLES) as usize);
        let progress_every = (requests / 10).max(1);

        for index in 0..requests {
            let packet = signed_packet(&self.signer, index, self.config.base_timestamp).await?;
            let body = serde_json::to_vec(&packet)?;

            let outcome = self
                .executor
                .post(&ingest_url, body, self.config.timeout)
                .await;
            let kind = outcome.outcome();

            match kind {
                RequestOutcome::TransportFailure => tracing::warn!(
                    index,
                    latency_ms = outcome.latency_ms,
                    error = %outcome.message(),
                    "Ingest request failed"
                ),
                _ => tracing::debug!(
                    index,
                    status = outcome.status,
                    accepted = kind == RequestOutcome::Accepted,
                    latency_ms = outcome.latency_ms,
                    "Ingest request completed"
                ),
            }

            metrics.record(outcome.latency_ms, kind);
            per_request.push(RequestResult::from_outcome(index, &outcome));

            // Progress reporting
            let done = index + 1;
            if done % progress_every == 0 && done < requests {
                tracing::info!(
                    done,
                    requests,
                    accepted = metrics.accepted(),
                    "Benchmark progress"
                );
            }
        }

        let server_metrics = match self
            .executor
            .get(&self.config.metrics_url(), self.config.timeout)
            .await
        {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "Server metrics unavailable");
                Err(e)
            }
        };

        let report = ReportBuilder::new(&self.config).build(
            &metrics,
            per_request,
            server_metrics_section(server_metrics),
        )?;

        let results = &report.client_results;
        tracing::info!(
            accepted = results.accepted_requests,
            rejected = results.rejected_requests,
            protocol_failures = metrics.protocol_failures(),
            transport_failures = metrics.transport_failures(),
            success_rate = results.success_rate,
            p95_ms = results.latency_ms.p95,
            "Benchmark complete"
        );

        Ok(report)
    }
}
