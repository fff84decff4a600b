//! # Ingest Benchmark Harness
//!
//! Deterministic success-rate and latency benchmark for an HTTP endpoint that
//! ingests signed telemetry packets.
//!
//! ## Pipeline
//!
//! ```text
//! for index in 0..requests:
//!     payload::generate(index, base_timestamp)   -> unsigned packet + sha256 hex
//!     Signer::sign(hash_hex)                     -> signature bytes (hex on the wire)
//!     HttpExecutor::post(ingest_url, packet)     -> status, body, latency
//!     BenchmarkMetrics::record(..)
//! HttpExecutor::get(metrics_url)                 -> opaque server snapshot (best effort)
//! ReportBuilder::build(..)                       -> BenchmarkReport (JSON / HTML)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use ingestbench_harness::prelude::*;
//!
//! let config = BenchmarkConfig::new("http://127.0.0.1:8080").with_requests(100);
//! let signer = OpenSslSigner::new("keys/pubkey-1-test-private.pem")?;
//! let report = BenchmarkRunner::new(config, signer)?.run().await?;
//! report.write_json("artifacts/ingest_baseline.json")?;
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod payload;
pub mod report;
pub mod runner;
pub mod signer;

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::BenchmarkConfig;
    pub use crate::error::{BenchError, Result};
    pub use crate::report::BenchmarkReport;
    pub use crate::runner::BenchmarkRunner;
    pub use crate::signer::{DeterministicSigner, OpenSslSigner, Signer};
}

// Re-export key types at crate root
pub use config::BenchmarkConfig;
pub use error::{BenchError, Result};
pub use executor::{HttpExecutor, PostOutcome, RequestOutcome, ACCEPTED_STATUS};
pub use metrics::{percentile, BenchmarkMetrics, LatencySummary};
pub use payload::{Packet, Telemetry, UnsignedPacket};
pub use report::{BenchmarkReport, ClientResults, ReportBuilder, RequestResult, WorkloadParameters};
pub use runner::{signed_packet, BenchmarkRunner};
pub use signer::{DeterministicSigner, OpenSslSigner, Signer, SIGNED_PAYLOAD_CONVENTION};
