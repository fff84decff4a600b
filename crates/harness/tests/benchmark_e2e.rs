// End-to-end benchmark runs against a mock ingestion service
// Run with: cargo test -p ingestbench-harness --test benchmark_e2e

use std::time::Duration;

use async_trait::async_trait;
use ingestbench_harness::prelude::*;
use ingestbench_harness::Packet;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE_TIMESTAMP: i64 = 1_700_002_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("ingestbench_harness=debug")
        .try_init();
}

async fn mount_accepting_ingest(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/ingest"))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(json!({"accepted": true, "message": "queued"})),
        )
        .mount(server)
        .await;
}

fn config_for(server: &MockServer, requests: u64) -> BenchmarkConfig {
    BenchmarkConfig::new(server.uri())
        .with_requests(requests)
        .with_base_timestamp(BASE_TIMESTAMP)
        .with_timeout(Duration::from_secs(2))
}

async fn posted_packets(server: &MockServer) -> Vec<Packet> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| serde_json::from_slice(&r.body).expect("packet body"))
        .collect()
}

#[tokio::test]
async fn test_mixed_acceptance_scenario() {
    init_tracing();
    let server = MockServer::start().await;

    // Reject the second packet only
    Mock::given(method("POST"))
        .and(path("/api/v1/ingest"))
        .and(body_partial_json(json!({"timestamp": BASE_TIMESTAMP + 1})))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"accepted": false, "message": "signature verification failed"})),
        )
        .with_priority(1)
        .mount(&server)
        .await;
    mount_accepting_ingest(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/metrics/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalIngested": 2,
            "rejected": 1
        })))
        .mount(&server)
        .await;

    let runner = BenchmarkRunner::new(config_for(&server, 3), DeterministicSigner::new("k1"))
        .expect("valid config");
    let report = runner.run().await.expect("benchmark completes");

    let results = &report.client_results;
    assert_eq!(results.total_requests, 3);
    assert_eq!(results.accepted_requests, 2);
    assert_eq!(results.rejected_requests, 1);
    assert_eq!(results.success_rate, 0.666667);
    assert_eq!(
        results.accepted_requests + results.rejected_requests,
        results.total_requests
    );

    let statuses: Vec<u16> = report.per_request.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![202, 400, 202]);
    let indexes: Vec<u64> = report.per_request.iter().map(|r| r.index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
    assert_eq!(report.per_request[1].message, "signature verification failed");
    assert!(!report.per_request[1].accepted);
    assert_eq!(report.per_request[0].message, "queued");

    let latency = results.latency_ms;
    assert!(latency.min <= latency.p50 && latency.p50 <= latency.p95);
    assert!(latency.p95 <= latency.max);

    assert_eq!(report.server_metrics, json!({"totalIngested": 2, "rejected": 1}));
    assert_eq!(report.deterministic_workload.requests, 3);
    assert_eq!(report.deterministic_workload.base_timestamp, BASE_TIMESTAMP);

    // Every packet on the wire carries a valid content hash
    let packets = posted_packets(&server).await;
    assert_eq!(packets.len(), 3);
    assert!(packets.iter().all(Packet::verify_hash));

    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("qa/artifacts/ingest_mock_baseline.json");
    report.write_json(&artifact).unwrap();
    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&artifact).unwrap()).unwrap();
    assert_eq!(written["clientResults"]["acceptedRequests"], 2);
    assert_eq!(written["perRequest"].as_array().unwrap().len(), 3);
    assert_eq!(written["serverMetrics"]["totalIngested"], 2);
}

#[tokio::test]
async fn test_metrics_failure_yields_placeholder() {
    init_tracing();
    let server = MockServer::start().await;
    mount_accepting_ingest(&server).await;
    // No metrics mock: the endpoint answers 404

    let runner = BenchmarkRunner::new(config_for(&server, 2), DeterministicSigner::new("k1"))
        .expect("valid config");
    let report = runner.run().await.expect("benchmark completes");

    assert_eq!(report.client_results.accepted_requests, 2);
    assert_eq!(report.client_results.success_rate, 1.0);
    assert_eq!(report.per_request.len(), 2);

    let error = report.server_metrics["error"]
        .as_str()
        .expect("placeholder error string");
    assert!(error.contains("404"), "{}", error);
}

#[tokio::test]
async fn test_unreachable_service_still_produces_report() {
    init_tracing();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = BenchmarkConfig::new(format!("http://127.0.0.1:{}/", port))
        .with_requests(2)
        .with_timeout(Duration::from_millis(500));
    let report = BenchmarkRunner::new(config, DeterministicSigner::new("k1"))
        .unwrap()
        .run()
        .await
        .expect("0% success is still a completed benchmark");

    assert_eq!(report.client_results.accepted_requests, 0);
    assert_eq!(report.client_results.rejected_requests, 2);
    assert_eq!(report.client_results.success_rate, 0.0);
    assert!(report.per_request.iter().all(|r| r.status == 0));
    assert!(report.per_request.iter().all(|r| !r.message.is_empty()));
    assert!(report.server_metrics.get("error").is_some());
}

#[tokio::test]
async fn test_runs_are_byte_identical() {
    init_tracing();
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_accepting_ingest(&first).await;
    mount_accepting_ingest(&second).await;

    for server in [&first, &second] {
        BenchmarkRunner::new(config_for(server, 12), DeterministicSigner::new("k1"))
            .unwrap()
            .run()
            .await
            .unwrap();
    }

    let bodies = |requests: Vec<wiremock::Request>| -> Vec<Vec<u8>> {
        requests
            .into_iter()
            .filter(|r| r.method.as_str() == "POST")
            .map(|r| r.body)
            .collect()
    };
    let a = bodies(first.received_requests().await.unwrap());
    let b = bodies(second.received_requests().await.unwrap());

    assert_eq!(a.len(), 12);
    assert_eq!(a, b);
}

struct FailingSigner;

#[async_trait]
impl Signer for FailingSigner {
    async fn sign(&self, _hash_hex: &str) -> Result<Vec<u8>> {
        Err(BenchError::SigningFailed(
            "unable to load private key".to_string(),
        ))
    }
}

#[tokio::test]
async fn test_signing_failure_aborts_before_sending() {
    init_tracing();
    let server = MockServer::start().await;
    mount_accepting_ingest(&server).await;

    let err = BenchmarkRunner::new(config_for(&server, 3), FailingSigner)
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, BenchError::SigningFailed(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
