// HTTP request executor for the ingestion and metrics endpoints
//
// POST never fails: every attempt is folded into a PostOutcome so the
// measurement loop keeps going. GET is best-effort and returns an error the
// caller turns into a report placeholder.

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use thiserror::Error;

/// Status the ingestion endpoint returns for an asynchronously accepted packet
pub const ACCEPTED_STATUS: u16 = 202;

/// Status recorded when no HTTP response was obtained
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// Decoded JSON object body
pub type JsonObject = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("HTTP error: {}", describe_reqwest_error(.0))]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Classification of a single measured request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// 202 with `accepted: true`
    Accepted,
    /// An HTTP response that is not an acceptance
    ProtocolFailure,
    /// No HTTP response: refused, DNS failure, timeout, truncated body
    TransportFailure,
}

/// Result of one POST attempt
#[derive(Debug, Clone)]
pub struct PostOutcome {
    /// HTTP status, or 0 for a transport failure
    pub status: u16,
    /// Decoded body; `{"raw": ..}` for non-object bodies, `{"error": ..}` for transport failures
    pub body: JsonObject,
    /// Unrounded latency in milliseconds
    pub latency_ms: f64,
}

impl PostOutcome {
    fn transport_failure(error: String, latency_ms: f64) -> Self {
        let mut body = JsonObject::new();
        body.insert("error".to_string(), Value::String(error));
        Self {
            status: TRANSPORT_FAILURE_STATUS,
            body,
            latency_ms,
        }
    }

    pub fn outcome(&self) -> RequestOutcome {
        if self.status == TRANSPORT_FAILURE_STATUS {
            RequestOutcome::TransportFailure
        } else if self.is_accepted() {
            RequestOutcome::Accepted
        } else {
            RequestOutcome::ProtocolFailure
        }
    }

    /// `status == 202` and the body carries `accepted: true`
    pub fn is_accepted(&self) -> bool {
        self.status == ACCEPTED_STATUS && self.body.get("accepted") == Some(&Value::Bool(true))
    }

    /// Server `message`, else `error`, else empty
    pub fn message(&self) -> String {
        body_text(&self.body, "message")
            .or_else(|| body_text(&self.body, "error"))
            .unwrap_or_default()
    }
}

/// Issues timed HTTP requests
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    http: reqwest::Client,
}

impl HttpExecutor {
    pub fn new() -> Result<Self, ExecutorError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ingestbench/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// POST an already-encoded JSON body and time the exchange
    ///
    /// The clock starts right before the request is sent and stops once the
    /// response body has been read in full or the failure is known.
    pub async fn post(&self, url: &str, json_body: Vec<u8>, timeout: Duration) -> PostOutcome {
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .body(json_body);

        let start = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return PostOutcome::transport_failure(
                    describe_reqwest_error(&e),
                    elapsed_ms(start),
                )
            }
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                return PostOutcome::transport_failure(
                    format!("failed to read response body: {}", describe_reqwest_error(&e)),
                    elapsed_ms(start),
                )
            }
        };
        let latency_ms = elapsed_ms(start);

        PostOutcome {
            status,
            body: decode_object(&text),
            latency_ms,
        }
    }

    /// GET a JSON object; non-success status or invalid JSON is an error
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<JsonObject, ExecutorError> {
        let response = self.http.get(url).timeout(timeout).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExecutorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        match serde_json::from_str::<Value>(&text)? {
            Value::Object(map) => Ok(map),
            _ => Ok(raw_object(text)),
        }
    }
}

/// Decode a body as a JSON object, wrapping anything else as `{"raw": text}`
pub fn decode_object(text: &str) -> JsonObject {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        _ => raw_object(text.to_string()),
    }
}

fn raw_object(text: String) -> JsonObject {
    let mut map = JsonObject::new();
    map.insert("raw".to_string(), Value::String(text));
    map
}

fn body_text(body: &JsonObject, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Human-readable description including the underlying cause chain
fn describe_reqwest_error(e: &reqwest::Error) -> String {
    let kind = if e.is_timeout() {
        "request timed out"
    } else if e.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };

    let mut causes = Vec::new();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = std::error::Error::source(cause);
    }

    if causes.is_empty() {
        format!("{}: {}", kind, e)
    } else {
        format!("{}: {}", kind, causes.join(": "))
    }
}
