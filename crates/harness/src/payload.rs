//! Deterministic synthetic telemetry workload
//!
//! Every packet is a pure function of `(index, base_timestamp)`. The content
//! hash covers the canonical string `deviceId|timestamp|telemetryJson`, where
//! `telemetryJson` has lexicographically sorted keys, no whitespace, integer
//! percentages and a temperature with exactly one decimal place.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of simulated devices; device ids cycle over this pool
pub const DEVICE_POOL_SIZE: u64 = 4;

/// Identifier of the signing key the ingestion service verifies against
pub const PUB_KEY_ID: &str = "pubkey-1";

/// Transport label carried by every packet
pub const TRANSPORT: &str = "wifi";

/// Batch label identifying benchmark traffic
pub const BATCH_CODE: &str = "BENCHMARK-QA-M1";

const DEVICE_PREFIX: &str = "stm32-node-";

/// Sensor readings of one packet
///
/// Field declaration order is the sorted key order, so the serialized form
/// matches the canonical form used for hashing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub humidity_pct: u32,
    pub soil_moisture_pct: u32,
    pub temperature_c: f64,
}

impl Telemetry {
    /// Deterministic readings for a sequence index
    pub fn for_index(index: u64) -> Self {
        // Tenths of a degree: 21.5 + (index % 9) * 0.2
        let temperature_tenths = 215 + 2 * (index % 9);
        Self {
            humidity_pct: 56 + (index % 7) as u32,
            soil_moisture_pct: 42 + (index % 5) as u32,
            temperature_c: temperature_tenths as f64 / 10.0,
        }
    }

    /// Sorted-key, whitespace-free JSON used as hash input
    pub fn canonical_json(&self) -> String {
        format!(
            "{{\"humidityPct\":{},\"soilMoisturePct\":{},\"temperatureC\":{:.1}}}",
            self.humidity_pct, self.soil_moisture_pct, self.temperature_c
        )
    }
}

/// A packet that has been hashed but not yet signed
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedPacket {
    pub device_id: String,
    pub timestamp: i64,
    pub telemetry: Telemetry,
    pub hash: String,
}

impl UnsignedPacket {
    /// Attach a hex-encoded signature, producing the wire packet
    pub fn into_signed(self, signature_hex: String) -> Packet {
        Packet {
            device_id: self.device_id,
            timestamp: self.timestamp,
            telemetry: self.telemetry,
            hash: self.hash,
            signature: signature_hex,
            pub_key_id: PUB_KEY_ID.to_string(),
            transport: TRANSPORT.to_string(),
            batch_code: BATCH_CODE.to_string(),
        }
    }
}

/// Signed telemetry packet as POSTed to the ingestion endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Packet {
    pub device_id: String,
    pub timestamp: i64,
    pub telemetry: Telemetry,
    pub hash: String,
    pub signature: String,
    pub pub_key_id: String,
    pub transport: String,
    pub batch_code: String,
}

impl Packet {
    /// Canonical string of this packet's content
    pub fn canonical_string(&self) -> String {
        canonical_string(&self.device_id, self.timestamp, &self.telemetry)
    }

    /// Whether `hash` matches the packet content
    pub fn verify_hash(&self) -> bool {
        sha256_hex(&self.canonical_string()) == self.hash
    }
}

/// Build the `deviceId|timestamp|telemetryJson` hash input
pub fn canonical_string(device_id: &str, timestamp: i64, telemetry: &Telemetry) -> String {
    format!("{}|{}|{}", device_id, timestamp, telemetry.canonical_json())
}

/// Lowercase hex SHA-256 of a UTF-8 string
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Device id for a sequence index
pub fn device_id(index: u64) -> String {
    format!("{}{}", DEVICE_PREFIX, (index % DEVICE_POOL_SIZE) + 1)
}

/// Generate the unsigned packet and its content hash for `index`
pub fn generate(index: u64, base_timestamp: i64) -> (UnsignedPacket, String) {
    let device_id = device_id(index);
    let timestamp = base_timestamp.saturating_add_unsigned(index);
    let telemetry = Telemetry::for_index(index);
    let hash = sha256_hex(&canonical_string(&device_id, timestamp, &telemetry));

    let packet = UnsignedPacket {
        device_id,
        timestamp,
        telemetry,
        hash: hash.clone(),
    };
    (packet, hash)
}
