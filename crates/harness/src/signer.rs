//! Signing capability
//!
//! The harness never performs cryptography itself. A [`Signer`] receives the
//! content hash of a packet and returns raw signature bytes, which are
//! hex-encoded into the packet's `signature` field.
//!
//! Signed bytes convention ([`SIGNED_PAYLOAD_CONVENTION`]): the signer is given
//! the 64-character lowercase hex **text** of the SHA-256 hash, as UTF-8 bytes,
//! not the 32 raw digest bytes. The ingestion service verifies against the
//! same text. If the service ever switches to raw digest bytes, this
//! convention and the verifier must change together, otherwise every
//! signature is rejected and the benchmark measures nothing useful.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{BenchError, Result};

/// Name of the signed-bytes convention shared with the ingestion service
pub const SIGNED_PAYLOAD_CONVENTION: &str = "hash-hex-utf8";

/// Produces signatures over packet content hashes
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign the hex text of a content hash, returning raw signature bytes
    async fn sign(&self, hash_hex: &str) -> Result<Vec<u8>>;

    /// Verify the signer is usable before the run starts
    async fn probe(&self) -> Result<()> {
        Ok(())
    }
}

/// Signs by shelling out to `openssl dgst -sha256 -sign <key> -binary`
#[derive(Debug, Clone)]
pub struct OpenSslSigner {
    program: String,
    private_key: PathBuf,
}

impl OpenSslSigner {
    /// Create a signer for a PEM private key; the key file must exist
    pub fn new(private_key: impl Into<PathBuf>) -> Result<Self> {
        let private_key = private_key.into();
        if !private_key.is_file() {
            return Err(BenchError::config(format!(
                "private key not found: {}",
                private_key.display()
            )));
        }
        Ok(Self {
            program: "openssl".to_string(),
            private_key,
        })
    }

    /// Use a specific openssl executable instead of the one on PATH
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Path of the private key used for signing
    pub fn private_key(&self) -> &Path {
        &self.private_key
    }
}

#[async_trait]
impl Signer for OpenSslSigner {
    async fn probe(&self) -> Result<()> {
        let output = Command::new(&self.program)
            .arg("version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                BenchError::signing_unavailable(format!(
                    "{} could not be started: {}",
                    self.program, e
                ))
            })?;

        if !output.status.success() {
            return Err(BenchError::signing_unavailable(format!(
                "{} command is unavailable or not functional",
                self.program
            )));
        }

        tracing::debug!(
            version = %String::from_utf8_lossy(&output.stdout).trim(),
            "Signing tool available"
        );
        Ok(())
    }

    async fn sign(&self, hash_hex: &str) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args(["dgst", "-sha256", "-sign"])
            .arg(&self.private_key)
            .arg("-binary")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                BenchError::signing_unavailable(format!(
                    "{} could not be started: {}",
                    self.program, e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| BenchError::signing_failed("signing tool stdin unavailable"))?;
        let write_result = stdin.write_all(hash_hex.as_bytes()).await;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| BenchError::signing_failed(format!("waiting for signer: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BenchError::signing_failed(format!(
                "openssl signing failed: {}",
                stderr.trim()
            )));
        }
        write_result
            .map_err(|e| BenchError::signing_failed(format!("writing hash to signer: {}", e)))?;

        if output.stdout.is_empty() {
            return Err(BenchError::signing_failed(
                "signing tool produced no signature",
            ));
        }
        Ok(output.stdout)
    }
}

/// Deterministic stand-in signer: `sha256(secret || hash_hex)`
///
/// Not a real signature scheme. Lets tests exercise the full pipeline without
/// depending on an openssl installation.
#[derive(Debug, Clone)]
pub struct DeterministicSigner {
    secret: Vec<u8>,
}

impl DeterministicSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl Signer for DeterministicSigner {
    async fn sign(&self, hash_hex: &str) -> Result<Vec<u8>> {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(hash_hex.as_bytes());
        Ok(hasher.finalize().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic_signer_is_stable() {
        let signer = DeterministicSigner::new("test-key");
        let a = signer.sign("abc123").await.unwrap();
        let b = signer.sign("abc123").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);

        let other = signer.sign("abc124").await.unwrap();
        assert_ne!(a, other);

        let other_key = DeterministicSigner::new("other-key")
            .sign("abc123")
            .await
            .unwrap();
        assert_ne!(a, other_key);
    }

    #[tokio::test]
    async fn test_deterministic_signer_probe_succeeds() {
        assert!(DeterministicSigner::new("k").probe().await.is_ok());
    }

    #[test]
    fn test_openssl_signer_requires_existing_key() {
        let err = OpenSslSigner::new("/definitely/not/here/key.pem").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("private key not found"));
    }

    #[tokio::test]
    async fn test_missing_signing_tool_is_unavailable() {
        let key = tempfile::NamedTempFile::new().unwrap();
        let signer = OpenSslSigner::new(key.path())
            .unwrap()
            .with_program("ingestbench-no-such-openssl-binary");

        let err = signer.probe().await.unwrap_err();
        assert!(matches!(err, BenchError::SigningUnavailable(_)), "{err}");

        let err = signer.sign("deadbeef").await.unwrap_err();
        assert!(matches!(err, BenchError::SigningUnavailable(_)), "{err}");
    }

    /// Write an executable shell script standing in for openssl
    #[cfg(unix)]
    fn fake_tool(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-openssl");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tool_error_output_is_reported_as_signing_failure() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("key.pem");
        std::fs::write(&key, "not a key").unwrap();
        let tool = fake_tool(
            dir.path(),
            "cat >/dev/null\necho 'Could not find private key from key.pem' >&2\nexit 1",
        );

        let signer = OpenSslSigner::new(&key)
            .unwrap()
            .with_program(tool.to_string_lossy());
        let err = signer.sign("deadbeef").await.unwrap_err();

        match err {
            BenchError::SigningFailed(msg) => {
                assert!(msg.contains("Could not find private key from key.pem"), "{msg}")
            }
            other => panic!("expected SigningFailed, got {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tool_output_is_returned_as_signature() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("key.pem");
        std::fs::write(&key, "key").unwrap();
        // Echo stdin back so the test can see exactly which bytes were signed
        let tool = fake_tool(dir.path(), "cat");

        let signer = OpenSslSigner::new(&key)
            .unwrap()
            .with_program(tool.to_string_lossy());
        let signature = signer.sign("deadbeef").await.unwrap();
        assert_eq!(signature, b"deadbeef");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_version_check_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("key.pem");
        std::fs::write(&key, "key").unwrap();
        let tool = fake_tool(dir.path(), "exit 3");

        let signer = OpenSslSigner::new(&key)
            .unwrap()
            .with_program(tool.to_string_lossy());
        let err = signer.probe().await.unwrap_err();
        assert!(matches!(err, BenchError::SigningUnavailable(_)), "{err}");
    }
}
