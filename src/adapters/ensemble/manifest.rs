//! Signed manifest verification for model artifacts.
//!
//! A signed artifact directory carries two extra files next to `model.json`:
//! - `manifest.json`: SHA-256 of every bound file plus serial, timestamp, nonce
//! - `model.sig`: raw 64-byte Ed25519 signature over the manifest bytes
//!
//! Unsigned directories are accepted unless the integrity policy requires a
//! signature.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::ModelError;

pub const MODEL_FILE: &str = "model.json";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const SIGNATURE_FILE: &str = "model.sig";

/// Clock skew tolerated for `created_at`.
const MAX_FUTURE_SKEW_SECS: i64 = 300;

/// How strictly artifacts are checked before loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityPolicy {
    /// Refuse directories without `manifest.json` + `model.sig`.
    pub require_signed: bool,
    /// Base64 Ed25519 verifying key.
    pub public_key_b64: Option<String>,
    /// Refuse manifests older than this.
    pub max_age_secs: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedManifest {
    pub version: u32,
    /// Monotonic serial (CI build number or creation time).
    pub serial: u64,
    /// Unix seconds.
    pub created_at: i64,
    /// 16 random bytes, base64.
    pub nonce_b64: String,
    /// Relative file name → lowercase hex SHA-256.
    pub files: BTreeMap<String, String>,
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Current Unix time in seconds (0 if the clock is before the epoch).
#[must_use]
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Decode and check a manifest nonce.
///
/// # Errors
/// Returns `ModelError::Signature` unless it is base64 for exactly 16 bytes.
pub fn validate_nonce_b64(nonce_b64: &str) -> Result<(), ModelError> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(nonce_b64.trim())
        .map_err(|e| ModelError::Signature(format!("Invalid nonce base64: {e}")))?;
    if raw.len() != 16 {
        return Err(ModelError::Signature(
            "nonce must decode to exactly 16 bytes".into(),
        ));
    }
    Ok(())
}

/// Parse a base64 Ed25519 verifying key.
///
/// # Errors
/// Returns `ModelError::Signature` on bad base64, wrong length or an invalid point.
pub fn verifying_key_from_b64(b64: &str) -> Result<VerifyingKey, ModelError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|_| ModelError::Signature("Invalid public key base64".into()))?;
    let key: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ModelError::Signature("Invalid public key length (expected 32 bytes)".into()))?;
    VerifyingKey::from_bytes(&key)
        .map_err(|_| ModelError::Signature("Invalid verifying key".into()))
}

/// Verify the manifest in `base_dir`, if any.
///
/// `model_bytes` is the `model.json` content the caller is about to parse;
/// its hash is checked instead of re-reading the file. Other bound files are
/// read from `base_dir`.
///
/// Returns `Ok(None)` for an unsigned directory when the policy allows it.
///
/// # Errors
/// Returns `ModelError::Signature` when a signature is required but absent,
/// when the signature or any bound file hash does not match, or when the
/// manifest is malformed, from the future, or too old.
pub fn verify(
    base_dir: &Path,
    policy: &IntegrityPolicy,
    model_bytes: &[u8],
) -> Result<Option<SignedManifest>, ModelError> {
    let sig_path = base_dir.join(SIGNATURE_FILE);
    let manifest_path = base_dir.join(MANIFEST_FILE);

    if !sig_path.exists() || !manifest_path.exists() {
        if policy.require_signed {
            tracing::error!(
                "Model signature not found at {:?}; signed artifacts are required",
                sig_path
            );
            return Err(ModelError::Signature(
                "signed model required (manifest.json and model.sig missing)".into(),
            ));
        }
        tracing::warn!("Loading UNSIGNED model artifact from {:?}", base_dir);
        return Ok(None);
    }

    let public_key_b64 = policy.public_key_b64.as_deref().ok_or_else(|| {
        ModelError::Signature("artifact is signed but no verifying key is configured".into())
    })?;
    let public_key = verifying_key_from_b64(public_key_b64)?;

    let sig_bytes = fs::read(&sig_path)
        .map_err(|e| ModelError::Signature(format!("Failed to read signature: {e}")))?;
    let sig_bytes: [u8; 64] = sig_bytes
        .as_slice()
        .try_into()
        .map_err(|_| ModelError::Signature("Invalid signature length (expected 64 bytes)".into()))?;
    let signature = Signature::from_bytes(&sig_bytes);

    let manifest_content = fs::read(&manifest_path)
        .map_err(|e| ModelError::Signature(format!("Failed to read manifest: {e}")))?;

    public_key
        .verify(&manifest_content, &signature)
        .map_err(|_| ModelError::Signature("Invalid model signature".into()))?;

    let manifest: SignedManifest = serde_json::from_slice(&manifest_content)
        .map_err(|e| ModelError::Signature(format!("Invalid manifest.json format: {e}")))?;
    if manifest.version != 1 {
        return Err(ModelError::Signature(format!(
            "Unsupported manifest version: {}",
            manifest.version
        )));
    }
    validate_nonce_b64(&manifest.nonce_b64)?;

    let now = unix_now();
    if manifest.created_at > now + MAX_FUTURE_SKEW_SECS {
        return Err(ModelError::Signature(
            "manifest created_at is in the future".into(),
        ));
    }
    if let Some(max_age) = policy.max_age_secs.filter(|m| *m > 0) {
        if now.saturating_sub(manifest.created_at) > max_age {
            return Err(ModelError::Signature(
                "manifest is older than allowed max age".into(),
            ));
        }
    }

    if !manifest.files.contains_key(MODEL_FILE) {
        return Err(ModelError::Signature(format!(
            "manifest.json must include {MODEL_FILE}"
        )));
    }

    for (rel, expected_hex) in &manifest.files {
        if Path::new(rel).components().count() != 1 {
            return Err(ModelError::Signature(format!(
                "manifest entry {rel:?} must be a plain file name"
            )));
        }
        let digest = if rel == MODEL_FILE {
            sha256_hex(model_bytes)
        } else {
            let path = base_dir.join(rel);
            let bytes = fs::read(&path).map_err(|e| {
                ModelError::Signature(format!(
                    "Manifest references missing/unreadable file {path:?}: {e}"
                ))
            })?;
            sha256_hex(&bytes)
        };
        if !constant_time_eq_str(&digest, expected_hex) {
            return Err(ModelError::Signature(format!("File hash mismatch for {rel}")));
        }
    }

    tracing::info!(
        "Model signature and hashes verified (serial={}, files={})",
        manifest.serial,
        manifest.files.len()
    );
    Ok(Some(manifest))
}

fn constant_time_eq_str(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
