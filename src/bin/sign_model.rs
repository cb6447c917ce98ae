//! Signs a model artifact directory.
//!
//! Validates `model.json`, then writes `manifest.json` (SHA-256 of the bound
//! file plus serial, timestamp and nonce) and `model.sig` (Ed25519 over the
//! manifest bytes) next to it.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sign_model -- <model_dir> [--serial <n>] [--nonce-b64 <b64>]
//! ```
//!
//! The signing seed is read from `MINDSCREEN_MODEL_SIGNING_KEY_B64_FD`,
//! `MINDSCREEN_MODEL_SIGNING_KEY_B64_FILE` or the
//! `mindscreen_model_signing_key_b64` Docker secret, and zeroized after use.

use std::collections::BTreeMap;
use std::env;
use std::fs;
#[cfg(unix)]
use std::os::unix::io::FromRawFd;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use mindscreen::adapters::ensemble::manifest::{
    self, SignedManifest, MANIFEST_FILE, MODEL_FILE, SIGNATURE_FILE,
};
use mindscreen::adapters::ensemble::{ModelArtifact, FORMAT_VERSION};
use mindscreen::adapters::EnsembleClassifier;

const KEY_FD_ENV: &str = "MINDSCREEN_MODEL_SIGNING_KEY_B64_FD";
const KEY_FILE_ENV: &str = "MINDSCREEN_MODEL_SIGNING_KEY_B64_FILE";
const KEY_DEV_ENV: &str = "MINDSCREEN_MODEL_SIGNING_KEY_B64";
const DOCKER_SECRET_PATH: &str = "/run/secrets/mindscreen_model_signing_key_b64";

#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; 32]);

fn non_empty_secret(raw: &str) -> Result<Zeroizing<String>, String> {
    let secret = Zeroizing::new(raw.trim_end_matches(['\n', '\r']).to_string());
    if secret.is_empty() {
        return Err("Empty signing key".to_string());
    }
    Ok(secret)
}

fn read_signing_seed_b64() -> Result<Zeroizing<String>, String> {
    #[cfg(unix)]
    if let Ok(fd_str) = env::var(KEY_FD_ENV) {
        let fd: i32 = fd_str
            .trim()
            .parse()
            .map_err(|_| "Invalid key FD".to_string())?;
        if fd <= 2 {
            return Err("Refusing to read signing key from stdio FD".to_string());
        }
        // SAFETY: the caller hands this FD over for a one-time secret read.
        let mut file = unsafe { std::fs::File::from_raw_fd(fd) };
        let mut buf = Zeroizing::new(String::new());
        use std::io::Read;
        file.read_to_string(&mut buf)
            .map_err(|e| format!("Failed reading signing key from FD: {e}"))?;
        return non_empty_secret(&buf);
    }

    if let Ok(path) = env::var(KEY_FILE_ENV) {
        let content = Zeroizing::new(
            fs::read_to_string(path.trim())
                .map_err(|e| format!("Failed reading signing key file: {e}"))?,
        );
        return non_empty_secret(&content);
    }

    if Path::new(DOCKER_SECRET_PATH).exists() {
        let content = Zeroizing::new(
            fs::read_to_string(DOCKER_SECRET_PATH)
                .map_err(|e| format!("Failed reading docker secret: {e}"))?,
        );
        return non_empty_secret(&content);
    }

    // Plain env var only in debug builds.
    if cfg!(debug_assertions) {
        if let Ok(v) = env::var(KEY_DEV_ENV) {
            return non_empty_secret(&Zeroizing::new(v));
        }
    }

    Err(format!(
        "Missing signing key. Provide one of: {KEY_FD_ENV}, {KEY_FILE_ENV}, or {DOCKER_SECRET_PATH} ({KEY_DEV_ENV} only in debug builds)."
    ))
}

fn read_signing_seed() -> Result<Seed, String> {
    let v = read_signing_seed_b64()?;

    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(v.trim())
            .map_err(|e| format!("Invalid base64 in signing key: {e}"))?,
    );

    let seed: [u8; 32] = raw.as_slice().try_into().map_err(|_| {
        format!(
            "Signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        )
    })?;
    Ok(Seed(seed))
}

fn usage() -> String {
    "Usage: sign_model <model_dir> [--serial <u64>] [--nonce-b64 <b64_16_bytes>]".to_string()
}

struct Args {
    model_dir: PathBuf,
    serial: Option<u64>,
    nonce_b64: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = env::args().skip(1);
    let mut model_dir: Option<PathBuf> = None;
    let mut serial: Option<u64> = None;
    let mut nonce_b64: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--serial" => {
                let v = args.next().ok_or_else(usage)?;
                serial = Some(
                    v.trim()
                        .parse::<u64>()
                        .map_err(|_| "--serial must be a u64".to_string())?,
                );
            }
            "--nonce-b64" => nonce_b64 = Some(args.next().ok_or_else(usage)?),
            "-h" | "--help" => return Err(usage()),
            _ if model_dir.is_none() => model_dir = Some(PathBuf::from(arg)),
            _ => return Err(usage()),
        }
    }

    Ok(Args {
        model_dir: model_dir.ok_or_else(usage)?,
        serial,
        nonce_b64,
    })
}

fn make_nonce_b64() -> String {
    let mut nonce = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    general_purpose::STANDARD.encode(nonce)
}

/// Refuse to sign anything the runtime would reject on load.
fn check_artifact(bytes: &[u8]) -> Result<(), String> {
    let artifact: ModelArtifact = serde_json::from_slice(bytes)
        .map_err(|e| format!("{MODEL_FILE} is not a valid artifact: {e}"))?;
    if artifact.format_version != FORMAT_VERSION {
        return Err(format!(
            "{MODEL_FILE} has format_version {}, expected {FORMAT_VERSION}",
            artifact.format_version
        ));
    }
    EnsembleClassifier::from_artifact(artifact)
        .map(|_| ())
        .map_err(|e| format!("{MODEL_FILE} failed validation: {e}"))
}

fn main() -> Result<(), String> {
    let args = parse_args()?;

    let model_dir = if args.model_dir.is_file() {
        args.model_dir
            .parent()
            .ok_or_else(|| "Model path has no parent directory".to_string())?
            .to_path_buf()
    } else {
        args.model_dir
    };

    let model_path = model_dir.join(MODEL_FILE);
    let model_bytes =
        fs::read(&model_path).map_err(|e| format!("Failed to read {model_path:?}: {e}"))?;
    check_artifact(&model_bytes)?;

    let mut files = BTreeMap::new();
    files.insert(MODEL_FILE.to_string(), manifest::sha256_hex(&model_bytes));

    let created_at = manifest::unix_now();
    let serial = args
        .serial
        .unwrap_or_else(|| u64::try_from(created_at).unwrap_or(1).max(1));

    let nonce_b64 = match args.nonce_b64 {
        Some(v) => {
            manifest::validate_nonce_b64(&v).map_err(|e| e.to_string())?;
            v.trim().to_string()
        }
        None => make_nonce_b64(),
    };

    let manifest = SignedManifest {
        version: 1,
        serial,
        created_at,
        nonce_b64,
        files,
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| format!("Failed to serialize {MANIFEST_FILE}: {e}"))?;

    let seed = read_signing_seed()?;
    let signing_key = SigningKey::from_bytes(&seed.0);
    drop(seed);

    let manifest_path = model_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .map_err(|e| format!("Failed to write {manifest_path:?}: {e}"))?;

    let sig: Signature = signing_key.sign(&manifest_bytes);
    let sig_path = model_dir.join(SIGNATURE_FILE);
    fs::write(&sig_path, sig.to_bytes())
        .map_err(|e| format!("Failed to write {sig_path:?}: {e}"))?;

    println!("Signed manifest: {manifest_path:?} (serial {serial})");
    println!("Wrote signature: {sig_path:?}");
    println!(
        "MINDSCREEN_MODEL_PUBKEY_B64={}",
        general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes())
    );

    Ok(())
}
