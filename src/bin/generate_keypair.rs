//! Generates the Ed25519 keypair used to sign model artifacts.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_keypair -- --out-seed <path> [--out-pub <path>] [--force]
//! ```
//!
//! The base64 seed is written with 0600 permissions (Unix) and never printed;
//! feed it to `sign_model` via `MINDSCREEN_MODEL_SIGNING_KEY_B64_FILE`. The
//! public key goes to `MINDSCREEN_MODEL_PUBKEY_B64` (or `_FILE`) at runtime.

use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

const USAGE: &str = "Usage: generate_keypair --out-seed <path> [--out-pub <path>] [--force]";

struct Args {
    out_seed: PathBuf,
    out_pub: Option<PathBuf>,
    force: bool,
}

fn parse_args() -> Result<Option<Args>, String> {
    let mut args = std::env::args().skip(1);
    let mut out_seed: Option<PathBuf> = None;
    let mut out_pub: Option<PathBuf> = None;
    let mut force = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out-seed" | "--out" => {
                out_seed = Some(args.next().filter(|p| !p.is_empty()).ok_or(USAGE)?.into());
            }
            "--out-pub" => {
                out_pub = Some(args.next().filter(|p| !p.is_empty()).ok_or(USAGE)?.into());
            }
            "--force" => force = true,
            "-h" | "--help" => {
                println!(
                    "{USAGE}\n\nWrites a base64 Ed25519 seed to --out-seed (0600) and optionally the base64 public key to --out-pub. Only the public key is printed."
                );
                return Ok(None);
            }
            _ => return Err(format!("Unknown arg: {arg}\n{USAGE}")),
        }
    }

    Ok(Some(Args {
        out_seed: out_seed.ok_or(USAGE)?,
        out_pub,
        force,
    }))
}

fn refuse_overwrite(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "Refusing to overwrite existing file {path:?}. Use --force."
        ));
    }
    Ok(())
}

fn write_key_file(path: &Path, contents: &str, mode: u32) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {parent:?}: {e}"))?;
    }

    let mut opts = std::fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    opts.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = opts
        .open(path)
        .map_err(|e| format!("Failed to open {path:?}: {e}"))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.write_all(b"\n"))
        .map_err(|e| format!("Failed to write {path:?}: {e}"))
}

fn main() -> Result<(), String> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    // Check both targets before generating anything.
    refuse_overwrite(&args.out_seed, args.force)?;
    if let Some(pub_path) = &args.out_pub {
        refuse_overwrite(pub_path, args.force)?;
    }

    let signing_key = SigningKey::generate(&mut OsRng);
    let seed_b64 = Zeroizing::new(general_purpose::STANDARD.encode(signing_key.to_bytes()));
    let pub_b64 = general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes());

    write_key_file(&args.out_seed, &seed_b64, 0o600)?;
    println!("Wrote signing seed (base64) to {:?}", args.out_seed);

    if let Some(pub_path) = &args.out_pub {
        write_key_file(pub_path, &pub_b64, 0o644)?;
        println!("Wrote public key (base64) to {pub_path:?}");
    }

    println!("MINDSCREEN_MODEL_PUBKEY_B64={pub_b64}");
    Ok(())
}
