//! Headless assessment of one JSON submission.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin assess -- <submission.json|-> [--model <dir>] [--json]
//! ```
//!
//! The submission is `{ "profile": { ... }, "answers": [26 integers 0-3] }`.
//! Prints the plain-text report, or the assessment as JSON with `--json`.
//! Logs go to stderr so stdout stays machine-readable.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mindscreen::adapters::sanitize::SanitizingMakeWriter;
use mindscreen::adapters::EnsembleClassifier;
use mindscreen::application::AssessmentService;
use mindscreen::config::AppConfig;
use mindscreen::domain::{Answers, Report};
use mindscreen::StudentProfile;

const USAGE: &str = "Usage: assess <submission.json|-> [--model <dir>] [--json]";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Submission {
    profile: StudentProfile,
    answers: Answers,
}

struct Args {
    input: String,
    model: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut input: Option<String> = None;
    let mut model: Option<PathBuf> = None;
    let mut json = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--model" => model = Some(args.next().ok_or_else(|| anyhow!(USAGE))?.into()),
            "--json" => json = true,
            "-h" | "--help" => bail!(USAGE),
            _ if input.is_none() => input = Some(arg),
            _ => bail!(USAGE),
        }
    }

    Ok(Args {
        input: input.ok_or_else(|| anyhow!(USAGE))?,
        model,
        json,
    })
}

fn read_submission(input: &str) -> Result<Submission> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read submission from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))?
    };
    serde_json::from_str(&text).context("Invalid submission")
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    let mut config = AppConfig::from_env()?;
    if let Some(model) = args.model {
        config.model_path = model;
    }

    let submission = read_submission(&args.input)?;

    let model = EnsembleClassifier::load(&config.model_path, &config.integrity)
        .with_context(|| format!("Failed to load model from {:?}", config.model_path))?;
    let service = AssessmentService::new(Arc::new(model), config.minimal_policy);

    let assessment = service.assess(&submission.profile, &submission.answers)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print!("{}", Report::render(&assessment, &submission.profile));
    }

    Ok(())
}
