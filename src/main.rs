//! BioTwin: Patient digital-twin simulation.
//!
//! Runs one simulation and prints the twin as JSON.
//!
//! ```bash
//! biotwin [patient_id] [--p53 functional|mutated] [--dose <gy>] [--oxygen <0..1>]
//! ```

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use biotwin::adapters::sanitize::SanitizingMakeWriter;
use biotwin::config::Settings;
use biotwin::domain::{P53Status, SimulationConfig};
use biotwin::BioTwinService;

const DEFAULT_PATIENT_ID: &str = "demo-patient";

struct Args {
    patient_id: String,
    p53_status: P53Status,
    dose_gy: f64,
    oxygen_level: f64,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        patient_id: DEFAULT_PATIENT_ID.to_string(),
        p53_status: P53Status::Functional,
        dose_gy: 0.0,
        oxygen_level: 1.0,
    };

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--p53" => {
                let v = it.next().context("--p53 requires a value")?;
                args.p53_status = v.parse()?;
            }
            "--dose" => {
                let v = it.next().context("--dose requires a value")?;
                args.dose_gy = v.parse().with_context(|| format!("Invalid dose: {v}"))?;
            }
            "--oxygen" => {
                let v = it.next().context("--oxygen requires a value")?;
                args.oxygen_level = v.parse().with_context(|| format!("Invalid oxygen level: {v}"))?;
            }
            flag if flag.starts_with("--") => bail!("Unknown flag: {flag}"),
            id => args.patient_id = id.to_string(),
        }
    }

    Ok(args)
}

fn main() -> Result<()> {
    // stdout carries the twin JSON; logs go to stderr unless a file is requested.
    let log_mode = std::env::var("BIOTWIN_LOG_MODE").unwrap_or_else(|_| "stderr".to_string());

    let (writer, _guard) = if log_mode == "file" {
        let log_file =
            std::env::var("BIOTWIN_LOG_FILE").unwrap_or_else(|_| "biotwin.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    let args = parse_args()?;
    let settings = Settings::from_env_or_default();
    tracing::info!("Starting BioTwin...");

    let service = BioTwinService::from_settings(settings)?;
    let config = SimulationConfig::new(
        args.p53_status,
        service.settings().cellular_stress,
        i64::from(service.settings().time_steps),
        args.dose_gy,
        args.oxygen_level,
    )?;

    let twin = service.run_simulation(&args.patient_id, &config)?;
    println!("{}", serde_json::to_string_pretty(&twin)?);

    tracing::info!("BioTwin run complete.");
    Ok(())
}
