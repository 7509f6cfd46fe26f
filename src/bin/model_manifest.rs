//! Manifest utility for BioTwin risk models.
//!
//! Validates `risk_model.json` in a model directory and writes
//! `manifest.json` binding its SHA-256 digest, which the loader checks at
//! startup.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin model_manifest -- [model_dir]
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use biotwin::adapters::forest::{ARTIFACT_FILE, MANIFEST_FILE};
use biotwin::adapters::{ForestModel, ModelManifest};
use biotwin::ports::RiskModel;

fn main() -> Result<()> {
    let model_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("models"), PathBuf::from);

    let artifact_path = model_dir.join(ARTIFACT_FILE);
    let bytes =
        fs::read(&artifact_path).with_context(|| format!("Failed to read {artifact_path:?}"))?;

    let model = ForestModel::from_bytes(&bytes)
        .with_context(|| format!("{artifact_path:?} is not a valid risk model"))?;

    let manifest = ModelManifest::for_artifact(&bytes);
    let manifest_path = model_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("Failed to write {manifest_path:?}"))?;

    println!(
        "Wrote {} ({} trees, sha256={})",
        manifest_path.display(),
        model.tree_count(),
        model.fingerprint()
    );
    Ok(())
}
