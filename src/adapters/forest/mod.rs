//! Random-forest adapter: Implementation of RiskModel from a JSON artifact.
//!
//! The classifier-training job exports `risk_model.json`: an ensemble of
//! binary decision trees over the six risk features. Each leaf stores a
//! class distribution; the forest probability is the mean of the per-tree
//! normalized leaf distributions (scikit-learn `predict_proba` semantics,
//! `x[feature] <= threshold` goes left).
//!
//! # Integrity
//!
//! If `manifest.json` sits next to the artifact, the artifact's SHA-256
//! digest must match the manifest entry or loading fails. Without a manifest
//! the artifact is loaded with a warning.
//!
//! # Fallback
//!
//! A missing artifact is not an error: [`load_risk_classifier`] returns the
//! heuristic classifier instead.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{RiskFeatures, RiskLabel};
use crate::engine::RiskClassifier;
use crate::ports::RiskModel;
use crate::BioTwinError;

/// Artifact file name inside the model directory.
pub const ARTIFACT_FILE: &str = "risk_model.json";

/// Manifest file name inside the model directory.
pub const MANIFEST_FILE: &str = "manifest.json";

const ARTIFACT_VERSION: u32 = 1;
const MANIFEST_VERSION: u32 = 1;

/// Serialized forest as exported by the training job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub version: u32,
    /// Must equal the `RiskLabel::ALL` wire names, in order
    pub labels: Vec<String>,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Node 0 is the root; children always have a higher index than their parent
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Sample counts (or weights) per class
        distribution: Vec<f64>,
    },
}

/// Integrity manifest binding artifact files to their SHA-256 digests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: u32,
    pub created_at: i64,
    pub files: BTreeMap<String, String>,
}

impl ModelManifest {
    /// Manifest for a single artifact.
    #[must_use]
    pub fn for_artifact(artifact_bytes: &[u8]) -> Self {
        let mut files = BTreeMap::new();
        files.insert(ARTIFACT_FILE.to_string(), sha256_hex(artifact_bytes));
        Self {
            version: MANIFEST_VERSION,
            created_at: chrono::Utc::now().timestamp(),
            files,
        }
    }
}

/// Hex-encoded SHA-256 digest.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Loaded, validated random forest. Immutable after construction.
#[derive(Debug)]
pub struct ForestModel {
    trees: Vec<DecisionTree>,
    fingerprint: String,
}

impl ForestModel {
    /// Parse and validate an artifact from raw bytes.
    ///
    /// # Errors
    /// Returns `ModelArtifact` if the bytes are not a well-formed forest.
    pub fn from_bytes(bytes: &[u8]) -> crate::Result<Self> {
        let artifact: ForestArtifact = serde_json::from_slice(bytes)
            .map_err(|e| BioTwinError::ModelArtifact(format!("Invalid artifact format: {e}")))?;
        Self::validate(&artifact)?;

        Ok(Self {
            trees: artifact.trees,
            fingerprint: sha256_hex(bytes),
        })
    }

    /// Number of trees in the ensemble.
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn validate(artifact: &ForestArtifact) -> crate::Result<()> {
        if artifact.version != ARTIFACT_VERSION {
            return Err(BioTwinError::ModelArtifact(format!(
                "Unsupported artifact version: {}",
                artifact.version
            )));
        }

        let expected: Vec<&str> = RiskLabel::ALL.iter().map(RiskLabel::as_str).collect();
        if artifact.labels != expected {
            return Err(BioTwinError::ModelArtifact(format!(
                "Label set {:?} does not match {:?}",
                artifact.labels, expected
            )));
        }
        if artifact.n_features != RiskFeatures::LEN {
            return Err(BioTwinError::ModelArtifact(format!(
                "Invalid feature count in model: got {}, expected {}",
                artifact.n_features,
                RiskFeatures::LEN
            )));
        }
        if artifact.trees.is_empty() {
            return Err(BioTwinError::ModelArtifact(
                "Artifact contains no trees".into(),
            ));
        }

        for (t, tree) in artifact.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(BioTwinError::ModelArtifact(format!("Tree {t} is empty")));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        let in_bounds = |c: usize| c > i && c < tree.nodes.len();
                        if *feature >= RiskFeatures::LEN
                            || !threshold.is_finite()
                            || !in_bounds(*left)
                            || !in_bounds(*right)
                        {
                            return Err(BioTwinError::ModelArtifact(format!(
                                "Tree {t} node {i}: malformed split"
                            )));
                        }
                    }
                    TreeNode::Leaf { distribution } => {
                        let total: f64 = distribution.iter().sum();
                        if distribution.len() != RiskLabel::ALL.len()
                            || distribution.iter().any(|w| !w.is_finite() || *w < 0.0)
                            || total <= 0.0
                        {
                            return Err(BioTwinError::ModelArtifact(format!(
                                "Tree {t} node {i}: malformed leaf distribution"
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn leaf_distribution<'a>(tree: &'a DecisionTree, features: &[f64; 6]) -> &'a [f64] {
        let mut index = 0;
        loop {
            match &tree.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { distribution } => return distribution,
            }
        }
    }
}

impl RiskModel for ForestModel {
    fn predict_proba(&self, features: &[f64; 6]) -> crate::Result<Vec<f64>> {
        if features.iter().any(|x| !x.is_finite()) {
            return Err(BioTwinError::InvalidModelOutput(
                "Cannot score non-finite features".into(),
            ));
        }

        let mut probs = vec![0.0; RiskLabel::ALL.len()];
        for tree in &self.trees {
            let leaf = Self::leaf_distribution(tree, features);
            let total: f64 = leaf.iter().sum();
            for (p, w) in probs.iter_mut().zip(leaf) {
                *p += w / total;
            }
        }

        let n = self.trees.len() as f64;
        for p in &mut probs {
            *p /= n;
        }
        Ok(probs)
    }

    fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Build the risk classifier from a model directory.
///
/// Returns the trained variant when `risk_model.json` exists, the heuristic
/// variant (with a warning) when it does not.
///
/// # Errors
/// Returns `ModelArtifact` if the artifact exists but is unreadable, fails
/// validation, or does not match its manifest digest.
pub fn load_risk_classifier(model_dir: &Path) -> crate::Result<RiskClassifier> {
    let artifact_path = model_dir.join(ARTIFACT_FILE);
    if !artifact_path.exists() {
        tracing::warn!(
            "No model artifact at {:?}; using heuristic risk classifier",
            artifact_path
        );
        return Ok(RiskClassifier::Heuristic);
    }

    let bytes = std::fs::read(&artifact_path).map_err(|e| {
        BioTwinError::ModelArtifact(format!("Failed to read {:?}: {e}", artifact_path))
    })?;

    verify_manifest(model_dir, &bytes)?;

    let model = ForestModel::from_bytes(&bytes)?;
    tracing::info!(
        "Loaded risk model from {:?} (trees={}, sha256={})",
        artifact_path,
        model.tree_count(),
        model.fingerprint()
    );

    Ok(RiskClassifier::trained(Arc::new(model)))
}

fn verify_manifest(model_dir: &Path, artifact_bytes: &[u8]) -> crate::Result<()> {
    let manifest_path = model_dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        tracing::warn!("No {MANIFEST_FILE} next to model artifact; integrity not verified");
        return Ok(());
    }

    let content = std::fs::read(&manifest_path)
        .map_err(|e| BioTwinError::ModelArtifact(format!("Failed to read manifest: {e}")))?;
    let manifest: ModelManifest = serde_json::from_slice(&content)
        .map_err(|e| BioTwinError::ModelArtifact(format!("Invalid manifest format: {e}")))?;

    if manifest.version != MANIFEST_VERSION {
        return Err(BioTwinError::ModelArtifact(format!(
            "Unsupported manifest version: {}",
            manifest.version
        )));
    }

    let expected = manifest.files.get(ARTIFACT_FILE).ok_or_else(|| {
        BioTwinError::ModelArtifact(format!("Manifest does not bind {ARTIFACT_FILE}"))
    })?;

    if !sha256_hex(artifact_bytes).eq_ignore_ascii_case(expected) {
        return Err(BioTwinError::ModelArtifact(format!(
            "File hash mismatch for {ARTIFACT_FILE}"
        )));
    }

    Ok(())
}
