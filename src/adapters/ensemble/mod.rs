//! Ensemble adapter: Implementation of Classifier over an exported tree ensemble.
//!
//! The screening model is a per-condition soft-voting hybrid of a random
//! forest and a gradient-boosted tree ensemble, exported from the training
//! pipeline as `model.json` (see [`ModelArtifact`]). This adapter loads that
//! file, validates it completely, and evaluates it natively.
//!
//! # Security
//!
//! - If the artifact directory carries `manifest.json` + `model.sig`, the
//!   Ed25519 signature and the SHA-256 of `model.json` are verified first
//! - With `IntegrityPolicy::require_signed`, unsigned artifacts are refused
//! - Feature values never reach the logs
//!
//! # Artifact semantics
//!
//! - Categorical columns are ordinally encoded by their position in the
//!   encoder's category list; unseen categories take `unknown_value`
//! - Forest: mean of the normalized leaf class distributions
//! - Boosting: `raw[k] = init[k] + lr * sum(stage[k](x))`, softmax for three or
//!   more classes, sigmoid of a single raw score for two
//! - Hybrid: weight-averaged member distributions

pub mod manifest;
mod tree;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{
    ClassDistribution, Condition, FeatureRow, FeatureSchema, FeatureValue, ModelError,
};
use crate::ports::{Classifier, LabelDecoder};

pub use manifest::{IntegrityPolicy, SignedManifest};
pub use tree::{LeafKind, Tree};

/// Artifact format understood by this adapter.
pub const FORMAT_VERSION: u32 = 1;

fn default_unknown_value() -> f64 {
    -1.0
}

/// Root of `model.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,

    /// Training column order. Falls back to the built-in 33-column list.
    #[serde(default)]
    pub feature_columns: Option<Vec<String>>,

    /// Ordinal encoders keyed by declared column name
    #[serde(default)]
    pub encoders: BTreeMap<String, CategoryEncoder>,

    pub targets: Vec<TargetHead>,
}

/// Ordinal encoder for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    pub categories: Vec<String>,
    #[serde(default = "default_unknown_value")]
    pub unknown_value: f64,
}

impl CategoryEncoder {
    /// Position of `value` in the category list (exact match first, then
    /// trimmed case-insensitive), or `unknown_value`.
    #[must_use]
    pub fn encode(&self, value: &str) -> f64 {
        if let Some(i) = self.categories.iter().position(|c| c == value) {
            return i as f64;
        }
        let needle = value.trim();
        self.categories
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(needle))
            .map_or(self.unknown_value, |i| i as f64)
    }
}

/// One condition's output head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetHead {
    /// "Anxiety", "Stress", "Depression" (a trailing " Label" is accepted)
    pub condition: String,
    /// Label decoder: class index → severity label
    pub classes: Vec<String>,
    pub members: Vec<EnsembleMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnsembleMember {
    Forest {
        weight: f64,
        trees: Vec<Tree>,
    },
    Boosting {
        weight: f64,
        learning_rate: f64,
        /// Per-class initial raw score (one entry for binary heads)
        init: Vec<f64>,
        /// Per stage, one tree per class (one tree for binary heads)
        stages: Vec<Vec<Tree>>,
    },
}

impl EnsembleMember {
    fn weight(&self) -> f64 {
        match self {
            Self::Forest { weight, .. } | Self::Boosting { weight, .. } => *weight,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Forest { .. } => "forest",
            Self::Boosting { .. } => "boosting",
        }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let w = self.weight();
        if !w.is_finite() || w <= 0.0 {
            return Err(format!("{} weight must be positive and finite", self.kind()));
        }

        match self {
            Self::Forest { trees, .. } => {
                if trees.is_empty() {
                    return Err("forest has no trees".into());
                }
                for (t, tree) in trees.iter().enumerate() {
                    tree.validate(n_features, LeafKind::Distribution(n_classes))
                        .map_err(|e| format!("forest tree {t}: {e}"))?;
                }
            }
            Self::Boosting {
                learning_rate,
                init,
                stages,
                ..
            } => {
                if !learning_rate.is_finite() || *learning_rate <= 0.0 {
                    return Err("boosting learning_rate must be positive and finite".into());
                }
                let per_stage = boosting_outputs(n_classes);
                if init.len() != per_stage || init.iter().any(|v| !v.is_finite()) {
                    return Err(format!(
                        "boosting init must hold {per_stage} finite values, got {}",
                        init.len()
                    ));
                }
                if stages.is_empty() {
                    return Err("boosting has no stages".into());
                }
                for (s, stage) in stages.iter().enumerate() {
                    if stage.len() != per_stage {
                        return Err(format!(
                            "boosting stage {s} has {} trees, expected {per_stage}",
                            stage.len()
                        ));
                    }
                    for (k, tree) in stage.iter().enumerate() {
                        tree.validate(n_features, LeafKind::Scalar)
                            .map_err(|e| format!("boosting stage {s} tree {k}: {e}"))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn predict(&self, x: &[f64], n_classes: usize) -> Result<Vec<f64>, String> {
        match self {
            Self::Forest { trees, .. } => {
                let mut acc = vec![0.0; n_classes];
                for tree in trees {
                    let leaf = tree.leaf_value(x)?;
                    let total: f64 = leaf.iter().sum();
                    if total <= 0.0 || leaf.len() != n_classes {
                        return Err("forest leaf is not a class distribution".into());
                    }
                    for (a, v) in acc.iter_mut().zip(leaf) {
                        *a += v / total;
                    }
                }
                let n = trees.len() as f64;
                Ok(acc.into_iter().map(|a| a / n).collect())
            }
            Self::Boosting {
                learning_rate,
                init,
                stages,
                ..
            } => {
                let mut raw = init.clone();
                for stage in stages {
                    for (r, tree) in raw.iter_mut().zip(stage) {
                        let leaf = tree.leaf_value(x)?;
                        let v = leaf.first().ok_or("boosting leaf is empty")?;
                        *r += learning_rate * v;
                    }
                }
                if n_classes == 2 {
                    let p1 = sigmoid(raw[0]);
                    Ok(vec![1.0 - p1, p1])
                } else {
                    Ok(softmax(&raw))
                }
            }
        }
    }
}

fn boosting_outputs(n_classes: usize) -> usize {
    if n_classes == 2 {
        1
    } else {
        n_classes
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(raw: &[f64]) -> Vec<f64> {
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = raw.iter().map(|r| (r - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Validated output head.
#[derive(Debug, Clone)]
struct Head {
    decoder: LabelDecoder,
    members: Vec<EnsembleMember>,
}

impl Head {
    fn predict(&self, x: &[f64]) -> Result<ClassDistribution, ModelError> {
        let n_classes = self.decoder.classes().len();
        let mut acc = vec![0.0; n_classes];
        let mut total_weight = 0.0;

        for member in &self.members {
            let dist = member.predict(x, n_classes).map_err(|e| {
                ModelError::Prediction(format!("{} {}: {e}", self.decoder.condition(), member.kind()))
            })?;
            let w = member.weight();
            for (a, p) in acc.iter_mut().zip(&dist) {
                *a += w * p;
            }
            total_weight += w;
        }

        let sum: f64 = acc.iter().sum();
        if total_weight <= 0.0 || !sum.is_finite() || sum <= 0.0 {
            return Err(ModelError::Prediction(format!(
                "{} produced a degenerate distribution",
                self.decoder.condition()
            )));
        }
        Ok(ClassDistribution::new(acc.into_iter().map(|a| a / sum).collect()))
    }
}

/// Hybrid tree-ensemble classifier loaded from `model.json`.
#[derive(Debug)]
pub struct EnsembleClassifier {
    schema: FeatureSchema,
    /// Encoder per schema column (None for numeric columns)
    encoders: Vec<Option<CategoryEncoder>>,
    /// In [`Condition::ALL`] order
    heads: Vec<Head>,
    manifest: Option<SignedManifest>,
    source: PathBuf,
}

impl EnsembleClassifier {
    /// Load and validate an artifact from a directory or a `model.json` path.
    ///
    /// # Security
    ///
    /// The manifest (when present) is verified before the model is parsed,
    /// against the same bytes that are then parsed.
    ///
    /// # Errors
    /// Returns `ModelError::Io` if the file cannot be read,
    /// `ModelError::Signature` on integrity failures, and
    /// `ModelError::Format` / `ModelError::Schema` on invalid content.
    pub fn load(path: &Path, policy: &IntegrityPolicy) -> Result<Self, ModelError> {
        let (base_dir, model_path) = if path.is_dir() {
            (path.to_path_buf(), path.join(manifest::MODEL_FILE))
        } else {
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            (parent.to_path_buf(), path.to_path_buf())
        };

        // Hash and parse the same bytes.
        let content = std::fs::read(&model_path)
            .map_err(|e| ModelError::Io(format!("{}: {e}", model_path.display())))?;

        let signed = manifest::verify(&base_dir, policy, &content)?;
        if signed.is_some()
            && model_path.file_name() != Some(std::ffi::OsStr::new(manifest::MODEL_FILE))
        {
            return Err(ModelError::Signature(format!(
                "{model_path:?} is not bound by the signed manifest"
            )));
        }

        let artifact: ModelArtifact = serde_json::from_slice(&content)
            .map_err(|e| ModelError::Format(format!("{}: {e}", model_path.display())))?;

        let mut classifier = Self::from_artifact(artifact)?;
        classifier.manifest = signed;
        classifier.source = model_path;

        tracing::info!(
            "Loaded model from {:?} (columns={}, conditions={}, signed={})",
            classifier.source,
            classifier.schema.len(),
            classifier.heads.len(),
            classifier.is_signed()
        );
        Ok(classifier)
    }

    /// Validate an in-memory artifact.
    ///
    /// # Errors
    /// Returns `ModelError::Schema` when the declared columns do not resolve
    /// to the 33 known fields and `ModelError::Format` for any other problem.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if artifact.format_version != FORMAT_VERSION {
            return Err(ModelError::Format(format!(
                "Unsupported format_version {} (expected {FORMAT_VERSION})",
                artifact.format_version
            )));
        }

        let schema = match &artifact.feature_columns {
            Some(columns) => FeatureSchema::resolve(columns)?,
            None => {
                tracing::warn!("Artifact declares no feature_columns; using built-in column list");
                FeatureSchema::default()
            }
        };

        let mut encoders: Vec<Option<CategoryEncoder>> = vec![None; schema.len()];
        for (column, encoder) in artifact.encoders {
            let idx = schema.index_of(&column).ok_or_else(|| {
                ModelError::Format(format!("Encoder for unknown column {column:?}"))
            })?;
            if encoder.categories.is_empty() {
                return Err(ModelError::Format(format!(
                    "Encoder for {column:?} has no categories"
                )));
            }
            if !encoder.unknown_value.is_finite() {
                return Err(ModelError::Format(format!(
                    "Encoder for {column:?} has a non-finite unknown_value"
                )));
            }
            encoders[idx] = Some(encoder);
        }
        for (i, field) in schema.fields().iter().enumerate() {
            if field.is_categorical() && encoders[i].is_none() {
                return Err(ModelError::Format(format!(
                    "Categorical column {:?} has no encoder",
                    schema.columns()[i]
                )));
            }
        }

        let mut by_condition: BTreeMap<usize, Head> = BTreeMap::new();
        for target in artifact.targets {
            let condition = Condition::from_name(&target.condition).ok_or_else(|| {
                ModelError::Format(format!("Unknown target condition {:?}", target.condition))
            })?;
            let slot = Condition::ALL
                .iter()
                .position(|c| *c == condition)
                .unwrap_or_default();
            if by_condition.contains_key(&slot) {
                return Err(ModelError::Format(format!(
                    "Condition {condition} declared more than once"
                )));
            }
            if target.classes.len() < 2 {
                return Err(ModelError::Format(format!(
                    "{condition} must declare at least two classes"
                )));
            }
            if target.members.is_empty() {
                return Err(ModelError::Format(format!("{condition} has no ensemble members")));
            }
            for (m, member) in target.members.iter().enumerate() {
                member
                    .validate(schema.len(), target.classes.len())
                    .map_err(|e| ModelError::Format(format!("{condition} member {m}: {e}")))?;
            }

            by_condition.insert(
                slot,
                Head {
                    decoder: LabelDecoder::new(condition, target.classes),
                    members: target.members,
                },
            );
        }

        let missing: Vec<&str> = Condition::ALL
            .iter()
            .enumerate()
            .filter(|(i, _)| !by_condition.contains_key(i))
            .map(|(_, c)| c.name())
            .collect();
        if !missing.is_empty() {
            return Err(ModelError::Format(format!(
                "Artifact is missing targets: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            schema,
            encoders,
            heads: by_condition.into_values().collect(),
            manifest: None,
            source: PathBuf::new(),
        })
    }

    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.manifest.is_some()
    }

    #[must_use]
    pub fn manifest(&self) -> Option<&SignedManifest> {
        self.manifest.as_ref()
    }

    /// File the model was read from (empty for in-memory artifacts).
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Encode a row into the numeric vector the trees split on.
    fn encode(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelError> {
        if row.columns() != self.schema.columns() {
            return Err(ModelError::Prediction(format!(
                "Row columns do not match model schema (row has {}, model expects {})",
                row.len(),
                self.schema.len()
            )));
        }

        row.values()
            .iter()
            .zip(&self.encoders)
            .zip(self.schema.columns())
            .map(|((value, encoder), column)| match (value, encoder) {
                (FeatureValue::Number(v), _) if v.is_finite() => Ok(*v),
                (FeatureValue::Number(_), _) => Err(ModelError::Prediction(format!(
                    "Non-finite value in column {column:?}"
                ))),
                (FeatureValue::Category(s), Some(enc)) => Ok(enc.encode(s)),
                (FeatureValue::Category(_), None) => Err(ModelError::Prediction(format!(
                    "Column {column:?} is categorical but the artifact declares no encoder"
                ))),
            })
            .collect()
    }
}

impl Classifier for EnsembleClassifier {
    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict_proba(
        &self,
        row: &FeatureRow,
    ) -> Result<Vec<(Condition, ClassDistribution)>, ModelError> {
        let x = self.encode(row)?;
        tracing::debug!("Evaluating {} heads over {} features", self.heads.len(), x.len());

        self.heads
            .iter()
            .map(|head| Ok((head.decoder.condition(), head.predict(&x)?)))
            .collect()
    }

    fn decoder(&self, condition: Condition) -> Option<&LabelDecoder> {
        self.heads
            .iter()
            .map(|h| &h.decoder)
            .find(|d| d.condition() == condition)
    }
}
