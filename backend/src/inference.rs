use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{FeatureValue, LoanApplication, PredictionResult, FEATURE_NAMES};

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// Failures while scoring an already validated application. All of them mean
/// the loaded model is inconsistent, so they are server errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("predicted label {label:?} is not one of the model classes {classes:?}")]
    UnknownLabel { label: String, classes: Vec<String> },
    #[error("model returned {got} probabilities for {expected} classes")]
    ProbabilityShape { expected: usize, got: usize },
    #[error("column {column} has no value on the application")]
    MissingColumn { column: String },
    #[error("column {column} cannot encode {value:?}")]
    UnknownCategory { column: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    pub classes: Vec<String>,
    pub features: Vec<String>,
    pub n_trees: usize,
}

/// The decision function the prediction endpoint is served from.
pub trait Classifier: Send + Sync {
    /// Class labels in the order `predict_proba` reports them.
    fn classes(&self) -> &[String];

    fn predict(&self, application: &LoanApplication) -> Result<String, InferenceError>;

    fn predict_proba(&self, application: &LoanApplication) -> Result<Vec<f64>, InferenceError>;

    fn info(&self) -> ModelInfo;
}

/// Scores one application and pairs the predicted label with its own
/// probability, found by position in the model's class list.
pub fn predict_application(
    model: &dyn Classifier,
    application: &LoanApplication,
) -> Result<PredictionResult, InferenceError> {
    let label = model.predict(application)?;
    let proba = model.predict_proba(application)?;
    let classes = model.classes();

    if proba.len() != classes.len() {
        return Err(InferenceError::ProbabilityShape {
            expected: classes.len(),
            got: proba.len(),
        });
    }

    let Some(index) = classes.iter().position(|class| *class == label) else {
        return Err(InferenceError::UnknownLabel {
            label,
            classes: classes.to_vec(),
        });
    };

    Ok(PredictionResult {
        approved: label,
        probability: proba[index],
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Encoding {
    Numeric,
    OneHot { categories: Vec<String> },
}

impl Encoding {
    fn width(&self) -> usize {
        match self {
            Encoding::Numeric => 1,
            Encoding::OneHot { categories } => categories.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub encoding: Encoding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walks from the root; `x <= threshold` goes left. Children always sit
    /// after their parent, which `ForestPipeline::from_json` checks.
    fn leaf(&self, features: &[f64]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Split {
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
                Node::Leaf { value } => return value,
            }
        }
    }
}

/// Column encoders feeding a random forest, as exported next to the
/// training notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestPipeline {
    pub name: String,
    pub version: String,
    pub classes: Vec<String>,
    pub columns: Vec<Column>,
    pub trees: Vec<Tree>,
}

impl ForestPipeline {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelLoadError> {
        let pipeline: ForestPipeline = serde_json::from_str(raw)?;
        pipeline.check()?;
        Ok(pipeline)
    }

    pub fn n_features(&self) -> usize {
        self.columns.iter().map(|c| c.encoding.width()).sum()
    }

    fn check(&self) -> Result<(), ModelLoadError> {
        let invalid =
            |msg: String| -> Result<(), ModelLoadError> { Err(ModelLoadError::Invalid(msg)) };

        if self.classes.is_empty() {
            return invalid("no classes declared".into());
        }
        let mut seen = HashSet::new();
        for class in &self.classes {
            if !seen.insert(class) {
                return invalid(format!("class {class:?} declared twice"));
            }
        }

        for column in &self.columns {
            if !FEATURE_NAMES.contains(&column.name.as_str()) {
                return invalid(format!("column {} is not an application field", column.name));
            }
            if let Encoding::OneHot { categories } = &column.encoding {
                if categories.is_empty() {
                    return invalid(format!("column {} has no categories", column.name));
                }
            }
        }

        if self.trees.is_empty() {
            return invalid("forest has no trees".into());
        }
        let n_features = self.n_features();
        let n_classes = self.classes.len();
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return invalid(format!("tree {t} has no nodes"));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= n_features {
                            return invalid(format!(
                                "tree {t} node {i} splits on feature {feature} of {n_features}"
                            ));
                        }
                        if !threshold.is_finite() {
                            return invalid(format!("tree {t} node {i} has a non-finite threshold"));
                        }
                        for child in [left, right] {
                            if *child <= i || *child >= tree.nodes.len() {
                                return invalid(format!(
                                    "tree {t} node {i} points to child {child}"
                                ));
                            }
                        }
                    }
                    Node::Leaf { value } => {
                        if value.len() != n_classes {
                            return invalid(format!(
                                "tree {t} leaf {i} has {} weights for {n_classes} classes",
                                value.len()
                            ));
                        }
                        if value.iter().any(|w| !w.is_finite() || *w < 0.0)
                            || value.iter().sum::<f64>() <= 0.0
                        {
                            return invalid(format!("tree {t} leaf {i} has unusable weights"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Encoded feature row in column order.
    pub fn encode(&self, application: &LoanApplication) -> Result<Vec<f64>, InferenceError> {
        let mut row = Vec::with_capacity(self.n_features());
        for column in &self.columns {
            let value =
                application
                    .feature(&column.name)
                    .ok_or_else(|| InferenceError::MissingColumn {
                        column: column.name.clone(),
                    })?;
            match (&column.encoding, value) {
                (Encoding::Numeric, FeatureValue::Number(v)) => row.push(v),
                (Encoding::OneHot { categories }, FeatureValue::Category(v)) => {
                    if !categories.iter().any(|c| c == v) {
                        return Err(InferenceError::UnknownCategory {
                            column: column.name.clone(),
                            value: v.to_string(),
                        });
                    }
                    row.extend(categories.iter().map(|c| if c == v { 1.0 } else { 0.0 }));
                }
                (_, other) => {
                    return Err(InferenceError::UnknownCategory {
                        column: column.name.clone(),
                        value: format!("{other:?}"),
                    })
                }
            }
        }
        Ok(row)
    }
}

impl Classifier for ForestPipeline {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, application: &LoanApplication) -> Result<String, InferenceError> {
        let proba = self.predict_proba(application)?;
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        Ok(self.classes[best].clone())
    }

    fn predict_proba(&self, application: &LoanApplication) -> Result<Vec<f64>, InferenceError> {
        let row = self.encode(application)?;
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let leaf = tree.leaf(&row);
            let total: f64 = leaf.iter().sum();
            for (acc, weight) in proba.iter_mut().zip(leaf) {
                *acc += weight / total;
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            classes: self.classes.clone(),
            features: self.columns.iter().map(|c| c.name.clone()).collect(),
            n_trees: self.trees.len(),
        }
    }
}
