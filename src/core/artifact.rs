use crate::domain::model::ClinicalObservation;
use crate::utils::error::{PredictorError, Result};
use crate::utils::validation::validate_range;
use serde::{Deserialize, Serialize};

/// 序列化後的模型管線（前處理 + 分類器）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub preprocessor: Vec<TransformStep>,
    pub classifier: ClassifierSpec,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformStep {
    StandardScaler {
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    OneHot {
        column: String,
        categories: Vec<f64>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
    Passthrough {
        columns: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    LogisticRegression {
        classes: Vec<i64>,
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    RandomForest {
        classes: Vec<i64>,
        n_features: usize,
        trees: Vec<DecisionTree>,
    },
    /// 二元 SVC：`sum(dual_coef[i] * K(sv[i], x)) + intercept > 0` 判為 classes[1]
    Svc {
        classes: Vec<i64>,
        kernel: SvcKernel,
        #[serde(default)]
        gamma: f64,
        support_vectors: Vec<Vec<f64>>,
        dual_coef: Vec<f64>,
        intercept: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SvcKernel {
    Linear,
    Rbf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// 扁平化的樹節點，`x[feature] <= threshold` 走 left
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: usize,
    },
}

impl TransformStep {
    pub fn input_columns(&self) -> Vec<&str> {
        match self {
            TransformStep::StandardScaler { columns, .. }
            | TransformStep::Passthrough { columns } => {
                columns.iter().map(String::as_str).collect()
            }
            TransformStep::OneHot { column, .. } => vec![column.as_str()],
        }
    }

    pub fn output_width(&self) -> usize {
        match self {
            TransformStep::StandardScaler { columns, .. }
            | TransformStep::Passthrough { columns } => columns.len(),
            TransformStep::OneHot { categories, .. } => categories.len(),
        }
    }
}

impl ClassifierSpec {
    pub fn classes(&self) -> &[i64] {
        match self {
            ClassifierSpec::LogisticRegression { classes, .. }
            | ClassifierSpec::RandomForest { classes, .. }
            | ClassifierSpec::Svc { classes, .. } => classes,
        }
    }

    pub fn input_width(&self) -> usize {
        match self {
            ClassifierSpec::LogisticRegression { coefficients, .. } => coefficients.len(),
            ClassifierSpec::RandomForest { n_features, .. } => *n_features,
            ClassifierSpec::Svc {
                support_vectors, ..
            } => support_vectors.first().map_or(0, Vec::len),
        }
    }
}

fn malformed(message: impl Into<String>) -> PredictorError {
    PredictorError::ArtifactError {
        message: message.into(),
    }
}

impl ModelArtifact {
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// 前處理後的欄位數（即分類器的輸入維度）
    pub fn transformed_width(&self) -> usize {
        if self.preprocessor.is_empty() {
            self.feature_names.len()
        } else {
            self.preprocessor.iter().map(TransformStep::output_width).sum()
        }
    }

    /// 載入時的結構檢查，任何不一致都視為啟動失敗
    pub fn validate(&self) -> Result<()> {
        if self.feature_names.is_empty() {
            return Err(malformed("feature_names cannot be empty"));
        }
        for name in &self.feature_names {
            if !ClinicalObservation::is_known_field(name) {
                return Err(malformed(format!(
                    "feature '{}' is not a clinical observation field",
                    name
                )));
            }
        }

        for (idx, step) in self.preprocessor.iter().enumerate() {
            for column in step.input_columns() {
                if !self.feature_names.iter().any(|n| n == column) {
                    return Err(malformed(format!(
                        "preprocessor step {} references unknown column '{}'",
                        idx, column
                    )));
                }
            }
            match step {
                TransformStep::StandardScaler {
                    columns,
                    mean,
                    scale,
                } => {
                    if mean.len() != columns.len() || scale.len() != columns.len() {
                        return Err(malformed(format!(
                            "standard_scaler step {} has {} columns but {} means and {} scales",
                            idx,
                            columns.len(),
                            mean.len(),
                            scale.len()
                        )));
                    }
                }
                TransformStep::OneHot { categories, .. } if categories.is_empty() => {
                    return Err(malformed(format!(
                        "one_hot step {} has no categories",
                        idx
                    )));
                }
                _ => {}
            }
        }

        let width = self.transformed_width();
        if width != self.classifier.input_width() {
            return Err(malformed(format!(
                "preprocessor produces {} values but classifier expects {}",
                width,
                self.classifier.input_width()
            )));
        }

        let classes = self.classifier.classes();
        if classes.len() != 2 {
            return Err(malformed(format!(
                "expected a binary classifier, found {} classes",
                classes.len()
            )));
        }

        if let ClassifierSpec::LogisticRegression { threshold, .. } = &self.classifier {
            validate_range("classifier.threshold", *threshold, 0.0, 1.0)
                .map_err(|e| malformed(e.to_string()))?;
        }

        if let ClassifierSpec::Svc {
            kernel,
            gamma,
            support_vectors,
            dual_coef,
            ..
        } = &self.classifier
        {
            if support_vectors.is_empty() {
                return Err(malformed("svc has no support vectors"));
            }
            if let Some(idx) = support_vectors.iter().position(|sv| sv.len() != width) {
                return Err(malformed(format!(
                    "support vector {} has width {} but preprocessor produces {}",
                    idx,
                    support_vectors[idx].len(),
                    width
                )));
            }
            if dual_coef.len() != support_vectors.len() {
                return Err(malformed(format!(
                    "svc has {} support vectors but {} dual coefficients",
                    support_vectors.len(),
                    dual_coef.len()
                )));
            }
            if *kernel == SvcKernel::Rbf && !(gamma.is_finite() && *gamma > 0.0) {
                return Err(malformed(format!("rbf kernel needs gamma > 0, got {}", gamma)));
            }
        }

        if let ClassifierSpec::RandomForest {
            n_features, trees, ..
        } = &self.classifier
        {
            if trees.is_empty() {
                return Err(malformed("random_forest has no trees"));
            }
            for (tree_idx, tree) in trees.iter().enumerate() {
                tree.validate(tree_idx, *n_features, classes.len())?;
            }
        }

        Ok(())
    }
}

impl DecisionTree {
    fn validate(&self, tree_idx: usize, n_features: usize, n_classes: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(malformed(format!("tree {} has no nodes", tree_idx)));
        }
        for (node_idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(malformed(format!(
                            "tree {} node {} splits on feature {} (width {})",
                            tree_idx, node_idx, feature, n_features
                        )));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(malformed(format!(
                            "tree {} node {} points outside the tree",
                            tree_idx, node_idx
                        )));
                    }
                }
                TreeNode::Leaf { class } if *class >= n_classes => {
                    return Err(malformed(format!(
                        "tree {} leaf {} votes for class index {}",
                        tree_idx, node_idx, class
                    )));
                }
                TreeNode::Leaf { .. } => {}
            }
        }
        Ok(())
    }
}
