use crate::core::artifact::{
    ClassifierSpec, DecisionTree, HandleUnknown, ModelArtifact, SvcKernel, TransformStep, TreeNode,
};
use crate::core::{Classifier, FeatureRow, ModelInfo};
use crate::utils::error::{PredictorError, Result};

const CATEGORY_TOLERANCE: f64 = 1e-9;

/// 由模型檔建立的推論管線，建立後不再變動
#[derive(Debug, Clone)]
pub struct PipelineModel {
    artifact: ModelArtifact,
}

fn inference_error(message: impl Into<String>) -> PredictorError {
    PredictorError::InferenceError {
        message: message.into(),
    }
}

impl PipelineModel {
    pub fn new(artifact: ModelArtifact) -> Result<Self> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// 依序執行前處理步驟，輸出分類器的輸入向量
    pub fn transform(&self, row: &FeatureRow) -> Result<Vec<f64>> {
        let lookup = |column: &str| {
            row.get(column)
                .ok_or_else(|| inference_error(format!("input row is missing column '{}'", column)))
        };

        if self.artifact.preprocessor.is_empty() {
            return self
                .artifact
                .feature_names
                .iter()
                .map(|name| lookup(name))
                .collect();
        }

        let mut output = Vec::with_capacity(self.artifact.transformed_width());
        for step in &self.artifact.preprocessor {
            match step {
                TransformStep::StandardScaler {
                    columns,
                    mean,
                    scale,
                } => {
                    for (idx, column) in columns.iter().enumerate() {
                        let x = lookup(column)?;
                        let s = if scale[idx] == 0.0 { 1.0 } else { scale[idx] };
                        output.push((x - mean[idx]) / s);
                    }
                }
                TransformStep::OneHot {
                    column,
                    categories,
                    handle_unknown,
                } => {
                    let x = lookup(column)?;
                    let hit = categories
                        .iter()
                        .position(|c| (c - x).abs() < CATEGORY_TOLERANCE);
                    if hit.is_none() && *handle_unknown == HandleUnknown::Error {
                        return Err(inference_error(format!(
                            "found unknown category {} in column '{}'",
                            x, column
                        )));
                    }
                    output.extend((0..categories.len()).map(|i| {
                        if Some(i) == hit {
                            1.0
                        } else {
                            0.0
                        }
                    }));
                }
                TransformStep::Passthrough { columns } => {
                    for column in columns {
                        output.push(lookup(column)?);
                    }
                }
            }
        }

        if let Some(idx) = output.iter().position(|v| !v.is_finite()) {
            return Err(inference_error(format!(
                "transformed value at position {} is not finite",
                idx
            )));
        }
        Ok(output)
    }

    fn classify(&self, x: &[f64]) -> Result<i64> {
        match &self.artifact.classifier {
            ClassifierSpec::LogisticRegression {
                classes,
                coefficients,
                intercept,
                threshold,
            } => {
                let z: f64 = coefficients
                    .iter()
                    .zip(x)
                    .map(|(w, v)| w * v)
                    .sum::<f64>()
                    + intercept;
                if !z.is_finite() {
                    return Err(inference_error("decision function is not finite"));
                }
                let probability = sigmoid(z);
                tracing::trace!("logistic score z={:.4} p={:.4}", z, probability);
                Ok(if probability >= *threshold {
                    classes[1]
                } else {
                    classes[0]
                })
            }
            ClassifierSpec::RandomForest { classes, trees, .. } => {
                let mut votes = vec![0usize; classes.len()];
                for (idx, tree) in trees.iter().enumerate() {
                    let class = walk_tree(tree, x)
                        .map_err(|e| inference_error(format!("tree {}: {}", idx, e)))?;
                    votes[class] += 1;
                }
                // 平手時取較小的類別索引
                let winner = votes
                    .iter()
                    .enumerate()
                    .fold(0, |best, (i, v)| if *v > votes[best] { i } else { best });
                Ok(classes[winner])
            }
            ClassifierSpec::Svc {
                classes,
                kernel,
                gamma,
                support_vectors,
                dual_coef,
                intercept,
            } => {
                let score = support_vectors
                    .iter()
                    .zip(dual_coef)
                    .map(|(sv, alpha)| alpha * kernel_value(*kernel, *gamma, sv, x))
                    .sum::<f64>()
                    + intercept;
                if !score.is_finite() {
                    return Err(inference_error("decision function is not finite"));
                }
                tracing::trace!("svc decision value {:.4}", score);
                Ok(if score > 0.0 { classes[1] } else { classes[0] })
            }
        }
    }
}

fn kernel_value(kernel: SvcKernel, gamma: f64, sv: &[f64], x: &[f64]) -> f64 {
    match kernel {
        SvcKernel::Linear => sv.iter().zip(x).map(|(a, b)| a * b).sum(),
        SvcKernel::Rbf => {
            let squared: f64 = sv.iter().zip(x).map(|(a, b)| (a - b) * (a - b)).sum();
            (-gamma * squared).exp()
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn walk_tree(tree: &DecisionTree, x: &[f64]) -> std::result::Result<usize, String> {
    let mut node = 0;
    // 路徑長度不可能超過節點數，否則樹中有環
    for _ in 0..=tree.nodes.len() {
        match tree.nodes.get(node) {
            Some(TreeNode::Leaf { class }) => return Ok(*class),
            Some(TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            }) => {
                let value = x
                    .get(*feature)
                    .ok_or_else(|| format!("feature index {} out of range", feature))?;
                node = if *value <= *threshold { *left } else { *right };
            }
            None => return Err(format!("node {} does not exist", node)),
        }
    }
    Err("walk did not reach a leaf".to_string())
}

impl Classifier for PipelineModel {
    fn feature_names(&self) -> &[String] {
        &self.artifact.feature_names
    }

    fn predict(&self, row: &FeatureRow) -> Result<i64> {
        let x = self.transform(row)?;
        self.classify(&x)
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            name: self.artifact.name.clone(),
            version: self.artifact.version.clone(),
            features: self.artifact.feature_names.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, f64)]) -> FeatureRow {
        FeatureRow::new(
            pairs.iter().map(|(n, _)| n.to_string()).collect(),
            pairs.iter().map(|(_, v)| *v).collect(),
        )
    }

    fn logreg(handle_unknown: &str) -> PipelineModel {
        let json = format!(
            r#"{{
            "name": "unit",
            "feature_names": ["age", "cp"],
            "preprocessor": [
                {{ "kind": "standard_scaler", "columns": ["age"], "mean": [50.0], "scale": [10.0] }},
                {{ "kind": "one_hot", "column": "cp", "categories": [0, 1, 2, 3], "handle_unknown": "{}" }}
            ],
            "classifier": {{
                "kind": "logistic_regression",
                "classes": [0, 1],
                "coefficients": [2.0, -1.0, 0.0, 0.5, 1.0],
                "intercept": 0.0
            }}
        }}"#,
            handle_unknown
        );
        PipelineModel::new(ModelArtifact::from_json_slice(json.as_bytes()).unwrap()).unwrap()
    }

    fn forest() -> PipelineModel {
        let json = r#"{
            "name": "forest",
            "feature_names": ["age", "thalach"],
            "classifier": {
                "kind": "random_forest",
                "classes": [0, 1],
                "n_features": 2,
                "trees": [
                    { "nodes": [
                        { "feature": 0, "threshold": 55.0, "left": 1, "right": 2 },
                        { "class": 0 },
                        { "class": 1 }
                    ] },
                    { "nodes": [
                        { "feature": 1, "threshold": 140.0, "left": 1, "right": 2 },
                        { "class": 1 },
                        { "class": 0 }
                    ] }
                ]
            }
        }"#;
        PipelineModel::new(ModelArtifact::from_json_slice(json.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn test_transform_scales_and_encodes() {
        let model = logreg("error");
        let x = model.transform(&row(&[("age", 60.0), ("cp", 2.0)])).unwrap();
        assert_eq!(x, vec![1.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_logistic_regression_threshold() {
        let model = logreg("error");
        // z = 2 * 1.0 + 0.5 > 0
        assert_eq!(model.predict(&row(&[("age", 60.0), ("cp", 2.0)])).unwrap(), 1);
        // z = 2 * -1.0 - 1.0 < 0
        assert_eq!(model.predict(&row(&[("age", 40.0), ("cp", 0.0)])).unwrap(), 0);
    }

    #[test]
    fn test_unknown_category_is_an_inference_fault() {
        let model = logreg("error");
        let err = model.predict(&row(&[("age", 60.0), ("cp", 9.0)])).unwrap_err();
        assert!(matches!(err, PredictorError::InferenceError { .. }));
    }

    #[test]
    fn test_unknown_category_ignored_when_configured() {
        let model = logreg("ignore");
        let x = model.transform(&row(&[("age", 60.0), ("cp", 9.0)])).unwrap();
        assert_eq!(x, vec![1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_non_finite_input_is_an_inference_fault() {
        let model = logreg("error");
        let err = model
            .predict(&row(&[("age", f64::INFINITY), ("cp", 1.0)]))
            .unwrap_err();
        assert!(err.to_string().contains("not finite"));
    }

    #[test]
    fn test_forest_tie_prefers_lower_class() {
        let model = forest();
        // tree 1 votes 1, tree 2 votes 0
        assert_eq!(model.predict(&row(&[("age", 60.0), ("thalach", 150.0)])).unwrap(), 0);
        // both vote 1
        assert_eq!(model.predict(&row(&[("age", 60.0), ("thalach", 120.0)])).unwrap(), 1);
    }

    fn svc(kernel: &str) -> PipelineModel {
        let json = format!(
            r#"{{
            "name": "svc-unit",
            "feature_names": ["age", "chol"],
            "classifier": {{
                "kind": "svc",
                "classes": [0, 1],
                "kernel": "{}",
                "gamma": 1.0,
                "support_vectors": [[1.0, 0.0], [0.0, 1.0]],
                "dual_coef": [-1.0, 1.0],
                "intercept": 0.0
            }}
        }}"#,
            kernel
        );
        PipelineModel::new(ModelArtifact::from_json_slice(json.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn test_svc_linear_kernel() {
        let model = svc("linear");
        // -1 * 3 + 1 * 1 < 0
        assert_eq!(model.predict(&row(&[("age", 3.0), ("chol", 1.0)])).unwrap(), 0);
        // -1 * 1 + 1 * 3 > 0
        assert_eq!(model.predict(&row(&[("age", 1.0), ("chol", 3.0)])).unwrap(), 1);
        // 決策值恰為 0 判為 classes[0]
        assert_eq!(model.predict(&row(&[("age", 2.0), ("chol", 2.0)])).unwrap(), 0);
    }

    #[test]
    fn test_svc_rbf_kernel() {
        let model = svc("rbf");
        // 靠近第二個支持向量
        assert_eq!(model.predict(&row(&[("age", 0.1), ("chol", 0.9)])).unwrap(), 1);
        // 靠近第一個支持向量
        assert_eq!(model.predict(&row(&[("age", 0.9), ("chol", 0.1)])).unwrap(), 0);
        assert!((kernel_value(SvcKernel::Rbf, 1.0, &[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!((kernel_value(SvcKernel::Rbf, 0.5, &[0.0, 0.0], &[1.0, 1.0]) - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_cyclic_tree_fails_at_inference() {
        let tree = DecisionTree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 1.0,
                left: 0,
                right: 0,
            }],
        };
        assert!(walk_tree(&tree, &[0.0]).is_err());
    }

    #[test]
    fn test_describe() {
        let info = forest().describe();
        assert_eq!(info.name, "forest");
        assert_eq!(info.version, "0.0.0");
        assert_eq!(info.features, 2);
    }
}
