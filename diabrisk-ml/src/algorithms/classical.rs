//! Fitted classical classifiers exported from sklearn-compatible training runs.
//!
//! Each model answers `predict_proba` for one sample; `predict` is the index of
//! the first maximal probability, which matches the estimator's own tie rule
//! for every algorithm here.

use crate::error::{InferenceError, MlError};
use serde::{Deserialize, Serialize};

/// A fitted single-sample classifier.
pub trait Classifier {
    /// Number of input features the model was fitted on.
    fn n_features(&self) -> usize;

    /// Number of output classes.
    fn n_classes(&self) -> usize;

    /// Per-class probability distribution for one sample.
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError>;

    /// Predicted class index together with the distribution it was read from.
    fn classify(&self, x: &[f64]) -> Result<(usize, Vec<f64>), InferenceError> {
        let proba = self.predict_proba(x)?;
        let class = argmax(&proba)
            .ok_or_else(|| InferenceError::InvalidOutput("empty probability vector".into()))?;
        Ok((class, proba))
    }

    /// Predicted class index for one sample.
    fn predict(&self, x: &[f64]) -> Result<usize, InferenceError> {
        self.classify(x).map(|(class, _)| class)
    }
}

fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.iter().copied().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

fn check_width(expected: usize, x: &[f64]) -> Result<(), InferenceError> {
    if x.len() != expected {
        return Err(InferenceError::shape("model", expected, x.len()));
    }
    Ok(())
}

fn normalize(mut votes: Vec<f64>) -> Result<Vec<f64>, InferenceError> {
    let total: f64 = votes.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(InferenceError::InvalidOutput(format!(
            "class weights sum to {total}"
        )));
    }
    for v in &mut votes {
        *v /= total;
    }
    Ok(votes)
}

const BINARY: usize = 2;

/// Allowed drift of a probability vector's sum away from 1.
const PROBA_SUM_TOLERANCE: f64 = 1e-6;

fn binary() -> usize {
    BINARY
}

/// A fitted model of one of the supported algorithms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum FittedModel {
    Knn(KnnClassifier),
    GaussianNb(GaussianNb),
    DecisionTree(DecisionTree),
    LogisticRegression(LogisticRegression),
}

impl FittedModel {
    fn inner(&self) -> &dyn Classifier {
        match self {
            Self::Knn(m) => m,
            Self::GaussianNb(m) => m,
            Self::DecisionTree(m) => m,
            Self::LogisticRegression(m) => m,
        }
    }

    /// Short algorithm identifier, as used in the persisted artifact.
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Knn(_) => "knn",
            Self::GaussianNb(_) => "gaussian_nb",
            Self::DecisionTree(_) => "decision_tree",
            Self::LogisticRegression(_) => "logistic_regression",
        }
    }

    /// The estimator class the parameters were exported from.
    pub fn sklearn_class(&self) -> &'static str {
        match self {
            Self::Knn(_) => "sklearn.neighbors.KNeighborsClassifier",
            Self::GaussianNb(_) => "sklearn.naive_bayes.GaussianNB",
            Self::DecisionTree(_) => "sklearn.tree.DecisionTreeClassifier",
            Self::LogisticRegression(_) => "sklearn.linear_model.LogisticRegression",
        }
    }

    pub(crate) fn validate(&self, n_features: usize) -> Result<(), MlError> {
        match self {
            Self::Knn(m) => m.validate()?,
            Self::GaussianNb(m) => m.validate()?,
            Self::DecisionTree(m) => m.validate()?,
            Self::LogisticRegression(m) => m.validate()?,
        }
        if self.n_features() != n_features {
            return Err(MlError::artifact(format!(
                "{} model expects {} features, artifact declares {n_features}",
                self.algorithm(),
                self.n_features()
            )));
        }
        if self.n_classes() != BINARY {
            return Err(MlError::artifact(format!(
                "{} model has {} classes, expected a binary classifier",
                self.algorithm(),
                self.n_classes()
            )));
        }
        Ok(())
    }
}

impl Classifier for FittedModel {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn n_classes(&self) -> usize {
        self.inner().n_classes()
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let proba = self.inner().predict_proba(x)?;
        let sum: f64 = proba.iter().sum();
        if proba.len() != self.n_classes()
            || proba.iter().any(|p| !(0.0..=1.0).contains(p))
            || (sum - 1.0).abs() > PROBA_SUM_TOLERANCE
        {
            return Err(InferenceError::InvalidOutput(format!(
                "{} returned {proba:?}, not a probability distribution",
                self.algorithm()
            )));
        }
        Ok(proba)
    }
}

// ---------------------------------------------------------------------------
// k-nearest neighbours
// ---------------------------------------------------------------------------

/// Neighbour weighting scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnnWeights {
    #[default]
    Uniform,
    Distance,
}

/// k-nearest neighbours over stored (already scaled) training points,
/// Euclidean metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier {
    pub n_neighbors: usize,
    #[serde(default)]
    pub weights: KnnWeights,
    pub points: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
    #[serde(default = "binary")]
    pub n_classes: usize,
}

impl KnnClassifier {
    fn validate(&self) -> Result<(), MlError> {
        if self.n_neighbors == 0 {
            return Err(MlError::artifact("knn n_neighbors must be at least 1"));
        }
        if self.points.is_empty() || self.points.len() != self.labels.len() {
            return Err(MlError::artifact(format!(
                "knn has {} points and {} labels",
                self.points.len(),
                self.labels.len()
            )));
        }
        let width = self.n_features();
        if self.points.iter().any(|p| p.len() != width) {
            return Err(MlError::artifact("knn points have differing widths"));
        }
        if let Some(bad) = self.labels.iter().find(|l| **l >= self.n_classes) {
            return Err(MlError::artifact(format!(
                "knn label {bad} outside {} classes",
                self.n_classes
            )));
        }
        Ok(())
    }
}

impl Classifier for KnnClassifier {
    fn n_features(&self) -> usize {
        self.points.first().map_or(0, Vec::len)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(self.n_features(), x)?;

        let mut distances: Vec<(f64, usize)> = self
            .points
            .iter()
            .zip(&self.labels)
            .map(|(p, &label)| {
                let d = p
                    .iter()
                    .zip(x)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt();
                (d, label)
            })
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));
        let k = self.n_neighbors.min(distances.len());
        let neighbours = &distances[..k];

        let mut votes = vec![0.0; self.n_classes];
        let exact = neighbours.iter().any(|(d, _)| *d == 0.0);
        for &(d, label) in neighbours {
            let weight = match self.weights {
                KnnWeights::Uniform => 1.0,
                // An exact match takes all the weight.
                KnnWeights::Distance if exact => {
                    if d == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                }
                KnnWeights::Distance => 1.0 / d,
            };
            let slot = votes.get_mut(label).ok_or_else(|| {
                InferenceError::InvalidOutput(format!("neighbour label {label} out of range"))
            })?;
            *slot += weight;
        }
        normalize(votes)
    }
}

// ---------------------------------------------------------------------------
// Gaussian naive Bayes
// ---------------------------------------------------------------------------

/// Gaussian naive Bayes with per-class priors, means and variances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNb {
    pub class_prior: Vec<f64>,
    pub theta: Vec<Vec<f64>>,
    pub var: Vec<Vec<f64>>,
}

impl GaussianNb {
    fn validate(&self) -> Result<(), MlError> {
        let classes = self.class_prior.len();
        if classes == 0 || self.theta.len() != classes || self.var.len() != classes {
            return Err(MlError::artifact(format!(
                "gaussian_nb has {classes} priors, {} mean rows, {} variance rows",
                self.theta.len(),
                self.var.len()
            )));
        }
        let width = self.n_features();
        if self
            .theta
            .iter()
            .chain(&self.var)
            .any(|row| row.len() != width)
        {
            return Err(MlError::artifact("gaussian_nb rows have differing widths"));
        }
        if self.class_prior.iter().any(|p| !(*p > 0.0 && p.is_finite())) {
            return Err(MlError::artifact("gaussian_nb priors must be positive"));
        }
        if self.var.iter().flatten().any(|v| !(*v > 0.0 && v.is_finite())) {
            return Err(MlError::artifact("gaussian_nb variances must be positive"));
        }
        Ok(())
    }

    fn joint_log_likelihood(&self, x: &[f64]) -> Vec<f64> {
        self.class_prior
            .iter()
            .zip(self.theta.iter().zip(&self.var))
            .map(|(prior, (theta, var))| {
                let norm: f64 = var
                    .iter()
                    .map(|v| (2.0 * std::f64::consts::PI * v).ln())
                    .sum();
                let dist: f64 = x
                    .iter()
                    .zip(theta.iter().zip(var))
                    .map(|(xi, (m, v))| (xi - m).powi(2) / v)
                    .sum();
                prior.ln() - 0.5 * norm - 0.5 * dist
            })
            .collect()
    }
}

impl Classifier for GaussianNb {
    fn n_features(&self) -> usize {
        self.theta.first().map_or(0, Vec::len)
    }

    fn n_classes(&self) -> usize {
        self.class_prior.len()
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(self.n_features(), x)?;
        let jll = self.joint_log_likelihood(x);
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(InferenceError::InvalidOutput(
                "naive bayes log likelihood is not finite".into(),
            ));
        }
        let log_norm = max + jll.iter().map(|l| (l - max).exp()).sum::<f64>().ln();
        Ok(jll.iter().map(|l| (l - log_norm).exp()).collect())
    }
}

// ---------------------------------------------------------------------------
// Decision tree
// ---------------------------------------------------------------------------

/// One node of a flattened decision tree. Leaves have no split feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<usize>,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<usize>,
    /// Per-class training sample weight reaching this node.
    pub value: Vec<f64>,
}

impl TreeNode {
    fn split(&self) -> Option<(usize, usize, usize)> {
        match (self.feature, self.left, self.right) {
            (Some(f), Some(l), Some(r)) => Some((f, l, r)),
            _ => None,
        }
    }
}

/// Decision tree classifier; samples go left when `x[feature] <= threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub n_features: usize,
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self) -> Result<(), MlError> {
        if self.nodes.is_empty() {
            return Err(MlError::artifact("decision_tree has no nodes"));
        }
        let classes = self.n_classes();
        for (i, node) in self.nodes.iter().enumerate() {
            if node.value.len() != classes {
                return Err(MlError::artifact(format!(
                    "decision_tree node {i} has {} class values, expected {classes}",
                    node.value.len()
                )));
            }
            if node.value.iter().any(|v| !(v.is_finite() && *v >= 0.0)) {
                return Err(MlError::artifact(format!(
                    "decision_tree node {i} has class values {:?}, expected finite non-negative weights",
                    node.value
                )));
            }
            match node.split() {
                Some((f, l, r)) => {
                    if f >= self.n_features {
                        return Err(MlError::artifact(format!(
                            "decision_tree node {i} splits on feature {f}"
                        )));
                    }
                    // Children always follow their parent, so traversal cannot loop.
                    if l <= i || r <= i || l >= self.nodes.len() || r >= self.nodes.len() {
                        return Err(MlError::artifact(format!(
                            "decision_tree node {i} has invalid children {l}/{r}"
                        )));
                    }
                }
                None => {
                    if node.feature.is_some() || node.left.is_some() || node.right.is_some() {
                        return Err(MlError::artifact(format!(
                            "decision_tree node {i} has a partial split"
                        )));
                    }
                    if node.value.iter().sum::<f64>() <= 0.0 {
                        return Err(MlError::artifact(format!(
                            "decision_tree leaf {i} carries no samples"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf(&self, x: &[f64]) -> Result<&TreeNode, InferenceError> {
        let mut idx = 0;
        for _ in 0..=self.nodes.len() {
            let node = self.nodes.get(idx).ok_or_else(|| {
                InferenceError::InvalidOutput(format!("tree node {idx} does not exist"))
            })?;
            match node.split() {
                Some((feature, left, right)) => {
                    let v = x
                        .get(feature)
                        .ok_or_else(|| InferenceError::shape("model", feature + 1, x.len()))?;
                    idx = if *v <= node.threshold { left } else { right };
                }
                None => return Ok(node),
            }
        }
        Err(InferenceError::InvalidOutput(
            "tree traversal did not reach a leaf".into(),
        ))
    }
}

impl Classifier for DecisionTree {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.nodes.first().map_or(0, |n| n.value.len())
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(self.n_features, x)?;
        normalize(self.leaf(x)?.value.clone())
    }
}

// ---------------------------------------------------------------------------
// Logistic regression
// ---------------------------------------------------------------------------

/// Binary logistic regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), MlError> {
        if self.coef.is_empty() {
            return Err(MlError::artifact("logistic_regression has no coefficients"));
        }
        if self
            .coef
            .iter()
            .chain(std::iter::once(&self.intercept))
            .any(|c| !c.is_finite())
        {
            return Err(MlError::artifact(
                "logistic_regression has non-finite parameters",
            ));
        }
        Ok(())
    }
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn n_classes(&self) -> usize {
        BINARY
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(self.coef.len(), x)?;
        let z: f64 = self.coef.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + self.intercept;
        let p = 1.0 / (1.0 + (-z).exp());
        Ok(vec![1.0 - p, p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_argmax_prefers_first_on_tie() {
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[0.2, 0.8]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_knn_uniform_votes() {
        let knn = KnnClassifier {
            n_neighbors: 3,
            weights: KnnWeights::Uniform,
            points: vec![vec![0.0], vec![0.1], vec![1.0], vec![5.0]],
            labels: vec![0, 0, 1, 1],
            n_classes: 2,
        };
        let proba = knn.predict_proba(&[0.0]).unwrap();
        assert!(approx(proba[0], 2.0 / 3.0));
        assert!(approx(proba[1], 1.0 / 3.0));
        assert_eq!(knn.predict(&[0.0]).unwrap(), 0);
        assert_eq!(knn.predict(&[4.0]).unwrap(), 1);
    }

    #[test]
    fn test_knn_distance_exact_match_wins() {
        let knn = KnnClassifier {
            n_neighbors: 2,
            weights: KnnWeights::Distance,
            points: vec![vec![1.0], vec![1.5]],
            labels: vec![1, 0],
            n_classes: 2,
        };
        let proba = knn.predict_proba(&[1.0]).unwrap();
        assert_eq!(proba, vec![0.0, 1.0]);
    }

    #[test]
    fn test_knn_wrong_width() {
        let knn = KnnClassifier {
            n_neighbors: 1,
            weights: KnnWeights::Uniform,
            points: vec![vec![0.0, 0.0]],
            labels: vec![0],
            n_classes: 2,
        };
        assert_eq!(
            knn.predict_proba(&[0.0]).unwrap_err(),
            InferenceError::shape("model", 2, 1)
        );
    }

    #[test]
    fn test_gaussian_nb_symmetric_classes() {
        let nb = GaussianNb {
            class_prior: vec![0.5, 0.5],
            theta: vec![vec![-1.0], vec![1.0]],
            var: vec![vec![1.0], vec![1.0]],
        };
        let mid = nb.predict_proba(&[0.0]).unwrap();
        assert!(approx(mid[0], 0.5));
        let right = nb.predict_proba(&[2.0]).unwrap();
        assert!(right[1] > 0.9);
        assert!(approx(right.iter().sum::<f64>(), 1.0));
        assert_eq!(nb.predict(&[2.0]).unwrap(), 1);
    }

    #[test]
    fn test_decision_tree_traversal() {
        let tree = DecisionTree {
            n_features: 2,
            nodes: vec![
                TreeNode {
                    feature: Some(1),
                    threshold: 0.5,
                    left: Some(1),
                    right: Some(2),
                    value: vec![5.0, 5.0],
                },
                TreeNode {
                    feature: None,
                    threshold: 0.0,
                    left: None,
                    right: None,
                    value: vec![4.0, 1.0],
                },
                TreeNode {
                    feature: None,
                    threshold: 0.0,
                    left: None,
                    right: None,
                    value: vec![1.0, 4.0],
                },
            ],
        };
        tree.validate().unwrap();
        assert_eq!(tree.predict_proba(&[9.0, 0.5]).unwrap(), vec![0.8, 0.2]);
        assert_eq!(tree.predict(&[9.0, 0.6]).unwrap(), 1);
    }

    #[test]
    fn test_decision_tree_rejects_backward_children() {
        let tree = DecisionTree {
            n_features: 1,
            nodes: vec![TreeNode {
                feature: Some(0),
                threshold: 0.0,
                left: Some(0),
                right: Some(0),
                value: vec![1.0, 1.0],
            }],
        };
        assert!(tree.validate().is_err());
    }

    fn leaf(value: Vec<f64>) -> TreeNode {
        TreeNode {
            feature: None,
            threshold: 0.0,
            left: None,
            right: None,
            value,
        }
    }

    #[test]
    fn test_decision_tree_rejects_negative_class_weights() {
        let tree = DecisionTree {
            n_features: 1,
            nodes: vec![leaf(vec![-1.0, 3.0])],
        };
        let err = tree.validate().unwrap_err();
        assert!(err.to_string().contains("non-negative"));

        let nan = DecisionTree {
            n_features: 1,
            nodes: vec![leaf(vec![f64::NAN, 1.0])],
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_fitted_model_rejects_out_of_range_probabilities() {
        // Bypasses load-time validation to reach the output check.
        let model = FittedModel::DecisionTree(DecisionTree {
            n_features: 1,
            nodes: vec![leaf(vec![-1.0, 3.0])],
        });
        assert!(matches!(
            model.predict_proba(&[0.0]),
            Err(InferenceError::InvalidOutput(_))
        ));
        assert!(model.classify(&[0.0]).is_err());
    }

    #[test]
    fn test_fitted_model_accepts_valid_distribution() {
        let model = FittedModel::DecisionTree(DecisionTree {
            n_features: 1,
            nodes: vec![leaf(vec![1.0, 3.0])],
        });
        let (class, proba) = model.classify(&[0.0]).unwrap();
        assert_eq!(class, 1);
        assert_eq!(proba, vec![0.25, 0.75]);
    }

    #[test]
    fn test_logistic_regression() {
        let lr = LogisticRegression {
            coef: vec![1.0, -1.0],
            intercept: 0.0,
        };
        let proba = lr.predict_proba(&[0.0, 0.0]).unwrap();
        assert!(approx(proba[1], 0.5));
        // decision value 0 is the negative class
        assert_eq!(lr.predict(&[0.0, 0.0]).unwrap(), 0);
        assert_eq!(lr.predict(&[3.0, 0.0]).unwrap(), 1);
    }

    #[test]
    fn test_fitted_model_serde_tag() {
        let json = r#"{"algorithm":"logistic_regression","coef":[0.5],"intercept":-0.1}"#;
        let model: FittedModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.algorithm(), "logistic_regression");
        assert_eq!(model.n_features(), 1);
        assert!(model.validate(1).is_ok());
        assert!(model.validate(9).is_err());
    }
}
