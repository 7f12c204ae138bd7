//! Classical classifiers that can be carried by a model artifact.

pub mod classical;

pub use classical::{
    Classifier, DecisionTree, FittedModel, GaussianNb, KnnClassifier, KnnWeights,
    LogisticRegression, TreeNode,
};
