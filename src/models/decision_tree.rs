use std::fmt;

use gbdt::config::Loss;
use gbdt::decision_tree::{Data, DataVec, DecisionTree, TrainingCache};
use log::info;
use ndarray::{Array1, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::data_handling::Document;
use crate::error::{Result, TriageError};
use crate::feature_selection::{FittedSelector, Selector};
use crate::models::classifier_trait::Model;

/// Regression-tree classifier.
///
/// One tree per label is fitted on the 0/1 indicator of that label with a
/// squared-error loss, so each leaf holds the fraction of its training
/// samples carrying the label. That fraction is the label's score.
pub struct DecisionTreeModel {
    selector: Box<dyn Selector>,
    max_depth: u32,
    min_leaf_size: usize,
    trained: Option<TrainedDecisionTree>,
}

/// Fit state of a [`DecisionTreeModel`]: one tree per label plus the
/// hyper-parameters they were grown with.
#[derive(Serialize, Deserialize)]
pub struct TrainedDecisionTree {
    pub fitted: FittedSelector,
    pub trees: Vec<DecisionTree>,
    pub max_depth: u32,
    pub min_leaf_size: usize,
}

impl DecisionTreeModel {
    pub fn new(selector: impl Selector + 'static) -> Self {
        DecisionTreeModel {
            selector: Box::new(selector),
            max_depth: 10,
            min_leaf_size: 1,
            trained: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_leaf_size(mut self, min_leaf_size: usize) -> Self {
        self.min_leaf_size = min_leaf_size;
        self
    }

    /// Restore a model from a previously exported fit state.
    pub fn from_trained(selector: impl Selector + 'static, state: TrainedDecisionTree) -> Self {
        DecisionTreeModel {
            selector: Box::new(selector),
            max_depth: state.max_depth,
            min_leaf_size: state.min_leaf_size,
            trained: Some(state),
        }
    }

    pub fn trained_state(&self) -> Result<&TrainedDecisionTree> {
        self.trained
            .as_ref()
            .ok_or(TriageError::NotTrained { model: self.name() })
    }
}

fn to_features(x: ArrayView1<f64>) -> Vec<f32> {
    x.iter().map(|&v| v as f32).collect()
}

impl Model for DecisionTreeModel {
    fn name(&self) -> &'static str {
        "DecisionTreeModel"
    }

    fn train(&mut self, documents: &[Document]) -> Result<()> {
        if self.max_depth == 0 || self.min_leaf_size == 0 {
            return Err(TriageError::InvalidParameter(format!(
                "decision tree needs max_depth > 0 and min_leaf_size > 0, got {} and {}",
                self.max_depth, self.min_leaf_size
            )));
        }

        let built = self.selector.build(documents)?;
        let feature_size = built.x.ncols();
        let n_classes = built.fitted.labels().len();

        let mut trees = Vec::with_capacity(n_classes);
        for class in 0..n_classes {
            let train_x: DataVec = built
                .x
                .axis_iter(Axis(0))
                .zip(built.y.iter())
                .map(|(row, &label)| {
                    let target = if label == class { 1.0 } else { 0.0 };
                    Data::new_training_data(to_features(row), 1.0, target, None)
                })
                .collect();

            let mut tree = DecisionTree::new();
            tree.set_feature_size(feature_size);
            tree.set_max_depth(self.max_depth);
            tree.set_min_leaf_size(self.min_leaf_size);
            tree.set_loss(Loss::SquaredError);

            let mut cache = TrainingCache::get_cache(feature_size, &train_x, 2);
            tree.fit(&train_x, &mut cache);
            trees.push(tree);
        }

        info!(
            "{} (max_depth={}, min_leaf_size={}) trained {} trees on {} documents",
            self.name(),
            self.max_depth,
            self.min_leaf_size,
            trees.len(),
            documents.len()
        );

        self.trained = Some(TrainedDecisionTree {
            fitted: built.fitted,
            trees,
            max_depth: self.max_depth,
            min_leaf_size: self.min_leaf_size,
        });
        Ok(())
    }

    fn feature_selector(&self) -> Result<&FittedSelector> {
        Ok(&self.trained_state()?.fitted)
    }

    fn class_scores(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        let trained = self.trained_state()?;
        let test_x: DataVec = vec![Data::new_test_data(to_features(x), None)];

        Ok(trained
            .trees
            .iter()
            .map(|tree| {
                tree.predict(&test_x)
                    .first()
                    .map(|&p| p as f64)
                    .unwrap_or(f64::NAN)
            })
            .collect())
    }
}

impl fmt::Display for DecisionTreeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DecisionTreeModel(max_depth={}, min_leaf_size={}, {})",
            self.max_depth, self.min_leaf_size, self.selector
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_selection::BasicSelector;

    fn documents() -> Vec<Document> {
        vec![
            Document::labeled("Login", "login password", "alice"),
            Document::labeled("Login", "login reset", "alice"),
            Document::labeled("Printer", "printer paper", "bob"),
            Document::labeled("Printer", "printer toner", "bob"),
            Document::labeled("VPN", "vpn tunnel", "carol"),
            Document::labeled("VPN", "vpn drops", "carol"),
        ]
    }

    #[test]
    fn test_fits_training_data() {
        let mut model = DecisionTreeModel::new(BasicSelector::new(2, 1));
        model.train(&documents()).unwrap();
        for doc in documents() {
            let predicted = model.predict(&doc, 1).unwrap();
            assert_eq!(Some(&predicted[0]), doc.label.as_ref());
        }
    }

    #[test]
    fn test_scores_are_leaf_fractions() {
        let mut model = DecisionTreeModel::new(BasicSelector::new(2, 1));
        model.train(&documents()).unwrap();
        let x = model
            .feature_selector()
            .unwrap()
            .get_x(&Document::unlabeled("VPN", "vpn"));
        let scores = model.class_scores(x.view()).unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores.iter().all(|&s| (-1e-6..=1.0 + 1e-6).contains(&s)));
        assert!(scores[2] > scores[0]);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let mut model = DecisionTreeModel::new(BasicSelector::new(2, 1)).with_max_depth(0);
        assert!(matches!(
            model.train(&documents()),
            Err(TriageError::InvalidParameter(_))
        ));
    }
}
