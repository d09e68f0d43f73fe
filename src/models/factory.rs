use crate::config::{ModelConfig, ModelType};
use crate::feature_selection::Selector;
use crate::models::baseline::BaselineModel;
use crate::models::classifier_trait::Model;
use crate::models::decision_tree::DecisionTreeModel;
use crate::models::naive_bayes::NaiveBayesModel;
use crate::models::svm::KernelModel;

/// Build an untrained boxed model from a `ModelConfig`.
pub fn build_model(params: &ModelConfig) -> Box<dyn Model> {
    build_model_with_selector(&params.model, params.selector.build_selector())
}

/// Build an untrained model of `model_type` around an already assembled selector.
pub fn build_model_with_selector(model_type: &ModelType, selector: Box<dyn Selector>) -> Box<dyn Model> {
    match model_type {
        ModelType::Baseline => Box::new(BaselineModel::new(selector)),

        ModelType::NaiveBayes => Box::new(NaiveBayesModel::new(selector)),

        ModelType::Svm { kernel, c, eps } => {
            Box::new(KernelModel::new(selector, kernel.clone(), *c).with_eps(*eps))
        }

        ModelType::DecisionTree {
            max_depth,
            min_leaf_size,
        } => Box::new(
            DecisionTreeModel::new(selector)
                .with_max_depth(*max_depth)
                .with_min_leaf_size(*min_leaf_size),
        ),
    }
}
