pub mod baseline;
pub mod decision_tree;
pub mod naive_bayes;
pub mod svm;

pub mod classifier_trait;
pub mod factory;

pub use baseline::BaselineModel;
pub use classifier_trait::Model;
pub use decision_tree::DecisionTreeModel;
pub use naive_bayes::NaiveBayesModel;
pub use svm::KernelModel;
