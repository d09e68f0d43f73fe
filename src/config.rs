use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::feature_selection::{
    BasicSelector, ChiSquaredDecorator, LsiDecorator, NormalizationDecorator, Selector,
    StandardizationDecorator, StopWordsDecorator, TfIdfDecorator,
};
use crate::kernels::Kernel;
use crate::stopwords::Language;

/// Central configuration for a classifier: how documents become features and
/// which model is fitted on them.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ModelConfig {
    #[serde(default)]
    pub selector: SelectorConfig,

    #[serde(default)]
    pub model: ModelType,
}

impl ModelConfig {
    pub fn new(selector: SelectorConfig, model: ModelType) -> Self {
        Self { selector, model }
    }
}

/// A basic bag-of-words selector wrapped by `decorators`, innermost first.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    pub min_len: usize,
    pub min_occur: usize,
    pub decorators: Vec<DecoratorConfig>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            min_len: 2,
            min_occur: 2,
            decorators: vec![
                DecoratorConfig::StopWords {
                    language: Language::English,
                },
                DecoratorConfig::TfIdf,
            ],
        }
    }
}

impl SelectorConfig {
    /// A bare bag-of-words selector with no decorators.
    pub fn basic(min_len: usize, min_occur: usize) -> Self {
        Self {
            min_len,
            min_occur,
            decorators: Vec::new(),
        }
    }

    pub fn with(mut self, decorator: DecoratorConfig) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// Assemble the selector chain.
    pub fn build_selector(&self) -> Box<dyn Selector> {
        let basic: Box<dyn Selector> =
            Box::new(BasicSelector::new(self.min_len, self.min_occur));
        self.decorators
            .iter()
            .fold(basic, |inner, decorator| decorator.wrap(inner))
    }
}

/// One decorator layer of a selector chain.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum DecoratorConfig {
    StopWords { language: Language },
    Standardization,
    Normalization,
    TfIdf,
    Lsi { k: usize },
    ChiSquared { threshold: f64 },
}

impl DecoratorConfig {
    fn wrap(&self, inner: Box<dyn Selector>) -> Box<dyn Selector> {
        match self {
            DecoratorConfig::StopWords { language } => {
                Box::new(StopWordsDecorator::new(inner, *language))
            }
            DecoratorConfig::Standardization => Box::new(StandardizationDecorator::new(inner)),
            DecoratorConfig::Normalization => Box::new(NormalizationDecorator::new(inner)),
            DecoratorConfig::TfIdf => Box::new(TfIdfDecorator::new(inner)),
            DecoratorConfig::Lsi { k } => Box::new(LsiDecorator::new(inner, *k)),
            DecoratorConfig::ChiSquared { threshold } => {
                Box::new(ChiSquaredDecorator::new(inner, *threshold))
            }
        }
    }
}

impl FromStr for DecoratorConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stopwords" | "stop_words" => Ok(DecoratorConfig::StopWords {
                language: Language::English,
            }),
            "standardization" => Ok(DecoratorConfig::Standardization),
            "normalization" => Ok(DecoratorConfig::Normalization),
            "tfidf" => Ok(DecoratorConfig::TfIdf),
            "lsi" => Ok(DecoratorConfig::Lsi { k: 500 }),
            "chi2" | "chi_squared" => Ok(DecoratorConfig::ChiSquared { threshold: 10.86 }),
            _ => Err(format!("Unknown selector decorator: {}", s)),
        }
    }
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub enum ModelType {
    Baseline,
    NaiveBayes,
    Svm {
        kernel: Kernel,
        c: f64,
        eps: f64,
    },
    DecisionTree {
        max_depth: u32,
        min_leaf_size: usize,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::Svm {
            kernel: Kernel::default(),
            c: 1.0,
            eps: 1e-3,
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baseline" => Ok(ModelType::Baseline),
            "naive_bayes" | "nb" => Ok(ModelType::NaiveBayes),
            "svm" => Ok(ModelType::default()),
            "cart" | "decision_tree" => Ok(ModelType::DecisionTree {
                max_depth: 10,
                min_leaf_size: 1,
            }),
            _ => Err(format!(
                "Unknown model type: {}. Valid options are: baseline, naive_bayes, svm, decision_tree",
                s
            )),
        }
    }
}

/// Settings of a training job over a ticket history.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct TrainingConfig {
    /// Only the newest `ticket_limit` documents are used.
    pub ticket_limit: usize,
    /// Labels with fewer documents are dropped before training.
    pub min_class_occur: usize,
    pub train_fraction: f64,
    pub seed: u64,
    pub model: ModelConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            ticket_limit: 3000,
            min_class_occur: 30,
            train_fraction: 0.8,
            seed: 42,
            model: ModelConfig::new(
                SelectorConfig::default(),
                ModelType::Svm {
                    kernel: Kernel::default(),
                    c: 240.0,
                    eps: 1e-3,
                },
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selector_chain() {
        let selector = SelectorConfig::default().build_selector();
        assert_eq!(
            selector.to_string(),
            "TfIdf -> StopWords(english) -> Basic(min_len=2, min_occur=2)"
        );
    }

    #[test]
    fn test_decorators_applied_in_order() {
        let config = SelectorConfig::basic(3, 1)
            .with(DecoratorConfig::ChiSquared { threshold: 5.0 })
            .with(DecoratorConfig::Lsi { k: 10 });
        assert_eq!(
            config.build_selector().to_string(),
            "Lsi(k=10) -> ChiSquared(threshold=5) -> Basic(min_len=3, min_occur=1)"
        );
    }

    #[test]
    fn test_model_type_from_str() {
        assert!(matches!("NB".parse::<ModelType>(), Ok(ModelType::NaiveBayes)));
        assert!(matches!(
            "cart".parse::<ModelType>(),
            Ok(ModelType::DecisionTree { max_depth: 10, .. })
        ));
        assert!("xgboost".parse::<ModelType>().is_err());
    }

    #[test]
    fn test_decorator_from_str() {
        assert_eq!(
            "chi2".parse::<DecoratorConfig>().unwrap(),
            DecoratorConfig::ChiSquared { threshold: 10.86 }
        );
        assert!("pca".parse::<DecoratorConfig>().is_err());
    }

    #[test]
    fn test_training_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.ticket_limit, 3000);
        assert_eq!(config.min_class_occur, 30);
        match config.model.model {
            ModelType::Svm { c, .. } => assert_eq!(c, 240.0),
            other => panic!("expected Svm, got {:?}", other),
        }
    }
}
