use std::fmt;

use log::info;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::data_handling::Document;
use crate::error::{Result, TriageError};
use crate::feature_selection::{FittedSelector, Selector};
use crate::models::classifier_trait::Model;

/// Multinomial naive Bayes with maximum-likelihood estimates.
///
/// No smoothing is applied: a feature never seen with a class has zero
/// likelihood, so any document containing it scores `-inf` for that class.
/// Scores are unnormalized log posteriors.
pub struct NaiveBayesModel {
    selector: Box<dyn Selector>,
    trained: Option<TrainedNaiveBayes>,
}

/// Fit state of a [`NaiveBayesModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedNaiveBayes {
    pub fitted: FittedSelector,
    pub log_prior: Array1<f64>,
    /// (n_classes x n_features) log P(feature | class).
    pub log_likelihood: Array2<f64>,
}

impl NaiveBayesModel {
    pub fn new(selector: impl Selector + 'static) -> Self {
        NaiveBayesModel {
            selector: Box::new(selector),
            trained: None,
        }
    }

    /// Restore a model from a previously exported fit state.
    pub fn from_trained(selector: impl Selector + 'static, state: TrainedNaiveBayes) -> Self {
        NaiveBayesModel {
            selector: Box::new(selector),
            trained: Some(state),
        }
    }

    pub fn trained_state(&self) -> Result<&TrainedNaiveBayes> {
        self.trained
            .as_ref()
            .ok_or(TriageError::NotTrained { model: self.name() })
    }
}

impl Model for NaiveBayesModel {
    fn name(&self) -> &'static str {
        "NaiveBayesModel"
    }

    fn train(&mut self, documents: &[Document]) -> Result<()> {
        let built = self.selector.build(documents)?;
        let n_classes = built.fitted.labels().len();
        let n_samples = built.n_documents() as f64;

        let mut class_counts = Array1::<f64>::zeros(n_classes);
        let mut feature_mass = Array2::<f64>::zeros((n_classes, built.x.ncols()));
        for (row, &label) in built.x.axis_iter(Axis(0)).zip(built.y.iter()) {
            class_counts[label] += 1.0;
            let mut mass = feature_mass.row_mut(label);
            mass += &row;
        }

        let log_prior = (class_counts / n_samples).mapv(f64::ln);
        let class_mass = feature_mass.sum_axis(Axis(1)).insert_axis(Axis(1));
        let log_likelihood = (feature_mass / &class_mass).mapv(f64::ln);

        info!(
            "{} trained on {} documents ({} classes, {} features)",
            self.name(),
            documents.len(),
            n_classes,
            built.x.ncols()
        );

        self.trained = Some(TrainedNaiveBayes {
            fitted: built.fitted,
            log_prior,
            log_likelihood,
        });
        Ok(())
    }

    fn feature_selector(&self) -> Result<&FittedSelector> {
        Ok(&self.trained_state()?.fitted)
    }

    fn class_scores(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        let trained = self.trained_state()?;
        let mut scores = trained.log_prior.clone();
        for (score, log_likelihood) in scores
            .iter_mut()
            .zip(trained.log_likelihood.axis_iter(Axis(0)))
        {
            for (&count, &log_p) in x.iter().zip(log_likelihood.iter()) {
                if count != 0.0 {
                    *score += count * log_p;
                }
            }
        }
        Ok(scores)
    }
}

impl fmt::Display for NaiveBayesModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NaiveBayesModel({})", self.selector)
    }
}
