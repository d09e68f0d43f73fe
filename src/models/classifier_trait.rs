use std::fmt;

use ndarray::{Array1, ArrayView1};

use crate::data_handling::Document;
use crate::error::{Result, TriageError};
use crate::feature_selection::FittedSelector;

/// Contract shared by every triage classifier.
///
/// A model owns an unfitted selector; `train` builds it on the training
/// documents and fits the model on the resulting matrix. After training,
/// `predict` returns up to `n` labels, most likely first.
pub trait Model: fmt::Display + Send {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Fit the model. Retraining replaces all previous state.
    fn train(&mut self, documents: &[Document]) -> Result<()>;

    /// The selector fitted by the last `train` call.
    fn feature_selector(&self) -> Result<&FittedSelector>;

    /// One score per label (in `feature_selector().labels()` order); larger
    /// means more likely.
    fn class_scores(&self, _x: ArrayView1<f64>) -> Result<Array1<f64>> {
        Err(TriageError::not_implemented(self.name(), "class_scores"))
    }

    /// Up to `n` labels ordered by descending score. Ties keep label order.
    fn predict(&self, document: &Document, n: usize) -> Result<Vec<String>> {
        let selector = self.feature_selector()?;
        let x = selector.get_x(document);
        let scores = self.class_scores(x.view())?;
        Ok(rank_labels(selector.labels(), &scores, n))
    }
}

/// The `n` labels with the highest scores; NaN scores rank last.
pub fn rank_labels(labels: &[String], scores: &Array1<f64>, n: usize) -> Vec<String> {
    let key = |v: f64| if v.is_nan() { f64::NEG_INFINITY } else { v };

    let mut order: Vec<usize> = (0..scores.len().min(labels.len())).collect();
    order.sort_by(|&a, &b| key(scores[b]).total_cmp(&key(scores[a])));
    order
        .into_iter()
        .take(n)
        .map(|i| labels[i].clone())
        .collect()
}
