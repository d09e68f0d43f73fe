//! Evaluation metrics for trained models.
//!
//! `accuracy` is a top-`n` hit rate. `precision_and_recall` are macro
//! averages over every label the model knows plus every label seen only in
//! the evaluation set, using each document's single best prediction.
use std::collections::HashMap;

use log::debug;

use crate::data_handling::Document;
use crate::error::{Result, TriageError};
use crate::models::Model;

/// Fraction of `documents` whose label is among the top `n` predictions.
///
/// # Errors
///
/// `EmptyEvaluationSet` when `documents` is empty; prediction errors are
/// passed through.
pub fn accuracy(model: &dyn Model, documents: &[Document], n: usize) -> Result<f64> {
    if documents.is_empty() {
        return Err(TriageError::EmptyEvaluationSet);
    }

    let mut hits = 0usize;
    for document in documents {
        let predicted = model.predict(document, n)?;
        if let Some(label) = &document.label {
            if predicted.contains(label) {
                hits += 1;
            }
        }
    }
    Ok(hits as f64 / documents.len() as f64)
}

/// Macro-averaged precision and recall of the top-1 prediction.
///
/// Per label, true positives, false positives and false negatives are
/// counted. A label with no true positive has its false positive and false
/// negative counts forced to one, so it scores zero for both metrics instead
/// of dividing by zero. Labels present only in `documents` therefore lower
/// both averages.
pub fn precision_and_recall(model: &dyn Model, documents: &[Document]) -> Result<(f64, f64)> {
    let mut labels: Vec<String> = model.feature_selector()?.labels().to_vec();
    let mut index: HashMap<String, usize> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.clone(), i))
        .collect();

    let mut truths = Vec::with_capacity(documents.len());
    for (i, document) in documents.iter().enumerate() {
        let label = document
            .label
            .as_ref()
            .ok_or(TriageError::UnlabeledDocument { index: i })?;
        let truth = *index.entry(label.clone()).or_insert_with(|| {
            labels.push(label.clone());
            labels.len() - 1
        });
        truths.push(truth);
    }

    let n_labels = labels.len();
    let mut tp = vec![0usize; n_labels];
    let mut fp = vec![0usize; n_labels];
    let mut fn_ = vec![0usize; n_labels];

    for (document, &truth) in documents.iter().zip(truths.iter()) {
        let predicted = model
            .predict(document, 1)?
            .into_iter()
            .next()
            .and_then(|label| index.get(&label).copied());
        match predicted {
            Some(p) if p == truth => tp[truth] += 1,
            Some(p) => {
                fp[p] += 1;
                fn_[truth] += 1;
            }
            None => fn_[truth] += 1,
        }
    }

    let mut precision = 0.0;
    let mut recall = 0.0;
    for i in 0..n_labels {
        if tp[i] == 0 {
            fp[i] = 1;
            fn_[i] = 1;
        }
        precision += tp[i] as f64 / (tp[i] + fp[i]) as f64;
        recall += tp[i] as f64 / (tp[i] + fn_[i]) as f64;
    }

    debug!(
        "Evaluated {} documents over {} labels ({} unseen by the model)",
        documents.len(),
        n_labels,
        n_labels - model.feature_selector()?.labels().len()
    );

    Ok((precision / n_labels as f64, recall / n_labels as f64))
}

/// Harmonic mean of precision and recall; zero when both are zero.
pub fn fscore(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        return 0.0;
    }
    2.0 * precision * recall / (precision + recall)
}
