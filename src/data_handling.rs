//! Documents and the helpers that prepare document sets for training.
//!
//! `Document` is the record handed over by the ingestion layer. The helpers
//! here drop rare classes and split a corpus into train/evaluation parts
//! before it reaches a selector.
use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// A free-text issue report: title, body and (for training data) its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub content: String,
    pub label: Option<String>,
}

impl Document {
    pub fn new(title: impl Into<String>, content: impl Into<String>, label: Option<String>) -> Self {
        Document {
            title: title.into(),
            content: content.into(),
            label,
        }
    }

    pub fn labeled(
        title: impl Into<String>,
        content: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self::new(title, content, Some(label.into()))
    }

    pub fn unlabeled(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(title, content, None)
    }

    /// Title and content joined the way selectors read them.
    pub fn text(&self) -> String {
        format!("{}\n{}", self.title, self.content)
    }
}

/// Keep only documents whose label occurs at least `min_class_occur` times.
///
/// Unlabeled documents are counted as their own (`None`) class. Order of the
/// surviving documents is preserved.
pub fn filter_by_class_occurrence(documents: Vec<Document>, min_class_occur: usize) -> Vec<Document> {
    let mut occurrences: HashMap<Option<String>, usize> = HashMap::new();
    for document in &documents {
        *occurrences.entry(document.label.clone()).or_insert(0) += 1;
    }

    let before = documents.len();
    let kept: Vec<Document> = documents
        .into_iter()
        .filter(|d| occurrences.get(&d.label).copied().unwrap_or(0) >= min_class_occur)
        .collect();

    log::debug!(
        "Class occurrence filter (min {}): kept {} of {} documents",
        min_class_occur,
        kept.len(),
        before
    );
    kept
}

/// Shuffle `documents` with a seeded RNG and split them into a training part
/// holding `ceil(n * train_fraction)` documents and an evaluation part with
/// the rest.
pub fn train_test_split(
    mut documents: Vec<Document>,
    train_fraction: f64,
    seed: u64,
) -> (Vec<Document>, Vec<Document>) {
    let mut rng = StdRng::seed_from_u64(seed);
    documents.shuffle(&mut rng);

    let n = documents.len();
    let split = ((n as f64 * train_fraction).ceil() as usize).min(n);
    let test = documents.split_off(split);
    (documents, test)
}
