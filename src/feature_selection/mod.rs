//! Feature selection: turning documents into feature vectors.
//!
//! A [`Selector`] is an unfitted configuration. Calling [`Selector::build`]
//! on labeled documents fits it and returns a [`Built`] value: the feature
//! matrix, the label vector and a [`FittedSelector`] holding everything
//! needed to transform new documents the same way.
//!
//! Selectors compose: [`BasicSelector`] produces bag-of-words counts and
//! every decorator in [`decorators`] wraps another selector, builds it first
//! and then appends its own fitted [`Stage`]. The fitted selector replays the
//! stages in order, so `get_x` on a training document reproduces its row of
//! the built matrix exactly.
use std::fmt;

use log::warn;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::data_handling::Document;
use crate::error::{Result, TriageError};
use crate::preprocessing::{count_words, normalize, Scaler};

pub mod basic;
pub mod decorators;
pub mod univariate_selection;

pub use basic::BasicSelector;
pub use decorators::{
    ChiSquared, ChiSquaredDecorator, Layer, Lsi, LsiDecorator, Normalization,
    NormalizationDecorator, SelectorDecorator, Standardization, StandardizationDecorator,
    StopWords, StopWordsDecorator, TfIdf, TfIdfDecorator,
};

/// An unfitted feature selector.
pub trait Selector: fmt::Display + Send + Sync {
    /// Fit on labeled documents and return the feature matrix `x` (one row
    /// per document), label indices `y` and the frozen fit state.
    ///
    /// Fails on an empty document set or a document without a label.
    fn build(&self, documents: &[Document]) -> Result<Built>;
}

impl Selector for Box<dyn Selector> {
    fn build(&self, documents: &[Document]) -> Result<Built> {
        (**self).build(documents)
    }
}

/// Output of [`Selector::build`].
#[derive(Debug, Clone)]
pub struct Built {
    pub fitted: FittedSelector,
    pub x: Array2<f64>,
    pub y: Array1<usize>,
}

impl Built {
    /// Append a fitted stage: every row of `x` is passed through it and the
    /// feature names are replaced by `features`.
    pub fn push_stage(self, stage: Stage, features: Vec<String>) -> Result<Built> {
        let Built { mut fitted, x, y } = self;

        let n_rows = x.nrows();
        let mut data = Vec::with_capacity(n_rows * features.len());
        for row in x.rows() {
            data.extend(stage.apply(row).iter().copied());
        }
        let x = Array2::from_shape_vec((n_rows, features.len()), data)?;

        let non_finite = x.iter().filter(|v| !v.is_finite()).count();
        if non_finite > 0 {
            warn!(
                "{} produced {} non-finite values in the fit matrix",
                stage.name(),
                non_finite
            );
        }

        fitted.features = features;
        fitted.stages.push(stage);
        Ok(Built { fitted, x, y })
    }

    pub fn n_documents(&self) -> usize {
        self.x.nrows()
    }
}

/// Fit parameters of one decorator layer, applied to a single feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    /// Drop the listed column positions (ascending).
    DropColumns { removed: Vec<usize> },
    Standardize(Scaler),
    Normalize,
    /// Augmented term frequency times inverse document frequency.
    TfIdf { idf: Array1<f64> },
    /// Project onto the rows of `components` (k x features).
    Project { components: Array2<f64> },
}

impl Stage {
    pub fn apply(&self, x: ArrayView1<f64>) -> Array1<f64> {
        match self {
            Stage::DropColumns { removed } => x
                .iter()
                .enumerate()
                .filter(|(i, _)| removed.binary_search(i).is_err())
                .map(|(_, &v)| v)
                .collect(),
            Stage::Standardize(scaler) => scaler.transform(x),
            Stage::Normalize => normalize(x),
            Stage::TfIdf { idf } => {
                let max_count = x.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
                x.mapv(|v| (0.5 * v / max_count) + 0.5) * idf
            }
            Stage::Project { components } => components.dot(&x),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::DropColumns { .. } => "DropColumns",
            Stage::Standardize(_) => "Standardize",
            Stage::Normalize => "Normalize",
            Stage::TfIdf { .. } => "TfIdf",
            Stage::Project { .. } => "Project",
        }
    }
}

/// Frozen state of a built selector chain.
///
/// `features` and `labels` describe the final output of the chain; the
/// vocabulary is the bag-of-words dictionary of the innermost selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedSelector {
    vocabulary: Vec<String>,
    features: Vec<String>,
    labels: Vec<String>,
    stages: Vec<Stage>,
}

impl FittedSelector {
    /// `vocabulary` and `labels` must both be sorted ascending.
    pub fn new(vocabulary: Vec<String>, labels: Vec<String>) -> Self {
        FittedSelector {
            features: vocabulary.clone(),
            vocabulary,
            labels,
            stages: Vec::new(),
        }
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Raw word counts of `document` projected on the vocabulary; words
    /// outside it are ignored.
    pub fn count_vector(&self, document: &Document) -> Array1<f64> {
        let mut x = Array1::zeros(self.vocabulary.len());
        for (word, count) in count_words(&document.text()) {
            if let Ok(i) = self.vocabulary.binary_search(&word) {
                x[i] = count as f64;
            }
        }
        x
    }

    /// Feature vector of `document` after every fitted stage.
    pub fn get_x(&self, document: &Document) -> Array1<f64> {
        self.stages
            .iter()
            .fold(self.count_vector(document), |x, stage| stage.apply(x.view()))
    }

    pub fn get_label(&self, y: usize) -> Result<&str> {
        self.labels
            .get(y)
            .map(String::as_str)
            .ok_or(TriageError::LabelOutOfRange {
                index: y,
                len: self.labels.len(),
            })
    }

    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.labels.binary_search_by(|l| l.as_str().cmp(label)).ok()
    }
}
