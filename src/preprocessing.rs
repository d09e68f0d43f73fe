//! Small preprocessing utilities shared by selectors.
//!
//! Provides word counting for raw text, a `Scaler` for mean/std
//! standardization and unit-length scaling of feature vectors. Degenerate
//! inputs (zero variance, all-zero vectors) are not guarded: the resulting
//! NaN / infinite values are passed on to the caller unchanged.
use std::collections::BTreeMap;
use std::sync::OnceLock;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use regex::Regex;
use serde::{Deserialize, Serialize};

static APOSTROPHES: OnceLock<Regex> = OnceLock::new();
static NON_ALPHABETIC: OnceLock<Regex> = OnceLock::new();

fn apostrophes() -> &'static Regex {
    APOSTROPHES.get_or_init(|| Regex::new("'+").expect("valid regex"))
}

fn non_alphabetic() -> &'static Regex {
    NON_ALPHABETIC.get_or_init(|| Regex::new("[^a-zA-Z]").expect("valid regex"))
}

/// Count lower-cased alphabetic words in `text`.
///
/// Apostrophes are removed (so "don't" counts as "dont"), every other
/// non-alphabetic character separates words. No stemming is applied.
/// The map iterates in ascending word order.
pub fn count_words(text: &str) -> BTreeMap<String, usize> {
    let without_apostrophes = apostrophes().replace_all(text, "");
    let letters_only = non_alphabetic().replace_all(&without_apostrophes, " ");

    let mut word_counts = BTreeMap::new();
    for word in letters_only.to_lowercase().split_whitespace() {
        *word_counts.entry(word.to_string()).or_insert(0) += 1;
    }
    word_counts
}

/// Per-column mean and sample standard deviation (n - 1 degrees of freedom).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl Scaler {
    /// `(x - mean) / std`, element-wise.
    pub fn transform(&self, x: ArrayView1<f64>) -> Array1<f64> {
        (&x - &self.mean) / &self.std
    }
}

/// Fit a `Scaler` from a matrix where rows are samples and columns features.
///
/// A single-row matrix yields a NaN standard deviation; constant columns
/// yield zero, so transforming divides by zero.
pub fn fit_scaler(x: &Array2<f64>) -> Scaler {
    let n = x.nrows() as f64;
    let mean = x.sum_axis(Axis(0)) / n;

    let mut var = Array1::<f64>::zeros(x.ncols());
    for row in x.axis_iter(Axis(0)) {
        let d = &row - &mean;
        var += &(&d * &d);
    }
    let std = (var / (n - 1.0)).mapv(f64::sqrt);

    Scaler { mean, std }
}

/// Euclidean norm of a vector.
pub fn l2_norm(x: ArrayView1<f64>) -> f64 {
    x.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Rescale `x` to unit Euclidean length. An all-zero vector becomes NaN.
pub fn normalize(x: ArrayView1<f64>) -> Array1<f64> {
    let norm = l2_norm(x);
    x.mapv(|v| v / norm)
}
