//! Univariate feature scoring following scikit-learn's `chi2`.
//!
//! See: https://scikit-learn.org/stable/modules/generated/sklearn.feature_selection.chi2.html

use ndarray::{Array1, Array2, Axis};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::{Result, TriageError};

/// Compute chi-squared statistics between each non-negative feature and the class.
///
/// Observed frequencies are the per-class column sums of `x`; expected
/// frequencies are the column totals spread by class prior. A column that is
/// zero everywhere has expected frequency zero and scores NaN.
///
/// # Parameters
///
/// * `x` - A 2D array of shape (n_samples, n_features), typically counts or frequencies.
/// * `y` - Class index of every sample, each below `n_classes`.
/// * `n_classes` - Number of distinct classes.
///
/// # Returns
///
/// A tuple containing:
/// - An array of shape (n_features,) with the chi-squared statistic of each feature.
/// - An array of shape (n_features,) with the p-value of each statistic
///   (NaN when fewer than two classes exist).
///
/// # Errors
///
/// `InvalidInput` when `x` holds a negative value or a label is out of range.
pub fn chi2(
    x: &Array2<f64>,
    y: &Array1<usize>,
    n_classes: usize,
) -> Result<(Array1<f64>, Array1<f64>)> {
    if x.iter().any(|&v| v < 0.0) {
        return Err(TriageError::InvalidInput(
            "chi-squared scoring requires non-negative features".to_string(),
        ));
    }
    if let Some(&label) = y.iter().find(|&&label| label >= n_classes) {
        return Err(TriageError::InvalidInput(format!(
            "class index {} out of range for {} classes",
            label, n_classes
        )));
    }

    let n_samples = x.nrows() as f64;
    let n_features = x.ncols();

    let mut observed = Array2::<f64>::zeros((n_classes, n_features));
    let mut class_counts = Array1::<f64>::zeros(n_classes);
    for (row, &label) in x.axis_iter(Axis(0)).zip(y.iter()) {
        let mut class_row = observed.row_mut(label);
        class_row += &row;
        class_counts[label] += 1.0;
    }

    let feature_count = x.sum_axis(Axis(0));
    let class_prob = class_counts / n_samples;

    let mut scores = Array1::<f64>::zeros(n_features);
    for (class, observed_row) in observed.axis_iter(Axis(0)).enumerate() {
        for j in 0..n_features {
            let expected = class_prob[class] * feature_count[j];
            scores[j] += (observed_row[j] - expected).powi(2) / expected;
        }
    }

    let mut p_values = Array1::from_elem(n_features, f64::NAN);
    if n_classes > 1 {
        let dist = ChiSquared::new((n_classes - 1) as f64)
            .map_err(|e| TriageError::InvalidParameter(e.to_string()))?;
        for (p, &score) in p_values.iter_mut().zip(scores.iter()) {
            *p = if score.is_nan() {
                f64::NAN
            } else if score.is_infinite() {
                0.0
            } else {
                1.0 - dist.cdf(score)
            };
        }
    }

    Ok((scores, p_values))
}

/// Indices of the features whose score falls below `threshold`, ascending.
///
/// NaN scores compare false and are therefore never removed.
pub fn below_threshold(scores: &Array1<f64>, threshold: f64) -> Vec<usize> {
    scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s < threshold)
        .map(|(i, _)| i)
        .collect()
}
