use std::cmp::Ordering;

use log::debug;
use nalgebra::DMatrix;
use ndarray::{Array2, Axis};

use crate::error::{Result, TriageError};

const SVD_MAX_ITERATIONS: usize = 10_000;

/// Top-`k` right singular vectors of `x` as a (k x n_features) matrix.
///
/// Rows are ordered by descending singular value. Each row's sign is fixed so
/// that its largest-magnitude entry is positive, which keeps projections
/// stable across otherwise equivalent decompositions.
pub fn truncated_svd(x: &Array2<f64>, k: usize) -> Result<Array2<f64>> {
    let (n_rows, n_cols) = x.dim();
    let max_rank = n_rows.min(n_cols);
    if k == 0 || k > max_rank {
        return Err(TriageError::InvalidParameter(format!(
            "cannot keep {} components of a {}x{} matrix (at most {})",
            k, n_rows, n_cols, max_rank
        )));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(TriageError::InvalidInput(
            "singular value decomposition of a matrix with non-finite entries".to_string(),
        ));
    }

    let matrix = DMatrix::from_fn(n_rows, n_cols, |i, j| x[[i, j]]);
    let svd = matrix
        .try_svd(false, true, 5.0 * f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or_else(|| TriageError::Solver("SVD did not converge".to_string()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| TriageError::Solver("SVD returned no right singular vectors".to_string()))?;

    let singular_values = &svd.singular_values;
    let mut order: Vec<usize> = (0..singular_values.len()).collect();
    order.sort_by(|&a, &b| {
        singular_values[b]
            .partial_cmp(&singular_values[a])
            .unwrap_or(Ordering::Equal)
    });

    let mut components = Array2::<f64>::zeros((k, n_cols));
    for (row, &source) in order.iter().take(k).enumerate() {
        for j in 0..n_cols {
            components[[row, j]] = v_t[(source, j)];
        }
    }

    for mut component in components.axis_iter_mut(Axis(0)) {
        let pivot = component
            .iter()
            .copied()
            .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
        if pivot < 0.0 {
            component.mapv_inplace(|v| -v);
        }
    }

    debug!(
        "Kept {} of {} singular vectors, leading value {:.4}",
        k,
        singular_values.len(),
        order.first().map(|&i| singular_values[i]).unwrap_or(0.0)
    );
    Ok(components)
}
