//! Kernel functions for the kernel classifier.
use std::fmt;
use std::sync::Arc;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

pub type KernelFn = dyn Fn(ArrayView1<f64>, ArrayView1<f64>) -> f64 + Send + Sync;

/// A user-supplied kernel function with a display name.
#[derive(Clone)]
pub struct CustomKernel {
    name: String,
    function: Arc<KernelFn>,
}

impl CustomKernel {
    pub fn new<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(ArrayView1<f64>, ArrayView1<f64>) -> f64 + Send + Sync + 'static,
    {
        CustomKernel {
            name: name.into(),
            function: Arc::new(function),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compute(&self, x: ArrayView1<f64>, x0: ArrayView1<f64>) -> f64 {
        (self.function)(x, x0)
    }
}

impl fmt::Debug for CustomKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomKernel")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Kernel used by the SVM.
///
/// `Linear`, `Polynomial` and `Gaussian` are handed to the SVM solver
/// natively. `Custom` kernels are only usable in-process and cannot be
/// serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    /// `x . x0`
    Linear,
    /// `(gamma * x . x0 + coef0) ^ degree`
    Polynomial { gamma: f64, coef0: f64, degree: f64 },
    /// `exp(-gamma * |x - x0|^2)`; `None` resolves to `1 / n_features` at training time.
    Gaussian { gamma: Option<f64> },
    #[serde(skip)]
    Custom(CustomKernel),
}

impl Default for Kernel {
    fn default() -> Self {
        Kernel::Gaussian { gamma: None }
    }
}

impl Kernel {
    pub fn polynomial(coef0: f64, degree: f64) -> Self {
        Kernel::Polynomial {
            gamma: 1.0,
            coef0,
            degree,
        }
    }

    pub fn gaussian(gamma: f64) -> Self {
        Kernel::Gaussian { gamma: Some(gamma) }
    }

    pub fn custom<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(ArrayView1<f64>, ArrayView1<f64>) -> f64 + Send + Sync + 'static,
    {
        Kernel::Custom(CustomKernel::new(name, function))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Kernel::Linear => "LinearKernel",
            Kernel::Polynomial { .. } => "PolynomialKernel",
            Kernel::Gaussian { .. } => "GaussianKernel",
            Kernel::Custom(_) => "CustomKernel",
        }
    }

    /// Evaluate the kernel on a pair of vectors.
    ///
    /// The Gaussian kernel is evaluated inside the solver only and reports
    /// `NotImplemented` here.
    pub fn compute(&self, x: ArrayView1<f64>, x0: ArrayView1<f64>) -> Result<f64> {
        if x.len() != x0.len() {
            return Err(TriageError::InvalidInput(format!(
                "kernel inputs differ in length: {} vs {}",
                x.len(),
                x0.len()
            )));
        }
        match self {
            Kernel::Linear => Ok(x.dot(&x0)),
            Kernel::Polynomial {
                gamma,
                coef0,
                degree,
            } => Ok((gamma * x.dot(&x0) + coef0).powf(*degree)),
            Kernel::Gaussian { .. } => Err(TriageError::not_implemented(self.type_name(), "compute")),
            Kernel::Custom(kernel) => Ok(kernel.compute(x, x0)),
        }
    }

    /// Reject parameter values the solver cannot work with.
    pub fn validate(&self) -> Result<()> {
        match self {
            Kernel::Polynomial { gamma, degree, .. } if *gamma <= 0.0 || *degree <= 0.0 => {
                Err(TriageError::InvalidParameter(format!(
                    "polynomial kernel needs gamma > 0 and degree > 0, got gamma={} degree={}",
                    gamma, degree
                )))
            }
            Kernel::Gaussian { gamma: Some(gamma) } if *gamma <= 0.0 => Err(
                TriageError::InvalidParameter(format!("gaussian gamma must be > 0, got {}", gamma)),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kernel::Linear => write!(f, "LinearKernel()"),
            Kernel::Polynomial {
                gamma,
                coef0,
                degree,
            } => write!(f, "PolynomialKernel(gamma={}, r={}, d={})", gamma, coef0, degree),
            Kernel::Gaussian { gamma: Some(gamma) } => write!(f, "GaussianKernel(gamma={})", gamma),
            Kernel::Gaussian { gamma: None } => write!(f, "GaussianKernel(gamma=auto)"),
            Kernel::Custom(kernel) => write!(f, "CustomKernel({})", kernel.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear() {
        let x = array![1.0, 2.0, 3.0];
        let y = array![4.0, 5.0, 6.0];
        assert_eq!(Kernel::Linear.compute(x.view(), y.view()).unwrap(), 32.0);
    }

    #[test]
    fn test_polynomial() {
        let x = array![1.0, 2.0];
        let y = array![3.0, 1.0];
        // (5 + 1)^2
        let k = Kernel::polynomial(1.0, 2.0);
        assert_eq!(k.compute(x.view(), y.view()).unwrap(), 36.0);
    }

    #[test]
    fn test_gaussian_compute_not_implemented() {
        let x = array![1.0];
        match Kernel::default().compute(x.view(), x.view()) {
            Err(TriageError::NotImplemented { type_name, method }) => {
                assert_eq!(type_name, "GaussianKernel");
                assert_eq!(method, "compute");
            }
            other => panic!("expected NotImplemented, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_kernel() {
        let k = Kernel::custom("sum", |a, b| a.sum() + b.sum());
        let x = array![1.0, 2.0];
        assert_eq!(k.compute(x.view(), x.view()).unwrap(), 6.0);
        assert_eq!(k.to_string(), "CustomKernel(sum)");
    }

    #[test]
    fn test_length_mismatch() {
        let x = array![1.0, 2.0];
        let y = array![1.0];
        assert!(Kernel::Linear.compute(x.view(), y.view()).is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_gamma() {
        let k = Kernel::Polynomial {
            gamma: 0.0,
            coef0: 1.0,
            degree: 3.0,
        };
        assert!(matches!(k.validate(), Err(TriageError::InvalidParameter(_))));
        assert!(Kernel::gaussian(-1.0).validate().is_err());
        assert!(Kernel::default().validate().is_ok());
    }
}
