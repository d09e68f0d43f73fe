use std::fmt;

use linfa::dataset::Pr;
use linfa::traits::Predict;
use linfa::Dataset;
use linfa_svm::{Svm, SvmParams};
use log::{debug, info, trace};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::data_handling::Document;
use crate::error::{Result, TriageError};
use crate::feature_selection::{FittedSelector, Selector};
use crate::kernels::{CustomKernel, Kernel};
use crate::models::classifier_trait::Model;

/// Support vector machine over a configurable kernel.
///
/// Multi-class problems are decomposed one-vs-rest: one binary machine per
/// label, scored by its Platt-scaled probability. Custom kernels are trained
/// through an empirical kernel map (each sample represented by its kernel
/// values against the training set) fed to a linear machine.
///
/// Feature vectors with non-finite entries (for instance a document with no
/// known word under TF-IDF) are not handed to the solver; every machine
/// scores them NaN.
pub struct KernelModel {
    selector: Box<dyn Selector>,
    kernel: Kernel,
    c: f64,
    eps: f64,
    trained: Option<TrainedKernelModel>,
}

/// Fit state of a [`KernelModel`].
///
/// Serializable unless the kernel is custom, in which case serialization
/// fails because the kernel function cannot be stored.
#[derive(Clone, Serialize, Deserialize)]
pub struct TrainedKernelModel {
    fitted: FittedSelector,
    kernel: Kernel,
    c: f64,
    eps: f64,
    input: SolverInput,
    machines: Vec<ClassMachine>,
}

impl TrainedKernelModel {
    pub fn fitted(&self) -> &FittedSelector {
        &self.fitted
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }
}

/// How a feature vector is turned into solver records.
#[derive(Clone, Serialize, Deserialize)]
enum SolverInput {
    /// Features scaled by a constant (used to fold the polynomial gamma in).
    Scaled(f64),
    /// Kernel values against every training row.
    #[serde(skip)]
    KernelMap {
        kernel: CustomKernel,
        support: Array2<f64>,
    },
}

impl SolverInput {
    fn records(&self, x: &Array2<f64>) -> Array2<f64> {
        match self {
            SolverInput::Scaled(scale) => x * *scale,
            SolverInput::KernelMap { kernel, support } => {
                let mut records = Array2::<f64>::zeros((x.nrows(), support.nrows()));
                for (i, row) in x.axis_iter(Axis(0)).enumerate() {
                    for (j, s) in support.axis_iter(Axis(0)).enumerate() {
                        records[[i, j]] = kernel.compute(row, s);
                    }
                }
                records
            }
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
enum ClassMachine {
    Svm(Svm<f64, Pr>),
    /// A class that covers every training sample.
    Constant(f64),
}

impl KernelModel {
    pub fn new(selector: impl Selector + 'static, kernel: Kernel, c: f64) -> Self {
        KernelModel {
            selector: Box::new(selector),
            kernel,
            c,
            eps: 1e-3,
            trained: None,
        }
    }

    /// Solver stopping tolerance.
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Restore a model from a previously exported fit state.
    pub fn from_trained(selector: impl Selector + 'static, state: TrainedKernelModel) -> Self {
        KernelModel {
            selector: Box::new(selector),
            kernel: state.kernel.clone(),
            c: state.c,
            eps: state.eps,
            trained: Some(state),
        }
    }

    pub fn trained_state(&self) -> Result<&TrainedKernelModel> {
        self.trained
            .as_ref()
            .ok_or(TriageError::NotTrained { model: self.name() })
    }

    fn solver_params(&self, n_features: usize) -> Result<(SvmParams<f64, Pr>, SolverInput)> {
        if !(self.c > 0.0) {
            return Err(TriageError::InvalidParameter(format!(
                "SVM penalty C must be > 0, got {}",
                self.c
            )));
        }
        self.kernel.validate()?;

        let params: SvmParams<f64, Pr> = Svm::<f64, Pr>::params()
            .eps(self.eps)
            .pos_neg_weights(self.c, self.c);

        let configured = match &self.kernel {
            Kernel::Linear => (params.linear_kernel(), SolverInput::Scaled(1.0)),
            Kernel::Polynomial {
                gamma,
                coef0,
                degree,
            } => (
                params.polynomial_kernel(*coef0, *degree),
                SolverInput::Scaled(gamma.sqrt()),
            ),
            Kernel::Gaussian { gamma } => {
                let gamma = gamma.unwrap_or(1.0 / n_features.max(1) as f64);
                // the solver parameterizes the gaussian as exp(-|x - x0|^2 / eps)
                (params.gaussian_kernel(1.0 / gamma), SolverInput::Scaled(1.0))
            }
            Kernel::Custom(kernel) => (
                params.linear_kernel(),
                SolverInput::KernelMap {
                    kernel: kernel.clone(),
                    support: Array2::zeros((0, n_features)),
                },
            ),
        };
        Ok(configured)
    }
}

impl Model for KernelModel {
    fn name(&self) -> &'static str {
        "KernelModel"
    }

    fn train(&mut self, documents: &[Document]) -> Result<()> {
        let built = self.selector.build(documents)?;
        let n_classes = built.fitted.labels().len();

        let (params, input) = self.solver_params(built.x.ncols())?;
        let input = match input {
            SolverInput::KernelMap { kernel, .. } => SolverInput::KernelMap {
                kernel,
                support: built.x.clone(),
            },
            scaled => scaled,
        };
        let records = input.records(&built.x);

        let mut machines = Vec::with_capacity(n_classes);
        for class in 0..n_classes {
            let targets: Array1<bool> = built.y.mapv(|label| label == class);
            if targets.iter().all(|&t| t) {
                machines.push(ClassMachine::Constant(1.0));
                continue;
            }

            let dataset = Dataset::new(records.clone(), targets);
            let svm = <SvmParams<f64, Pr> as linfa::traits::Fit<_, _, _>>::fit(&params, &dataset)
                .map_err(|e| TriageError::Solver(e.to_string()))?;
            trace!(
                "{}: machine for {:?} keeps {} support vectors",
                self.name(),
                built.fitted.labels()[class],
                svm.nsupport()
            );
            machines.push(ClassMachine::Svm(svm));
        }

        info!(
            "{} ({}, C={}) trained {} machines on {} documents",
            self.name(),
            self.kernel,
            self.c,
            machines.len(),
            documents.len()
        );

        self.trained = Some(TrainedKernelModel {
            fitted: built.fitted,
            kernel: self.kernel.clone(),
            c: self.c,
            eps: self.eps,
            input,
            machines,
        });
        Ok(())
    }

    fn feature_selector(&self) -> Result<&FittedSelector> {
        Ok(&self.trained_state()?.fitted)
    }

    fn class_scores(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        let trained = self.trained_state()?;
        let records = trained.input.records(&x.to_owned().insert_axis(Axis(0)));
        // the solver cannot turn a NaN decision value into a probability
        let finite = records.iter().all(|v| v.is_finite());
        if !finite {
            debug!("{}: non-finite feature vector, scoring NaN", self.name());
        }

        let scores = trained
            .machines
            .iter()
            .map(|machine| match machine {
                ClassMachine::Constant(p) => *p,
                ClassMachine::Svm(_) if !finite => f64::NAN,
                ClassMachine::Svm(svm) => {
                    let probabilities: Array1<Pr> = svm.predict(&records);
                    probabilities.first().map(|p| **p as f64).unwrap_or(f64::NAN)
                }
            })
            .collect();
        Ok(scores)
    }
}

impl fmt::Display for KernelModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KernelModel({}, C={}, {})", self.kernel, self.c, self.selector)
    }
}
