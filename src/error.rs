use thiserror::Error;

/// Errors raised by selectors, models and the evaluation helpers.
#[derive(Error, Debug)]
pub enum TriageError {
    /// `build`/`train` received no documents, so no features or labels exist.
    #[error("cannot build features from an empty document set")]
    EmptyDocuments,

    #[error("document {index} has no label")]
    UnlabeledDocument { index: usize },

    #[error("label index {index} out of range for {len} labels")]
    LabelOutOfRange { index: usize, len: usize },

    /// `predict` (or anything needing trained state) called before `train`.
    #[error("{model} must be trained before it can predict")]
    NotTrained { model: &'static str },

    #[error("method {type_name}#{method} not implemented")]
    NotImplemented {
        type_name: &'static str,
        method: &'static str,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Metrics over zero documents have no defined value.
    #[error("cannot evaluate a model on an empty document set")]
    EmptyEvaluationSet,

    /// Failure reported by an underlying solver (SVM, SVD, tree).
    #[error("solver error: {0}")]
    Solver(String),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl TriageError {
    pub fn not_implemented(type_name: &'static str, method: &'static str) -> Self {
        TriageError::NotImplemented { type_name, method }
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;
