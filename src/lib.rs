//! triage-classifiers: routing free-text issue reports to a label.
//!
//! Documents are turned into feature vectors by a composable selector chain
//! (bag-of-words counts, stop-word removal, TF-IDF, LSI, chi-squared pruning,
//! standardization, normalization) and scored by interchangeable models
//! (frequency baseline, naive Bayes, kernel SVM, decision tree). The
//! `evaluation` module measures a trained model on held-out documents and
//! `training` wires everything into a single train-and-evaluate job. Ticket
//! exports can be loaded with the readers in `io`.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod evaluation;
pub mod feature_selection;
pub mod io;
pub mod kernels;
pub mod math;
pub mod models;
pub mod preprocessing;
pub mod stopwords;
pub mod training;

pub use data_handling::Document;
pub use error::{Result, TriageError};
