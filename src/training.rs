//! End-to-end training job over a project's ticket history.
//!
//! The job trains the model that will serve predictions on every usable
//! document, and a second model of the same configuration on a seeded split
//! so the reported metrics come from documents that model never saw.
use std::fmt;

use anyhow::{ensure, Context, Result};
use log::{info, warn};

use crate::config::TrainingConfig;
use crate::data_handling::{filter_by_class_occurrence, train_test_split, Document};
use crate::evaluation::{accuracy, fscore, precision_and_recall};
use crate::models::factory::build_model;
use crate::models::Model;

/// Outcome of [`train_and_evaluate`].
pub struct TrainingReport {
    /// Model trained on every usable document.
    pub model: Box<dyn Model>,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub fscore: f64,
    pub n_train: usize,
    pub n_test: usize,
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: accuracy={:.4} precision={:.4} recall={:.4} fscore={:.4} (train={}, test={})",
            self.model, self.accuracy, self.precision, self.recall, self.fscore, self.n_train, self.n_test
        )
    }
}

impl fmt::Debug for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainingReport")
            .field("model", &format_args!("{}", self.model))
            .field("accuracy", &self.accuracy)
            .field("precision", &self.precision)
            .field("recall", &self.recall)
            .field("fscore", &self.fscore)
            .field("n_train", &self.n_train)
            .field("n_test", &self.n_test)
            .finish()
    }
}

/// Train a production model on `documents` and measure a held-out copy of it.
///
/// `documents` are expected oldest first; only the newest
/// `config.ticket_limit` are kept.
pub fn train_and_evaluate(documents: Vec<Document>, config: &TrainingConfig) -> Result<TrainingReport> {
    ensure!(
        config.train_fraction > 0.0 && config.train_fraction < 1.0,
        "train_fraction must lie strictly between 0 and 1, got {}",
        config.train_fraction
    );

    let skip = documents.len().saturating_sub(config.ticket_limit);
    let recent: Vec<Document> = documents.into_iter().skip(skip).collect();

    let n_recent = recent.len();
    let labeled: Vec<Document> = recent.into_iter().filter(|d| d.label.is_some()).collect();
    if labeled.len() < n_recent {
        warn!("Ignoring {} unlabeled documents", n_recent - labeled.len());
    }

    let data = filter_by_class_occurrence(labeled, config.min_class_occur);
    ensure!(
        !data.is_empty(),
        "no class has at least {} documents among the newest {}",
        config.min_class_occur,
        config.ticket_limit
    );
    info!("Training on {} documents", data.len());

    let (train, test) = train_test_split(data.clone(), config.train_fraction, config.seed);
    ensure!(
        !test.is_empty(),
        "held-out split is empty: {} documents at train_fraction {}",
        train.len(),
        config.train_fraction
    );

    let mut model = build_model(&config.model);
    model
        .train(&data)
        .with_context(|| format!("Failed to train {}", model))?;

    let mut model_test = build_model(&config.model);
    model_test
        .train(&train)
        .with_context(|| format!("Failed to train evaluation model {}", model_test))?;

    let accuracy = accuracy(model_test.as_ref(), &test, 1).context("Failed to compute accuracy")?;
    let (precision, recall) = precision_and_recall(model_test.as_ref(), &test)
        .context("Failed to compute precision and recall")?;

    let report = TrainingReport {
        model,
        accuracy,
        precision,
        recall,
        fscore: fscore(precision, recall),
        n_train: train.len(),
        n_test: test.len(),
    };
    info!("{}", report);
    Ok(report)
}
