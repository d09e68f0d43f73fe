use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};

use crate::data_handling::Document;
use crate::error::{Result, TriageError};
use crate::feature_selection::{BasicSelector, FittedSelector, Selector};
use crate::models::classifier_trait::Model;

/// Predicts the most frequent training labels regardless of the document.
pub struct BaselineModel {
    selector: Box<dyn Selector>,
    trained: Option<TrainedBaseline>,
}

/// Fit state of a [`BaselineModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedBaseline {
    pub fitted: FittedSelector,
    /// Labels with their training frequency, most frequent first.
    pub ranking: Vec<(String, usize)>,
}

impl BaselineModel {
    pub fn new(selector: impl Selector + 'static) -> Self {
        BaselineModel {
            selector: Box::new(selector),
            trained: None,
        }
    }

    /// Restore a model from a previously exported fit state.
    pub fn from_trained(selector: impl Selector + 'static, state: TrainedBaseline) -> Self {
        BaselineModel {
            selector: Box::new(selector),
            trained: Some(state),
        }
    }

    pub fn trained_state(&self) -> Result<&TrainedBaseline> {
        self.trained
            .as_ref()
            .ok_or(TriageError::NotTrained { model: self.name() })
    }
}

impl Default for BaselineModel {
    fn default() -> Self {
        BaselineModel::new(BasicSelector::default())
    }
}

impl Model for BaselineModel {
    fn name(&self) -> &'static str {
        "BaselineModel"
    }

    fn train(&mut self, documents: &[Document]) -> Result<()> {
        let built = self.selector.build(documents)?;

        let mut counts = vec![0usize; built.fitted.labels().len()];
        for &label in built.y.iter() {
            counts[label] += 1;
        }

        let mut ranking: Vec<(String, usize)> = built
            .fitted
            .labels()
            .iter()
            .cloned()
            .zip(counts)
            .collect();
        // labels are already ascending, so a stable sort keeps ties in label order
        ranking.sort_by(|a, b| b.1.cmp(&a.1));

        info!(
            "{} trained on {} documents, top label {:?}",
            self.name(),
            documents.len(),
            ranking.first().map(|(label, _)| label)
        );

        self.trained = Some(TrainedBaseline {
            fitted: built.fitted,
            ranking,
        });
        Ok(())
    }

    fn feature_selector(&self) -> Result<&FittedSelector> {
        Ok(&self.trained_state()?.fitted)
    }

    fn predict(&self, _document: &Document, n: usize) -> Result<Vec<String>> {
        Ok(self
            .trained_state()?
            .ranking
            .iter()
            .take(n)
            .map(|(label, _)| label.clone())
            .collect())
    }
}

impl fmt::Display for BaselineModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BaselineModel({})", self.selector)
    }
}
