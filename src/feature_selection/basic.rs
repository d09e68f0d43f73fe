use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::info;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::data_handling::Document;
use crate::error::{Result, TriageError};
use crate::feature_selection::{Built, FittedSelector, Selector};
use crate::preprocessing::count_words;

/// Bag-of-words selector: one feature per sufficiently long and frequent word.
///
/// A word becomes a feature when it occurs at least `min_occur` times over
/// the whole corpus and has at least `min_len` characters. Features and
/// labels are both kept in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicSelector {
    pub min_len: usize,
    pub min_occur: usize,
}

impl Default for BasicSelector {
    fn default() -> Self {
        BasicSelector {
            min_len: 2,
            min_occur: 2,
        }
    }
}

impl BasicSelector {
    pub fn new(min_len: usize, min_occur: usize) -> Self {
        BasicSelector { min_len, min_occur }
    }
}

impl Selector for BasicSelector {
    fn build(&self, documents: &[Document]) -> Result<Built> {
        if documents.is_empty() {
            return Err(TriageError::EmptyDocuments);
        }

        let mut labels = BTreeSet::new();
        let mut corpus_counts: BTreeMap<String, usize> = BTreeMap::new();
        for (index, document) in documents.iter().enumerate() {
            let label = document
                .label
                .as_deref()
                .ok_or(TriageError::UnlabeledDocument { index })?;
            labels.insert(label.to_string());

            for (word, count) in count_words(&document.text()) {
                *corpus_counts.entry(word).or_insert(0) += count;
            }
        }

        let vocabulary: Vec<String> = corpus_counts
            .into_iter()
            .filter(|(word, count)| *count >= self.min_occur && word.len() >= self.min_len)
            .map(|(word, _)| word)
            .collect();
        let fitted = FittedSelector::new(vocabulary, labels.into_iter().collect());

        let mut x = Array2::<f64>::zeros((documents.len(), fitted.n_features()));
        let mut y = Array1::<usize>::zeros(documents.len());
        for (i, document) in documents.iter().enumerate() {
            x.row_mut(i).assign(&fitted.count_vector(document));
            // every label was collected above
            if let Some(label) = document.label.as_deref().and_then(|l| fitted.label_index(l)) {
                y[i] = label;
            }
        }

        info!(
            "{} built {} features and {} labels from {} documents",
            self,
            fitted.n_features(),
            fitted.labels().len(),
            documents.len()
        );

        Ok(Built { fitted, x, y })
    }
}

impl fmt::Display for BasicSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Basic(min_len={}, min_occur={})", self.min_len, self.min_occur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn documents() -> Vec<Document> {
        vec![
            Document::labeled("Login broken", "login page fails", "alice"),
            Document::labeled("Printer jam", "the printer is jammed", "bob"),
            Document::labeled("Login again", "cannot login", "alice"),
        ]
    }

    #[test]
    fn test_features_are_sorted_and_filtered() {
        let built = BasicSelector::default().build(&documents()).unwrap();
        // "login" x4 and "printer" x2 pass min_occur=2; everything else occurs once
        assert_eq!(
            built.fitted.features(),
            &["login".to_string(), "printer".to_string()]
        );
        assert_eq!(built.fitted.labels(), &["alice".to_string(), "bob".to_string()]);
        assert_eq!(built.x.dim(), (3, 2));
        assert_eq!(built.x.row(0).to_vec(), vec![2.0, 0.0]);
        assert_eq!(built.y.to_vec(), vec![0, 1, 0]);
    }

    #[test]
    fn test_min_len_drops_short_words() {
        let docs = vec![
            Document::labeled("a a a", "ok ok", "x"),
            Document::labeled("a", "ok", "y"),
        ];
        let built = BasicSelector::new(2, 1).build(&docs).unwrap();
        assert_eq!(built.fitted.features(), &["ok".to_string()]);
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(
            BasicSelector::default().build(&[]),
            Err(TriageError::EmptyDocuments)
        ));
    }

    #[test]
    fn test_unlabeled_document_fails() {
        let mut docs = documents();
        docs.push(Document::unlabeled("Login", "login"));
        match BasicSelector::default().build(&docs) {
            Err(TriageError::UnlabeledDocument { index }) => assert_eq!(index, 3),
            other => panic!("expected UnlabeledDocument, got {:?}", other.map(|b| b.x)),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            BasicSelector::new(3, 5).to_string(),
            "Basic(min_len=3, min_occur=5)"
        );
    }
}
