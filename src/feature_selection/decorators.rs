//! Selector decorators.
//!
//! A decorator owns an inner [`Selector`] and a [`Layer`]. Building the
//! decorator builds the inner selector, fits the layer on its output and
//! appends the resulting [`Stage`]; the fitted selector therefore applies the
//! innermost transformation first and this decorator's last.
use std::fmt;

use log::debug;
use ndarray::Axis;

use crate::data_handling::Document;
use crate::error::{Result, TriageError};
use crate::feature_selection::univariate_selection::{below_threshold, chi2};
use crate::feature_selection::{Built, Selector, Stage};
use crate::math::truncated_svd;
use crate::preprocessing::fit_scaler;
use crate::stopwords::Language;

/// A transformation fitted on the output of an inner selector.
pub trait Layer: fmt::Display + Send + Sync {
    /// Fit on `built` and return the stage to append together with the
    /// feature names it produces.
    fn fit(&self, built: &Built) -> Result<(Stage, Vec<String>)>;
}

/// Wraps an inner selector and appends one fitted layer to it.
pub struct SelectorDecorator<L> {
    selector: Box<dyn Selector>,
    layer: L,
}

impl<L: Layer> SelectorDecorator<L> {
    pub fn wrap(selector: impl Selector + 'static, layer: L) -> Self {
        SelectorDecorator {
            selector: Box::new(selector),
            layer,
        }
    }

    pub fn inner(&self) -> &dyn Selector {
        self.selector.as_ref()
    }

    pub fn layer(&self) -> &L {
        &self.layer
    }
}

impl<L: Layer> Selector for SelectorDecorator<L> {
    fn build(&self, documents: &[Document]) -> Result<Built> {
        let built = self.selector.build(documents)?;
        let before = built.fitted.n_features();
        let (stage, features) = self.layer.fit(&built)?;
        let built = built.push_stage(stage, features)?;
        debug!(
            "{}: {} -> {} features",
            self.layer,
            before,
            built.fitted.n_features()
        );
        Ok(built)
    }
}

impl<L: Layer> fmt::Display for SelectorDecorator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.layer, self.selector)
    }
}

/// Keep the names of all columns not listed in `removed` (ascending).
fn retained_features(built: &Built, removed: &[usize]) -> Vec<String> {
    built
        .fitted
        .features()
        .iter()
        .enumerate()
        .filter(|(i, _)| removed.binary_search(i).is_err())
        .map(|(_, name)| name.clone())
        .collect()
}

/// Removes features that are stop words of `language`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopWords {
    pub language: Language,
}

impl Layer for StopWords {
    fn fit(&self, built: &Built) -> Result<(Stage, Vec<String>)> {
        let stop_words = self.language.stop_words();
        let removed: Vec<usize> = built
            .fitted
            .features()
            .iter()
            .enumerate()
            .filter(|(_, word)| stop_words.contains(word.as_str()))
            .map(|(i, _)| i)
            .collect();
        let features = retained_features(built, &removed);
        Ok((Stage::DropColumns { removed }, features))
    }
}

impl fmt::Display for StopWords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopWords({})", self.language)
    }
}

/// Per-feature `(x - mean) / std` with the sample standard deviation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Standardization;

impl Layer for Standardization {
    fn fit(&self, built: &Built) -> Result<(Stage, Vec<String>)> {
        let scaler = fit_scaler(&built.x);
        Ok((Stage::Standardize(scaler), built.fitted.features().to_vec()))
    }
}

impl fmt::Display for Standardization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Standardization")
    }
}

/// Scales every feature vector to unit Euclidean length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalization;

impl Layer for Normalization {
    fn fit(&self, built: &Built) -> Result<(Stage, Vec<String>)> {
        Ok((Stage::Normalize, built.fitted.features().to_vec()))
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Normalization")
    }
}

/// TF-IDF weighting with augmented term frequency.
///
/// `idf = ln(n_documents / document_frequency)`, where a document contains a
/// feature when its value is positive. A feature no fit document contains
/// gets an infinite idf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TfIdf;

impl Layer for TfIdf {
    fn fit(&self, built: &Built) -> Result<(Stage, Vec<String>)> {
        let n_documents = built.n_documents() as f64;
        let idf = built
            .x
            .map_axis(Axis(0), |column| {
                column.iter().filter(|&&v| v > 0.0).count() as f64
            })
            .mapv(|df| (n_documents / df).ln());
        Ok((Stage::TfIdf { idf }, built.fitted.features().to_vec()))
    }
}

impl fmt::Display for TfIdf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TfIdf")
    }
}

/// Latent semantic indexing: projection on the top `k` right singular vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lsi {
    pub k: usize,
}

impl Default for Lsi {
    fn default() -> Self {
        Lsi { k: 500 }
    }
}

impl Layer for Lsi {
    fn fit(&self, built: &Built) -> Result<(Stage, Vec<String>)> {
        let components = truncated_svd(&built.x, self.k)?;
        let features = (0..self.k).map(|i| format!("lsi_{}", i)).collect();
        Ok((Stage::Project { components }, features))
    }
}

impl fmt::Display for Lsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lsi(k={})", self.k)
    }
}

/// Drops features whose chi-squared statistic against the label is below
/// `threshold`. Requires non-negative features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquared {
    pub threshold: f64,
}

impl Default for ChiSquared {
    fn default() -> Self {
        // chi-squared critical value for p = 0.001 at one degree of freedom
        ChiSquared { threshold: 10.86 }
    }
}

impl Layer for ChiSquared {
    fn fit(&self, built: &Built) -> Result<(Stage, Vec<String>)> {
        if !self.threshold.is_finite() {
            return Err(TriageError::InvalidParameter(format!(
                "chi-squared threshold must be finite, got {}",
                self.threshold
            )));
        }
        let (scores, _p_values) = chi2(&built.x, &built.y, built.fitted.labels().len())?;
        let removed = below_threshold(&scores, self.threshold);
        let features = retained_features(built, &removed);
        Ok((Stage::DropColumns { removed }, features))
    }
}

impl fmt::Display for ChiSquared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChiSquared(threshold={})", self.threshold)
    }
}

pub type StopWordsDecorator = SelectorDecorator<StopWords>;
pub type StandardizationDecorator = SelectorDecorator<Standardization>;
pub type NormalizationDecorator = SelectorDecorator<Normalization>;
pub type TfIdfDecorator = SelectorDecorator<TfIdf>;
pub type LsiDecorator = SelectorDecorator<Lsi>;
pub type ChiSquaredDecorator = SelectorDecorator<ChiSquared>;

impl SelectorDecorator<StopWords> {
    pub fn new(selector: impl Selector + 'static, language: Language) -> Self {
        Self::wrap(selector, StopWords { language })
    }
}

impl SelectorDecorator<Standardization> {
    pub fn new(selector: impl Selector + 'static) -> Self {
        Self::wrap(selector, Standardization)
    }
}

impl SelectorDecorator<Normalization> {
    pub fn new(selector: impl Selector + 'static) -> Self {
        Self::wrap(selector, Normalization)
    }
}

impl SelectorDecorator<TfIdf> {
    pub fn new(selector: impl Selector + 'static) -> Self {
        Self::wrap(selector, TfIdf)
    }
}

impl SelectorDecorator<Lsi> {
    pub fn new(selector: impl Selector + 'static, k: usize) -> Self {
        Self::wrap(selector, Lsi { k })
    }
}

impl SelectorDecorator<ChiSquared> {
    pub fn new(selector: impl Selector + 'static, threshold: f64) -> Self {
        Self::wrap(selector, ChiSquared { threshold })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_selection::BasicSelector;

    fn documents() -> Vec<Document> {
        vec![
            Document::labeled("The login page", "the login fails", "alice"),
            Document::labeled("The printer", "printer is out of paper", "bob"),
            Document::labeled("Login again", "login is broken", "alice"),
            Document::labeled("Printer paper", "the paper tray", "bob"),
        ]
    }

    fn basic() -> BasicSelector {
        BasicSelector::new(2, 2)
    }

    #[test]
    fn test_stop_words_are_removed() {
        let selector = StopWordsDecorator::new(basic(), Language::English);
        let built = selector.build(&documents()).unwrap();
        let features = built.fitted.features();
        assert!(!features.iter().any(|f| f == "the" || f == "is"));
        assert!(features.iter().any(|f| f == "login"));
        assert_eq!(built.x.ncols(), features.len());
    }

    #[test]
    fn test_standardization_centers_columns() {
        let selector = StandardizationDecorator::new(basic());
        let built = selector.build(&documents()).unwrap();
        for column in built.x.columns() {
            let mean = column.sum() / column.len() as f64;
            assert!(mean.abs() < 1e-9);
        }
    }

    #[test]
    fn test_normalization_gives_unit_rows() {
        let selector = NormalizationDecorator::new(basic());
        let built = selector.build(&documents()).unwrap();
        for row in built.x.rows() {
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_tfidf_zero_idf_for_ubiquitous_feature() {
        let docs = vec![
            Document::labeled("bug bug", "crash", "a"),
            Document::labeled("bug", "crash crash", "b"),
        ];
        let selector = TfIdfDecorator::new(BasicSelector::new(2, 1));
        let built = selector.build(&docs).unwrap();
        // both words appear in both documents: idf = ln(1) = 0
        assert!(built.x.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_lsi_projects_to_k_columns() {
        let selector = LsiDecorator::new(basic(), 2);
        let built = selector.build(&documents()).unwrap();
        assert_eq!(built.x.dim(), (4, 2));
        assert_eq!(
            built.fitted.features(),
            &["lsi_0".to_string(), "lsi_1".to_string()]
        );
    }

    #[test]
    fn test_lsi_rejects_k_above_rank_bound() {
        let selector = LsiDecorator::new(basic(), 50);
        assert!(matches!(
            selector.build(&documents()),
            Err(TriageError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_chi_squared_keeps_discriminative_words() {
        let selector = ChiSquaredDecorator::new(basic(), 1.0);
        let built = selector.build(&documents()).unwrap();
        let features = built.fitted.features();
        assert!(features.iter().any(|f| f == "login"));
        assert!(features.iter().any(|f| f == "printer"));
        // "the" is spread over both classes
        assert!(!features.iter().any(|f| f == "the"));
    }

    #[test]
    fn test_chi_squared_rejects_negative_features() {
        let selector = ChiSquaredDecorator::new(StandardizationDecorator::new(basic()), 10.86);
        assert!(matches!(
            selector.build(&documents()),
            Err(TriageError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_display_lists_outermost_first() {
        let selector = TfIdfDecorator::new(StopWordsDecorator::new(basic(), Language::English));
        assert_eq!(
            selector.to_string(),
            "TfIdf -> StopWords(english) -> Basic(min_len=2, min_occur=2)"
        );
    }
}
