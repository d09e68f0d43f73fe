use triage_classifiers::config::{DecoratorConfig, ModelConfig, ModelType, SelectorConfig, TrainingConfig};
use triage_classifiers::evaluation::{accuracy, fscore, precision_and_recall};
use triage_classifiers::feature_selection::BasicSelector;
use triage_classifiers::models::naive_bayes::TrainedNaiveBayes;
use triage_classifiers::models::decision_tree::TrainedDecisionTree;
use triage_classifiers::models::{BaselineModel, DecisionTreeModel, Model, NaiveBayesModel};
use triage_classifiers::stopwords::Language;
use triage_classifiers::training::train_and_evaluate;
use triage_classifiers::{Document, TriageError};

fn small_corpus() -> Vec<Document> {
    vec![
        Document::labeled("bug in login", "cannot log in", "alice"),
        Document::labeled("ui glitch", "button misaligned", "bob"),
        Document::labeled("login fails", "password reset broken", "alice"),
    ]
}

fn separable_corpus() -> Vec<Document> {
    vec![
        Document::labeled("Login", "login password", "alice"),
        Document::labeled("Password", "password login reset", "alice"),
        Document::labeled("Printer", "printer paper", "bob"),
        Document::labeled("Paper", "paper printer toner", "bob"),
    ]
}

fn trained_naive_bayes() -> NaiveBayesModel {
    let mut model = NaiveBayesModel::new(BasicSelector::new(2, 1));
    model.train(&separable_corpus()).unwrap();
    model
}

// ------------------------------------------------------------------
// Baseline
// ------------------------------------------------------------------

#[test]
fn test_baseline_predicts_majority_label() {
    let mut model = BaselineModel::new(BasicSelector::new(2, 1));
    model.train(&small_corpus()).unwrap();

    for query in [
        Document::unlabeled("ui glitch", "button misaligned"),
        Document::unlabeled("", ""),
        Document::unlabeled("completely", "unrelated words"),
    ] {
        assert_eq!(model.predict(&query, 1).unwrap(), vec!["alice".to_string()]);
    }
    assert_eq!(
        model.predict(&Document::unlabeled("x", "y"), 5).unwrap(),
        vec!["alice".to_string(), "bob".to_string()]
    );
}

// ------------------------------------------------------------------
// Accuracy
// ------------------------------------------------------------------

#[test]
fn test_accuracy_on_empty_set_fails() {
    let model = trained_naive_bayes();
    assert!(matches!(
        accuracy(&model, &[], 1),
        Err(TriageError::EmptyEvaluationSet)
    ));
}

#[test]
fn test_accuracy_top_n() {
    let model = trained_naive_bayes();
    let held_out = vec![
        Document::labeled("login", "password", "alice"),
        Document::labeled("printer", "toner", "bob"),
        // misrouted on purpose: top-1 is bob
        Document::labeled("printer", "paper", "alice"),
    ];
    assert!((accuracy(&model, &held_out, 1).unwrap() - 2.0 / 3.0).abs() < 1e-12);
    assert!((accuracy(&model, &held_out, 2).unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn test_accuracy_requires_trained_model() {
    let model = NaiveBayesModel::new(BasicSelector::default());
    assert!(matches!(
        accuracy(&model, &small_corpus(), 1),
        Err(TriageError::NotTrained { .. })
    ));
}

// ------------------------------------------------------------------
// Precision / recall
// ------------------------------------------------------------------

#[test]
fn test_perfect_precision_and_recall() {
    let model = trained_naive_bayes();
    let held_out = vec![
        Document::labeled("login", "password", "alice"),
        Document::labeled("printer", "toner", "bob"),
    ];
    let (precision, recall) = precision_and_recall(&model, &held_out).unwrap();
    assert!((precision - 1.0).abs() < 1e-12);
    assert!((recall - 1.0).abs() < 1e-12);
    assert!((fscore(precision, recall) - 1.0).abs() < 1e-12);
}

#[test]
fn test_unseen_label_is_penalized() {
    let model = trained_naive_bayes();
    let held_out = vec![
        Document::labeled("login", "password", "alice"),
        Document::labeled("printer", "toner", "bob"),
        Document::labeled("printer", "paper", "carol"),
    ];
    let (precision, recall) = precision_and_recall(&model, &held_out).unwrap();
    // alice: 1/1 and 1/1, bob: 1/2 and 1/1, carol: forced 0 and 0
    assert!((precision - 1.5 / 3.0).abs() < 1e-12);
    assert!((recall - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_label_without_true_positive_scores_zero() {
    let model = trained_naive_bayes();
    let held_out = vec![Document::labeled("printer", "paper", "alice")];
    let (precision, recall) = precision_and_recall(&model, &held_out).unwrap();
    assert_eq!(precision, 0.0);
    assert_eq!(recall, 0.0);
    assert_eq!(fscore(precision, recall), 0.0);
}

#[test]
fn test_precision_and_recall_rejects_unlabeled() {
    let model = trained_naive_bayes();
    let held_out = vec![Document::unlabeled("login", "password")];
    assert!(matches!(
        precision_and_recall(&model, &held_out),
        Err(TriageError::UnlabeledDocument { index: 0 })
    ));
}

// ------------------------------------------------------------------
// Persistence of a trained model
// ------------------------------------------------------------------

#[test]
fn test_naive_bayes_restored_from_state() {
    let model = trained_naive_bayes();
    let state: TrainedNaiveBayes = model.trained_state().unwrap().clone();
    // "printer" never occurs with alice
    assert!(state.log_likelihood.row(0).iter().any(|v| *v == f64::NEG_INFINITY));

    let restored = NaiveBayesModel::from_trained(BasicSelector::new(2, 1), state);
    let query = Document::unlabeled("printer", "toner");
    assert_eq!(restored.predict(&query, 2).unwrap(), model.predict(&query, 2).unwrap());
}

#[test]
fn test_baseline_state_round_trip() {
    let mut model = BaselineModel::new(BasicSelector::new(2, 1));
    model.train(&small_corpus()).unwrap();

    let json = serde_json::to_string(model.trained_state().unwrap()).unwrap();
    let restored = BaselineModel::from_trained(BasicSelector::new(2, 1), serde_json::from_str(&json).unwrap());
    let query = Document::unlabeled("anything", "");
    assert_eq!(restored.predict(&query, 2).unwrap(), model.predict(&query, 2).unwrap());
}

#[test]
fn test_decision_tree_state_round_trip() {
    let mut model = DecisionTreeModel::new(BasicSelector::new(2, 1))
        .with_max_depth(4)
        .with_min_leaf_size(2);
    model.train(&separable_corpus()).unwrap();

    let json = serde_json::to_string(model.trained_state().unwrap()).unwrap();
    let state: TrainedDecisionTree = serde_json::from_str(&json).unwrap();
    assert_eq!((state.max_depth, state.min_leaf_size), (4, 2));

    let restored = DecisionTreeModel::from_trained(BasicSelector::new(2, 1), state);
    assert_eq!(restored.to_string(), model.to_string());
    let query = Document::unlabeled("printer", "toner");
    assert_eq!(restored.predict(&query, 2).unwrap(), model.predict(&query, 2).unwrap());
}

// ------------------------------------------------------------------
// Training job
// ------------------------------------------------------------------

fn ticket_history() -> Vec<Document> {
    let topics = [
        ("alice", "Login", "login password account locked"),
        ("bob", "Printer", "printer paper toner jam"),
        ("carol", "VPN", "vpn tunnel network drops"),
    ];
    let mut docs = Vec::new();
    for i in 0..12 {
        for (label, title, body) in topics.iter() {
            docs.push(Document::labeled(*title, format!("{} ticket {}", body, "again ".repeat(i % 3)), *label));
        }
    }
    // a rare class and an unlabeled ticket
    docs.push(Document::labeled("Coffee", "coffee machine empty", "dave"));
    docs.push(Document::unlabeled("Login", "login password"));
    docs
}

#[test]
fn test_train_and_evaluate() {
    let config = TrainingConfig {
        ticket_limit: 100,
        min_class_occur: 5,
        train_fraction: 0.75,
        seed: 7,
        model: ModelConfig::new(
            SelectorConfig::basic(2, 1).with(DecoratorConfig::StopWords {
                language: Language::English,
            }),
            ModelType::NaiveBayes,
        ),
    };

    let report = train_and_evaluate(ticket_history(), &config).unwrap();
    assert_eq!(report.n_train + report.n_test, 36);
    assert_eq!(report.n_train, 27);
    assert!(report.accuracy > 0.9);
    assert!(report.precision > 0.9 && report.recall > 0.9);
    assert!((report.fscore - fscore(report.precision, report.recall)).abs() < 1e-12);

    let labels = report.model.feature_selector().unwrap().labels().to_vec();
    assert_eq!(labels, vec!["alice".to_string(), "bob".to_string(), "carol".to_string()]);
}

#[test]
fn test_train_and_evaluate_keeps_newest_tickets() {
    let mut history = ticket_history();
    // oldest tickets belong to a label that must not survive the limit
    let old: Vec<Document> = (0..10)
        .map(|_| Document::labeled("Old", "legacy system", "erin"))
        .collect();
    history.splice(0..0, old);

    let config = TrainingConfig {
        ticket_limit: 38,
        min_class_occur: 5,
        model: ModelConfig::new(SelectorConfig::basic(2, 1), ModelType::Baseline),
        ..TrainingConfig::default()
    };
    let report = train_and_evaluate(history, &config).unwrap();
    let labels = report.model.feature_selector().unwrap().labels().to_vec();
    assert!(!labels.contains(&"erin".to_string()));
}

#[test]
fn test_train_and_evaluate_without_enough_data() {
    let config = TrainingConfig::default();
    assert!(train_and_evaluate(small_corpus(), &config).is_err());
}

#[test]
fn test_train_and_evaluate_checks_split_before_training() {
    // the model would fail to train; the empty held-out split must be reported first
    let config = TrainingConfig {
        min_class_occur: 1,
        train_fraction: 0.99,
        model: ModelConfig::new(
            SelectorConfig::basic(2, 1),
            ModelType::DecisionTree {
                max_depth: 0,
                min_leaf_size: 1,
            },
        ),
        ..TrainingConfig::default()
    };
    let err = train_and_evaluate(small_corpus(), &config).unwrap_err();
    assert!(err.to_string().contains("held-out split is empty"), "{}", err);
}
