use anyhow::{Context, Result};
use log::LevelFilter;

use triage_classifiers::config::{DecoratorConfig, ModelConfig, ModelType, SelectorConfig};
use triage_classifiers::data_handling::train_test_split;
use triage_classifiers::evaluation::{accuracy, fscore, precision_and_recall};
use triage_classifiers::kernels::Kernel;
use triage_classifiers::models::factory::build_model;
use triage_classifiers::stopwords::Language;
use triage_classifiers::Document;

fn tickets() -> Vec<Document> {
    let teams = [
        ("identity", ["login", "password", "account", "locked", "sso", "token"]),
        ("printing", ["printer", "paper", "toner", "jam", "queue", "tray"]),
        ("network", ["vpn", "tunnel", "wifi", "dns", "latency", "router"]),
    ];

    let mut tickets = Vec::new();
    for i in 0..40 {
        for (label, words) in teams.iter() {
            let body: Vec<&str> = (0..4).map(|k| words[(i * 5 + k * 2) % words.len()]).collect();
            // every fifth ticket borrows a word from the next team
            let noise = if i % 5 == 0 { "vpn printer" } else { "" };
            tickets.push(Document::labeled(
                "Help needed",
                format!("the {} {} has a problem", body.join(" "), noise),
                *label,
            ));
        }
    }
    tickets
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("TRIAGE_LOG", "error"))
        .init();

    let stop_words = DecoratorConfig::StopWords {
        language: Language::English,
    };
    let candidates = vec![
        ModelConfig::new(SelectorConfig::basic(2, 2), ModelType::Baseline),
        ModelConfig::new(
            SelectorConfig::basic(2, 2).with(stop_words.clone()),
            ModelType::NaiveBayes,
        ),
        ModelConfig::new(
            SelectorConfig::default(),
            ModelType::Svm {
                kernel: Kernel::default(),
                c: 240.0,
                eps: 1e-3,
            },
        ),
        ModelConfig::new(
            SelectorConfig::basic(2, 2)
                .with(stop_words.clone())
                .with(DecoratorConfig::Normalization),
            ModelType::Svm {
                kernel: Kernel::Linear,
                c: 10.0,
                eps: 1e-3,
            },
        ),
        ModelConfig::new(
            SelectorConfig::basic(2, 2)
                .with(stop_words.clone())
                .with(DecoratorConfig::ChiSquared { threshold: 10.86 })
                .with(DecoratorConfig::Lsi { k: 5 }),
            ModelType::Svm {
                kernel: Kernel::polynomial(1.0, 2.0),
                c: 10.0,
                eps: 1e-3,
            },
        ),
        ModelConfig::new(
            SelectorConfig::basic(2, 2).with(stop_words),
            ModelType::DecisionTree {
                max_depth: 8,
                min_leaf_size: 2,
            },
        ),
    ];

    let (train, test) = train_test_split(tickets(), 0.8, 42);
    println!("{:<100} {:>8} {:>8} {:>8} {:>8}", "model", "acc@1", "prec", "recall", "f1");

    for config in candidates {
        let mut model = build_model(&config);
        model
            .train(&train)
            .with_context(|| format!("Failed to train {}", model))?;

        let acc = accuracy(model.as_ref(), &test, 1)?;
        let (precision, recall) = precision_and_recall(model.as_ref(), &test)?;
        println!(
            "{:<100} {:>8.3} {:>8.3} {:>8.3} {:>8.3}",
            model.to_string(),
            acc,
            precision,
            recall,
            fscore(precision, recall)
        );
    }

    Ok(())
}
