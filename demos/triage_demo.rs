use std::env;

use anyhow::{Context, Result};
use log::LevelFilter;

use triage_classifiers::config::TrainingConfig;
use triage_classifiers::io::{read_tickets_csv, TicketReaderConfig};
use triage_classifiers::training::train_and_evaluate;
use triage_classifiers::Document;

/// A small synthetic ticket history, oldest first.
fn synthetic_tickets() -> Vec<Document> {
    let teams = [
        ("identity", "Login", ["login", "password", "account", "locked", "sso", "token"]),
        ("printing", "Printer", ["printer", "paper", "toner", "jam", "queue", "tray"]),
        ("network", "VPN", ["vpn", "tunnel", "wifi", "dns", "latency", "router"]),
        ("storage", "Disk", ["disk", "quota", "backup", "volume", "share", "restore"]),
    ];

    let mut tickets = Vec::new();
    for i in 0..60 {
        for (label, title, words) in teams.iter() {
            let body: Vec<&str> = (0..5).map(|k| words[(i * 7 + k * 3) % words.len()]).collect();
            tickets.push(Document::labeled(
                format!("{} issue #{}", title, i),
                format!("the {} is not working since the update", body.join(" ")),
                *label,
            ));
        }
    }
    tickets
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("TRIAGE_LOG", "error,triage_classifiers=info"))
        .init();

    let tickets = match env::args().nth(1) {
        Some(path) => read_tickets_csv(&path, &TicketReaderConfig::default())
            .with_context(|| format!("Failed to load tickets from {}", path))?,
        None => synthetic_tickets(),
    };

    let config = TrainingConfig {
        min_class_occur: 10,
        ..TrainingConfig::default()
    };
    let report = train_and_evaluate(tickets, &config)?;

    println!("Model:     {}", report.model);
    println!("Train/test: {}/{}", report.n_train, report.n_test);
    println!("Accuracy:  {:.3}", report.accuracy);
    println!("Precision: {:.3}", report.precision);
    println!("Recall:    {:.3}", report.recall);
    println!("F-score:   {:.3}", report.fscore);

    let query = Document::unlabeled("Cannot print", "the printer says paper jam in tray 2");
    let suggestions = report.model.predict(&query, 3)?;
    println!("Suggested assignees for {:?}: {:?}", query.title, suggestions);

    Ok(())
}
