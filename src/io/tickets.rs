//! Ticket export reader (CSV / TSV with a header row).
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;

use crate::data_handling::Document;

/// Column layout of a ticket export.
#[derive(Debug, Clone)]
pub struct TicketReaderConfig {
    pub title_column: String,
    pub content_column: String,
    /// Column holding the label; an empty cell yields an unlabeled document.
    pub label_column: Option<String>,
    pub delimiter: u8,
}

impl Default for TicketReaderConfig {
    fn default() -> Self {
        Self {
            title_column: "title".to_string(),
            content_column: "content".to_string(),
            label_column: Some("label".to_string()),
            delimiter: b',',
        }
    }
}

/// Read a ticket export file into documents, in file order.
pub fn read_tickets_csv<P: AsRef<Path>>(path: P, config: &TicketReaderConfig) -> Result<Vec<Document>> {
    let file = std::fs::File::open(&path)
        .with_context(|| format!("Failed to open ticket file: {}", path.as_ref().display()))?;
    read_tickets(file, config)
}

/// Read tickets from any reader holding a delimited export.
pub fn read_tickets<R: Read>(reader: R, config: &TicketReaderConfig) -> Result<Vec<Document>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = reader
        .headers()
        .context("Failed to read ticket header row")?
        .clone();

    let title_idx = find_column(&headers, &config.title_column)
        .ok_or_else(|| anyhow!("Missing title column '{}'", config.title_column))?;
    let content_idx = find_column(&headers, &config.content_column)
        .ok_or_else(|| anyhow!("Missing content column '{}'", config.content_column))?;
    let label_idx = match &config.label_column {
        Some(name) => Some(
            find_column(&headers, name).ok_or_else(|| anyhow!("Missing label column '{}'", name))?,
        ),
        None => None,
    };

    let mut documents = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        let title = record.get(title_idx).unwrap_or_default();
        let content = record.get(content_idx).unwrap_or_default();
        let label = label_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        documents.push(Document::new(title, content, label));
    }

    log::debug!("Read {} tickets", documents.len());
    Ok(documents)
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_tickets() {
        let data = "Label,Title,Content\nalice,Login broken,\"cannot log in, again\"\n,VPN,drops\n";
        let docs = read_tickets(data.as_bytes(), &TicketReaderConfig::default()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0], Document::labeled("Login broken", "cannot log in, again", "alice"));
        assert_eq!(docs[1].label, None);
    }

    #[test]
    fn test_tab_separated_without_labels() {
        let config = TicketReaderConfig {
            label_column: None,
            delimiter: b'\t',
            ..TicketReaderConfig::default()
        };
        let docs = read_tickets("title\tcontent\nPrinter\tjam\n".as_bytes(), &config).unwrap();
        assert_eq!(docs, vec![Document::unlabeled("Printer", "jam")]);
    }

    #[test]
    fn test_missing_column() {
        let err = read_tickets("title,body\na,b\n".as_bytes(), &TicketReaderConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("content"));
    }
}
