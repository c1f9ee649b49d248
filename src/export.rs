//! Flat interchange files
//!
//! The observation table is CSV with the columns
//! `text,interview_id,theme,sentiment`; cluster summaries are JSON.

use crate::model::{LabelError, Observation};
use crate::summary::{cluster_summaries, ClusterSummary};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

pub const CSV_COLUMNS: [&str; 4] = ["text", "interview_id", "theme", "sentiment"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {line}: {message}")]
    Csv { line: usize, message: String },
    #[error("line {line}: {source}")]
    Label {
        line: usize,
        #[source]
        source: LabelError,
    },
}

/// Quote a CSV field when it holds a delimiter, quote or line break
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render the table as CSV text, header included
pub fn observations_to_csv(observations: &[Observation]) -> String {
    let mut out = CSV_COLUMNS.join(",");
    out.push('\n');
    for obs in observations {
        let row = [
            csv_escape(&obs.text),
            csv_escape(&obs.source_id),
            csv_escape(obs.theme.label()),
            csv_escape(obs.sentiment.label()),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

pub fn write_observations_csv<P: AsRef<Path>>(
    path: P,
    observations: &[Observation],
) -> Result<(), ExportError> {
    fs::write(path, observations_to_csv(observations))?;
    Ok(())
}

/// Split CSV text into records, each tagged with the line it starts on
fn csv_records(content: &str) -> Result<Vec<(usize, Vec<String>)>, ExportError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push((record_line, std::mem::take(&mut record)));
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ExportError::Csv {
            line: record_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push((record_line, record));
    }

    // blank lines carry no record
    records.retain(|(_, r)| !(r.len() == 1 && r[0].is_empty()));
    Ok(records)
}

/// Parse a CSV observation table.
///
/// Columns may come in any order but all four must be present. Theme and
/// sentiment labels are validated against the closed sets.
pub fn parse_observations_csv(content: &str) -> Result<Vec<Observation>, ExportError> {
    let mut records = csv_records(content)?.into_iter();
    let Some((header_line, header)) = records.next() else {
        return Ok(Vec::new());
    };

    let mut index = [0usize; 4];
    for (slot, column) in index.iter_mut().zip(CSV_COLUMNS) {
        *slot = header
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| ExportError::Csv {
                line: header_line,
                message: format!("missing column {:?}", column),
            })?;
    }

    records
        .map(|(line, fields)| {
            if fields.len() != header.len() {
                return Err(ExportError::Csv {
                    line,
                    message: format!("expected {} fields, found {}", header.len(), fields.len()),
                });
            }
            let label_err = |source| ExportError::Label { line, source };
            Ok(Observation {
                text: fields[index[0]].clone(),
                source_id: fields[index[1]].clone(),
                theme: fields[index[2]].parse().map_err(label_err)?,
                sentiment: fields[index[3]].parse().map_err(label_err)?,
            })
        })
        .collect()
}

pub fn read_observations_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>, ExportError> {
    let content = fs::read_to_string(path)?;
    parse_observations_csv(&content)
}

/// Cluster summaries plus a fingerprint of the table they came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterReport {
    /// SHA-256 of the table rendered as CSV
    pub corpus_digest: String,
    pub total_observations: usize,
    pub clusters: Vec<ClusterSummary>,
}

impl ClusterReport {
    pub fn build(observations: &[Observation], sample_size: usize) -> Self {
        Self {
            corpus_digest: table_digest(observations),
            total_observations: observations.len(),
            clusters: cluster_summaries(observations, sample_size),
        }
    }
}

pub fn table_digest(observations: &[Observation]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(observations_to_csv(observations).as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn write_clusters_json<P: AsRef<Path>>(path: P, report: &ClusterReport) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn read_clusters_json<P: AsRef<Path>>(path: P) -> Result<ClusterReport, ExportError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Sentiment, Theme};
    use tempfile::TempDir;

    fn sample() -> Vec<Observation> {
        vec![
            Observation {
                text: "Notion, Todoist, Trello, Asana".to_string(),
                source_id: "interview_01".to_string(),
                theme: Theme::ToolHopping,
                sentiment: Sentiment::Neutral,
            },
            Observation {
                text: "It said \"YOU HAVE 15 OVERDUE ITEMS\"\nand I closed it".to_string(),
                source_id: "interview_02".to_string(),
                theme: Theme::ProductivityGuilt,
                sentiment: Sentiment::Negative,
            },
        ]
    }

    #[test]
    fn test_csv_quoting() {
        let csv = observations_to_csv(&sample());
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("text,interview_id,theme,sentiment"));
        assert_eq!(
            lines.next(),
            Some("\"Notion, Todoist, Trello, Asana\",interview_01,Tool Hopping Behavior,neutral")
        );
        assert!(csv.contains("\"It said \"\"YOU HAVE 15 OVERDUE ITEMS\"\"\nand I closed it\""));
    }

    #[test]
    fn test_csv_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("affinity_clusters.csv");
        write_observations_csv(&path, &sample()).unwrap();
        assert_eq!(read_observations_csv(&path).unwrap(), sample());
    }

    #[test]
    fn test_parse_reordered_columns_and_crlf() {
        let content = "theme,sentiment,interview_id,text\r\nOther,positive,interview_09,\"a, b\"\r\n\r\n";
        let rows = parse_observations_csv(content).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "a, b");
        assert_eq!(rows[0].source_id, "interview_09");
        assert_eq!(rows[0].theme, Theme::Other);
        assert_eq!(rows[0].sentiment, Sentiment::Positive);
    }

    #[test]
    fn test_parse_rejects_unknown_labels() {
        let content = "text,interview_id,theme,sentiment\nsome text,i1,Other,neutral\nmore text,i1,Boredom,neutral\n";
        match parse_observations_csv(content) {
            Err(ExportError::Label { line, source }) => {
                assert_eq!(line, 3);
                assert_eq!(source, LabelError::UnknownTheme("Boredom".to_string()));
            }
            other => panic!("expected label error, got {:?}", other),
        }

        let content = "text,interview_id,theme,sentiment\nsome text,i1,Other,angry\n";
        assert!(matches!(
            parse_observations_csv(content),
            Err(ExportError::Label {
                source: LabelError::UnknownSentiment(_),
                ..
            })
        ));
    }

    #[test]
    fn test_parse_structural_errors() {
        assert!(matches!(
            parse_observations_csv("text,theme,sentiment\n"),
            Err(ExportError::Csv { line: 1, .. })
        ));
        assert!(matches!(
            parse_observations_csv("text,interview_id,theme,sentiment\nonly,two\n"),
            Err(ExportError::Csv { line: 2, .. })
        ));
        assert!(matches!(
            parse_observations_csv("text,interview_id,theme,sentiment\n\"open,i1,Other,neutral\n"),
            Err(ExportError::Csv { .. })
        ));
        assert!(parse_observations_csv("").unwrap().is_empty());
    }

    #[test]
    fn test_cluster_report_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clusters.json");
        let report = ClusterReport::build(&sample(), 3);
        write_clusters_json(&path, &report).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["total_observations"], 2);
        assert_eq!(raw["clusters"][0]["theme"], "Tool Hopping Behavior");
        assert_eq!(raw["clusters"][1]["sentiment_negative"], 1);
        assert_eq!(raw["corpus_digest"].as_str().unwrap().len(), 64);

        assert_eq!(read_clusters_json(&path).unwrap(), report);
    }

    #[test]
    fn test_digest_tracks_content() {
        let mut rows = sample();
        let before = table_digest(&rows);
        assert_eq!(before, table_digest(&sample()));
        rows[0].sentiment = Sentiment::Positive;
        assert_ne!(before, table_digest(&rows));
    }
}
