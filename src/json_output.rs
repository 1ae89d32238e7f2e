//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per comunicazione con
//! altri processi (una riga JSON per evento su stdout).
//!
//! ## Tipi di messaggi:
//! - `start`: inizio del run, con configurazione e numero di item
//! - `file_complete`: fine elaborazione di un item
//! - `complete`: fine del run con il riepilogo finale
//! - `error`: errore fatale prima del dispatch

use crate::config::{Config, Mode};
use crate::processor::ProcessingResult;
use crate::summary::{ProgressObserver, SummaryReport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio del run
    #[serde(rename = "start")]
    Start {
        input_dir: PathBuf,
        output_dir: PathBuf,
        total_files: usize,
        config: JsonConfig,
    },

    /// Fine elaborazione di un item
    #[serde(rename = "file_complete")]
    FileComplete {
        input: PathBuf,
        output: PathBuf,
        ok: bool,
        error: Option<String>,
        completed: usize,
        succeeded: usize,
    },

    /// Run completato
    #[serde(rename = "complete")]
    Complete {
        total: usize,
        succeeded: usize,
        failed: usize,
        duration_seconds: f64,
    },

    /// Errore fatale
    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonConfig {
    pub mode: Mode,
    pub quality: u16,
    pub workers: usize,
    pub dry_run: bool,
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            mode: config.mode,
            quality: config.quality,
            workers: config.workers,
            dry_run: config.dry_run,
        }
    }
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn file_complete(result: &ProcessingResult, progress: &SummaryReport) -> Self {
        Self::FileComplete {
            input: result.item.input_path.clone(),
            output: result.item.output_path.clone(),
            ok: result.ok,
            error: result.detail.clone(),
            completed: progress.total,
            succeeded: progress.succeeded,
        }
    }

    pub fn complete(report: &SummaryReport, duration_seconds: f64) -> Self {
        Self::Complete {
            total: report.total,
            succeeded: report.succeeded,
            failed: report.failed(),
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

/// Observer that emits one `file_complete` line per result.
/// The `complete` line is emitted by the pipeline, which knows the duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonObserver;

impl ProgressObserver for JsonObserver {
    fn on_result(&self, result: &ProcessingResult, progress: &SummaryReport) {
        JsonMessage::file_complete(result, progress).emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::WorkItem;

    #[test]
    fn test_message_tags() {
        let item = WorkItem::new(PathBuf::from("/in/a.gif"), PathBuf::from("/out/a.gif"));
        let message = JsonMessage::file_complete(
            &ProcessingResult::failed(item, "exit 1"),
            &SummaryReport { total: 3, succeeded: 2 },
        );
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "file_complete");
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"], "exit 1");
        assert_eq!(value["completed"], 3);

        let complete = JsonMessage::complete(&SummaryReport { total: 3, succeeded: 2 }, 1.5);
        let value = serde_json::to_value(&complete).unwrap();
        assert_eq!(value["type"], "complete");
        assert_eq!(value["failed"], 1);
    }

    #[test]
    fn test_start_config_roundtrip() {
        let config = Config::for_mode(Mode::Webp);
        let message = JsonMessage::Start {
            input_dir: PathBuf::from("/in"),
            output_dir: PathBuf::from("/in/webp_converted"),
            total_files: 4,
            config: JsonConfig::from(&config),
        };
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains(r#""mode":"webp""#));
        let back: JsonMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }
}
