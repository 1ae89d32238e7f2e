//! # Run Summary Module
//!
//! Questo modulo aggrega i risultati di un run.
//!
//! ## Responsabilità:
//! - Conta `total` (ogni risultato) e `succeeded` (solo `ok == true`)
//! - Tiene la lista dei fallimenti per il report finale
//! - Notifica un `ProgressObserver` opzionale a ogni risultato; il conteggio
//!   non dipende mai dall'observer
//!
//! `RunSummary` ha un solo proprietario, il loop che raccoglie i risultati
//! del dispatcher: `accumulate` prende `&mut self`, quindi non esistono
//! scrittori concorrenti.

use crate::processor::ProcessingResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Final counts of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub total: usize,
    pub succeeded: usize,
}

impl SummaryReport {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// True when nothing failed (an empty run counts as success)
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} succeeded", self.succeeded, self.total)?;
        if self.failed() > 0 {
            write!(f, " ({} failed)", self.failed())?;
        }
        Ok(())
    }
}

/// Receives every result as it is counted
pub trait ProgressObserver: Send {
    /// Called after `result` has been counted; `progress` includes it
    fn on_result(&self, result: &ProcessingResult, progress: &SummaryReport);

    /// Called once when the run is over
    fn on_finish(&self, _report: &SummaryReport) {}
}

/// Aggregates results into total/succeeded counts
#[derive(Default)]
pub struct RunSummary {
    total: usize,
    succeeded: usize,
    failures: Vec<(PathBuf, String)>,
    observer: Option<Box<dyn ProgressObserver>>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(observer: Box<dyn ProgressObserver>) -> Self {
        Self {
            observer: Some(observer),
            ..Self::default()
        }
    }

    pub fn accumulate(&mut self, result: ProcessingResult) {
        self.total += 1;
        if result.ok {
            self.succeeded += 1;
        } else {
            self.failures.push((
                result.item.input_path.clone(),
                result.detail.clone().unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        if let Some(ref observer) = self.observer {
            observer.on_result(&result, &self.report());
        }
    }

    pub fn report(&self) -> SummaryReport {
        SummaryReport {
            total: self.total,
            succeeded: self.succeeded,
        }
    }

    /// Input path and error message of every failed item, in arrival order
    pub fn failures(&self) -> &[(PathBuf, String)] {
        &self.failures
    }

    /// Final report; notifies the observer once
    pub fn finish(&self) -> SummaryReport {
        let report = self.report();
        if let Some(ref observer) = self.observer {
            observer.on_finish(&report);
        }
        report
    }
}
