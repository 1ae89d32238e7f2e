//! # Batch Pipeline Orchestrator
//!
//! Questo è il modulo che orchestra un run completo.
//!
//! ## Flusso di esecuzione:
//! 1. **Inizializzazione**: valida la config, risolve input/output root,
//!    crea la directory di output, carica le ignore rules
//! 2. **Dependency check**: verifica che il tool esterno sia installato
//!    (saltato in dry run)
//! 3. **Discovery**: `TreeWalker` materializza tutti i `WorkItem`; gli input
//!    il cui output è già preso da un altro input contano come falliti
//! 4. **Dispatch**: `BoundedDispatcher` esegue il processor sul pool
//! 5. **Summary**: ogni risultato passa per `RunSummary::accumulate`
//! 6. **Report**: riepilogo finale `succeeded/total`
//!
//! ## Error handling:
//! Solo gli errori di setup (config, dipendenze, I/O sulla output root)
//! interrompono il run, sempre prima del dispatch. Il fallimento di un singolo
//! file è un dato nel `SummaryReport`.
//!
//! ## Esempio:
//! ```rust,ignore
//! let pipeline = BatchPipeline::new(config).await?;
//! let report = pipeline.run().await?;
//! if !report.all_succeeded() {
//!     std::process::exit(1);
//! }
//! ```

use crate::{
    config::{Config, Mode},
    dispatcher::BoundedDispatcher,
    error::BatchError,
    filter::IgnoreRules,
    json_output::{JsonConfig, JsonMessage, JsonObserver},
    processor::{
        DryRun, GifOptions, GifsicleProcessor, ProcessingResult, WebpOptions, WebpProcessor,
        WorkItemProcessor,
    },
    progress::ProgressManager,
    summary::{ProgressObserver, RunSummary, SummaryReport},
    tools::ToolResolver,
    walker::{Discovery, TreeWalker},
};
use anyhow::Result;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Orchestratore principale
pub struct BatchPipeline {
    config: Config,
    input_root: PathBuf,
    output_root: PathBuf,
    rules: IgnoreRules,
}

impl BatchPipeline {
    /// Validate the configuration and prepare the output root
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let input_root = canonical(&config.input_dir)?;
        let output_root = absolute(&config.resolved_output_dir())?;

        tokio::fs::create_dir_all(&output_root).await.map_err(BatchError::from)?;
        let output_root = canonical(&output_root)?;

        if input_root.starts_with(&output_root) {
            return Err(BatchError::Configuration(format!(
                "Output directory {} must not contain the input directory {}",
                output_root.display(),
                input_root.display()
            ))
            .into());
        }

        let rules = match config.ignore_file {
            Some(ref path) => IgnoreRules::load(path)?,
            None => IgnoreRules::from_dir(&input_root)?,
        };
        if !rules.is_empty() {
            debug!("Using {} ignore patterns", rules.len());
        }

        Ok(Self {
            config,
            input_root,
            output_root,
            rules,
        })
    }

    pub fn input_root(&self) -> &Path {
        &self.input_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Enumerate every eligible input for this run
    pub fn discover(&self) -> Discovery {
        let mode = self.config.mode;
        TreeWalker::new(&self.input_root, &self.output_root)
            .with_ignore_rules(self.rules.clone())
            .with_output_extension(mode.output_extension())
            .keep_processed(self.config.keep_processed)
            .discover(|path| mode.accepts(path))
    }

    /// Run with the processor the configured mode calls for
    pub async fn run(&self) -> Result<SummaryReport> {
        let resolver = ToolResolver::new();

        match (self.config.mode, self.config.dry_run) {
            (Mode::Gif, false) => {
                let processor = GifsicleProcessor::new(&resolver, GifOptions::from(&self.config))?;
                self.run_with(processor).await
            }
            (Mode::Gif, true) => {
                let processor =
                    GifsicleProcessor::with_program(GifsicleProcessor::TOOL, GifOptions::from(&self.config));
                self.run_with(DryRun::new(processor)).await
            }
            (Mode::Webp, false) => {
                let processor = WebpProcessor::new(&resolver, WebpOptions::from(&self.config))?;
                self.run_with(processor).await
            }
            (Mode::Webp, true) => {
                let processor =
                    WebpProcessor::with_program(WebpProcessor::TOOL, WebpOptions::from(&self.config));
                self.run_with(DryRun::new(processor)).await
            }
        }
    }

    /// Run with an explicit processor, reporting through the configured observer
    pub async fn run_with<P: WorkItemProcessor>(&self, processor: P) -> Result<SummaryReport> {
        let discovery = self.discover();
        let observer: Box<dyn ProgressObserver> = if self.config.json_output {
            Box::new(JsonObserver)
        } else {
            Box::new(ProgressManager::new(discovery.total() as u64))
        };
        Ok(self.execute(discovery, processor, observer).await)
    }

    /// Run with an explicit processor and observer
    pub async fn run_with_observer<P: WorkItemProcessor>(
        &self,
        processor: P,
        observer: Box<dyn ProgressObserver>,
    ) -> Result<SummaryReport> {
        let discovery = self.discover();
        Ok(self.execute(discovery, processor, observer).await)
    }

    async fn execute<P: WorkItemProcessor>(
        &self,
        discovery: Discovery,
        processor: P,
        observer: Box<dyn ProgressObserver>,
    ) -> SummaryReport {
        let start_time = Instant::now();
        self.emit_start_message(discovery.total(), processor.name());

        let Discovery { items, collisions } = discovery;
        let mut summary = RunSummary::with_observer(observer);
        for collision in collisions {
            let detail = format!(
                "output path already claimed by {}",
                collision.claimed_by.display()
            );
            summary.accumulate(ProcessingResult::failed(collision.item, detail));
        }

        let dispatcher = BoundedDispatcher::new(self.config.workers)
            .with_item_timeout(self.config.timeout_secs.map(Duration::from_secs));

        let mut results = std::pin::pin!(dispatcher.run(items, Arc::new(processor)));
        while let Some(result) = results.next().await {
            if result.ok {
                debug!("Saved to: {}", result.item.output_path.display());
            } else {
                debug!(
                    "Failed: {}: {}",
                    result.item.input_path.display(),
                    result.detail.as_deref().unwrap_or("unknown error")
                );
            }
            summary.accumulate(result);
        }

        let report = summary.finish();
        self.print_final_stats(&summary, &report, start_time.elapsed().as_secs_f64());
        report
    }

    fn emit_start_message(&self, total_files: usize, tool: &str) {
        if self.config.json_output {
            JsonMessage::Start {
                input_dir: self.input_root.clone(),
                output_dir: self.output_root.clone(),
                total_files,
                config: JsonConfig::from(&self.config),
            }
            .emit();
            return;
        }

        info!("Starting {} batch ({})", self.config.mode, tool);
        info!("Input directory : {}", self.input_root.display());
        info!("Output directory: {}", self.output_root.display());
        info!("Quality level   : {}", self.config.quality);
        info!("Workers         : {}", self.config.workers);
        if self.config.dry_run {
            info!("Dry run mode: No files will be written");
        }
        if total_files == 0 {
            info!("No matching files found to process");
        } else {
            info!("Dispatching {} files...", total_files);
        }
    }

    fn print_final_stats(&self, summary: &RunSummary, report: &SummaryReport, duration: f64) {
        if self.config.json_output {
            JsonMessage::complete(report, duration).emit();
            return;
        }

        for (path, message) in summary.failures() {
            warn!("Error processing {}: {}", path.display(), message);
        }
        info!(
            "Finished in {:.1}s! Successfully processed {}/{} files.",
            duration, report.succeeded, report.total
        );
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir().map_err(BatchError::from)?.join(path))
    }
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| {
        BatchError::Configuration(format!("Cannot resolve {}: {}", path.display(), e)).into()
    })
}
