//! # Media Batch Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare della pipeline
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test di integrazione
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione del run e validazione parametri
//! - `error`: Tassonomia degli errori (`BatchError`)
//! - `filter`: Ignore rules ed esclusione della output root
//! - `walker`: Discovery ricorsiva e mirroring dei path (`TreeWalker`)
//! - `processor`: Trait `WorkItemProcessor` e processor gifsicle/cwebp
//! - `dispatcher`: Pool concorrente limitato (`BoundedDispatcher`)
//! - `summary`: Aggregazione dei risultati (`RunSummary`)
//! - `pipeline`: Orchestratore del run completo
//! - `progress` / `json_output`: Feedback per terminale o per altri processi
//! - `tools`: Risoluzione dei tool esterni
//! - `tree`: Listing ad albero della directory di input
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use media_batch::{BatchPipeline, Config, Mode};
//!
//! let config = Config { input_dir: path, ..Config::for_mode(Mode::Gif) };
//! let report = BatchPipeline::new(config).await?.run().await?;
//! println!("{}", report);
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod json_output;
pub mod pipeline;
pub mod processor;
pub mod progress;
pub mod summary;
pub mod tools;
pub mod tree;
pub mod utils;
pub mod walker;

pub use config::{Config, Mode};
pub use dispatcher::BoundedDispatcher;
pub use error::BatchError;
pub use filter::IgnoreRules;
pub use pipeline::BatchPipeline;
pub use processor::{ProcessingResult, WorkItemProcessor};
pub use summary::{ProgressObserver, RunSummary, SummaryReport};
pub use walker::{Collision, Discovery, TreeWalker, WorkItem};
