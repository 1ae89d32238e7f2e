//! # Media Batch - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Costruzione della `Config` (file opzionale + override da CLI)
//! - Avvio della pipeline e exit code in base al riepilogo
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (subcommand `gif`, `webp` o `tree`)
//! 2. Carica la config da `--config` se presente, poi applica gli override
//! 3. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 4. Istanzia `BatchPipeline` e avvia il run
//! 5. Exit code: 0 se tutto ok, 1 se almeno un file è fallito, 2 per un
//!    errore di setup (config, dipendenze mancanti)
//!
//! ## Esempio di utilizzo:
//! ```bash
//! media-batch gif /path/to/gifs --lossy 120 --threads 8
//! media-batch webp /path/to/images --quality 85 --preserve-alpha
//! media-batch tree /path/to/gifs
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use media_batch::json_output::JsonMessage;
use media_batch::tree::render_tree;
use media_batch::{BatchError, BatchPipeline, Config, IgnoreRules, Mode};

/// Exit status for runs that never reached dispatch
const SETUP_ERROR_EXIT: u8 = 2;

#[derive(Parser)]
#[command(name = "media-batch")]
#[command(about = "Mirror a directory tree through an external media compressor")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recompress every GIF with gifsicle
    Gif(GifArgs),

    /// Convert PNG/JPEG images to WebP with cwebp
    Webp(WebpArgs),

    /// Print the directory tree after ignore rules
    Tree {
        /// Directory to list
        directory: PathBuf,

        /// Ignore pattern file (default: <directory>/.gitignore)
        #[arg(long)]
        ignore_file: Option<PathBuf>,
    },
}

/// Options shared by every batch mode
#[derive(Args)]
struct RunArgs {
    /// Directory containing the files to process
    input_dir: PathBuf,

    /// Output directory (default: a mode-specific folder inside the input directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel workers [default: 4]
    #[arg(short = 't', long = "threads", visible_alias = "workers")]
    threads: Option<usize>,

    /// Ignore pattern file (default: <input>/.gitignore)
    #[arg(long)]
    ignore_file: Option<PathBuf>,

    /// Per-file timeout in seconds [default: 180]
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Skip files whose output already exists
    #[arg(long)]
    keep_processed: bool,

    /// Dry run - don't invoke the external tool
    #[arg(long)]
    dry_run: bool,

    /// Output progress and status as JSON for programmatic use
    #[arg(long)]
    json: bool,

    /// Load configuration from a JSON file (command-line flags take precedence)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to a JSON file before running
    #[arg(long)]
    save_config: Option<PathBuf>,
}

#[derive(Args)]
struct GifArgs {
    #[command(flatten)]
    run: RunArgs,

    /// gifsicle lossy level (0-200) [default: 80]
    #[arg(short, long)]
    lossy: Option<u16>,

    /// gifsicle optimization level (1-3) [default: 3]
    #[arg(short = 'O', long = "optimize")]
    optimize: Option<u8>,
}

#[derive(Args)]
struct WebpArgs {
    #[command(flatten)]
    run: RunArgs,

    /// cwebp quality (0-100) [default: 90]
    #[arg(short, long)]
    quality: Option<u16>,

    /// Keep transparency instead of flattening on a white background
    #[arg(long)]
    preserve_alpha: bool,
}

impl RunArgs {
    /// Base config for `mode`, from `--config` when given
    async fn base_config(&self, mode: Mode) -> Result<Config> {
        let mut config = match self.config {
            Some(ref path) => Config::from_file(path).await?,
            None => Config::for_mode(mode),
        };
        if config.mode != mode {
            config.mode = mode;
            config.quality = mode.default_quality();
        }
        Ok(config)
    }

    fn apply(self, config: &mut Config) {
        config.input_dir = self.input_dir;
        if self.output.is_some() {
            config.output_dir = self.output;
        }
        if let Some(threads) = self.threads {
            config.workers = threads;
        }
        if self.ignore_file.is_some() {
            config.ignore_file = self.ignore_file;
        }
        if self.timeout_secs.is_some() {
            config.timeout_secs = self.timeout_secs;
        }
        config.keep_processed |= self.keep_processed;
        config.dry_run |= self.dry_run;
        config.json_output |= self.json;
    }
}

impl GifArgs {
    async fn into_config(self) -> Result<(Config, Option<PathBuf>)> {
        let mut config = self.run.base_config(Mode::Gif).await?;
        if let Some(lossy) = self.lossy {
            config.quality = lossy;
        }
        if let Some(level) = self.optimize {
            config.optimize_level = level;
        }
        let save_path = self.run.save_config.clone();
        self.run.apply(&mut config);
        Ok((config, save_path))
    }
}

impl WebpArgs {
    async fn into_config(self) -> Result<(Config, Option<PathBuf>)> {
        let mut config = self.run.base_config(Mode::Webp).await?;
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        config.preserve_alpha |= self.preserve_alpha;
        let save_path = self.run.save_config.clone();
        self.run.apply(&mut config);
        Ok((config, save_path))
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let (config, save_path) = match cli.command {
        Command::Tree { directory, ignore_file } => {
            init_logging(cli.verbose, false)?;
            print_tree(&directory, ignore_file.as_deref())?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Gif(args) => args.into_config().await?,
        Command::Webp(args) => args.into_config().await?,
    };

    init_logging(cli.verbose, config.json_output)?;

    if let Some(path) = save_path {
        config.save_to_file(&path).await?;
        info!("Saved configuration to {}", path.display());
    }

    run_batch(config).await
}

async fn run_batch(config: Config) -> Result<ExitCode> {
    let json_output = config.json_output;

    let outcome = match BatchPipeline::new(config).await {
        Ok(pipeline) => pipeline.run().await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(report) if report.all_succeeded() => Ok(ExitCode::SUCCESS),
        Ok(_) => Ok(ExitCode::FAILURE),
        Err(e) => {
            if json_output {
                JsonMessage::error(e.to_string(), Some(format!("{:?}", e))).emit();
            }
            match e.downcast_ref::<BatchError>() {
                Some(setup_error) if setup_error.is_fatal() => {
                    error!("{}", setup_error);
                    Ok(ExitCode::from(SETUP_ERROR_EXIT))
                }
                _ => Err(e),
            }
        }
    }
}

fn print_tree(directory: &Path, ignore_file: Option<&Path>) -> Result<()> {
    if !directory.is_dir() {
        return Err(BatchError::Configuration(format!(
            "Not a directory: {}",
            directory.display()
        ))
        .into());
    }

    let rules = match ignore_file {
        Some(path) => IgnoreRules::load(path)?,
        None => IgnoreRules::from_dir(directory)?,
    };

    println!("{}/", directory.display());
    let rendered = render_tree(directory, &rules);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    Ok(())
}

fn init_logging(verbose: bool, to_stderr: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let result = if to_stderr {
        builder.with_writer(std::io::stderr).try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
