//! # Configuration Management Module
//!
//! Questo modulo gestisce i parametri di un run batch.
//!
//! ## Responsabilità:
//! - Definisce `Mode` (ricompressione GIF o conversione WebP) e il predicato sul tipo di file
//! - Definisce la struct `Config` con tutti i parametri del run
//! - Validazione dei parametri prima di toccare qualsiasi file
//! - Caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri di configurazione:
//! - `quality`: livello lossy di gifsicle (0-200, default: 80) o qualità cwebp (0-100, default: 90)
//! - `preserve_alpha`: mantiene la trasparenza nel WebP (default: false, sfondo bianco)
//! - `optimize_level`: livello `-O` di gifsicle (1-3, default: 3)
//! - `workers`: numero di worker paralleli (default: 4)
//! - `output_dir`: directory di output (default: `<input>/output` o `<input>/webp_converted`)
//! - `ignore_file`: file di pattern da ignorare (default: `<input>/.gitignore` se presente)
//! - `timeout_secs`: timeout per singolo file (default: 180)
//! - `keep_processed`: salta i file il cui output esiste già
//! - `dry_run`: simula senza invocare il tool esterno
//! - `json_output`: output JSON al posto della progress bar
//!
//! ## Validazione:
//! Ogni controllo fallisce con `BatchError::Configuration`.
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     input_dir: PathBuf::from("/data/gifs"),
//!     quality: 120,
//!     workers: 8,
//!     ..Config::for_mode(Mode::Gif)
//! };
//! config.validate()?;
//! ```

use crate::error::BatchError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Which transformation a run applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Lossy LZW recompression of GIFs with gifsicle
    Gif,
    /// PNG/JPEG to WebP conversion with cwebp
    Webp,
}

impl Mode {
    /// Accepted quality (or lossy) values for this mode
    pub fn quality_range(&self) -> RangeInclusive<u16> {
        match self {
            Mode::Gif => 0..=200,
            Mode::Webp => 0..=100,
        }
    }

    pub fn default_quality(&self) -> u16 {
        match self {
            Mode::Gif => 80,
            Mode::Webp => 90,
        }
    }

    /// Output directory name used when none is given
    pub fn default_output_dir_name(&self) -> &'static str {
        match self {
            Mode::Gif => "output",
            Mode::Webp => "webp_converted",
        }
    }

    /// External tool the mode shells out to
    pub fn tool_name(&self) -> &'static str {
        match self {
            Mode::Gif => "gifsicle",
            Mode::Webp => "cwebp",
        }
    }

    /// Extension the output file gets, if it differs from the input's
    pub fn output_extension(&self) -> Option<&'static str> {
        match self {
            Mode::Gif => None,
            Mode::Webp => Some("webp"),
        }
    }

    /// File type predicate: case-insensitive extension match
    pub fn accepts(&self, path: &Path) -> bool {
        use image::ImageFormat;

        match (self, ImageFormat::from_path(path)) {
            (Mode::Gif, Ok(ImageFormat::Gif)) => true,
            (Mode::Webp, Ok(ImageFormat::Png | ImageFormat::Jpeg)) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Gif => write!(f, "gif"),
            Mode::Webp => write!(f, "webp"),
        }
    }
}

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the tree to process
    pub input_dir: PathBuf,
    /// Mirror root (None = mode default under the input root)
    pub output_dir: Option<PathBuf>,
    pub mode: Mode,
    /// gifsicle lossy level (0-200) or cwebp quality (0-100)
    pub quality: u16,
    /// Keep transparency in WebP output instead of flattening on white
    pub preserve_alpha: bool,
    /// gifsicle optimization level (1-3)
    pub optimize_level: u8,
    /// Number of parallel workers
    pub workers: usize,
    /// Line-oriented ignore pattern file
    pub ignore_file: Option<PathBuf>,
    /// Per-item timeout in seconds (None = wait forever)
    pub timeout_secs: Option<u64>,
    /// Skip files whose output already exists
    pub keep_processed: bool,
    /// Dry run - don't invoke the external tool
    pub dry_run: bool,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_mode(Mode::Gif)
    }
}

impl Config {
    /// Defaults for the given mode
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: None,
            mode,
            quality: mode.default_quality(),
            preserve_alpha: false,
            optimize_level: 3,
            workers: 4,
            ignore_file: None,
            timeout_secs: Some(180),
            keep_processed: false,
            dry_run: false,
            json_output: false,
        }
    }

    /// Output root, falling back to the mode default under the input root
    pub fn resolved_output_dir(&self) -> PathBuf {
        match self.output_dir {
            Some(ref dir) => dir.clone(),
            None => self.input_dir.join(self.mode.default_output_dir_name()),
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        let range = self.mode.quality_range();
        if !range.contains(&self.quality) {
            return Err(invalid(format!(
                "{} quality must be between {} and {}, got {}",
                self.mode,
                range.start(),
                range.end(),
                self.quality
            )));
        }

        if !(1..=3).contains(&self.optimize_level) {
            return Err(invalid("Optimization level must be between 1 and 3"));
        }

        if self.workers == 0 {
            return Err(invalid("Number of workers must be greater than 0"));
        }

        if self.timeout_secs == Some(0) {
            return Err(invalid("Timeout must be greater than 0 seconds"));
        }

        if !self.input_dir.is_dir() {
            return Err(invalid(format!(
                "Input path is not a directory: {}",
                self.input_dir.display()
            )));
        }
        if let Err(e) = std::fs::read_dir(&self.input_dir) {
            return Err(invalid(format!(
                "Input directory is not readable: {}: {}",
                self.input_dir.display(),
                e
            )));
        }

        let output_dir = self.resolved_output_dir();
        if output_dir.exists() && !output_dir.is_dir() {
            return Err(invalid(format!(
                "Output path is not a directory: {}",
                output_dir.display()
            )));
        }

        if let Some(ref ignore_file) = self.ignore_file {
            if !ignore_file.is_file() {
                return Err(invalid(format!(
                    "Ignore file does not exist: {}",
                    ignore_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| invalid(format!("Invalid config file {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    BatchError::Configuration(message.into()).into()
}
