//! Lossy GIF recompression with gifsicle.
//!
//! ```text
//! gifsicle --lossy=<0-200> -O<1-3> input.gif -o output.gif
//! ```

use crate::args;
use crate::config::Config;
use crate::processor::{run_tool, ProcessingResult, WorkItemProcessor};
use crate::tools::ToolResolver;
use crate::walker::WorkItem;
use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifOptions {
    /// `--lossy` level, 0-200
    pub lossy: u16,
    /// `-O` optimization level, 1-3
    pub optimize_level: u8,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            lossy: 80,
            optimize_level: 3,
        }
    }
}

impl From<&Config> for GifOptions {
    fn from(config: &Config) -> Self {
        Self {
            lossy: config.quality,
            optimize_level: config.optimize_level,
        }
    }
}

pub struct GifsicleProcessor {
    program: PathBuf,
    options: GifOptions,
}

impl GifsicleProcessor {
    pub const TOOL: &'static str = "gifsicle";

    /// Locate gifsicle, failing with `MissingDependency` if it isn't installed
    pub fn new(resolver: &ToolResolver, options: GifOptions) -> Result<Self> {
        let program = resolver.require(Self::TOOL)?;
        Ok(Self { program, options })
    }

    /// Use an explicit executable (no lookup)
    pub fn with_program(program: impl Into<PathBuf>, options: GifOptions) -> Self {
        Self {
            program: program.into(),
            options,
        }
    }
}

impl WorkItemProcessor for GifsicleProcessor {
    fn name(&self) -> &str {
        Self::TOOL
    }

    fn command_line(&self, item: &WorkItem) -> Vec<OsString> {
        args![
            format!("--lossy={}", self.options.lossy),
            format!("-O{}", self.options.optimize_level),
            item.input_path,
            "-o",
            item.output_path,
        ]
    }

    async fn process(&self, item: &WorkItem) -> ProcessingResult {
        let args = self.command_line(item);
        let outcome = run_tool(&self.program, &args, &item.output_path).await;
        ProcessingResult::from_outcome(item.clone(), outcome)
    }
}
