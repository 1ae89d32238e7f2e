//! PNG/JPEG to WebP conversion with cwebp.
//!
//! Transparent inputs are flattened onto a white background unless
//! `preserve_alpha` is set:
//!
//! ```text
//! cwebp -q <0-100> [-blend_alpha 0xffffff -noalpha] -m 4 -mt input.png -o output.webp
//! ```

use crate::args;
use crate::config::Config;
use crate::processor::{run_tool, ProcessingResult, WorkItemProcessor};
use crate::tools::ToolResolver;
use crate::walker::WorkItem;
use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;

/// Background used when flattening alpha
const WHITE: &str = "0xffffff";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebpOptions {
    /// `-q` quality, 0-100
    pub quality: u16,
    pub preserve_alpha: bool,
}

impl Default for WebpOptions {
    fn default() -> Self {
        Self {
            quality: 90,
            preserve_alpha: false,
        }
    }
}

impl From<&Config> for WebpOptions {
    fn from(config: &Config) -> Self {
        Self {
            quality: config.quality,
            preserve_alpha: config.preserve_alpha,
        }
    }
}

pub struct WebpProcessor {
    program: PathBuf,
    options: WebpOptions,
}

impl WebpProcessor {
    pub const TOOL: &'static str = "cwebp";

    pub fn new(resolver: &ToolResolver, options: WebpOptions) -> Result<Self> {
        let program = resolver.require(Self::TOOL)?;
        Ok(Self { program, options })
    }

    pub fn with_program(program: impl Into<PathBuf>, options: WebpOptions) -> Self {
        Self {
            program: program.into(),
            options,
        }
    }
}

impl WorkItemProcessor for WebpProcessor {
    fn name(&self) -> &str {
        Self::TOOL
    }

    fn command_line(&self, item: &WorkItem) -> Vec<OsString> {
        let mut args = args!["-q", self.options.quality.to_string()];
        if !self.options.preserve_alpha {
            args.extend(args!["-blend_alpha", WHITE, "-noalpha"]);
        }
        args.extend(args!["-m", "4", "-mt", item.input_path, "-o", item.output_path]);
        args
    }

    async fn process(&self, item: &WorkItem) -> ProcessingResult {
        let args = self.command_line(item);
        let outcome = run_tool(&self.program, &args, &item.output_path).await;
        ProcessingResult::from_outcome(item.clone(), outcome)
    }
}
