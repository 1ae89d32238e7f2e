//! # Processor Module
//!
//! Una unità di lavoro: trasforma un file di input in un file di output
//! tramite un tool esterno.
//!
//! - `gif`: ricompressione lossy con gifsicle
//! - `webp`: conversione PNG/JPEG → WebP con cwebp
//! - `DryRun`: wrapper che logga il comando senza eseguirlo
//!
//! Il contratto è sempre lo stesso: un solo tentativo per item, nessun retry,
//! e qualsiasi fallimento (tool non avviabile, exit code non zero, input
//! malformato) diventa un `ProcessingResult` con `ok = false`. Un fallimento
//! può lasciare un file di output parziale.

pub mod gif;
pub mod webp;

pub use gif::{GifOptions, GifsicleProcessor};
pub use webp::{WebpOptions, WebpProcessor};

use crate::error::BatchError;
use crate::walker::WorkItem;
use std::ffi::OsString;
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Outcome of one work item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    pub item: WorkItem,
    pub ok: bool,
    pub detail: Option<String>,
}

impl ProcessingResult {
    pub fn succeeded(item: WorkItem) -> Self {
        Self {
            item,
            ok: true,
            detail: None,
        }
    }

    pub fn failed(item: WorkItem, detail: impl Into<String>) -> Self {
        Self {
            item,
            ok: false,
            detail: Some(detail.into()),
        }
    }

    /// Fold a tool outcome into a result
    pub fn from_outcome(item: WorkItem, outcome: Result<(), BatchError>) -> Self {
        match outcome {
            Ok(()) => Self::succeeded(item),
            Err(e) => Self::failed(item, e.to_string()),
        }
    }
}

/// Transforms one input file into one output file.
///
/// Implementations must not panic or return early on failure: every call
/// yields exactly one `ProcessingResult` for the item it was given.
pub trait WorkItemProcessor: Send + Sync + 'static {
    /// Short name used in logs (usually the tool name)
    fn name(&self) -> &str;

    /// External command line for `item`, used for logging and dry runs
    fn command_line(&self, item: &WorkItem) -> Vec<OsString>;

    fn process(&self, item: &WorkItem) -> impl Future<Output = ProcessingResult> + Send;
}

/// Run an external tool once and verify it produced `output`
pub async fn run_tool(program: &Path, args: &[OsString], output: &Path) -> Result<(), BatchError> {
    debug!("Running {} {:?}", program.display(), args);

    let result = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| BatchError::Transformation {
            path: output.to_path_buf(),
            message: format!("failed to start {}: {}", program.display(), e),
        })?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(BatchError::Transformation {
            path: output.to_path_buf(),
            message: format!(
                "{} exited with {}: {}",
                program.display(),
                result.status,
                stderr.trim()
            ),
        });
    }

    if !output.is_file() {
        return Err(BatchError::Transformation {
            path: output.to_path_buf(),
            message: format!("{} reported success but wrote no output", program.display()),
        });
    }

    Ok(())
}

/// Logs what would run and reports success without touching the filesystem
pub struct DryRun<P> {
    inner: P,
}

impl<P: WorkItemProcessor> DryRun<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P: WorkItemProcessor> WorkItemProcessor for DryRun<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn command_line(&self, item: &WorkItem) -> Vec<OsString> {
        self.inner.command_line(item)
    }

    async fn process(&self, item: &WorkItem) -> ProcessingResult {
        let command: Vec<_> = self
            .command_line(item)
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        info!("Dry run: would run {} {}", self.name(), command.join(" "));
        ProcessingResult::succeeded(item.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn item(dir: &Path) -> WorkItem {
        WorkItem::new(dir.join("in.gif"), dir.join("out.gif"))
    }

    #[test]
    fn test_from_outcome() {
        let item = WorkItem::new(PathBuf::from("/a.gif"), PathBuf::from("/out/a.gif"));
        let ok = ProcessingResult::from_outcome(item.clone(), Ok(()));
        assert!(ok.ok);
        assert!(ok.detail.is_none());

        let failed = ProcessingResult::from_outcome(
            item,
            Err(BatchError::Transformation {
                path: PathBuf::from("/out/a.gif"),
                message: "exit 1".into(),
            }),
        );
        assert!(!failed.ok);
        assert!(failed.detail.unwrap().contains("exit 1"));
    }

    #[tokio::test]
    async fn test_run_tool_missing_program_is_captured() {
        let dir = TempDir::new().unwrap();
        let item = item(dir.path());
        let err = run_tool(
            Path::new("/definitely/not/a/program"),
            &[],
            &item.output_path,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BatchError::Transformation { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_tool_nonzero_exit() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.gif");
        let err = run_tool(Path::new("/bin/sh"), &crate::args!["-c", "echo broken >&2; exit 3"], &output)
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("broken"), "{}", message);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_tool_requires_output_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.gif");
        assert!(run_tool(Path::new("/bin/sh"), &crate::args!["-c", "exit 0"], &output)
            .await
            .is_err());

        let script = format!("echo data > '{}'", output.display());
        run_tool(Path::new("/bin/sh"), &crate::args!["-c", script], &output)
            .await
            .unwrap();
        assert!(output.is_file());
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let processor = DryRun::new(GifsicleProcessor::with_program(
            "/definitely/not/gifsicle",
            GifOptions::default(),
        ));
        let item = item(dir.path());
        let result = processor.process(&item).await;
        assert!(result.ok);
        assert!(!item.output_path.exists());
    }
}
