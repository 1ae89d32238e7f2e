use media_batch::progress::ProgressManager;
use media_batch::{
    BatchError, BatchPipeline, Config, Mode, ProcessingResult, SummaryReport, WorkItem, WorkItemProcessor,
};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Copies input to output; fails on purpose for one file name
struct CopyProcessor {
    fail_on: Option<&'static str>,
}

impl CopyProcessor {
    fn new() -> Self {
        Self { fail_on: None }
    }

    fn failing_on(name: &'static str) -> Self {
        Self { fail_on: Some(name) }
    }
}

impl WorkItemProcessor for CopyProcessor {
    fn name(&self) -> &str {
        "copy"
    }

    fn command_line(&self, item: &WorkItem) -> Vec<OsString> {
        media_batch::args!["cp", item.input_path, item.output_path]
    }

    async fn process(&self, item: &WorkItem) -> ProcessingResult {
        if self.fail_on.is_some_and(|name| item.input_path.ends_with(name)) {
            return ProcessingResult::failed(item.clone(), "rigged failure");
        }
        let outcome = tokio::fs::copy(&item.input_path, &item.output_path)
            .await
            .map(|_| ())
            .map_err(BatchError::from);
        ProcessingResult::from_outcome(item.clone(), outcome)
    }
}

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"GIF89a").unwrap();
}

fn files_under(root: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().strip_prefix(root).unwrap().to_path_buf())
        .collect()
}

fn gif_config(root: &Path) -> Config {
    Config {
        input_dir: root.to_path_buf(),
        ..Config::for_mode(Mode::Gif)
    }
}

async fn run_copy(config: Config, processor: CopyProcessor) -> (BatchPipeline, SummaryReport) {
    let pipeline = BatchPipeline::new(config).await.unwrap();
    let total = pipeline.discover().total() as u64;
    let report = pipeline
        .run_with_observer(processor, Box::new(ProgressManager::hidden(total)))
        .await
        .unwrap();
    (pipeline, report)
}

#[tokio::test]
async fn test_mirrors_tree_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.gif");
    touch(dir.path(), "sub/b.GIF");
    touch(dir.path(), "sub/deep/c.gif");
    touch(dir.path(), "sub/notes.txt");
    std::fs::create_dir_all(dir.path().join("empty")).unwrap();

    let (pipeline, first) = run_copy(gif_config(dir.path()), CopyProcessor::new()).await;
    assert_eq!(first, SummaryReport { total: 3, succeeded: 3 });

    let output_root = pipeline.output_root().to_path_buf();
    let expected: BTreeSet<PathBuf> = ["a.gif", "sub/b.GIF", "sub/deep/c.gif"]
        .iter()
        .map(PathBuf::from)
        .collect();
    assert_eq!(files_under(&output_root), expected);
    assert!(!output_root.join("empty").exists());

    // The output root now lives inside the input tree and must stay invisible.
    let (_, second) = run_copy(gif_config(dir.path()), CopyProcessor::new()).await;
    assert_eq!(second, first);
    assert_eq!(files_under(&output_root), expected);
}

#[tokio::test]
async fn test_one_rigged_failure_does_not_stop_the_run() {
    let dir = TempDir::new().unwrap();
    for i in 0..5 {
        touch(dir.path(), &format!("clips/{}.gif", i));
    }

    let config = Config {
        workers: 2,
        ..gif_config(dir.path())
    };
    let (pipeline, report) = run_copy(config, CopyProcessor::failing_on("3.gif")).await;

    assert_eq!(report, SummaryReport { total: 5, succeeded: 4 });
    assert!(!report.all_succeeded());
    let outputs = files_under(pipeline.output_root());
    assert_eq!(outputs.len(), 4);
    assert!(!outputs.contains(Path::new("clips/3.gif")));
}

#[tokio::test]
async fn test_existing_output_inside_input_is_never_a_work_item() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "x.gif");
    touch(dir.path(), "output/x.gif");
    touch(dir.path(), "output/stale/y.gif");

    let pipeline = BatchPipeline::new(gif_config(dir.path())).await.unwrap();
    let items = pipeline.discover().items;

    assert_eq!(items.len(), 1);
    assert!(items
        .iter()
        .all(|item| !item.input_path.starts_with(pipeline.output_root())));
}

#[tokio::test]
async fn test_explicit_output_outside_input() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    touch(input.path(), "a/b/c.gif");

    let config = Config {
        output_dir: Some(output.path().join("mirror")),
        ..gif_config(input.path())
    };
    let (pipeline, report) = run_copy(config, CopyProcessor::new()).await;

    assert_eq!(report.total, 1);
    assert!(pipeline.output_root().join("a/b/c.gif").is_file());
    assert!(!input.path().join("output").exists());
}

#[tokio::test]
async fn test_keep_processed_skips_existing_outputs() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.gif");
    touch(dir.path(), "b.gif");

    let (_, first) = run_copy(gif_config(dir.path()), CopyProcessor::new()).await;
    assert_eq!(first.total, 2);

    touch(dir.path(), "c.gif");
    let config = Config {
        keep_processed: true,
        ..gif_config(dir.path())
    };
    let (_, second) = run_copy(config, CopyProcessor::new()).await;
    assert_eq!(second, SummaryReport { total: 1, succeeded: 1 });
}

#[tokio::test]
async fn test_webp_mode_rewrites_extension() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "photos/a.PNG");
    touch(dir.path(), "photos/b.jpeg");
    touch(dir.path(), "photos/c.gif");

    let config = Config {
        input_dir: dir.path().to_path_buf(),
        ..Config::for_mode(Mode::Webp)
    };
    let pipeline = BatchPipeline::new(config).await.unwrap();
    let outputs: BTreeSet<PathBuf> = pipeline
        .discover()
        .items
        .into_iter()
        .map(|item| item.output_path.strip_prefix(pipeline.output_root()).unwrap().to_path_buf())
        .collect();

    let expected: BTreeSet<PathBuf> = ["photos/a.webp", "photos/b.webp"].iter().map(PathBuf::from).collect();
    assert_eq!(outputs, expected);
}

#[tokio::test]
async fn test_colliding_outputs_count_as_failures() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.png");
    touch(dir.path(), "a.jpg");
    touch(dir.path(), "b.png");

    let config = Config {
        input_dir: dir.path().to_path_buf(),
        ..Config::for_mode(Mode::Webp)
    };
    let (pipeline, report) = run_copy(config, CopyProcessor::new()).await;

    assert_eq!(report, SummaryReport { total: 3, succeeded: 2 });
    assert!(!report.all_succeeded());
    let expected: BTreeSet<PathBuf> = ["a.webp", "b.webp"].iter().map(PathBuf::from).collect();
    assert_eq!(files_under(pipeline.output_root()), expected);
}

#[tokio::test]
async fn test_quality_bounds_are_checked_before_anything_runs() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.gif");

    for quality in [0, 200] {
        let config = Config {
            quality,
            ..gif_config(dir.path())
        };
        assert!(BatchPipeline::new(config).await.is_ok(), "lossy {} rejected", quality);
    }
    std::fs::remove_dir_all(dir.path().join("output")).unwrap();

    let cases = [(Mode::Gif, 201), (Mode::Webp, 101)];
    for (mode, quality) in cases {
        let config = Config {
            input_dir: dir.path().to_path_buf(),
            quality,
            ..Config::for_mode(mode)
        };
        let err = BatchPipeline::new(config).await.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<BatchError>(),
            Some(BatchError::Configuration(_))
        ));
    }
    assert!(!dir.path().join("output").exists());
    assert!(!dir.path().join("webp_converted").exists());
}

#[tokio::test]
async fn test_many_workers_on_many_files() {
    let dir = TempDir::new().unwrap();
    for i in 0..40 {
        touch(dir.path(), &format!("d{}/f{}.gif", i % 7, i));
    }

    let config = Config {
        workers: 64,
        ..gif_config(dir.path())
    };
    let (pipeline, report) = run_copy(config, CopyProcessor::new()).await;

    assert_eq!(report, SummaryReport { total: 40, succeeded: 40 });
    assert_eq!(files_under(pipeline.output_root()).len(), 40);
}
