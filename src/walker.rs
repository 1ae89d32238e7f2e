//! # Tree Walker Module
//!
//! Questo modulo gestisce la discovery dei file da elaborare.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva (depth-first, entry ordinate per nome a ogni livello)
//! - Applica `filter::should_skip` a file e directory; una directory saltata
//!   esclude tutto il suo sottoalbero
//! - Calcola il path di output speculare: `output_root/<path relativo>`,
//!   con estensione opzionalmente sostituita (modalità WebP)
//! - Crea le directory di output in modo lazy, subito prima di emettere il
//!   primo `WorkItem` che vi scrive, così i processor non creano directory
//!
//! ## Errori di discovery:
//! Una directory non leggibile (permessi, symlink rotto) viene loggata e
//! saltata; il walk continua.
//!
//! ## Esempio:
//! ```rust,ignore
//! let items = TreeWalker::new("/data", "/data/output")
//!     .with_ignore_rules(rules)
//!     .walk(|path| Mode::Gif.accepts(path));
//! ```

use crate::error::BatchError;
use crate::filter::{should_skip, IgnoreRules};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// One discovered input file paired with its mirrored output destination
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl WorkItem {
    pub fn new(input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            input_path,
            output_path,
        }
    }

    /// File name of the input, for progress messages
    pub fn display_name(&self) -> String {
        self.input_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }
}

/// An eligible input whose mirrored output was already taken by an earlier input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub item: WorkItem,
    /// Input that owns `item.output_path`
    pub claimed_by: PathBuf,
}

/// Result of a walk: items to dispatch plus inputs rejected for colliding outputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub items: Vec<WorkItem>,
    pub collisions: Vec<Collision>,
}

impl Discovery {
    /// Every eligible input found, dispatched or not
    pub fn total(&self) -> usize {
        self.items.len() + self.collisions.len()
    }
}

/// Enumerates a root directory into work items
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    output_root: PathBuf,
    rules: IgnoreRules,
    output_extension: Option<String>,
    keep_processed: bool,
}

impl TreeWalker {
    pub fn new(root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_root: output_root.into(),
            rules: IgnoreRules::default(),
            output_extension: None,
            keep_processed: false,
        }
    }

    pub fn with_ignore_rules(mut self, rules: IgnoreRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the extension of every output path (e.g. `webp`)
    pub fn with_output_extension(mut self, extension: Option<&str>) -> Self {
        self.output_extension = extension.map(str::to_string);
        self
    }

    /// Leave out files whose mirrored output already exists
    pub fn keep_processed(mut self, keep: bool) -> Self {
        self.keep_processed = keep;
        self
    }

    /// Mirrored output path for an input under the root
    pub fn mirror_path(&self, input_path: &Path) -> Option<PathBuf> {
        let relative = input_path.strip_prefix(&self.root).ok()?;
        let mut output_path = self.output_root.join(relative);
        if let Some(ref extension) = self.output_extension {
            output_path.set_extension(extension);
        }
        Some(output_path)
    }

    /// Walk the tree and materialize every work item
    pub fn walk<F>(&self, accepts: F) -> Vec<WorkItem>
    where
        F: Fn(&Path) -> bool,
    {
        self.discover(accepts).items
    }

    /// Walk the tree, keeping inputs whose output path was already claimed.
    ///
    /// `accepts` is the file type predicate; it only sees regular files that
    /// passed the path filter.
    pub fn discover<F>(&self, accepts: F) -> Discovery
    where
        F: Fn(&Path) -> bool,
    {
        let mut items = Vec::new();
        let mut collisions = Vec::new();
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut created_dirs: HashSet<PathBuf> = HashSet::new();

        let entries = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let skip = should_skip(entry.path(), &self.root, &self.output_root, &self.rules);
                if skip {
                    debug!("Skipping {}", entry.path().display());
                }
                !skip
            });

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let err = BatchError::Discovery {
                        path: e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone()),
                        message: e.to_string(),
                    };
                    warn!("{}, skipping", err);
                    continue;
                }
            };

            if !is_regular_file(&entry) || !accepts(entry.path()) {
                continue;
            }

            let Some(output_path) = self.mirror_path(entry.path()) else {
                continue;
            };

            if let Some(owner) = claimed.get(&output_path) {
                warn!(
                    "Output {} already claimed by {}, skipping {}",
                    output_path.display(),
                    owner.display(),
                    entry.path().display()
                );
                collisions.push(Collision {
                    claimed_by: owner.clone(),
                    item: WorkItem::new(entry.into_path(), output_path),
                });
                continue;
            }
            claimed.insert(output_path.clone(), entry.path().to_path_buf());

            if self.keep_processed && output_path.exists() {
                debug!("Output already exists, skipping: {}", output_path.display());
                continue;
            }

            if let Some(parent) = output_path.parent() {
                if !created_dirs.contains(parent) {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        warn!("Failed to create output directory {}: {}", parent.display(), e);
                        continue;
                    }
                    created_dirs.insert(parent.to_path_buf());
                }
            }

            items.push(WorkItem::new(entry.into_path(), output_path));
        }

        debug!("Discovered {} work items under {}", items.len(), self.root.display());
        Discovery { items, collisions }
    }
}

/// Plain files and symlinks that resolve to one; broken links are dropped
fn is_regular_file(entry: &DirEntry) -> bool {
    if entry.file_type().is_file() {
        return true;
    }
    if entry.path_is_symlink() {
        if entry.path().is_file() {
            return true;
        }
        debug!("Ignoring dangling or non-file symlink: {}", entry.path().display());
    }
    false
}

/// Enumerate `root` into work items mirrored under `output_root`
pub fn walk<F>(root: &Path, output_root: &Path, accepts: F, rules: &IgnoreRules) -> Vec<WorkItem>
where
    F: Fn(&Path) -> bool,
{
    TreeWalker::new(root, output_root)
        .with_ignore_rules(rules.clone())
        .walk(accepts)
}
