//! # File Tree Listing
//!
//! Renders a directory as an ASCII tree, honouring the same ignore rules as
//! the batch walker. Entries are sorted by name; directories get a trailing
//! `/`. Symlinks are listed but never followed.
//!
//! ```text
//! ├── clips/
//! │   ├── a.gif
//! │   └── b.gif
//! └── cover.png
//! ```

use crate::filter::{relative_key, IgnoreRules};
use std::fs;
use std::path::Path;
use tracing::warn;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Render `root` as a tree, one line per visible entry
pub fn render_tree(root: &Path, rules: &IgnoreRules) -> String {
    let mut lines = Vec::new();
    render_dir(root, root, rules, "", &mut lines);
    lines.join("\n")
}

fn render_dir(dir: &Path, root: &Path, rules: &IgnoreRules, prefix: &str, lines: &mut Vec<String>) {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) => {
            warn!("Cannot list {}: {}", dir.display(), e);
            lines.push(format!("{}[error reading {}: {}]", prefix, dir.display(), e));
            return;
        }
    };

    let mut entries: Vec<_> = read
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let path = entry.path();
            match relative_key(&path, root) {
                Some(relative) => !rules.matches(&relative),
                None => true,
            }
        })
        .collect();
    entries.sort_by_key(|entry| entry.file_name());

    let count = entries.len();
    for (index, entry) in entries.into_iter().enumerate() {
        let is_last = index + 1 == count;
        let connector = if is_last { LAST_BRANCH } else { BRANCH };
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_dir {
            lines.push(format!("{}{}{}/", prefix, connector, name));
            let child_prefix = format!("{}{}", prefix, if is_last { SPACE } else { PIPE });
            render_dir(&entry.path(), root, rules, &child_prefix, lines);
        } else {
            lines.push(format!("{}{}{}", prefix, connector, name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_render_tree() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "clips/a.gif");
        touch(dir.path(), "clips/b.gif");
        touch(dir.path(), "cover.png");
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        let expected = [
            "├── clips/",
            "│   ├── a.gif",
            "│   └── b.gif",
            "├── cover.png",
            "└── empty/",
        ]
        .join("\n");
        assert_eq!(render_tree(dir.path(), &IgnoreRules::new()), expected);
    }

    #[test]
    fn test_render_tree_honours_ignore_rules() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "build/out.gif");
        touch(dir.path(), "src/tmp_file.gif");
        touch(dir.path(), "src/keep.gif");

        let rules = IgnoreRules::from_patterns(["/build", "tmp"]);
        let expected = ["└── src/", "    └── keep.gif"].join("\n");
        assert_eq!(render_tree(dir.path(), &rules), expected);
    }

    #[test]
    fn test_render_missing_dir_reports_inline() {
        let dir = TempDir::new().unwrap();
        let rendered = render_tree(&dir.path().join("gone"), &IgnoreRules::new());
        assert!(rendered.starts_with("[error reading"));
    }
}
