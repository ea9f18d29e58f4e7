//! Submission and member-file discovery by glob pattern.
//!
//! Patterns are matched against paths *relative to the base directory*,
//! with `*` never crossing a `/`, the same as shell globbing:
//! `*/p03*` under `~/course` matches `~/course/alice/p03-repo` but not
//! `~/course/alice/src/p03-repo`. Results are sorted so runs are
//! reproducible regardless of directory iteration order.

use globset::{Glob, GlobMatcher};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Errors from pattern compilation or directory walking.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to read directory '{path}': {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// One submission: a folder and the member files found in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFolder {
    pub path: PathBuf,
    /// Folder basename; the combined PDF is written as `<name>.pdf`.
    pub name: String,
    /// Member files in discovery order.
    pub files: Vec<PathBuf>,
}

impl SubmissionFolder {
    pub fn new(path: impl Into<PathBuf>, files: Vec<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "submission".to_string());
        Self { path, name, files }
    }
}

/// Folders under `root` matching `folder_pattern`, each with its files
/// matching `file_pattern`.
pub fn discover_submissions(
    root: &Path,
    folder_pattern: &str,
    file_pattern: &str,
) -> Result<Vec<SubmissionFolder>, DiscoverError> {
    discover_folders(root, folder_pattern)?
        .into_iter()
        .map(|folder| {
            let files = discover_files(&folder, file_pattern)?;
            Ok(SubmissionFolder::new(folder, files))
        })
        .collect()
}

/// Directories under `root` matching `pattern`.
pub fn discover_folders(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, DiscoverError> {
    let found = walk_matching(root, pattern, |entry| entry.file_type().is_dir())?;
    debug!(root = %root.display(), pattern, count = found.len(), "Discovered submission folders");
    Ok(found)
}

/// Regular files under `folder` matching `pattern`.
pub fn discover_files(folder: &Path, pattern: &str) -> Result<Vec<PathBuf>, DiscoverError> {
    walk_matching(folder, pattern, |entry| entry.file_type().is_file())
}

/// Expand a leading `~` / `~/` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

fn walk_matching(
    base: &Path,
    pattern: &str,
    keep: impl Fn(&walkdir::DirEntry) -> bool,
) -> Result<Vec<PathBuf>, DiscoverError> {
    let matcher = compile(pattern)?;
    // A pattern can only match paths with as many components as it has.
    let depth = pattern.split('/').filter(|c| !c.is_empty()).count();
    let max_depth = if pattern.contains("**") { usize::MAX } else { depth.max(1) };

    let mut found = Vec::new();
    let walker = WalkDir::new(base)
        .follow_links(true)
        .min_depth(1)
        .max_depth(max_depth);
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // An unreadable base is fatal; anything below it is skipped.
            Err(source) if source.depth() == 0 => {
                return Err(DiscoverError::Walk {
                    path: base.to_path_buf(),
                    source,
                })
            }
            Err(e) => {
                warn!(base = %base.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !keep(&entry) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        if matcher.is_match(relative) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

fn compile(pattern: &str) -> Result<GlobMatcher, DiscoverError> {
    globset::GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|g: Glob| g.compile_matcher())
        .map_err(|source| DiscoverError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn folders_match_one_level_down() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let root = tmp.path();
        fs::create_dir_all(root.join("bob/p03-bob")).unwrap();
        fs::create_dir_all(root.join("alice/p03-alice")).unwrap();
        fs::create_dir_all(root.join("alice/src/p03-nested")).unwrap();
        fs::create_dir_all(root.join("carol/p04-carol")).unwrap();

        let found = discover_folders(root, "*/p03*").expect("discover");
        assert_eq!(
            found,
            vec![root.join("alice/p03-alice"), root.join("bob/p03-bob")]
        );
    }

    #[test]
    fn files_sorted_and_filtered() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let folder = tmp.path();
        touch(&folder.join("p03_b.py"));
        touch(&folder.join("p03_a.md"));
        touch(&folder.join("other.py"));
        touch(&folder.join("sub/p03_deep.py"));
        fs::create_dir_all(folder.join("p03_dir")).unwrap();

        let found = discover_files(folder, "p03*").expect("discover");
        assert_eq!(found, vec![folder.join("p03_a.md"), folder.join("p03_b.py")]);
    }

    #[test]
    fn submissions_pair_folders_with_files() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let root = tmp.path();
        touch(&root.join("alice/p03/p03_main.py"));
        touch(&root.join("alice/p03/p03_README.md"));
        touch(&root.join("alice/p03/scratch.txt"));
        fs::create_dir_all(root.join("bob/p03")).unwrap();

        let subs = discover_submissions(root, "*/p03*", "p03*").expect("discover");
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].name, "p03");
        assert_eq!(
            subs[0].files,
            vec![
                root.join("alice/p03/p03_README.md"),
                root.join("alice/p03/p03_main.py")
            ]
        );
        assert!(subs[1].files.is_empty());
    }

    #[test]
    fn bad_pattern_is_reported() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let err = discover_files(tmp.path(), "p03[").unwrap_err();
        assert!(err.to_string().contains("p03["), "got: {err}");
    }

    #[test]
    fn missing_base_is_an_error() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let err = discover_folders(&tmp.path().join("absent"), "*/p03*").unwrap_err();
        assert!(matches!(err, DiscoverError::Walk { .. }), "got {err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_folders_are_followed() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let root = tmp.path().join("root");
        let elsewhere = tmp.path().join("elsewhere/p03-carol");
        touch(&elsewhere.join("p03_main.py"));
        fs::create_dir_all(root.join("carol")).unwrap();
        std::os::unix::fs::symlink(&elsewhere, root.join("carol/p03-carol")).unwrap();

        let subs = discover_submissions(&root, "*/p03*", "p03*").expect("discover");
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].path, root.join("carol/p03-carol"));
        assert_eq!(subs[0].files, vec![root.join("carol/p03-carol/p03_main.py")]);
    }

    #[cfg(unix)]
    #[test]
    fn link_cycle_is_skipped_not_fatal() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let folder = tmp.path();
        touch(&folder.join("a.py"));
        touch(&folder.join("sub/b.py"));
        std::os::unix::fs::symlink(folder, folder.join("sub/loop")).unwrap();

        let found = discover_files(folder, "**/*.py").expect("discover");
        assert_eq!(found, vec![folder.join("a.py"), folder.join("sub/b.py")]);
    }

    #[test]
    fn expand_home_only_touches_tilde() {
        assert_eq!(expand_home(Path::new("/abs/path")), PathBuf::from("/abs/path"));
        assert_eq!(expand_home(Path::new("rel")), PathBuf::from("rel"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/src")), home.join("src"));
        }
    }
}
