//! File classification: pick a renderer from the file name alone.
//!
//! Matching is a plain suffix test on the file name, case as found
//! (`README.MD` is not Markdown unless `.MD` is configured). Anything that
//! matches neither list is [`FileKind::Unsupported`], which is a normal
//! outcome: the orchestrator logs it and moves on.

use crate::config::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which rendering path a member file takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Code,
    Markdown,
    Unsupported,
}

/// One file inside a submission folder, classified once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberFile {
    pub path: PathBuf,
    pub name: String,
    pub kind: FileKind,
    /// Stem for this file's intermediates in the scratch directory.
    /// Unique within a folder once [`MemberFile::indexed`] was applied.
    pub scratch_key: String,
}

impl MemberFile {
    pub fn new(path: impl Into<PathBuf>, config: &PipelineConfig) -> Self {
        let path = path.into();
        let name = file_name(&path);
        let kind = classify_name(&name, config);
        let scratch_key = name.clone();
        Self {
            path,
            name,
            kind,
            scratch_key,
        }
    }

    /// Prefix the scratch key with the discovery index, so `a/main.py` and
    /// `b/main.py` in one folder never share intermediates.
    pub fn indexed(mut self, index: usize) -> Self {
        self.scratch_key = format!("{index:03}-{}", self.name);
        self
    }
}

/// Classify `path` against the configured suffix lists.
pub fn classify(path: &Path, config: &PipelineConfig) -> FileKind {
    classify_name(&file_name(path), config)
}

fn classify_name(name: &str, config: &PipelineConfig) -> FileKind {
    // Code is checked first; the default lists do not overlap.
    if matches_any(name, &config.code_extensions) {
        FileKind::Code
    } else if matches_any(name, &config.markdown_extensions) {
        FileKind::Markdown
    } else {
        FileKind::Unsupported
    }
}

fn matches_any(name: &str, suffixes: &[String]) -> bool {
    suffixes
        .iter()
        .any(|s| !s.is_empty() && name.len() > s.len() && name.ends_with(s.as_str()))
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn recognises_code_and_markdown() {
        let c = config();
        assert_eq!(classify(Path::new("sub1/main.py"), &c), FileKind::Code);
        assert_eq!(classify(Path::new("sub1/lib.rs"), &c), FileKind::Code);
        assert_eq!(classify(Path::new("sub1/README.md"), &c), FileKind::Markdown);
        assert_eq!(classify(Path::new("notes.markdown"), &c), FileKind::Markdown);
    }

    #[test]
    fn unknown_suffix_is_unsupported() {
        let c = config();
        assert_eq!(classify(Path::new("sub1/notes.txt"), &c), FileKind::Unsupported);
        assert_eq!(classify(Path::new("Makefile"), &c), FileKind::Unsupported);
    }

    #[test]
    fn case_is_taken_as_found() {
        let c = config();
        assert_eq!(classify(Path::new("README.MD"), &c), FileKind::Unsupported);
        assert_eq!(classify(Path::new("MAIN.PY"), &c), FileKind::Unsupported);
    }

    #[test]
    fn suffix_not_substring() {
        let c = config();
        // ".py" appears in the name but not at the end
        assert_eq!(classify(Path::new("p03.pyc"), &c), FileKind::Unsupported);
        assert_eq!(classify(Path::new("notes.md.bak"), &c), FileKind::Unsupported);
    }

    #[test]
    fn bare_suffix_is_not_a_file_name() {
        let c = config();
        assert_eq!(classify(Path::new(".md"), &c), FileKind::Unsupported);
    }

    #[test]
    fn member_file_records_name_and_kind() {
        let m = MemberFile::new("sub1/p03_train.py", &config());
        assert_eq!(m.name, "p03_train.py");
        assert_eq!(m.kind, FileKind::Code);
    }

    #[test]
    fn indexed_keys_differ_for_same_name() {
        let c = config();
        let a = MemberFile::new("sub1/a/main.py", &c).indexed(0);
        let b = MemberFile::new("sub1/b/main.py", &c).indexed(1);
        assert_eq!(a.name, b.name);
        assert_eq!(a.scratch_key, "000-main.py");
        assert_eq!(b.scratch_key, "001-main.py");
    }
}
