//! The shared intermediate working directory.
//!
//! One scratch tree (`<work_dir>/` plus `<work_dir>/html/`) is reused for
//! every folder. It is removed and recreated before each folder so nothing
//! rendered for folder *i* can be picked up while assembling folder *i+1*.

use crate::error::SubmissionError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Paths inside a freshly reset scratch directory.
#[derive(Debug, Clone)]
pub struct Scratch {
    root: PathBuf,
    html: PathBuf,
}

impl Scratch {
    /// Remove `work_dir` if present, then recreate it and its `html/` child.
    pub async fn reset(work_dir: &Path) -> Result<Self, SubmissionError> {
        let wrap = |source| SubmissionError::WorkDir {
            path: work_dir.to_path_buf(),
            source,
        };

        match tokio::fs::remove_dir_all(work_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(wrap(e)),
        }

        // Renderers run with other working directories; keep paths absolute.
        let root = std::path::absolute(work_dir).map_err(wrap)?;
        let html = root.join("html");
        tokio::fs::create_dir_all(&html).await.map_err(wrap)?;
        debug!(work_dir = %root.display(), "Scratch directory reset");

        Ok(Self { root, html })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn html_dir(&self) -> &Path {
        &self.html
    }

    // Keys are `MemberFile::scratch_key`, unique per file within a folder.

    /// Where the per-file PDF for `key` goes: `<work_dir>/<key>.pdf`.
    pub fn pdf_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.pdf"))
    }

    /// Where intermediate HTML for `key` goes: `<work_dir>/html/<key>.html`.
    pub fn html_for(&self, key: &str) -> PathBuf {
        self.html.join(format!("{key}.html"))
    }

    /// Where intermediate LaTeX for `key` goes: `<work_dir>/<key>.tex`.
    pub fn tex_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.tex"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reset_removes_stale_files() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let work = tmp.path().join("code_to_pdf");
        std::fs::create_dir_all(work.join("html")).unwrap();
        std::fs::write(work.join("stale.pdf"), b"%PDF").unwrap();
        std::fs::write(work.join("html/stale.html"), b"<html>").unwrap();

        let scratch = Scratch::reset(&work).await.expect("reset");
        assert!(scratch.html_dir().is_dir());
        assert!(!work.join("stale.pdf").exists());
        assert!(!work.join("html/stale.html").exists());
    }

    #[tokio::test]
    async fn reset_creates_missing_dir() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let work = tmp.path().join("nested/work");
        let scratch = Scratch::reset(&work).await.expect("reset");
        assert_eq!(scratch.root(), work.as_path());
        assert_eq!(scratch.pdf_for("main.py"), work.join("main.py.pdf"));
        assert_eq!(scratch.html_for("main.py"), work.join("html/main.py.html"));
        assert_eq!(scratch.tex_for("main.py"), work.join("main.py.tex"));
    }

    #[tokio::test]
    async fn reset_fails_when_path_is_a_file() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let err = Scratch::reset(&blocker.join("work")).await.unwrap_err();
        assert!(matches!(err, SubmissionError::WorkDir { .. }), "got {err:?}");
    }
}
