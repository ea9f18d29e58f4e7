//! Error types for the submission2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SubmissionError`] — **Fatal**: a folder's combined PDF cannot be
//!   produced at all (output directory not creatable, merged document not
//!   writable, scratch directory unusable). Returned as
//!   `Err(SubmissionError)` from the top-level `convert*` functions.
//!
//! * [`FileError`] — **Non-fatal**: a single member file failed to render
//!   (highlighter crashed, every Markdown engine failed) but the rest of the
//!   folder is fine. Stored inside [`crate::output::FolderReport`] so callers
//!   can see which submissions are complete and which are degraded.
//!
//! Unsupported files are not errors at all; they are listed in
//! [`crate::output::FolderReport::skipped`].

use crate::pipeline::command::CommandError;
use crate::pipeline::fallback::EngineFailure;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the submission2pdf library.
#[derive(Debug, Error)]
pub enum SubmissionError {
    // ── Filesystem errors ─────────────────────────────────────────────────
    /// The output directory could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The intermediate working directory could not be cleared or recreated.
    #[error("Failed to reset working directory '{path}': {source}")]
    WorkDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The combined PDF could not be written.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// lopdf could not assemble or serialise the combined document.
    #[error("Failed to merge PDFs into '{path}': {detail}")]
    MergeFailed { path: PathBuf, detail: String },

    // ── Policy errors ─────────────────────────────────────────────────────
    /// A file exhausted every renderer and the run is configured to treat
    /// that as fatal (`fail_on_exhausted`).
    #[error("Aborting run: {0}")]
    ConversionExhausted(FileError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single member file.
///
/// The folder keeps going; the file simply contributes no pages.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum FileError {
    /// One no-fallback step of a renderer chain failed (e.g. the highlighter).
    #[error("{file}: {engine} failed: {detail}")]
    Render {
        file: PathBuf,
        engine: String,
        detail: String,
    },

    /// Every configured fallback candidate failed.
    #[error("{file}: all engines failed ({})", summarize(.failures))]
    Exhausted {
        file: PathBuf,
        failures: Vec<EngineFailure>,
    },
}

impl FileError {
    pub(crate) fn render(file: impl Into<PathBuf>, engine: &str, err: &CommandError) -> Self {
        FileError::Render {
            file: file.into(),
            engine: engine.to_string(),
            detail: err.to_string(),
        }
    }

    /// Path of the member file the error belongs to.
    pub fn file(&self) -> &std::path::Path {
        match self {
            FileError::Render { file, .. } | FileError::Exhausted { file, .. } => file,
        }
    }
}

fn summarize(failures: &[EngineFailure]) -> String {
    if failures.is_empty() {
        return "no engines configured".to_string();
    }
    failures
        .iter()
        .map(|f| f.engine.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_display_names_every_engine() {
        let e = FileError::Exhausted {
            file: PathBuf::from("sub2/a.md"),
            failures: vec![
                EngineFailure {
                    engine: "pandoc/pdflatex".into(),
                    detail: "exit 43".into(),
                },
                EngineFailure {
                    engine: "pandoc-html".into(),
                    detail: "exit 1".into(),
                },
            ],
        };
        let msg = e.to_string();
        assert!(msg.contains("sub2/a.md"), "got: {msg}");
        assert!(msg.contains("pandoc/pdflatex, pandoc-html"), "got: {msg}");
    }

    #[test]
    fn exhausted_without_candidates() {
        let e = FileError::Exhausted {
            file: PathBuf::from("a.md"),
            failures: vec![],
        };
        assert!(e.to_string().contains("no engines configured"));
    }

    #[test]
    fn render_display() {
        let e = FileError::Render {
            file: PathBuf::from("main.py"),
            engine: "pygmentize".into(),
            detail: "not found".into(),
        };
        assert_eq!(e.to_string(), "main.py: pygmentize failed: not found");
        assert_eq!(e.file(), std::path::Path::new("main.py"));
    }

    #[test]
    fn output_write_display() {
        let e = SubmissionError::OutputWriteFailed {
            path: PathBuf::from("pdfs/sub1.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("pdfs/sub1.pdf"));
    }
}
