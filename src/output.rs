//! Result types returned by the orchestrator.

use crate::error::FileError;
use crate::pipeline::classify::FileKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A PDF produced for exactly one member file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedArtifact {
    /// The member file it was rendered from.
    pub source: PathBuf,
    /// Classification of `source`; decides its place in the assembly.
    pub kind: FileKind,
    /// Engine that produced it, e.g. `pandoc/xelatex` or `browser`.
    pub engine: String,
    /// Location of the per-file PDF in the working directory.
    pub pdf: PathBuf,
}

/// Outcome of one submission folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderReport {
    /// The submission folder.
    pub folder: PathBuf,
    /// The combined `<folder-basename>.pdf`.
    pub output: PathBuf,
    /// Artifacts in the order they were merged.
    pub artifacts: Vec<RenderedArtifact>,
    /// Files with no recognised kind.
    pub skipped: Vec<PathBuf>,
    /// Files that were recognised but failed to render.
    pub failed: Vec<FileError>,
    /// Pages in the combined document.
    pub page_count: usize,
    /// Wall-clock time for the folder.
    pub duration_ms: u64,
}

impl FolderReport {
    /// True when every recognised file made it into the output.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub folders: Vec<FolderReport>,
}

impl RunReport {
    /// Paths of every combined PDF written, in processing order.
    pub fn outputs(&self) -> Vec<&Path> {
        self.folders.iter().map(|f| f.output.as_path()).collect()
    }

    /// Number of member files that failed across the run.
    pub fn failed_files(&self) -> usize {
        self.folders.iter().map(|f| f.failed.len()).sum()
    }

    /// Number of unsupported files skipped across the run.
    pub fn skipped_files(&self) -> usize {
        self.folders.iter().map(|f| f.skipped.len()).sum()
    }
}
