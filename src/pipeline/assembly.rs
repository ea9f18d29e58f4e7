//! Assembly order for one folder's per-file PDFs.
//!
//! Markdown artifacts are pushed to the front as they arrive, everything
//! else to the back. The net effect: all Markdown pages come first, in
//! *reverse* discovery order among themselves, followed by code pages in
//! discovery order. The reversed Markdown order is long-standing behaviour
//! that existing graders depend on; keep it unless that changes.

use crate::output::RenderedArtifact;
use crate::pipeline::classify::FileKind;
use std::collections::VecDeque;
use std::path::Path;

/// Ordered sequence of artifacts about to be merged.
#[derive(Debug, Default)]
pub struct AssemblyList {
    items: VecDeque<RenderedArtifact>,
}

impl AssemblyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `artifact` according to its kind.
    pub fn add(&mut self, artifact: RenderedArtifact) {
        match artifact.kind {
            FileKind::Markdown => self.items.push_front(artifact),
            FileKind::Code | FileKind::Unsupported => self.items.push_back(artifact),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// PDF paths in merge order.
    pub fn paths(&self) -> Vec<&Path> {
        self.items.iter().map(|a| a.pdf.as_path()).collect()
    }

    pub fn into_artifacts(self) -> Vec<RenderedArtifact> {
        self.items.into()
    }
}
