//! Progress-callback trait for per-folder and per-file conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to receive
//! events as the orchestrator walks submissions. The CLI uses this to drive
//! its progress bar; library callers can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use submission2pdf::{ConversionProgressCallback, PipelineConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     folders: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_folder_complete(&self, folder: &Path, output: &Path, pages: usize) {
//!         self.folders.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} → {} ({pages} pages)", folder.display(), output.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { folders: AtomicUsize::new(0) });
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the orchestrator as it processes folders and their files.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in order from a single task.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first folder.
    fn on_run_start(&self, total_folders: usize) {
        let _ = total_folders;
    }

    /// Called after the scratch directory was reset for `folder`.
    fn on_folder_start(&self, folder: &Path, total_files: usize) {
        let _ = (folder, total_files);
    }

    /// Called just before a recognised file is handed to its renderer.
    fn on_file_start(&self, file: &Path) {
        let _ = file;
    }

    /// Called when a file produced a PDF, with the engine that made it.
    fn on_file_complete(&self, file: &Path, engine: &str) {
        let _ = (file, engine);
    }

    /// Called for files whose kind is not recognised.
    fn on_file_skipped(&self, file: &Path) {
        let _ = file;
    }

    /// Called when a file failed to render; `error` is human-readable.
    fn on_file_error(&self, file: &Path, error: &str) {
        let _ = (file, error);
    }

    /// Called once the combined PDF for `folder` is on disk.
    fn on_folder_complete(&self, folder: &Path, output: &Path, pages: usize) {
        let _ = (folder, output, pages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
