//! Submission orchestration: folders → files → renderers → one PDF each.
//!
//! Per folder the states run strictly in sequence:
//!
//! ```text
//! clear scratch ─▶ convert file₁ … fileₙ ─▶ assemble ─▶ merge/write ─▶ done
//! ```
//!
//! Folders and files are processed one at a time because they share one
//! scratch directory. A file that fails is logged and left out; only
//! filesystem failures at folder-output level (or an exhausted file when
//! `fail_on_exhausted` is set) end the run.

use crate::config::PipelineConfig;
use crate::discover::SubmissionFolder;
use crate::error::{FileError, SubmissionError};
use crate::output::{FolderReport, RunReport};
use crate::pipeline::assembly::AssemblyList;
use crate::pipeline::classify::{FileKind, MemberFile};
use crate::pipeline::scratch::Scratch;
use crate::pipeline::{code, markdown, merge, RenderContext};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert every folder in order, returning one report per folder.
///
/// # Errors
/// Returns `Err(SubmissionError)` only for fatal errors:
/// - output or working directory cannot be created
/// - a combined PDF cannot be written
/// - a file exhausted every engine and `fail_on_exhausted` is set
pub async fn convert_all(
    folders: &[SubmissionFolder],
    config: &PipelineConfig,
) -> Result<RunReport, SubmissionError> {
    info!("Starting run over {} submission folders", folders.len());
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(folders.len());
    }

    let mut report = RunReport::default();
    for folder in folders {
        report.folders.push(convert_folder(folder, config).await?);
    }

    info!(
        "Processing complete: {} PDFs written, {} files failed, {} skipped",
        report.folders.len(),
        report.failed_files(),
        report.skipped_files()
    );
    Ok(report)
}

/// Synchronous wrapper around [`convert_all`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_all_sync(
    folders: &[SubmissionFolder],
    config: &PipelineConfig,
) -> Result<RunReport, SubmissionError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SubmissionError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_all(folders, config))
}

/// Convert one submission folder into `<output_dir>/<folder-name>.pdf`.
pub async fn convert_folder(
    folder: &SubmissionFolder,
    config: &PipelineConfig,
) -> Result<FolderReport, SubmissionError> {
    let start = Instant::now();
    let output = config.output_dir.join(format!("{}.pdf", folder.name));

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|e| SubmissionError::OutputDir {
            path: config.output_dir.clone(),
            source: e,
        })?;

    // ── Step 1: Clear the shared scratch space ───────────────────────────
    let scratch = Scratch::reset(&config.work_dir).await?;
    let ctx = RenderContext {
        config,
        scratch: &scratch,
    };
    info!(
        "Converting {} ({} files)",
        folder.path.display(),
        folder.files.len()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_folder_start(&folder.path, folder.files.len());
    }

    // ── Step 2: Render each file in discovery order ──────────────────────
    let mut assembly = AssemblyList::new();
    let mut skipped = Vec::new();
    let mut failed = Vec::new();

    for (index, path) in folder.files.iter().enumerate() {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.clone());
        let file = MemberFile::new(absolute, config).indexed(index);

        let result = match file.kind {
            FileKind::Unsupported => {
                warn!("Skipping unsupported file: {}", path.display());
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_skipped(path);
                }
                skipped.push(path.clone());
                continue;
            }
            FileKind::Code => {
                notify_start(config, path);
                code::render_code(&file, ctx).await
            }
            FileKind::Markdown => {
                notify_start(config, path);
                markdown::render_markdown(&file, ctx).await
            }
        };

        match result {
            Ok(artifact) => {
                debug!("Rendered {} via {}", path.display(), artifact.engine);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_complete(path, &artifact.engine);
                }
                assembly.add(artifact);
            }
            Err(e) => {
                warn!("Failed to convert {}: {}", path.display(), e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_error(path, &e.to_string());
                }
                if config.fail_on_exhausted && matches!(e, FileError::Exhausted { .. }) {
                    return Err(SubmissionError::ConversionExhausted(e));
                }
                failed.push(e);
            }
        }
    }

    // ── Step 3: Merge in assembly order ──────────────────────────────────
    let inputs: Vec<PathBuf> = assembly.paths().into_iter().map(|p| p.to_path_buf()).collect();
    let summary = merge::merge_pdfs(&inputs, &output).await?;

    // A renderer that exited 0 but wrote garbage is a file-level failure.
    let mut artifacts = assembly.into_artifacts();
    for (pdf, detail) in summary.unreadable {
        if let Some(pos) = artifacts.iter().position(|a| a.pdf == pdf) {
            let artifact = artifacts.remove(pos);
            warn!(
                "Dropped unreadable PDF for {}: {}",
                artifact.source.display(),
                detail
            );
            let error = FileError::Render {
                file: artifact.source,
                engine: artifact.engine,
                detail: format!("produced an unreadable PDF: {detail}"),
            };
            if let Some(ref cb) = config.progress_callback {
                cb.on_file_error(error.file(), &error.to_string());
            }
            failed.push(error);
        }
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Wrote {} ({} pages from {} files, {} failed, {}ms)",
        output.display(),
        summary.page_count,
        artifacts.len(),
        failed.len(),
        duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_folder_complete(&folder.path, &output, summary.page_count);
    }

    Ok(FolderReport {
        folder: folder.path.clone(),
        output,
        artifacts,
        skipped,
        failed,
        page_count: summary.page_count,
        duration_ms,
    })
}

fn notify_start(config: &PipelineConfig, path: &std::path::Path) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_file_start(path);
    }
}
