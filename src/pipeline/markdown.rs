//! Markdown → PDF with two-level engine fallback.
//!
//! The outer list (`markdown_engines`) picks an engine family:
//!
//! | Engine        | Chain                                                      |
//! |---------------|------------------------------------------------------------|
//! | `pandoc`      | `pandoc -s in.md -o out.pdf --pdf-engine=E`, E from `markdown_pdf_engines` in order |
//! | `pandoc-html` | `pandoc -s in.md -o in.html`, then browser print           |
//! | `markdown`    | `markdown_py in.md -f in.html`, then browser print         |
//!
//! Only when every family (and, for `pandoc`, every `--pdf-engine`) has
//! failed does the file count as failed.

use crate::config::{ENGINE_MARKDOWN_HTML, ENGINE_PANDOC, ENGINE_PANDOC_HTML};
use crate::error::FileError;
use crate::output::RenderedArtifact;
use crate::pipeline::classify::MemberFile;
use crate::pipeline::command::{self, CommandSpec};
use crate::pipeline::fallback::{try_in_order, TrialOutcome};
use crate::pipeline::{html, AttemptError, RenderContext};
use std::path::Path;
use tracing::debug;

/// Render one Markdown file into `<work_dir>/<name>.pdf`.
pub async fn render_markdown(
    file: &MemberFile,
    ctx: RenderContext<'_>,
) -> Result<RenderedArtifact, FileError> {
    let pdf_path = ctx.scratch.pdf_for(&file.scratch_key);

    let outcome = try_in_order("markdown", &ctx.config.markdown_engines, |engine| {
        let engine = engine.to_string();
        let pdf_path = &pdf_path;
        async move { run_engine(&engine, file, pdf_path, ctx).await }
    })
    .await;

    match outcome {
        TrialOutcome::Succeeded { engine, value, .. } => {
            let engine = match value {
                Some(backend) => format!("{engine}/{backend}"),
                None => engine,
            };
            debug!(file = %file.path.display(), engine = %engine, "Markdown rendered");
            Ok(RenderedArtifact {
                source: file.path.clone(),
                kind: file.kind,
                engine,
                pdf: pdf_path,
            })
        }
        TrialOutcome::Exhausted { failures } => Err(FileError::Exhausted {
            file: file.path.clone(),
            failures,
        }),
    }
}

/// Run one engine family. Returns the nested backend that succeeded, if any.
async fn run_engine(
    engine: &str,
    file: &MemberFile,
    pdf: &Path,
    ctx: RenderContext<'_>,
) -> Result<Option<String>, AttemptError> {
    let timeout = ctx.config.command_timeout();
    let toolchain = &ctx.config.toolchain;
    let cwd = source_dir(&file.path);

    match engine {
        ENGINE_PANDOC => {
            let nested = try_in_order(
                "pandoc --pdf-engine",
                &ctx.config.markdown_pdf_engines,
                |pdf_engine| {
                    let spec = CommandSpec::new(&toolchain.pandoc)
                        .arg("-s")
                        .arg(&file.path)
                        .arg("-o")
                        .arg(pdf)
                        .arg(format!("--pdf-engine={pdf_engine}"))
                        .current_dir(cwd);
                    async move { command::run(&spec, timeout).await.map(|_| ()) }
                },
            )
            .await;
            match nested {
                TrialOutcome::Succeeded { engine, .. } => Ok(Some(engine)),
                TrialOutcome::Exhausted { failures } => Err(AttemptError::Exhausted(failures)),
            }
        }
        ENGINE_PANDOC_HTML => {
            let html_path = ctx.scratch.html_for(&file.scratch_key);
            let spec = CommandSpec::new(&toolchain.pandoc)
                .arg("-s")
                .arg(&file.path)
                .arg("-o")
                .arg(&html_path)
                .arg("--metadata")
                .arg(format!("pagetitle={}", file.name))
                .current_dir(cwd);
            command::run(&spec, timeout).await?;
            html::html_to_pdf(&toolchain.browser, &html_path, pdf, cwd, timeout).await?;
            Ok(None)
        }
        ENGINE_MARKDOWN_HTML => {
            let html_path = ctx.scratch.html_for(&file.scratch_key);
            let spec = CommandSpec::new(&toolchain.markdown_html)
                .arg(&file.path)
                .arg("-f")
                .arg(&html_path)
                .current_dir(cwd);
            command::run(&spec, timeout).await?;
            html::html_to_pdf(&toolchain.browser, &html_path, pdf, cwd, timeout).await?;
            Ok(None)
        }
        other => Err(AttemptError::UnknownEngine(other.to_string())),
    }
}

/// Renderers run next to the source so relative image links resolve.
fn source_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
