//! Source code → PDF.
//!
//! The highlighter runs first and has no fallback: if pygmentize cannot
//! render the file, the file is abandoned. The highlighted output is then
//! printed by each configured backend in turn:
//!
//! * `browser` — `pygmentize -f html` then headless browser print
//! * any TeX engine (`pdflatex`, `xelatex`, …) — `pygmentize -f tex` then
//!   the engine with `-output-directory` set to the scratch dir
//!
//! With the default single `browser` backend a failed print abandons the
//! file, exactly like a failed highlight.

use crate::config::ENGINE_BROWSER;
use crate::error::FileError;
use crate::output::RenderedArtifact;
use crate::pipeline::classify::MemberFile;
use crate::pipeline::command::{self, CommandSpec};
use crate::pipeline::fallback::{try_in_order, TrialOutcome};
use crate::pipeline::{html, AttemptError, RenderContext};
use std::path::Path;
use tracing::debug;

/// Render one source file into `<work_dir>/<name>.pdf`.
pub async fn render_code(
    file: &MemberFile,
    ctx: RenderContext<'_>,
) -> Result<RenderedArtifact, FileError> {
    let config = ctx.config;
    let scratch = ctx.scratch;
    let engines = &config.code_pdf_engines;
    let timeout = config.command_timeout();

    let html_path = scratch.html_for(&file.scratch_key);
    let tex_path = scratch.tex_for(&file.scratch_key);
    let pdf_path = scratch.pdf_for(&file.scratch_key);

    // ── Highlight (no fallback) ──────────────────────────────────────────
    if engines.iter().any(|e| e == ENGINE_BROWSER) {
        let spec = highlight_spec(ctx, file, "html", &html_path);
        command::run(&spec, timeout)
            .await
            .map_err(|e| FileError::render(&file.path, &spec.program_name(), &e))?;
    }
    if engines.iter().any(|e| e != ENGINE_BROWSER) {
        let spec = highlight_spec(ctx, file, "tex", &tex_path);
        command::run(&spec, timeout)
            .await
            .map_err(|e| FileError::render(&file.path, &spec.program_name(), &e))?;
    }

    // ── Print ────────────────────────────────────────────────────────────
    let outcome = try_in_order("code", engines, |engine| {
        let engine = engine.to_string();
        let (html_path, tex_path, pdf_path) = (&html_path, &tex_path, &pdf_path);
        async move {
            if engine == ENGINE_BROWSER {
                html::html_to_pdf(
                    &config.toolchain.browser,
                    html_path,
                    pdf_path,
                    scratch.root(),
                    timeout,
                )
                .await
                .map_err(AttemptError::from)
            } else {
                let spec = tex_spec(&engine, &file.scratch_key, scratch.root(), tex_path);
                command::run(&spec, timeout)
                    .await
                    .map(|_| ())
                    .map_err(AttemptError::from)
            }
        }
    })
    .await;

    match outcome {
        TrialOutcome::Succeeded { engine, .. } => {
            debug!(file = %file.path.display(), engine = %engine, "Code rendered");
            Ok(RenderedArtifact {
                source: file.path.clone(),
                kind: file.kind,
                engine,
                pdf: pdf_path,
            })
        }
        TrialOutcome::Exhausted { mut failures } => {
            if failures.len() == 1 {
                let only = failures.remove(0);
                Err(FileError::Render {
                    file: file.path.clone(),
                    engine: only.engine,
                    detail: only.detail,
                })
            } else {
                Err(FileError::Exhausted {
                    file: file.path.clone(),
                    failures,
                })
            }
        }
    }
}

fn highlight_spec(ctx: RenderContext<'_>, file: &MemberFile, format: &str, out: &Path) -> CommandSpec {
    CommandSpec::new(&ctx.config.toolchain.highlighter)
        .args(["-f", format, "-O"])
        .arg(format!("linenos=1,full=1,style={}", ctx.config.highlight_style))
        // -P takes the value verbatim; names may contain ',' or '='.
        .arg("-P")
        .arg(format!("title={}", file.name))
        .arg("-o")
        .arg(out)
        .arg(&file.path)
        .current_dir(ctx.scratch.root())
}

fn tex_spec(engine: &str, jobname: &str, out_dir: &Path, tex: &Path) -> CommandSpec {
    CommandSpec::new(engine)
        .args(["-interaction=nonstopmode", "-halt-on-error"])
        .arg(format!("-jobname={jobname}"))
        .arg(format!("-output-directory={}", out_dir.display()))
        .arg(tex)
        .current_dir(out_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::pipeline::scratch::Scratch;

    #[tokio::test]
    async fn highlight_args_request_full_titled_page() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let scratch = Scratch::reset(tmp.path()).await.expect("scratch");
        let config = PipelineConfig::default();
        let ctx = RenderContext {
            config: &config,
            scratch: &scratch,
        };
        let file = MemberFile::new("/subs/sub1/main.py", &config);
        let spec = highlight_spec(ctx, &file, "html", &scratch.html_for("main.py"));
        let line = spec.display();
        assert!(line.starts_with(
            "pygmentize -f html -O linenos=1,full=1,style=default -P title=main.py -o "
        ));
        assert!(line.ends_with("html/main.py.html /subs/sub1/main.py"), "got: {line}");
    }

    #[tokio::test]
    async fn title_with_separators_is_one_option_value() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let scratch = Scratch::reset(tmp.path()).await.expect("scratch");
        let config = PipelineConfig::default();
        let ctx = RenderContext {
            config: &config,
            scratch: &scratch,
        };
        let file = MemberFile::new("/subs/sub1/a,b=c.py", &config);
        let spec = highlight_spec(ctx, &file, "html", &scratch.html_for("a,b=c.py"));
        let line = spec.display();
        assert!(
            line.contains(" -O linenos=1,full=1,style=default -P title=a,b=c.py -o "),
            "got: {line}"
        );
    }

    #[test]
    fn tex_job_lands_in_scratch() {
        let spec = tex_spec(
            "xelatex",
            "main.py",
            Path::new("/tmp/work"),
            Path::new("/tmp/work/main.py.tex"),
        );
        assert_eq!(
            spec.display(),
            "xelatex -interaction=nonstopmode -halt-on-error -jobname=main.py \
             -output-directory=/tmp/work /tmp/work/main.py.tex"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_highlighter_abandons_file() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let scratch = Scratch::reset(&tmp.path().join("work")).await.expect("scratch");
        let mut config = PipelineConfig::default();
        config.toolchain.highlighter = "/definitely/not/pygmentize".into();
        let ctx = RenderContext {
            config: &config,
            scratch: &scratch,
        };
        let src = tmp.path().join("main.py");
        std::fs::write(&src, "print('hi')\n").unwrap();
        let file = MemberFile::new(&src, &config);

        let err = render_code(&file, ctx).await.unwrap_err();
        match err {
            FileError::Render { engine, detail, .. } => {
                assert_eq!(engine, "/definitely/not/pygmentize");
                assert!(detail.contains("not found"), "got: {detail}");
            }
            other => panic!("expected Render, got {other:?}"),
        }
    }
}
