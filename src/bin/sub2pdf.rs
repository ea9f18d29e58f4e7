//! CLI binary for submission2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig`, discovers submissions by glob, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use submission2pdf::config::parse_list;
use submission2pdf::discover::expand_home;
use submission2pdf::{
    convert_all, discover_submissions, ConversionProgressCallback, PipelineConfig, ProgressCallback,
    Toolchain,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over folders, one log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} folders  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

fn short(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_folders: usize) {
        self.bar.set_length(total_folders as u64);
    }

    fn on_folder_start(&self, folder: &Path, total_files: usize) {
        self.bar.println(format!(
            "{} {}  {}",
            bold("◆"),
            bold(&short(folder)),
            dim(&format!("{total_files} files"))
        ));
    }

    fn on_file_start(&self, file: &Path) {
        self.bar.set_message(short(file));
    }

    fn on_file_complete(&self, file: &Path, engine: &str) {
        self.bar.println(format!(
            "  {} {:<32} {}",
            green("✓"),
            short(file),
            dim(engine)
        ));
    }

    fn on_file_skipped(&self, file: &Path) {
        self.bar
            .println(format!("  {} {:<32} {}", dim("-"), short(file), dim("skipped")));
    }

    fn on_file_error(&self, file: &Path, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 100 {
            let cut: String = error.chars().take(99).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {:<32} {}", red("✗"), short(file), red(&msg)));
    }

    fn on_folder_complete(&self, _folder: &Path, output: &Path, pages: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            cyan_arrow(),
            output.display(),
            dim(&format!("{pages} pages"))
        ));
        self.bar.inc(1);
    }
}

fn cyan_arrow() -> String {
    "\x1b[36m→\x1b[0m".to_string()
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Every */p03* folder under ~/src/deep-learning-jhu/p03/, files named p03*
  sub2pdf

  # Another assignment
  sub2pdf --root ~/grading/hw2 --folders '*/hw2*' --files '*' -o hw2-pdfs

  # Prefer the browser for Markdown, fall back to pandoc + xelatex
  sub2pdf --markdown-engines pandoc-html,pandoc --markdown-pdf-engines xelatex

  # Typeset code with LaTeX instead of the browser
  sub2pdf --code-engines xelatex,pdflatex

  # Machine-readable report
  sub2pdf --json > report.json

ENGINES:
  Markdown  pandoc       pandoc → PDF, trying each --markdown-pdf-engines entry
            pandoc-html  pandoc → HTML → headless browser
            markdown     markdown_py → HTML → headless browser
  Code      browser      pygmentize → HTML → headless browser
            <tex engine> pygmentize → LaTeX → pdflatex / xelatex / lualatex

ORDERING:
  Markdown PDFs go first (most recently discovered first), then code PDFs in
  discovery order. Unsupported files are skipped; failed files are reported
  and left out.
"#;

/// Combine assignment files into one PDF per submission folder.
#[derive(Parser, Debug)]
#[command(
    name = "sub2pdf",
    version,
    about = "Combine assignment files into one PDF per submission folder",
    long_about = "Render source files and Markdown documents from every submission folder \
into PDFs with external tools (pygmentize, a headless browser, pandoc) and merge them into \
<output-dir>/<folder>.pdf, write-ups first.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory holding the submission folders.
    #[arg(long, env = "SUB2PDF_ROOT", default_value = "~/src/deep-learning-jhu/p03/")]
    root: PathBuf,

    /// Glob (relative to --root) selecting submission folders.
    #[arg(long, env = "SUB2PDF_FOLDERS", default_value = "*/p03*")]
    folders: String,

    /// Glob (relative to each folder) selecting member files.
    #[arg(long, env = "SUB2PDF_FILES", default_value = "p03*")]
    files: String,

    /// Where combined PDFs are written.
    #[arg(short, long, env = "SUB2PDF_OUTPUT_DIR", default_value = "./pdfs")]
    output_dir: PathBuf,

    /// Scratch directory; wiped before every folder.
    #[arg(long, env = "SUB2PDF_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Markdown engines in preference order (comma-separated).
    #[arg(long, env = "SUB2PDF_MARKDOWN_ENGINES", default_value = "pandoc,pandoc-html")]
    markdown_engines: String,

    /// pandoc --pdf-engine values in preference order (comma-separated).
    #[arg(
        long,
        env = "SUB2PDF_MARKDOWN_PDF_ENGINES",
        default_value = "pdflatex,xelatex,lualatex"
    )]
    markdown_pdf_engines: String,

    /// Code backends in preference order: browser and/or TeX engines.
    #[arg(long, env = "SUB2PDF_CODE_ENGINES", default_value = "browser")]
    code_engines: String,

    /// Pygments style for highlighted code.
    #[arg(long, env = "SUB2PDF_STYLE", default_value = "default")]
    style: String,

    /// Per-command timeout in seconds.
    #[arg(long, env = "SUB2PDF_TIMEOUT", default_value_t = 300)]
    timeout: u64,

    /// pygmentize executable.
    #[arg(long, env = "SUB2PDF_PYGMENTIZE", default_value = "pygmentize")]
    pygmentize: PathBuf,

    /// Headless browser executable (chromium, google-chrome, …).
    #[arg(long, env = "SUB2PDF_BROWSER", default_value = "chromium")]
    browser: PathBuf,

    /// pandoc executable.
    #[arg(long, env = "SUB2PDF_PANDOC", default_value = "pandoc")]
    pandoc: PathBuf,

    /// python-markdown executable.
    #[arg(long, env = "SUB2PDF_MARKDOWN_PY", default_value = "markdown_py")]
    markdown_py: PathBuf,

    /// Abort the run when a file fails with every engine.
    #[arg(long, env = "SUB2PDF_FAIL_ON_EXHAUSTED")]
    fail_on_exhausted: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long, env = "SUB2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "SUB2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SUB2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SUB2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // With the progress bar active only warnings get through; the bar
    // already reports per-file progress.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Discover ─────────────────────────────────────────────────────────
    let root = expand_home(&cli.root);
    let folders = discover_submissions(&root, &cli.folders, &cli.files)
        .with_context(|| format!("Failed to discover submissions under {}", root.display()))?;
    if folders.is_empty() && !cli.quiet {
        eprintln!(
            "{} no folders matching '{}' under {}",
            yellow("⚠"),
            cli.folders,
            root.display()
        );
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress = if show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };
    let config = build_config(
        &cli,
        progress.clone().map(|p| p as Arc<dyn ConversionProgressCallback>),
    )?;

    // ── Run ──────────────────────────────────────────────────────────────
    let report = convert_all(&folders, &config)
        .await
        .context("Conversion failed")?;

    if let Some(ref p) = progress {
        p.bar.finish_and_clear();
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
        return Ok(());
    }

    if !cli.quiet {
        for folder in &report.folders {
            let mark = if folder.is_complete() {
                green("✔")
            } else {
                yellow("⚠")
            };
            eprintln!(
                "{mark} {}  {}",
                bold(&folder.output.display().to_string()),
                dim(&format!(
                    "{} pages, {} files, {} failed, {} skipped",
                    folder.page_count,
                    folder.artifacts.len(),
                    folder.failed.len(),
                    folder.skipped.len()
                ))
            );
            for failure in &folder.failed {
                eprintln!("    {} {}", red("✗"), failure);
            }
        }
        let outputs: Vec<String> = report
            .outputs()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        eprintln!(
            "Processing complete. {} PDFs written ({} file failures): {:?}",
            outputs.len(),
            report.failed_files(),
            outputs
        );
    }

    Ok(())
}

/// Map CLI args to `PipelineConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let toolchain = Toolchain {
        highlighter: cli.pygmentize.clone(),
        browser: cli.browser.clone(),
        pandoc: cli.pandoc.clone(),
        markdown_html: cli.markdown_py.clone(),
    };

    let mut builder = PipelineConfig::builder()
        .output_dir(expand_home(&cli.output_dir))
        .markdown_engines(parse_list(&cli.markdown_engines))
        .markdown_pdf_engines(parse_list(&cli.markdown_pdf_engines))
        .code_pdf_engines(parse_list(&cli.code_engines))
        .highlight_style(cli.style.clone())
        .command_timeout_secs(cli.timeout)
        .fail_on_exhausted(cli.fail_on_exhausted)
        .toolchain(toolchain);

    if let Some(ref dir) = cli.work_dir {
        builder = builder.work_dir(expand_home(dir));
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
