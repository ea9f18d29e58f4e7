//! Configuration types for submission-to-PDF conversion.
//!
//! All pipeline behaviour is controlled through [`PipelineConfig`], built via
//! its [`PipelineConfigBuilder`]. The config is passed explicitly into the
//! orchestrator and threaded down to every renderer; nothing in the crate
//! reads ambient global state.

use crate::error::SubmissionError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Markdown engine: pandoc straight to PDF, nested over `markdown_pdf_engines`.
pub const ENGINE_PANDOC: &str = "pandoc";
/// Markdown engine: pandoc to standalone HTML, then the headless browser.
pub const ENGINE_PANDOC_HTML: &str = "pandoc-html";
/// Markdown engine: python-markdown to HTML, then the headless browser.
pub const ENGINE_MARKDOWN_HTML: &str = "markdown";
/// Code engine: highlighter to HTML, then the headless browser.
pub const ENGINE_BROWSER: &str = "browser";

/// External binaries the renderers shell out to.
///
/// Each entry is a program name resolved via `PATH` or an absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    /// Syntax highlighter producing HTML or LaTeX. Default: `pygmentize`.
    pub highlighter: PathBuf,
    /// Chromium-compatible headless browser used for HTML → PDF. Default: `chromium`.
    pub browser: PathBuf,
    /// Pandoc, used by the `pandoc` and `pandoc-html` engines. Default: `pandoc`.
    pub pandoc: PathBuf,
    /// python-markdown CLI, used by the `markdown` engine. Default: `markdown_py`.
    pub markdown_html: PathBuf,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            highlighter: PathBuf::from("pygmentize"),
            browser: PathBuf::from("chromium"),
            pandoc: PathBuf::from("pandoc"),
            markdown_html: PathBuf::from("markdown_py"),
        }
    }
}

/// Configuration for a conversion run.
///
/// Built via [`PipelineConfig::builder()`] or using
/// [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use submission2pdf::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .output_dir("pdfs")
///     .markdown_engines(["pandoc-html", "pandoc"])
///     .command_timeout_secs(120)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Where combined `<folder>.pdf` files are written. Created on demand. Default: `./pdfs`.
    pub output_dir: PathBuf,

    /// Intermediate scratch directory, wiped before every folder.
    /// Default: `<temp>/code_to_pdf`.
    pub work_dir: PathBuf,

    /// Markdown engines in preference order. Default: `pandoc`, `pandoc-html`.
    pub markdown_engines: Vec<String>,

    /// `--pdf-engine` values tried by the `pandoc` Markdown engine.
    /// Default: `pdflatex`, `xelatex`, `lualatex`.
    pub markdown_pdf_engines: Vec<String>,

    /// Backends for source files: `browser` or a TeX engine name. Default: `browser`.
    ///
    /// With the single default entry a failed browser render abandons the
    /// file; further entries are tried in order like the Markdown engines.
    pub code_pdf_engines: Vec<String>,

    /// File-name suffixes classified as source code.
    pub code_extensions: Vec<String>,

    /// File-name suffixes classified as Markdown. Default: `.md`, `.markdown`.
    pub markdown_extensions: Vec<String>,

    /// Pygments style name passed to the highlighter. Default: `default`.
    pub highlight_style: String,

    /// Upper bound on any single external command, in seconds. Default: 300.
    pub command_timeout_secs: u64,

    /// Abort the run when a file exhausts every engine. Default: false (skip and warn).
    pub fail_on_exhausted: bool,

    /// External binaries.
    pub toolchain: Toolchain,

    /// Optional progress callback for per-folder and per-file events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("pdfs"),
            work_dir: std::env::temp_dir().join("code_to_pdf"),
            markdown_engines: strings(&[ENGINE_PANDOC, ENGINE_PANDOC_HTML]),
            markdown_pdf_engines: strings(&["pdflatex", "xelatex", "lualatex"]),
            code_pdf_engines: strings(&[ENGINE_BROWSER]),
            code_extensions: strings(&[
                ".py", ".rs", ".c", ".h", ".cpp", ".hpp", ".cc", ".java", ".js", ".ts", ".go",
                ".rb", ".sh", ".m", ".r", ".jl", ".scala", ".kt", ".swift",
            ]),
            markdown_extensions: strings(&[".md", ".markdown"]),
            highlight_style: "default".to_string(),
            command_timeout_secs: 300,
            fail_on_exhausted: false,
            toolchain: Toolchain::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("output_dir", &self.output_dir)
            .field("work_dir", &self.work_dir)
            .field("markdown_engines", &self.markdown_engines)
            .field("markdown_pdf_engines", &self.markdown_pdf_engines)
            .field("code_pdf_engines", &self.code_pdf_engines)
            .field("code_extensions", &self.code_extensions)
            .field("markdown_extensions", &self.markdown_extensions)
            .field("highlight_style", &self.highlight_style)
            .field("command_timeout_secs", &self.command_timeout_secs)
            .field("fail_on_exhausted", &self.fail_on_exhausted)
            .field("toolchain", &self.toolchain)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Per-command timeout as a `Duration`.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Sub-directory of `work_dir` that holds intermediate HTML.
    pub fn html_dir(&self) -> PathBuf {
        self.work_dir.join("html")
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = dir.into();
        self
    }

    pub fn markdown_engines<I, S>(mut self, engines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.markdown_engines = engines.into_iter().map(Into::into).collect();
        self
    }

    pub fn markdown_pdf_engines<I, S>(mut self, engines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.markdown_pdf_engines = engines.into_iter().map(Into::into).collect();
        self
    }

    pub fn code_pdf_engines<I, S>(mut self, engines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.code_pdf_engines = engines.into_iter().map(Into::into).collect();
        self
    }

    pub fn code_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.code_extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    pub fn markdown_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.markdown_extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    pub fn highlight_style(mut self, style: impl Into<String>) -> Self {
        self.config.highlight_style = style.into();
        self
    }

    pub fn command_timeout_secs(mut self, secs: u64) -> Self {
        self.config.command_timeout_secs = secs;
        self
    }

    pub fn fail_on_exhausted(mut self, v: bool) -> Self {
        self.config.fail_on_exhausted = v;
        self
    }

    pub fn toolchain(mut self, toolchain: Toolchain) -> Self {
        self.config.toolchain = toolchain;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, SubmissionError> {
        let c = &self.config;
        if c.markdown_engines.is_empty() {
            return Err(SubmissionError::InvalidConfig(
                "At least one Markdown engine is required".into(),
            ));
        }
        if c.code_pdf_engines.is_empty() {
            return Err(SubmissionError::InvalidConfig(
                "At least one code engine is required".into(),
            ));
        }
        if c.markdown_engines.iter().any(|e| e == ENGINE_PANDOC) && c.markdown_pdf_engines.is_empty()
        {
            return Err(SubmissionError::InvalidConfig(
                "The 'pandoc' engine needs at least one --pdf-engine".into(),
            ));
        }
        if c.command_timeout_secs == 0 {
            return Err(SubmissionError::InvalidConfig(
                "Command timeout must be ≥ 1 second".into(),
            ));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(SubmissionError::InvalidConfig(
                "Output directory must not be empty".into(),
            ));
        }
        if c.work_dir.as_os_str().is_empty() {
            return Err(SubmissionError::InvalidConfig(
                "Working directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Split a comma-separated engine list, dropping blanks.
///
/// `"pandoc, pandoc-html,"` → `["pandoc", "pandoc-html"]`.
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::builder().build().expect("defaults build");
        assert_eq!(config.markdown_engines, vec!["pandoc", "pandoc-html"]);
        assert_eq!(config.code_pdf_engines, vec!["browser"]);
        assert_eq!(config.command_timeout(), Duration::from_secs(300));
        assert!(config.html_dir().ends_with("code_to_pdf/html"));
    }

    #[test]
    fn empty_markdown_engines_rejected() {
        let err = PipelineConfig::builder()
            .markdown_engines(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Markdown engine"));
    }

    #[test]
    fn pandoc_without_pdf_engines_rejected() {
        let err = PipelineConfig::builder()
            .markdown_pdf_engines(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("pdf-engine"));

        // Fine once pandoc is not asked to typeset.
        PipelineConfig::builder()
            .markdown_engines(["pandoc-html"])
            .markdown_pdf_engines(Vec::<String>::new())
            .build()
            .expect("html-only engines need no typesetter");
    }

    #[test]
    fn zero_timeout_rejected() {
        assert!(PipelineConfig::builder()
            .command_timeout_secs(0)
            .build()
            .is_err());
    }

    #[test]
    fn parse_list_trims_and_drops_blanks() {
        assert_eq!(parse_list("pandoc, pandoc-html,"), vec!["pandoc", "pandoc-html"]);
        assert!(parse_list(" , ").is_empty());
    }
}
