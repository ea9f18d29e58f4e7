//! # submission2pdf
//!
//! Turn folders of assignment files into one PDF per submission, ready for
//! grading.
//!
//! Every submission folder (one student's repository, say) holds a mix of
//! source files, Markdown write-ups, and odds and ends. This crate renders
//! each recognised file to PDF with external tools — pygmentize and a
//! headless browser for code, pandoc or python-markdown for Markdown — and
//! concatenates the results into `<folder>.pdf`, write-ups first.
//!
//! ## Pipeline Overview
//!
//! ```text
//! submission folder
//!  │
//!  ├─ 1. Scratch    wipe and recreate the shared working directory
//!  ├─ 2. Classify   code / markdown / unsupported, by file-name suffix
//!  ├─ 3. Render     external tools, walking engine preference lists
//!  ├─ 4. Assemble   Markdown PDFs in front, code PDFs behind
//!  └─ 5. Merge      concatenate pages into <output_dir>/<folder>.pdf
//! ```
//!
//! A file that fails to render is logged and left out; the folder still gets
//! its (shorter) PDF. Only filesystem failures at the output level stop a run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use submission2pdf::{convert_all, discover_submissions, PipelineConfig};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let folders = discover_submissions(Path::new("course/p03"), "*/p03*", "p03*")?;
//!     let config = PipelineConfig::builder().output_dir("pdfs").build()?;
//!     let report = convert_all(&folders, &config).await?;
//!     for path in report.outputs() {
//!         println!("{}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `sub2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! ## External tools
//!
//! | Tool | Used for |
//! |------|----------|
//! | `pygmentize` | highlighted HTML / LaTeX for source files |
//! | `chromium` (or any Chromium-compatible browser) | HTML → PDF |
//! | `pandoc` + a TeX engine | Markdown → PDF |
//! | `markdown_py` | Markdown → HTML (optional engine) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod discover;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder, Toolchain};
pub use convert::{convert_all, convert_all_sync, convert_folder};
pub use discover::{discover_files, discover_folders, discover_submissions, SubmissionFolder};
pub use error::{FileError, SubmissionError};
pub use output::{FolderReport, RenderedArtifact, RunReport};
pub use pipeline::classify::FileKind;
pub use pipeline::fallback::EngineFailure;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
