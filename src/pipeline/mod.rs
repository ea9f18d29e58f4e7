//! Pipeline stages for submission-to-PDF conversion.
//!
//! Each submodule implements exactly one step, so each is independently
//! testable and a backend can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! classify ──▶ code / markdown ──▶ assembly ──▶ merge
//! (suffix)     (external tools)    (ordering)   (lopdf)
//! ```
//!
//! 1. [`classify`] — decide code / markdown / unsupported from the file name
//! 2. [`code`], [`markdown`] — drive the external renderers, using
//!    [`fallback`] to walk engine preference lists and [`html`] for the
//!    shared browser print step; every process goes through [`command`]
//! 3. [`assembly`] — place each per-file PDF (Markdown first)
//! 4. [`merge`] — concatenate pages into `<folder>.pdf`
//!
//! [`scratch`] owns the intermediate directory shared by steps 2–4.

pub mod assembly;
pub mod classify;
pub mod code;
pub mod command;
pub mod fallback;
pub mod html;
pub mod markdown;
pub mod merge;
pub mod scratch;

use crate::config::PipelineConfig;
use command::CommandError;
use fallback::EngineFailure;
use scratch::Scratch;
use thiserror::Error;

/// What a renderer needs for one file: the run config and the folder's scratch tree.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a PipelineConfig,
    pub scratch: &'a Scratch,
}

/// Why a single engine attempt failed.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The identifier is not one this crate knows how to drive.
    #[error("unknown engine '{0}'")]
    UnknownEngine(String),

    /// A nested candidate list (e.g. pandoc's `--pdf-engine`s) ran out.
    #[error("{}", join_failures(.0))]
    Exhausted(Vec<EngineFailure>),
}

fn join_failures(failures: &[EngineFailure]) -> String {
    if failures.is_empty() {
        return "no engines configured".to_string();
    }
    failures
        .iter()
        .map(|f| format!("{}: {}", f.engine, f.detail))
        .collect::<Vec<_>>()
        .join("; ")
}
