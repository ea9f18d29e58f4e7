//! Ordered fallback over candidate engines.
//!
//! Both the Markdown renderer (engine family, then `--pdf-engine` within
//! pandoc) and the code renderer (browser or TeX backends) share this loop:
//! try each candidate in the order given, return on the first success, and
//! otherwise hand back every failure so the caller can report them all.
//!
//! Candidates run strictly one after another. A later candidate is never
//! started once an earlier one has succeeded.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

/// One failed attempt: which engine, and what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFailure {
    pub engine: String,
    pub detail: String,
}

/// Result of running a candidate list to completion.
#[derive(Debug)]
pub enum TrialOutcome<T> {
    /// `engine` produced `value`; `attempts` counts every candidate started,
    /// including the successful one.
    Succeeded {
        engine: String,
        value: T,
        attempts: usize,
    },
    /// Every candidate failed, in order. Empty when there were no candidates.
    Exhausted { failures: Vec<EngineFailure> },
}

impl<T> TrialOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, TrialOutcome::Succeeded { .. })
    }

    /// The failures, flattened into a single `Result`.
    pub fn into_result(self) -> Result<(String, T), Vec<EngineFailure>> {
        match self {
            TrialOutcome::Succeeded { engine, value, .. } => Ok((engine, value)),
            TrialOutcome::Exhausted { failures } => Err(failures),
        }
    }
}

/// Try `action` against each candidate until one succeeds.
///
/// `label` is only used for logging (e.g. `"markdown"`, `"pandoc --pdf-engine"`).
pub async fn try_in_order<C, T, E, F, Fut>(
    label: &str,
    candidates: &[C],
    mut action: F,
) -> TrialOutcome<T>
where
    C: AsRef<str>,
    E: Display,
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut failures = Vec::new();

    for (i, candidate) in candidates.iter().enumerate() {
        let engine = candidate.as_ref();
        debug!(stage = label, engine, attempt = i + 1, "Trying engine");

        match action(engine).await {
            Ok(value) => {
                if !failures.is_empty() {
                    debug!(
                        stage = label,
                        engine,
                        earlier_failures = failures.len(),
                        "Fallback engine succeeded"
                    );
                }
                return TrialOutcome::Succeeded {
                    engine: engine.to_string(),
                    value,
                    attempts: i + 1,
                };
            }
            Err(e) => {
                let detail = e.to_string();
                warn!(stage = label, engine, error = %detail, "Engine attempt failed");
                failures.push(EngineFailure {
                    engine: engine.to_string(),
                    detail,
                });
            }
        }
    }

    TrialOutcome::Exhausted { failures }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[tokio::test]
    async fn stops_at_first_success() {
        let calls = RefCell::new(Vec::new());
        let outcome = try_in_order("test", &["A", "B", "C"], |engine| {
            calls.borrow_mut().push(engine.to_string());
            let engine = engine.to_string();
            async move {
                if engine == "C" {
                    Ok(format!("{engine}.pdf"))
                } else {
                    Err(format!("{engine} exited 1"))
                }
            }
        })
        .await;

        assert_eq!(*calls.borrow(), vec!["A", "B", "C"]);
        match outcome {
            TrialOutcome::Succeeded {
                engine,
                value,
                attempts,
            } => {
                assert_eq!(engine, "C");
                assert_eq!(value, "C.pdf");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn later_candidates_not_started_after_success() {
        let calls = RefCell::new(Vec::new());
        let outcome = try_in_order("test", &["A", "B", "C"], |engine| {
            calls.borrow_mut().push(engine.to_string());
            async { Ok::<_, String>(()) }
        })
        .await;

        assert!(outcome.is_success());
        assert_eq!(*calls.borrow(), vec!["A"]);
    }

    #[tokio::test]
    async fn exhaustion_keeps_failures_in_order() {
        let outcome: TrialOutcome<()> = try_in_order("test", &["x", "y"], |engine| {
            let engine = engine.to_string();
            async move { Err(format!("{engine} broke")) }
        })
        .await;

        let failures = outcome.into_result().unwrap_err();
        assert_eq!(
            failures,
            vec![
                EngineFailure {
                    engine: "x".into(),
                    detail: "x broke".into()
                },
                EngineFailure {
                    engine: "y".into(),
                    detail: "y broke".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn empty_candidate_list_is_exhausted() {
        let none: [&str; 0] = [];
        let outcome: TrialOutcome<()> =
            try_in_order("test", &none, |_| async { Ok::<_, String>(()) }).await;
        assert!(matches!(outcome, TrialOutcome::Exhausted { ref failures } if failures.is_empty()));
    }
}
