//! HTML → PDF through a headless Chromium-family browser.
//!
//! Shared by the code renderer and the HTML-intermediate Markdown engines.
//! The browser is pointed at the HTML as a `file://` URL so relative
//! stylesheet and image references keep resolving.

use crate::pipeline::command::{self, CommandError, CommandSpec};
use std::path::Path;
use std::time::Duration;

/// Print `html` to `pdf` with the browser at `browser`.
///
/// A zero exit status without the PDF on disk is treated as a failure;
/// some Chromium builds exit cleanly when printing is blocked by policy.
pub async fn html_to_pdf(
    browser: &Path,
    html: &Path,
    pdf: &Path,
    cwd: &Path,
    timeout: Duration,
) -> Result<(), CommandError> {
    let spec = CommandSpec::new(browser)
        .args([
            "--headless",
            "--disable-gpu",
            "--no-sandbox",
            "--no-pdf-header-footer",
        ])
        .arg(format!("--print-to-pdf={}", pdf.display()))
        .arg(file_url(html))
        .current_dir(cwd);

    command::run(&spec, timeout).await?;

    if !pdf.is_file() {
        return Err(CommandError::NonZeroExit {
            program: spec.program_name(),
            code: Some(0),
            stdout: String::new(),
            stderr: format!("no PDF written to {}", pdf.display()),
        });
    }
    Ok(())
}

/// `file://` URL for an absolute (or cwd-relative) path.
pub fn file_url(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|d| d.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    format!("file://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_url_is_absolute() {
        assert_eq!(
            file_url(Path::new("/tmp/code_to_pdf/html/main.py.html")),
            "file:///tmp/code_to_pdf/html/main.py.html"
        );
        assert!(file_url(Path::new("rel.html")).starts_with("file:///"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn clean_exit_without_pdf_is_failure() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let html = tmp.path().join("x.html");
        std::fs::write(&html, "<html></html>").unwrap();
        let err = html_to_pdf(
            Path::new("true"),
            &html,
            &tmp.path().join("x.pdf"),
            tmp.path(),
            Duration::from_secs(10),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("no PDF written"), "got: {err}");
    }
}
