//! Headless Chromium rendering engine.
//!
//! Writes the HTML to a scratch directory and drives the browser's
//! print-to-PDF mode. The scratch directory and the browser process are owned
//! by the conversion call and dropped with it, including on timeout.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tempfile::tempdir;
use tokio::process::Command;

use super::common::is_pdf;
use super::traits::PdfConverter;
use super::RenderError;
use crate::config::RendererConfig;

const HTML_FILENAME: &str = "document.html";
const PDF_FILENAME: &str = "document.pdf";

/// Virtual time granted to the page to settle before printing.
const SETTLE_BUDGET_MS: u64 = 5_000;

/// Converts HTML to PDF by running a headless Chromium per document.
#[derive(Debug, Clone)]
pub struct ChromiumPdfEngine {
    executable: String,
    timeout: Duration,
}

impl ChromiumPdfEngine {
    pub fn new(executable: impl Into<String>, timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    pub fn from_config(config: &RendererConfig) -> Self {
        Self::new(config.chromium_path.clone(), config.timeout)
    }

    /// Command-line arguments for printing `html_path` into `pdf_path`.
    pub fn browser_args(html_path: &Path, pdf_path: &Path) -> Vec<OsString> {
        let mut print_to = OsString::from("--print-to-pdf=");
        print_to.push(pdf_path);

        let mut page_url = OsString::from("file://");
        page_url.push(html_path);

        vec![
            "--headless".into(),
            "--disable-gpu".into(),
            "--no-sandbox".into(),
            "--disable-setuid-sandbox".into(),
            "--no-first-run".into(),
            "--no-pdf-header-footer".into(),
            "--run-all-compositor-stages-before-draw".into(),
            format!("--virtual-time-budget={SETTLE_BUDGET_MS}").into(),
            print_to,
            page_url,
        ]
    }
}

#[async_trait]
impl PdfConverter for ChromiumPdfEngine {
    async fn convert(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let temp_dir = tempdir().map_err(RenderError::TempDir)?;
        let html_path = temp_dir.path().join(HTML_FILENAME);
        let pdf_path = temp_dir.path().join(PDF_FILENAME);

        tokio::fs::write(&html_path, html)
            .await
            .map_err(RenderError::WriteHtml)?;

        debug!(
            "Launching {} for {} bytes of HTML in {}",
            self.executable,
            html.len(),
            temp_dir.path().display()
        );

        let mut command = Command::new(&self.executable);
        command
            .args(Self::browser_args(&html_path, &pdf_path))
            .current_dir(temp_dir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(RenderError::Spawn)?;

        // On timeout the output future is dropped, which kills the child.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| RenderError::Timeout(self.timeout.as_secs()))?
            .map_err(RenderError::Spawn)?;

        if !output.status.success() {
            return Err(RenderError::Exit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let pdf = tokio::fs::read(&pdf_path)
            .await
            .map_err(RenderError::ReadPdf)?;

        if !is_pdf(&pdf) {
            return Err(RenderError::NotAPdf);
        }

        info!("Rendered PDF ({} bytes)", pdf.len());
        Ok(pdf)
    }
}
