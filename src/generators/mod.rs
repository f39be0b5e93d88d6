//! Generators module - turns a deal bundle into a PDF document.
//!
//! - `document` - pure HTML rendering of a [`DealBundle`](crate::bundle::DealBundle)
//! - `engine` - headless Chromium conversion of that HTML into PDF bytes
//! - `common` - escaping, filename sanitization and timestamp helpers

pub mod common;
pub mod document;
pub mod engine;
pub mod traits;

pub use document::{render_deal_document, render_deal_document_at, EMPTY_ITEMS_TEXT};
pub use engine::ChromiumPdfEngine;
pub use traits::PdfConverter;

use thiserror::Error;

/// Errors that can occur while converting HTML to PDF.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write HTML source: {0}")]
    WriteHtml(#[source] std::io::Error),
    #[error("failed to start headless browser: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("headless browser did not finish within {0}s")]
    Timeout(u64),
    #[error("headless browser exited with status {code}: {stderr}")]
    Exit { code: i32, stderr: String },
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("headless browser output is not a PDF")]
    NotAPdf,
}

/// A converted document ready for upload.
#[derive(Debug)]
pub struct PdfArtifact {
    pub filename: String,
    pub pdf: Vec<u8>,
}
