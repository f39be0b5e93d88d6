//! Seam between the pipeline and whatever turns HTML into PDF bytes.

use async_trait::async_trait;

use super::RenderError;

#[async_trait]
pub trait PdfConverter: Send + Sync {
    /// Convert a self-contained HTML document into PDF bytes.
    ///
    /// Implementations must release every resource they acquire (browser
    /// process, scratch files) before returning, on success and on failure.
    async fn convert(&self, html: &str) -> Result<Vec<u8>, RenderError>;
}
