use std::collections::BTreeMap;
use std::sync::Arc;

use log::{error, info, warn};
use serde::Serialize;
use uuid::Uuid;

use super::filename::derive_pdf_filename;
use crate::error::{PipelineError, PipelineStage};
use crate::generators::{render_deal_document, PdfArtifact, PdfConverter};
use crate::records::{
    RecordStore, PDF_STATUS_PROPERTY, PDF_URL_PROPERTY, STATUS_FAILED, STATUS_GENERATED,
};
use crate::storage::{FileStorage, UploadOptions};

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutcome {
    pub deal_id: String,
    pub pdf_url: String,
}

/// Fields written onto the deal after a successful upload.
pub fn success_fields(pdf_url: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (PDF_URL_PROPERTY.to_string(), pdf_url.to_string()),
        (PDF_STATUS_PROPERTY.to_string(), STATUS_GENERATED.to_string()),
    ])
}

/// Fields written onto the deal when a run fails.
pub fn failure_fields() -> BTreeMap<String, String> {
    BTreeMap::from([(PDF_STATUS_PROPERTY.to_string(), STATUS_FAILED.to_string())])
}

/// Fetch → render → convert → upload → record, for one deal at a time.
///
/// Holds no per-run state: concurrent runs share only the collaborators.
pub struct DealPdfPipeline {
    records: Arc<dyn RecordStore>,
    converter: Arc<dyn PdfConverter>,
    storage: Arc<dyn FileStorage>,
    upload_options: UploadOptions,
}

impl DealPdfPipeline {
    pub fn new(
        records: Arc<dyn RecordStore>,
        converter: Arc<dyn PdfConverter>,
        storage: Arc<dyn FileStorage>,
        upload_options: UploadOptions,
    ) -> Self {
        Self {
            records,
            converter,
            storage,
            upload_options,
        }
    }

    /// Generate, upload and record the PDF for `deal_id`.
    ///
    /// On failure the deal is marked as failed (best effort) and the error
    /// that stopped the run is returned unchanged.
    pub async fn run(&self, deal_id: &str) -> Result<PipelineOutcome, PipelineError> {
        let run_id = Uuid::new_v4();
        info!("[{}] PDF generation started for deal {}", run_id, deal_id);

        match self.run_stages(run_id, deal_id).await {
            Ok(outcome) => {
                info!(
                    "[{}] PDF generation done for deal {}: {}",
                    run_id, deal_id, outcome.pdf_url
                );
                Ok(outcome)
            }
            Err(err) => {
                error!(
                    "[{}] PDF generation failed for deal {} while {}: {}",
                    run_id,
                    deal_id,
                    err.stage(),
                    err
                );
                self.mark_failed_best_effort(deal_id).await;
                Err(err)
            }
        }
    }

    /// Write the failure status onto the deal. Never fails: a write-back
    /// error is logged and dropped.
    pub async fn mark_failed_best_effort(&self, deal_id: &str) {
        match self.records.patch_fields(deal_id, &failure_fields()).await {
            Ok(()) => info!("Deal {} marked as {}", deal_id, STATUS_FAILED),
            Err(e) => warn!(
                "Could not mark deal {} as {}: {}",
                deal_id, STATUS_FAILED, e
            ),
        }
    }

    async fn run_stages(
        &self,
        run_id: Uuid,
        deal_id: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        let enter = |stage: PipelineStage| info!("[{}] -> {}", run_id, stage);

        enter(PipelineStage::Fetching);
        let bundle = self.records.fetch_bundle(deal_id).await?;
        let filename = derive_pdf_filename(deal_id, &bundle);

        enter(PipelineStage::Rendering);
        let html = render_deal_document(&bundle);

        enter(PipelineStage::Converting);
        let pdf = self.converter.convert(&html).await?;
        let artifact = PdfArtifact { filename, pdf };

        enter(PipelineStage::Uploading);
        let pdf_url = self
            .storage
            .upload(artifact.pdf, &artifact.filename, &self.upload_options)
            .await?;

        enter(PipelineStage::Recording);
        self.records
            .patch_fields(deal_id, &success_fields(&pdf_url))
            .await?;

        enter(PipelineStage::Done);
        Ok(PipelineOutcome {
            deal_id: deal_id.to_string(),
            pdf_url,
        })
    }
}
