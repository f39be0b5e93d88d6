//! Test doubles for the pipeline collaborators.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use deal_pdf_service::bundle::DealBundle;
use deal_pdf_service::generators::{PdfConverter, RenderError};
use deal_pdf_service::records::RecordStore;
use deal_pdf_service::storage::{FileStorage, UploadOptions};
use deal_pdf_service::{DealPdfPipeline, PipelineError};
use tokio::sync::Mutex;

pub const MOCK_PDF: &[u8] = b"%PDF-1.7\n% mock document\n";
pub const MOCK_URL: &str = "https://files.example.com/deal.pdf";

type FetchError = Box<dyn Fn(&str) -> PipelineError + Send + Sync>;

/// Record store serving one bundle and remembering every patch.
pub struct MockRecordStore {
    bundle: DealBundle,
    fetch_error: Option<FetchError>,
    patch_failure: Option<u16>,
    pub fetch_count: AtomicUsize,
    pub patches: Mutex<Vec<(String, BTreeMap<String, String>)>>,
}

impl MockRecordStore {
    pub fn with_bundle(bundle: DealBundle) -> Self {
        Self {
            bundle,
            fetch_error: None,
            patch_failure: None,
            fetch_count: AtomicUsize::new(0),
            patches: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_fetch<F>(error: F) -> Self
    where
        F: Fn(&str) -> PipelineError + Send + Sync + 'static,
    {
        Self {
            fetch_error: Some(Box::new(error)),
            ..Self::with_bundle(DealBundle::default())
        }
    }

    /// Every patch is recorded, then answered with `status`.
    pub fn with_failing_patches(mut self, status: u16) -> Self {
        self.patch_failure = Some(status);
        self
    }

    pub async fn recorded_patches(&self) -> Vec<(String, BTreeMap<String, String>)> {
        self.patches.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl RecordStore for MockRecordStore {
    async fn fetch_bundle(&self, deal_id: &str) -> Result<DealBundle, PipelineError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        match &self.fetch_error {
            Some(make_error) => Err(make_error(deal_id)),
            None => Ok(self.bundle.clone()),
        }
    }

    async fn patch_fields(
        &self,
        deal_id: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<(), PipelineError> {
        self.patches
            .lock()
            .await
            .push((deal_id.to_string(), fields.clone()));

        match self.patch_failure {
            Some(status) => Err(PipelineError::RecordPatch {
                status,
                body: "patch refused".to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Converter returning a fixed PDF, or failing like a browser that never settles.
pub struct MockPdfConverter {
    fail: bool,
    pub calls: AtomicUsize,
    pub last_html: Mutex<Option<String>>,
}

impl MockPdfConverter {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
            last_html: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PdfConverter for MockPdfConverter {
    async fn convert(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_html.lock().await = Some(html.to_string());

        if self.fail {
            return Err(RenderError::Timeout(30));
        }
        Ok(MOCK_PDF.to_vec())
    }
}

pub enum UploadBehaviour {
    Url(String),
    MissingUrl,
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub options: UploadOptions,
}

pub struct MockFileStorage {
    behaviour: UploadBehaviour,
    pub uploads: Mutex<Vec<RecordedUpload>>,
}

impl MockFileStorage {
    pub fn new(behaviour: UploadBehaviour) -> Self {
        Self {
            behaviour,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn returning_url() -> Self {
        Self::new(UploadBehaviour::Url(MOCK_URL.to_string()))
    }

    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl FileStorage for MockFileStorage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        options: &UploadOptions,
    ) -> Result<String, PipelineError> {
        self.uploads.lock().await.push(RecordedUpload {
            filename: filename.to_string(),
            bytes,
            options: options.clone(),
        });

        match &self.behaviour {
            UploadBehaviour::Url(url) => Ok(url.clone()),
            UploadBehaviour::MissingUrl => Err(PipelineError::MissingUrlInResponse {
                body: r#"{"id":"1"}"#.to_string(),
            }),
            UploadBehaviour::Status(status) => Err(PipelineError::Upload {
                status: *status,
                body: "upload refused".to_string(),
            }),
        }
    }
}

pub struct Harness {
    pub records: Arc<MockRecordStore>,
    pub converter: Arc<MockPdfConverter>,
    pub storage: Arc<MockFileStorage>,
    pub pipeline: DealPdfPipeline,
}

pub fn harness(
    records: MockRecordStore,
    converter: MockPdfConverter,
    storage: MockFileStorage,
) -> Harness {
    harness_with_options(records, converter, storage, UploadOptions::default())
}

pub fn harness_with_options(
    records: MockRecordStore,
    converter: MockPdfConverter,
    storage: MockFileStorage,
    options: UploadOptions,
) -> Harness {
    let records = Arc::new(records);
    let converter = Arc::new(converter);
    let storage = Arc::new(storage);
    let pipeline = DealPdfPipeline::new(
        records.clone(),
        converter.clone(),
        storage.clone(),
        options,
    );

    Harness {
        records,
        converter,
        storage,
        pipeline,
    }
}

pub fn acme_bundle() -> DealBundle {
    DealBundle::from_json_str(
        r#"{
            "deal": {"dealname": "Acme Renewal", "amount": "12000", "closedate": "2025-03-31",
                     "pipeline": "default", "dealstage": "closedwon"},
            "contact": {"firstname": "Jo", "lastname": "Lee", "email": "jo@acme.test", "phone": "+33 1 23 45 67 89"},
            "company": {"name": "Acme", "domain": "acme.test", "city": "Lyon"},
            "line_items": [
                {"name": "Licence", "quantity": "2", "price": "5000", "amount": "10000"},
                {"name": "Support", "quantity": 1, "price": 2000, "amount": 2000}
            ]
        }"#,
    )
    .expect("fixture bundle parses")
}
