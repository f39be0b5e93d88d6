//! Shared application state, built once from [`AppConfig`].

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::generators::ChromiumPdfEngine;
use crate::pipeline::DealPdfPipeline;
use crate::records::HubSpotRecordStore;
use crate::storage::HubSpotFileStorage;

const USER_AGENT: &str = concat!("deal-pdf-service/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DealPdfPipeline>,
    pub api_key: String,
}

impl AppState {
    pub fn new(pipeline: Arc<DealPdfPipeline>, api_key: impl Into<String>) -> Self {
        Self {
            pipeline,
            api_key: api_key.into(),
        }
    }

    /// State for the HTTP service. Requires the endpoint api key.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let pipeline = build_pipeline(config)?;
        Ok(Self::new(Arc::new(pipeline), api_key))
    }
}

pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(900))
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(120))
        .user_agent(USER_AGENT)
        .build()
}

/// Wire the HubSpot clients and the Chromium engine into a pipeline.
pub fn build_pipeline(config: &AppConfig) -> Result<DealPdfPipeline, reqwest::Error> {
    let http_client = build_http_client()?;

    Ok(DealPdfPipeline::new(
        Arc::new(HubSpotRecordStore::new(&config.hubspot, http_client.clone())),
        Arc::new(ChromiumPdfEngine::from_config(&config.renderer)),
        Arc::new(HubSpotFileStorage::new(&config.hubspot, http_client)),
        config.hubspot.upload.clone(),
    ))
}
