//! Record store: reads the deal bundle and writes the generation result back.

use std::collections::BTreeMap;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{StatusCode, Url};
use serde_json::{json, Value};

use crate::bundle::DealBundle;
use crate::config::HubSpotConfig;
use crate::error::{PipelineError, PipelineStage};

/// Deal property holding the bundle JSON.
pub const BUNDLE_PROPERTY: &str = "pdf_donnees_json";
/// Deal property receiving the uploaded PDF URL.
pub const PDF_URL_PROPERTY: &str = "pdf_url";
/// Deal property receiving the generation status.
pub const PDF_STATUS_PROPERTY: &str = "pdf_statut";

pub const STATUS_GENERATED: &str = "GENERE";
pub const STATUS_FAILED: &str = "ECHEC";

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read and parse the bundle stored on the deal.
    async fn fetch_bundle(&self, deal_id: &str) -> Result<DealBundle, PipelineError>;

    /// Partially update the deal's properties.
    async fn patch_fields(
        &self,
        deal_id: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<(), PipelineError>;
}

/// Extract and parse the bundle property from a deal read response.
pub fn parse_bundle_response(deal_id: &str, response: &Value) -> Result<DealBundle, PipelineError> {
    let raw = response
        .get("properties")
        .and_then(|p| p.get(BUNDLE_PROPERTY))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| PipelineError::EmptyBundle {
            deal_id: deal_id.to_string(),
            property: BUNDLE_PROPERTY.to_string(),
        })?;

    DealBundle::from_json_str(raw).map_err(PipelineError::MalformedBundle)
}

/// HubSpot CRM v3 deals client.
pub struct HubSpotRecordStore {
    http_client: reqwest::Client,
    token: String,
    api_base: Url,
}

impl HubSpotRecordStore {
    pub fn new(config: &HubSpotConfig, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            token: config.token.clone(),
            api_base: config.api_base.clone(),
        }
    }

    /// `<base>/crm/v3/objects/deals/<id>` with the id percent-encoded.
    pub fn deal_url(&self, deal_id: &str) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["crm", "v3", "objects", "deals", deal_id]);
        }
        url
    }
}

#[async_trait]
impl RecordStore for HubSpotRecordStore {
    async fn fetch_bundle(&self, deal_id: &str) -> Result<DealBundle, PipelineError> {
        let transport = |source: reqwest::Error| PipelineError::Transport {
            stage: PipelineStage::Fetching,
            source,
        };

        let mut url = self.deal_url(deal_id);
        url.query_pairs_mut()
            .append_pair("properties", BUNDLE_PROPERTY);
        debug!("Fetching deal bundle from {}", url);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PipelineError::NotFound {
                deal_id: deal_id.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::RecordFetch {
                status: status.as_u16(),
                body,
            });
        }

        // A 2xx that is not JSON (proxy or login page) keeps its status and body.
        let body = response.text().await.map_err(transport)?;
        let payload: Value = match serde_json::from_str(&body) {
            Ok(payload) => payload,
            Err(_) => {
                return Err(PipelineError::RecordFetch {
                    status: status.as_u16(),
                    body,
                })
            }
        };
        let bundle = parse_bundle_response(deal_id, &payload)?;
        info!(
            "Fetched bundle for deal {} ({} line items)",
            deal_id,
            bundle.line_items.len()
        );
        Ok(bundle)
    }

    async fn patch_fields(
        &self,
        deal_id: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<(), PipelineError> {
        let url = self.deal_url(deal_id);
        debug!("Patching deal {} with {:?}", deal_id, fields);

        let response = self
            .http_client
            .patch(url)
            .bearer_auth(&self.token)
            .json(&json!({ "properties": fields }))
            .send()
            .await
            .map_err(|source| PipelineError::Transport {
                stage: PipelineStage::Recording,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::RecordPatch {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
