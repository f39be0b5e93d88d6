use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::pipeline::PipelineOutcome;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GeneratePdfRequest {
    /// HubSpot deal identifier. A JSON number is accepted as well.
    #[serde(default, rename = "dealId", deserialize_with = "string_or_number")]
    #[schema(value_type = Option<String>, example = "1234567890")]
    pub deal_id: Option<String>,
}

impl GeneratePdfRequest {
    /// The trimmed deal id, `None` when missing or blank.
    pub fn deal_id(&self) -> Option<&str> {
        self.deal_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePdfResponse {
    #[schema(example = "1234567890")]
    pub deal_id: String,
    #[schema(example = "https://app.hubspot.com/files/Acme%20Renewal%20-%20Jo%20Lee.pdf")]
    pub pdf_url: String,
}

impl From<PipelineOutcome> for GeneratePdfResponse {
    fn from(outcome: PipelineOutcome) -> Self {
        Self {
            deal_id: outcome.deal_id,
            pdf_url: outcome.pdf_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
