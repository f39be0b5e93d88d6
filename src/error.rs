//! Pipeline error taxonomy.

use std::fmt;

use thiserror::Error;

use crate::generators::RenderError;

/// Stages of one pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Fetching,
    Rendering,
    Converting,
    Uploading,
    Recording,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetching => "fetching",
            Self::Rendering => "rendering",
            Self::Converting => "converting",
            Self::Uploading => "uploading",
            Self::Recording => "recording",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("deal {deal_id} not found in HubSpot")]
    NotFound { deal_id: String },

    #[error("HubSpot deal fetch failed: {status} {body}")]
    RecordFetch { status: u16, body: String },

    #[error("deal {deal_id} has empty {property}")]
    EmptyBundle { deal_id: String, property: String },

    #[error("deal bundle is not valid JSON: {0}")]
    MalformedBundle(#[source] serde_json::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("HubSpot file upload failed: {status} {body}")]
    Upload { status: u16, body: String },

    #[error("upload ok but no file URL in response: {body}")]
    MissingUrlInResponse { body: String },

    #[error("HubSpot deal patch failed: {status} {body}")]
    RecordPatch { status: u16, body: String },

    #[error("request failed while {stage}: {source}")]
    Transport {
        stage: PipelineStage,
        #[source]
        source: reqwest::Error,
    },
}

impl PipelineError {
    /// The stage this failure belongs to.
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::NotFound { .. }
            | Self::RecordFetch { .. }
            | Self::EmptyBundle { .. }
            | Self::MalformedBundle(_) => PipelineStage::Fetching,
            Self::Render(_) => PipelineStage::Converting,
            Self::Upload { .. } | Self::MissingUrlInResponse { .. } => PipelineStage::Uploading,
            Self::RecordPatch { .. } => PipelineStage::Recording,
            Self::Transport { stage, .. } => *stage,
        }
    }
}
