//! File host: uploads generated PDFs and hands back their public URL.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

use crate::config::HubSpotConfig;
use crate::error::{PipelineError, PipelineStage};

/// Response fields that may carry the uploaded file URL, in lookup order.
pub const URL_FIELDS: [&str; 3] = ["url", "friendlyUrl", "friendly_url"];

/// Visibility of an uploaded file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileAccess {
    PublicIndexable,
    #[default]
    PublicNotIndexable,
    Private,
}

impl FileAccess {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PUBLIC_INDEXABLE" => Some(Self::PublicIndexable),
            "PUBLIC_NOT_INDEXABLE" => Some(Self::PublicNotIndexable),
            "PRIVATE" => Some(Self::Private),
            _ => None,
        }
    }
}

/// Where the file lands on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderTarget {
    Id(String),
    Path(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadOptions {
    pub access: FileAccess,
    pub overwrite: Option<bool>,
    pub folder: Option<FolderTarget>,
}

impl UploadOptions {
    /// The `options` form field.
    pub fn options_json(&self) -> String {
        #[derive(Serialize)]
        struct Wire {
            access: FileAccess,
            #[serde(skip_serializing_if = "Option::is_none")]
            overwrite: Option<bool>,
        }

        serde_json::json!(Wire {
            access: self.access,
            overwrite: self.overwrite,
        })
        .to_string()
    }
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Upload `bytes` as `filename` and return the file's URL.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        options: &UploadOptions,
    ) -> Result<String, PipelineError>;
}

/// First non-blank URL field of an upload response.
pub fn extract_file_url(response: &Value) -> Option<String> {
    URL_FIELDS.iter().find_map(|field| {
        response
            .get(*field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    })
}

/// HubSpot Files API v3 client.
pub struct HubSpotFileStorage {
    http_client: reqwest::Client,
    token: String,
    api_base: Url,
}

impl HubSpotFileStorage {
    pub fn new(config: &HubSpotConfig, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            token: config.token.clone(),
            api_base: config.api_base.clone(),
        }
    }

    fn files_url(&self) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["files", "v3", "files"]);
        }
        url
    }

    fn build_form(
        bytes: Vec<u8>,
        filename: &str,
        options: &UploadOptions,
    ) -> Result<Form, reqwest::Error> {
        let mime = mime_guess::from_path(filename).first_or_octet_stream();
        let file = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime.as_ref())?;

        // Filenames go out verbatim, not as RFC 5987 `filename*=` parameters.
        let mut form = Form::new()
            .percent_encode_noop()
            .part("file", file)
            .text("options", options.options_json());

        form = match &options.folder {
            Some(FolderTarget::Id(id)) => form.text("folderId", id.clone()),
            Some(FolderTarget::Path(path)) => form.text("folderPath", path.clone()),
            None => form,
        };

        Ok(form)
    }
}

#[async_trait]
impl FileStorage for HubSpotFileStorage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        options: &UploadOptions,
    ) -> Result<String, PipelineError> {
        let transport = |source: reqwest::Error| PipelineError::Transport {
            stage: PipelineStage::Uploading,
            source,
        };

        let url = self.files_url();
        debug!("Uploading {} ({} bytes) to {}", filename, bytes.len(), url);

        let form = Self::build_form(bytes, filename, options).map_err(transport)?;
        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(PipelineError::Upload {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        match extract_file_url(&parsed) {
            Some(file_url) => {
                info!("Uploaded {} to {}", filename, file_url);
                Ok(file_url)
            }
            None => Err(PipelineError::MissingUrlInResponse { body }),
        }
    }
}
