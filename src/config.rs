//! Process configuration.
//!
//! Everything is read from the environment exactly once at startup and then
//! passed down explicitly; no module reads `std::env` on its own.

use std::env;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::storage::{FileAccess, FolderTarget, UploadOptions};

pub const DEFAULT_API_BASE: &str = "https://api.hubapi.com";
pub const DEFAULT_CHROMIUM_PATH: &str = "chromium";
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Missing or unusable configuration. Fatal: no pipeline is attempted.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct HubSpotConfig {
    pub token: String,
    pub api_base: Url,
    pub upload: UploadOptions,
}

#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub chromium_path: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub hubspot: HubSpotConfig,
    pub renderer: RendererConfig,
    pub server: ServerConfig,
    /// Only used by the one-shot job.
    pub deal_id: Option<String>,
}

impl AppConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let token = get("HUBSPOT_TOKEN").ok_or(ConfigError::Missing("HUBSPOT_TOKEN"))?;

        let api_base = parse_api_base(
            &get("HUBSPOT_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        )?;

        let access = match get("HUBSPOT_FILES_ACCESS") {
            Some(raw) => FileAccess::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "HUBSPOT_FILES_ACCESS",
                value: raw.clone(),
                reason: "expected PUBLIC_INDEXABLE, PUBLIC_NOT_INDEXABLE or PRIVATE".to_string(),
            })?,
            None => FileAccess::default(),
        };

        let overwrite = match get("HUBSPOT_FILES_OVERWRITE") {
            Some(raw) => Some(parse_bool("HUBSPOT_FILES_OVERWRITE", &raw)?),
            None => None,
        };

        // A folder id wins over a folder path when both are configured.
        let folder = get("HUBSPOT_FILES_FOLDER_ID")
            .map(FolderTarget::Id)
            .or_else(|| get("HUBSPOT_FILES_FOLDER_PATH").map(FolderTarget::Path));

        let timeout_secs = match get("PDF_RENDER_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("PDF_RENDER_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_RENDER_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "PDF_RENDER_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }

        let port = match get("PORT") {
            Some(raw) => parse_number::<u16>("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        Ok(AppConfig {
            hubspot: HubSpotConfig {
                token,
                api_base,
                upload: UploadOptions {
                    access,
                    overwrite,
                    folder,
                },
            },
            renderer: RendererConfig {
                chromium_path: get("CHROMIUM_PATH")
                    .unwrap_or_else(|| DEFAULT_CHROMIUM_PATH.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
            server: ServerConfig {
                host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
                api_key: get("ENDPOINT_API_KEY"),
            },
            deal_id: get("DEAL_ID"),
        })
    }

    /// Deal identifier for the one-shot job.
    pub fn require_deal_id(&self) -> Result<&str, ConfigError> {
        self.deal_id
            .as_deref()
            .ok_or(ConfigError::Missing("DEAL_ID"))
    }

    /// Shared secret guarding the service endpoint.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.server
            .api_key
            .as_deref()
            .ok_or(ConfigError::Missing("ENDPOINT_API_KEY"))
    }
}

fn parse_api_base(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "HUBSPOT_API_BASE",
        value: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("HUBSPOT_TOKEN", "pat-123")])).unwrap();

        assert_eq!(config.hubspot.token, "pat-123");
        assert_eq!(config.hubspot.api_base.as_str(), "https://api.hubapi.com/");
        assert_eq!(config.hubspot.upload.access, FileAccess::PublicNotIndexable);
        assert_eq!(config.hubspot.upload.folder, None);
        assert_eq!(config.hubspot.upload.overwrite, None);
        assert_eq!(config.renderer.chromium_path, "chromium");
        assert_eq!(config.renderer.timeout, Duration::from_secs(60));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.deal_id, None);
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&[("DEAL_ID", "42")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("HUBSPOT_TOKEN"));
    }

    #[test]
    fn test_blank_token_counts_as_missing() {
        let err = AppConfig::from_lookup(lookup(&[("HUBSPOT_TOKEN", "   ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("HUBSPOT_TOKEN"));
    }

    #[test]
    fn test_mode_requirements() {
        let config = AppConfig::from_lookup(lookup(&[("HUBSPOT_TOKEN", "t")])).unwrap();
        assert_eq!(config.require_deal_id(), Err(ConfigError::Missing("DEAL_ID")));
        assert_eq!(
            config.require_api_key(),
            Err(ConfigError::Missing("ENDPOINT_API_KEY"))
        );

        let config = AppConfig::from_lookup(lookup(&[
            ("HUBSPOT_TOKEN", "t"),
            ("DEAL_ID", " 1234 "),
            ("ENDPOINT_API_KEY", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.require_deal_id(), Ok("1234"));
        assert_eq!(config.require_api_key(), Ok("secret"));
    }

    #[test]
    fn test_folder_id_wins_over_path() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HUBSPOT_TOKEN", "t"),
            ("HUBSPOT_FILES_FOLDER_ID", "987"),
            ("HUBSPOT_FILES_FOLDER_PATH", "/deals"),
        ]))
        .unwrap();
        assert_eq!(
            config.hubspot.upload.folder,
            Some(FolderTarget::Id("987".to_string()))
        );

        let config = AppConfig::from_lookup(lookup(&[
            ("HUBSPOT_TOKEN", "t"),
            ("HUBSPOT_FILES_FOLDER_PATH", "/deals"),
        ]))
        .unwrap();
        assert_eq!(
            config.hubspot.upload.folder,
            Some(FolderTarget::Path("/deals".to_string()))
        );
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = AppConfig::from_lookup(lookup(&[("HUBSPOT_TOKEN", "t"), ("PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = AppConfig::from_lookup(lookup(&[
            ("HUBSPOT_TOKEN", "t"),
            ("HUBSPOT_API_BASE", "ftp://example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "HUBSPOT_API_BASE", .. }));

        let err = AppConfig::from_lookup(lookup(&[
            ("HUBSPOT_TOKEN", "t"),
            ("PDF_RENDER_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { name: "PDF_RENDER_TIMEOUT_SECS", .. }
        ));

        let err = AppConfig::from_lookup(lookup(&[
            ("HUBSPOT_TOKEN", "t"),
            ("HUBSPOT_FILES_ACCESS", "WORLD"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "HUBSPOT_FILES_ACCESS", .. }));
    }

    #[test]
    fn test_overwrite_flag() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HUBSPOT_TOKEN", "t"),
            ("HUBSPOT_FILES_OVERWRITE", "TRUE"),
        ]))
        .unwrap();
        assert_eq!(config.hubspot.upload.overwrite, Some(true));
    }
}
