use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::SeedsError;

pub const DEFAULT_SITE_URL: &str = "https://vulkanseeds.bolt.host";
pub const ANON_KEY_ENV: &str = "VULKANSEEDS_ANON_KEY";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub store_url: String,
    #[serde(default)]
    pub anon_key: Option<String>,
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub reconcile: Option<ReconcilePolicy>,
    #[serde(default)]
    pub static_files: Option<Vec<String>>,
}

/// What happens to the optimistic view count when the remote increment fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconcilePolicy {
    #[default]
    AcceptDrift,
    Revert,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub store_url: String,
    pub anon_key: String,
    pub site_url: String,
    pub reconcile: ReconcilePolicy,
    pub static_files: Vec<String>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, SeedsError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("vulkanseeds.json"),
        };

        if path.is_none() && !config_path.exists() {
            return Err(SeedsError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| SeedsError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| SeedsError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config, std::env::var(ANON_KEY_ENV).ok())
    }

    pub fn resolve_config(
        config: Config,
        anon_key_override: Option<String>,
    ) -> Result<ResolvedConfig, SeedsError> {
        let store_url = config.store_url.trim().trim_end_matches('/').to_string();
        if store_url.is_empty() {
            return Err(SeedsError::ConfigParse("store_url is empty".to_string()));
        }

        let anon_key = anon_key_override
            .filter(|value| !value.trim().is_empty())
            .or(config.anon_key)
            .unwrap_or_default();

        let site_url = config
            .site_url
            .as_deref()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());

        Ok(ResolvedConfig {
            store_url,
            anon_key,
            site_url,
            reconcile: config.reconcile.unwrap_or_default(),
            static_files: config.static_files.unwrap_or_else(default_static_files),
        })
    }
}

pub fn default_static_files() -> Vec<String> {
    vec![
        "sitemap.xml".to_string(),
        "robots.txt".to_string(),
        "ads.txt".to_string(),
    ]
}
