//! # Configuration
//!
//! Settings are loaded with [`confique`], layered in priority order:
//!
//! 1. **Environment variables**: `CATALOG_DATA_FILE`, `CATALOG_LOG`,
//!    `CATALOG_CLEANUP_ACTION`.
//! 2. **Config file**: `catalog.toml` in the data directory.
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_file` | `catalog.json` | Catalog document inside the data directory |
//! | `log_filter` | `warn` | `tracing` filter directive for the CLI |
//! | `cleanup_action` | `report` | Default for `catalog cleanup` (`fix`, `remove`, `report`) |
//! | `sync_channels` | all | Channels reported by `catalog sync-status` |

use crate::commands::cleanup::CleanupAction;
use crate::error::{CatalogError, Result};
use crate::model::Channel;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "catalog.toml";

/// Configuration for the catalog engine, stored in `catalog.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// File name of the catalog document inside the data directory
    #[config(env = "CATALOG_DATA_FILE", default = "catalog.json")]
    pub data_file: String,

    /// Log filter directive, e.g. "info" or "catalogapp=debug"
    #[config(env = "CATALOG_LOG", default = "warn")]
    pub log_filter: String,

    /// What `cleanup` does when no action is given
    #[config(env = "CATALOG_CLEANUP_ACTION", default = "report")]
    pub cleanup_action: String,

    /// Channels to report sync status for. All channels when absent.
    pub sync_channels: Option<Vec<Channel>>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_file: "catalog.json".to_string(),
            log_filter: "warn".to_string(),
            cleanup_action: "report".to_string(),
            sync_channels: None,
        }
    }
}

impl CatalogConfig {
    /// Load from the environment and `<dir>/catalog.toml` (if present).
    pub fn load(dir: &Path) -> Result<Self> {
        let config = CatalogConfig::builder()
            .env()
            .file(dir.join(CONFIG_FILE_NAME))
            .load()?;
        Ok(config)
    }

    pub fn cleanup_action(&self) -> Result<CleanupAction> {
        self.cleanup_action.parse().map_err(CatalogError::Api)
    }

    pub fn sync_channels(&self) -> Vec<Channel> {
        self.sync_channels
            .clone()
            .unwrap_or_else(|| Channel::ALL.to_vec())
    }

    /// Look up a setting by key, rendered as text.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_file" => Some(self.data_file.clone()),
            "log_filter" => Some(self.log_filter.clone()),
            "cleanup_action" => Some(self.cleanup_action.clone()),
            "sync_channels" => Some(
                self.sync_channels()
                    .iter()
                    .map(Channel::name)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            _ => None,
        }
    }

    /// All settings as `(key, value)` pairs, in table order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        ["data_file", "log_filter", "cleanup_action", "sync_channels"]
            .into_iter()
            .filter_map(|key| self.get(key).map(|value| (key, value)))
            .collect()
    }
}
