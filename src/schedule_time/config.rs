//! Client configuration for the schedule-times backend.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Configuration for [`RestScheduleTimeRepository`](super::RestScheduleTimeRepository).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the REST backend, e.g. `https://academia.example.edu/api`
    pub base_url: String,
    /// Resource path segment for schedule times
    pub resource: String,
    /// Default page size for list requests
    pub page_size: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Bearer token for the backend, if required
    pub auth_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            resource: "schedule-times".to_string(),
            page_size: 25,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            user_agent: concat!("horarios/", env!("CARGO_PKG_VERSION")).to_string(),
            auth_token: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a JSON file, falling back to defaults for
    /// absent fields.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: ClientConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
