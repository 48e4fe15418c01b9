//! Application configuration model.
//!
//! Every section has serde defaults so a partial (or missing) config file
//! yields a usable configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Messaging gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the HTTP gateway.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8081".to_string()
}

/// Session persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File stem of the session database.
    #[serde(default = "default_session_name")]
    pub name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: default_session_name(),
        }
    }
}

fn default_session_name() -> String {
    "anon".to_string()
}

/// Chat name resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Whether the name query is matched case-sensitively.
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,

    /// Characters of the latest message shown per candidate.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            case_sensitive: default_case_sensitive(),
            preview_chars: default_preview_chars(),
        }
    }
}

const fn default_case_sensitive() -> bool {
    true
}

const fn default_preview_chars() -> usize {
    20
}

/// History retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Messages requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

const fn default_page_size() -> usize {
    100
}

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".chat-history-export")
    }

    /// Get the session database path.
    #[must_use]
    pub fn session_db_path(&self) -> PathBuf {
        self.data_dir()
            .join(format!("{}.session", self.session.name))
    }
}
