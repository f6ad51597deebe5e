use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub devserver: DevServerConfig,
}

/// Where the moderation backend lives and how long a request may take.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout; a hung backend resolves to a network error after this.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_dashboard_interval_secs")]
    pub dashboard_interval_secs: u64,
    #[serde(default = "default_list_interval_secs")]
    pub list_interval_secs: u64,
    #[serde(default = "default_analytics_interval_secs")]
    pub analytics_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// How many of the newest items the "recent" panel shows.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,
    /// Repeated enqueues from the same source inside this window collapse into one.
    #[serde(default = "default_dedup_window_secs")]
    pub dedup_window_secs: u64,
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    #[serde(default = "default_server")]
    pub default_server: String,
    #[serde(default = "default_category")]
    pub default_category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_seed_posts")]
    pub seed_posts: usize,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default = "default_moderation_tick_secs")]
    pub moderation_tick_secs: u64,
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl PollingConfig {
    pub fn dashboard_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard_interval_secs.max(1))
    }

    pub fn list_interval(&self) -> Duration {
        Duration::from_secs(self.list_interval_secs.max(1))
    }

    pub fn analytics_interval(&self) -> Duration {
        Duration::from_secs(self.analytics_interval_secs.max(1))
    }
}

impl NotificationConfig {
    pub fn expire_after(&self) -> Duration {
        Duration::from_secs(self.expire_secs)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_secs(self.dedup_window_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            dashboard_interval_secs: default_dashboard_interval_secs(),
            list_interval_secs: default_list_interval_secs(),
            analytics_interval_secs: default_analytics_interval_secs(),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            expire_secs: default_expire_secs(),
            dedup_window_secs: default_dedup_window_secs(),
            max_visible: default_max_visible(),
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            default_server: default_server(),
            default_category: default_category(),
        }
    }
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            seed_posts: default_seed_posts(),
            worker_count: default_worker_count(),
            moderation_tick_secs: default_moderation_tick_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_request_timeout_secs() -> u64 {
    12
}

fn default_dashboard_interval_secs() -> u64 {
    10
}

fn default_list_interval_secs() -> u64 {
    10
}

fn default_analytics_interval_secs() -> u64 {
    30
}

fn default_page_size() -> usize {
    10
}

fn default_recent_limit() -> usize {
    5
}

fn default_expire_secs() -> u64 {
    5
}

fn default_dedup_window_secs() -> u64 {
    3
}

fn default_max_visible() -> usize {
    4
}

fn default_server() -> String {
    "server1".to_string()
}

fn default_category() -> String {
    "general".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_seed_posts() -> usize {
    40
}

fn default_worker_count() -> usize {
    4
}

fn default_moderation_tick_secs() -> u64 {
    3
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &std::path::Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
