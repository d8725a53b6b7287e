use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::auto_close;
use crate::domain::TimerKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub observability: ObservabilityConfig,

    pub solved: SolvedConfig,

    pub rate_limit: RateLimitConfig,

    pub lock: LockConfig,

    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Event bus buffer size (default: 100)
    pub event_bus_buffer_size: usize,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/solved.db".to_string(),
            log_level: "info".to_string(),
            event_bus_buffer_size: 100,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 6790,
            cors_allowed_origins: vec![
                "http://localhost:6790".to_string(),
                "http://127.0.0.1:6790".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "solved".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

/// Site-wide settings of the accepted-answer feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolvedConfig {
    pub enabled: bool,

    /// Allow accepting answers on every topic regardless of category or tags.
    pub allow_solved_on_all_topics: bool,

    /// Tags that enable accepted answers on a topic even if its category does not.
    pub enable_solved_tags: Vec<String>,

    /// Users at or above this trust level may accept answers on any topic.
    pub accept_all_solutions_trust_level: u8,

    /// Topic authors may accept answers on their own open topics.
    pub accept_solutions_topic_author: bool,

    /// Also notify the topic author when someone else accepts an answer.
    pub notify_on_staff_accept_solved: bool,

    /// Close solved topics this many hours after their last post (0 disables).
    pub solved_topics_auto_close_hours: u32,

    pub auto_close_mode: TimerKind,

    /// Category group moderators may accept answers in their categories.
    pub enable_category_group_moderation: bool,

    /// Characters of the accepted answer shown in the topic view (0 hides the excerpt).
    pub solved_quote_length: usize,

    /// Remind authors of topics still unsolved after this many days (0 disables).
    pub unresolved_reminder_delay_days: u32,
}

impl Default for SolvedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_solved_on_all_topics: false,
            enable_solved_tags: Vec::new(),
            accept_all_solutions_trust_level: 4,
            accept_solutions_topic_author: true,
            notify_on_staff_accept_solved: false,
            solved_topics_auto_close_hours: 0,
            auto_close_mode: TimerKind::SilentClose,
            enable_category_group_moderation: false,
            solved_quote_length: 300,
            unresolved_reminder_delay_days: 0,
        }
    }
}

impl SolvedConfig {
    /// Auto-close duration for a topic, preferring a positive category override.
    #[must_use]
    pub fn auto_close_hours(&self, category_override: Option<i32>) -> i32 {
        match category_override {
            Some(hours) if hours > 0 => hours.min(auto_close::MAX_HOURS),
            _ => i32::try_from(self.solved_topics_auto_close_hours)
                .unwrap_or(auto_close::MAX_HOURS)
                .min(auto_close::MAX_HOURS),
        }
    }
}

/// Per-user throttling of the accept/unaccept endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,

    pub hourly_limit: u32,

    pub burst_limit: u32,

    pub burst_window_seconds: u64,

    /// Let users at or above `bypass_min_trust_level` skip the limits.
    pub bypass_enabled: bool,

    pub bypass_min_trust_level: u8,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hourly_limit: 20,
            burst_limit: 4,
            burst_window_seconds: 30,
            bypass_enabled: true,
            bypass_min_trust_level: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockBackend {
    /// Keyed mutex table inside this process. Single-instance deployments only.
    Local,
    /// Lease rows in the shared database, safe across processes and hosts.
    Database,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    pub backend: LockBackend,

    /// How long to wait for a topic lock before failing with a retryable error.
    pub wait_timeout_ms: u64,

    /// Lease length of a database lock; a crashed holder blocks at most this long.
    pub lease_seconds: u64,

    pub retry_interval_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            backend: LockBackend::Local,
            wait_timeout_ms: 5000,
            lease_seconds: 60,
            retry_interval_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,

    pub timer_check_interval_seconds: u64,

    /// Cron expression (with seconds) for the unresolved-topic reminder job.
    pub reminder_cron: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timer_check_interval_seconds: 60,
            reminder_cron: "0 0 3 * * *".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("solved").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".solved").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.solved.accept_all_solutions_trust_level > 4 {
            anyhow::bail!("accept_all_solutions_trust_level must be between 0 and 4");
        }

        if self.rate_limit.enabled
            && (self.rate_limit.hourly_limit == 0 || self.rate_limit.burst_limit == 0)
        {
            anyhow::bail!("Rate limits must be > 0 when rate limiting is enabled");
        }

        if self.lock.backend == LockBackend::Database
            && self.lock.lease_seconds * 1000 <= self.lock.wait_timeout_ms
        {
            anyhow::bail!("Lock lease must outlast the lock wait timeout");
        }

        if self.scheduler.enabled && self.scheduler.timer_check_interval_seconds == 0 {
            anyhow::bail!("Timer check interval must be > 0");
        }

        Ok(())
    }
}
