mod file_config;

pub use file_config::{DownloadPolicyConfig, FileConfig};

use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::download_manager::DEFAULT_QUEUE_CAPACITY;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub notification_queue_capacity: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            notification_queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub notification_queue_capacity: usize,
    pub download_policy: DownloadPolicySettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let notification_queue_capacity = file
            .notification_queue_capacity
            .unwrap_or(cli.notification_queue_capacity);
        if notification_queue_capacity == 0 {
            bail!("notification_queue_capacity must be greater than zero");
        }

        let policy_file = file.download_policy.unwrap_or_default();
        let download_policy = DownloadPolicySettings {
            always_auto_when_roaming: policy_file.always_auto_when_roaming.unwrap_or(true),
        };

        Ok(Self {
            db_dir,
            notification_queue_capacity,
            download_policy,
        })
    }

    pub fn records_db_path(&self) -> PathBuf {
        self.db_dir.join("mms_notifications.db")
    }

    pub fn settings_db_path(&self) -> PathBuf {
        self.db_dir.join("settings.db")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPolicySettings {
    pub always_auto_when_roaming: bool,
}

impl Default for DownloadPolicySettings {
    fn default() -> Self {
        Self {
            always_auto_when_roaming: true,
        }
    }
}
