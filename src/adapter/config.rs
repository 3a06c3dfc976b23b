//! Configuration
//!
//! JSON設定ファイルの読み込み

use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::application::dto::poll_policy::{
    PollPolicy, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_DELAY_MS, DEFAULT_TIMEOUT_SECS,
};
use crate::application::use_cases::provision_warehouse::DEFAULT_LOCATION;

pub const DEFAULT_CREDENTIALS_PATH: &str = "secret.json";

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_initial_delay_ms() -> u64 {
    DEFAULT_INITIAL_DELAY_MS
}

fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// ジョブ完了待ちの設定
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PollConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PollConfig {
    pub fn to_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.max_delay_ms),
            Duration::from_secs(self.timeout_secs),
        )
    }
}

/// 設定
///
/// すべての項目が省略可能（CLI引数・環境変数の値が優先される）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default = "default_location")]
    pub location: String,

    /// Service account key path (used with `--local`)
    #[serde(default)]
    pub credentials_path: Option<String>,

    #[serde(default)]
    pub poll: PollConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: None,
            location: default_location(),
            credentials_path: None,
            poll: PollConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path).to_string();
        let content = fs::read_to_string(&expanded)
            .with_context(|| format!("Failed to read config file: {}", expanded))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", expanded))?;
        Ok(config)
    }
}
