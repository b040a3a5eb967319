use std::time::Duration;

use config::ConfigError;
use maritime_core::{Environment, LogFormat, RetryPolicy, load_settings};
use postgres::PsqlSettings;
use serde::Deserialize;

use crate::pipeline::DEFAULT_BATCH_SIZE;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub postgres: PsqlSettings,
    pub environment: Environment,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Websocket address of the playback publisher.
    pub feed_url: String,
    #[serde(with = "humantime_serde")]
    pub reconnect_delay: Duration,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Longest time an accepted report waits in the buffer.
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,
    #[serde(default)]
    pub commit_retry: RetryPolicy,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        load_settings("MARITIME_AIS_CONSUMER")
    }
}
