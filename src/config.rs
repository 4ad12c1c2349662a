//! Configuration for a tail log source.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Options recognized by [`TailLogSource`](crate::TailLogSource).
///
/// Keys are camelCase so a pipeline definition can be deserialized directly:
///
/// ```
/// use tail_log_source::TailConfig;
///
/// let config = TailConfig::from_json(r#"{ "logFile": "/var/log/app.log", "batchSize": 50 }"#).unwrap();
/// assert_eq!(config.batch_size, 50);
/// assert_eq!(config.max_lines_prefetch, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailConfig {
    /// File to tail.
    pub log_file: PathBuf,

    /// Capacity of the line queue.
    #[serde(default = "default_max_lines_prefetch")]
    pub max_lines_prefetch: usize,

    /// Target number of lines per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-call wait budget in milliseconds.
    #[serde(default = "default_max_wait_time")]
    pub max_wait_time: u64,

    /// Field under which each line is stored in the produced record.
    #[serde(default = "default_log_line_field")]
    pub log_line_record_field_name: String,

    /// Milliseconds between tailer polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Milliseconds between queue checks while a batch is filling up.
    #[serde(default = "default_batch_wait_interval")]
    pub batch_wait_interval: u64,

    /// Wake the tailer early on file-system events.
    #[serde(default = "default_watch_events")]
    pub watch_events: bool,

    /// Name carried in the tailer's log span.
    #[serde(default = "default_instance_name")]
    pub instance_name: String,
}

fn default_max_lines_prefetch() -> usize {
    100
}

fn default_batch_size() -> usize {
    10
}

fn default_max_wait_time() -> u64 {
    5000
}

fn default_log_line_field() -> String {
    "logLine".to_string()
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_batch_wait_interval() -> u64 {
    100
}

fn default_watch_events() -> bool {
    true
}

fn default_instance_name() -> String {
    "tailLog".to_string()
}

impl TailConfig {
    /// Creates a configuration for `log_file` with every other option at its default.
    pub fn new<P: AsRef<Path>>(log_file: P) -> Self {
        Self {
            log_file: log_file.as_ref().to_path_buf(),
            max_lines_prefetch: default_max_lines_prefetch(),
            batch_size: default_batch_size(),
            max_wait_time: default_max_wait_time(),
            log_line_record_field_name: default_log_line_field(),
            poll_interval: default_poll_interval(),
            batch_wait_interval: default_batch_wait_interval(),
            watch_events: default_watch_events(),
            instance_name: default_instance_name(),
        }
    }

    /// Parses and validates a configuration from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a configuration from an already-decoded key-value map.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every option is usable.
    pub fn validate(&self) -> Result<()> {
        if self.log_file.as_os_str().is_empty() {
            return Err(Error::InvalidPath {
                message: "logFile must not be empty".to_string(),
            });
        }
        if self.log_file.is_dir() {
            return Err(Error::InvalidPath {
                message: format!("'{}' is a directory", self.log_file.display()),
            });
        }
        check_positive("maxLinesPrefetch", self.max_lines_prefetch as u64)?;
        check_positive("batchSize", self.batch_size as u64)?;
        check_positive("pollInterval", self.poll_interval)?;
        check_positive("batchWaitInterval", self.batch_wait_interval)?;
        if self.log_line_record_field_name.is_empty() {
            return Err(Error::InvalidConfig {
                message: "logLineRecordFieldName must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_time)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }

    pub fn batch_wait_interval(&self) -> Duration {
        Duration::from_millis(self.batch_wait_interval)
    }
}

fn check_positive(name: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidConfig {
            message: format!("{} must be at least 1", name),
        });
    }
    Ok(())
}
