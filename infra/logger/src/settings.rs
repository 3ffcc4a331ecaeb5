use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::rolling::Rotation;

/// Logging section of a service configuration file.
///
/// ```toml
/// [logging]
/// level = "debug"
/// filter = "verneg_core=trace,hyper=info"
///
/// [logging.file]
/// path = "logs"
/// rotation = "hourly"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default level, e.g. `info` or `debug`.
    pub level: String,
    /// Extra `EnvFilter` directives. `RUST_LOG` is used when absent.
    pub filter: Option<String>,
    pub console: bool,
    /// Write the file output as JSON lines.
    pub json: bool,
    pub file: Option<FileSettings>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "info".into(), filter: None, console: true, json: false, file: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub path: PathBuf,
    pub rotation: RotationPolicy,
    pub max_files: usize,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self { path: PathBuf::from("logs"), rotation: RotationPolicy::Daily, max_files: 10 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<RotationPolicy> for Rotation {
    fn from(policy: RotationPolicy) -> Self {
        match policy {
            RotationPolicy::Minutely => Self::MINUTELY,
            RotationPolicy::Hourly => Self::HOURLY,
            RotationPolicy::Daily => Self::DAILY,
            RotationPolicy::Never => Self::NEVER,
        }
    }
}
