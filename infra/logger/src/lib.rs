//! # Logger
//!
//! Installs the global `tracing` subscriber for the workspace binaries: a compact console layer,
//! an optional non-blocking rolling file layer (plain text or JSON) and an `EnvFilter` that
//! honours `RUST_LOG`.
//!
//! Configure it in code with [`Logger::builder`], or from the `[logging]` section of a config
//! file with [`Logger::from_settings`].
//!
//! ## Example
//!
//! ```rust
//! # use verneg_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("people-api")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;
mod settings;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use crate::settings::{FileSettings, LogSettings, RotationPolicy};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
struct LoggerConfig {
    console: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: true,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

impl TryFrom<&LogSettings> for LoggerConfig {
    type Error = LoggerError;

    fn try_from(settings: &LogSettings) -> Result<Self, Self::Error> {
        let level = settings.level.trim().parse::<LevelFilter>().map_err(|e| {
            LoggerError::InvalidConfiguration {
                message: format!("Invalid level '{}': {e}", settings.level).into(),
                context: None,
            }
        })?;

        let mut config = Self {
            console: settings.console,
            level,
            json: settings.json,
            env_filter: settings.filter.clone(),
            ..Self::default()
        };

        if let Some(file) = &settings.file {
            config.path = Some(file.path.clone());
            config.rotation = file.rotation.into();
            config.max_files = file.max_files;
        }

        Ok(config)
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// Configures and installs the global tracing subscriber.
///
/// A name is required before anything else; file options only exist once a path is set.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    config: LoggerConfig,
    name: N,
    file_state: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Names the logger; the name prefixes rolling log files.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder { name: WithName(name.into()), config: self.config, file_state: PhantomData }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// Writes the file output as JSON lines.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Adds explicit filter directives (e.g. `verneg_core=trace,hyper=info`).
    ///
    /// Without them `RUST_LOG` is read. Invalid directives make [`LoggerBuilder::init`] fail.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Directory of the rolling log files.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut config = self.config;
        config.path = Some(path.into());
        LoggerBuilder { config, name: self.name, file_state: PhantomData }
    }

    /// Installs the global subscriber.
    ///
    /// Keep the returned [`Logger`] alive for the lifetime of the program; it owns the worker
    /// that flushes the file output.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber is already set, and
    /// [`LoggerError::InvalidConfiguration`] for unusable settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        install(self.config, &self.name.0)
    }
}

/// Handle of the installed logging system.
///
/// Holds the background worker guard of the file output, if any.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts configuring the global subscriber.
    ///
    /// # Example
    ///
    /// ```rust
    /// use verneg_logger::{LevelFilter, Logger};
    ///
    /// let _logger = Logger::builder()
    ///     .name("people-api")
    ///     .level(LevelFilter::DEBUG)
    ///     .init()
    ///     .unwrap();
    /// ```
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig::default(), name: NoName, file_state: PhantomData }
    }

    /// Installs the global subscriber from deserialized [`LogSettings`].
    ///
    /// # Errors
    /// Same as [`LoggerBuilder::init`], plus [`LoggerError::InvalidConfiguration`] for an
    /// unknown level.
    pub fn from_settings(name: &str, settings: &LogSettings) -> Result<Self, LoggerError> {
        install(LoggerConfig::try_from(settings)?, name)
    }

    /// The worker guard of the file output, if one was configured.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

fn install(config: LoggerConfig, name: &str) -> Result<Logger, LoggerError> {
    validate_config(&config, name)?;

    let env_filter = build_env_filter(&config)?;

    let mut layers = Vec::new();

    if config.console {
        layers.push(layer().compact().with_ansi(true).boxed());
    }

    let guard = if let Some(path) = config.path {
        fs::create_dir_all(&path).map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: Some(format!("Failed to create path: {}", path.display()).into()),
        })?;

        let file_appender = RollingFileAppender::builder()
            .rotation(config.rotation)
            .filename_prefix(name)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(config.max_files)
            .build(path)?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = layer().with_writer(non_blocking).with_ansi(false);

        layers.push(if config.json { file_layer.json().boxed() } else { file_layer.boxed() });
        Some(guard)
    } else {
        None
    };

    if layers.is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "No logging layers enabled. Enable console or file output.".into(),
            context: None,
        });
    }

    tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;

    Ok(Logger { guard })
}

fn validate_config(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if config.path.is_some() && config.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}
