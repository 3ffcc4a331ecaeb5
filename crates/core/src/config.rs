use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Prefix of environment overrides, e.g. `VERNEG__NEGOTIATION__EMIT_VARY_HEADER=false`.
pub const ENV_PREFIX: &str = "VERNEG";

#[verneg_derive::verneg_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration structure from an optional file plus environment overrides.
///
/// 1. **Base File**: when `path` is given, the file must exist. Its format is picked from the
///    extension (TOML, YAML, JSON, ...). Without a path only the defaults of `T` and the
///    environment apply.
/// 2. **Environment Overrides**: variables prefixed with `VERNEG__`. Nested fields use double
///    underscores, so `VERNEG__SERVER__PORT` maps to `server.port`.
///
/// # Errors
/// Returns an error if the file cannot be read or the merged values do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use verneg_core::config::load_config;
/// use verneg_core::NegotiationOptions;
///
/// let options: NegotiationOptions = load_config(None::<&str>).unwrap_or_default();
/// assert!(options.emit_vary_header);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder();

    let path: Option<&Path> = path.as_ref().map(AsRef::as_ref);
    match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        },
        None => info!("No config file given; using defaults and environment"),
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
