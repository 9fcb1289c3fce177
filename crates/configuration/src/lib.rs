use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    ApiSettings, CacheSettings, Config, ConfigOverrides, LoggingSettings, PaginationSettings,
    RefreshSettings,
};

/// Name of the optional configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "wiggle";
/// Prefix of environment overrides, e.g. `WIGGLE__API__BASE_URL`.
pub const ENV_PREFIX: &str = "WIGGLE";

/// Loads the application configuration.
///
/// Sources are layered in order: built-in defaults, then `wiggle.toml` in the
/// working directory (or the explicit `path`, which must exist), then
/// `WIGGLE__SECTION__KEY` environment variables. The result is validated.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;
    tracing::debug!(base_url = %config.api.base_url, "Configuration loaded.");

    Ok(config)
}

/// Parses configuration from an in-memory TOML document, without consulting
/// the environment.
pub fn load_config_from_str(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
