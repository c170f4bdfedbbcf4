//! Merge rules: defaults beneath every other source.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the built-in defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stdout")?
        .set_default("http.timeout_secs", 30_i64)?
        .set_default(
            "http.user_agent",
            concat!("graphgen/", env!("CARGO_PKG_VERSION")),
        )?
        .set_default("defaults.config_file", crate::project_config::DEFAULT_CONFIG_FILE)?
        .set_default("defaults.out", ".")
}
