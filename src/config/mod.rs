#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CommonArgs;
pub use toml_config::{AgentConfig, LogFormat, LoggingConfig, LookupConfig};

use crate::utils::logger;

/// Installs the global tracing subscriber described by `logging`.
pub fn init_logging(logging: &LoggingConfig) {
    match logging.format {
        LogFormat::Compact => logger::init_cli_logger(logging.verbose),
        LogFormat::Json => logger::init_json_logger(logging.verbose),
    }
}
