//! Process-level runtime support for the agenda server: layered configuration,
//! home directory resolution and logging bootstrap.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, AppConfigProvider, CliArgs, ConfigProvider,
    DatabaseConfig, LoggingConfig, Section, ServerConfig,
};
