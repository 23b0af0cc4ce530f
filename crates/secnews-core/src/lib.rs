//! Shared configuration and domain types for the DACH security news digest.

pub mod app_config;
pub mod config;
pub mod news;

pub use app_config::{AppConfig, Environment, FetchMode};
pub use config::{load_app_config, load_app_config_from_env};
pub use news::{NewsItem, SummarizedItem};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
