//! Error types for the CLI runtime.

use std::io;

use relock_config::ConfigError;
use relock_core::DiscoveryError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to read the source root: {0}")]
    Prompt(io::Error),
    #[error("no source root was given")]
    MissingRoot,
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("failed to write the report: {0}")]
    Report(io::Error),
}
