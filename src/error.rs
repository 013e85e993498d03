//! Startup errors
//!
//! Everything that stops the process before the status indicator is running.
//! Failures after startup (fetches, autostart) are handled where they occur.

use std::io;

use thiserror::Error;

use crate::autostart::AutostartError;
use crate::config::ConfigError;
use crate::data::FetchError;
use crate::indicator::AssetError;

/// Fatal application error
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An indicator icon is missing; the indicator cannot be displayed
    #[error("Indicator assets unavailable: {0}")]
    Assets(#[from] AssetError),

    #[error("Failed to create HTTP client: {0}")]
    Http(#[from] FetchError),

    #[error("Autostart error: {0}")]
    Autostart(#[from] AutostartError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
