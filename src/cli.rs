//! Command-line interface parsing for the Tempo status indicator
//!
//! This module handles parsing of CLI arguments using clap. Every setting can
//! also be given through its `TEMPO_*` environment variable.

use std::path::PathBuf;

use clap::Parser;

use crate::logging::LogLevel;

/// Tempo EDF - today's and tomorrow's Tempo color and the current price
#[derive(Parser, Debug)]
#[command(name = "tempotray")]
#[command(about = "EDF Tempo color and price status indicator")]
#[command(version)]
pub struct Cli {
    /// Refresh once, print the current status and exit
    #[arg(long, conflicts_with_all = ["enable_autostart", "disable_autostart"])]
    pub once: bool,

    /// Register the application to start with the session, then exit
    #[arg(long, conflicts_with = "disable_autostart")]
    pub enable_autostart: bool,

    /// Remove the session autostart registration, then exit
    #[arg(long)]
    pub disable_autostart: bool,

    /// Base URL of the Tempo API
    #[arg(long, env = "TEMPO_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Timeout of each HTTP request, in seconds
    #[arg(long, env = "TEMPO_TIMEOUT_SECS", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// How long API responses are cached, in minutes (0 disables caching)
    #[arg(long, env = "TEMPO_CACHE_TTL_MINUTES", value_name = "MINUTES")]
    pub cache_ttl_minutes: Option<u64>,

    /// Directory containing the blue/white/red indicator icons
    #[arg(long, env = "TEMPO_ASSETS_DIR", value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Append logs to this file instead of the default location
    #[arg(long, env = "TEMPO_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Minimum log level: trace, debug, info, warn, error
    #[arg(long, default_value = "info", value_parser = LogLevel::from_arg)]
    pub log_level: LogLevel,
}

/// What the process does after startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Interactive status panel with midnight rollover
    #[default]
    Tray,
    /// Single refresh printed to stdout
    Once,
    EnableAutostart,
    DisableAutostart,
}

impl Cli {
    /// Run mode selected by the flags
    pub fn run_mode(&self) -> RunMode {
        if self.once {
            RunMode::Once
        } else if self.enable_autostart {
            RunMode::EnableAutostart
        } else if self.disable_autostart {
            RunMode::DisableAutostart
        } else {
            RunMode::Tray
        }
    }
}
