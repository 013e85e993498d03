//! Tempo EDF status indicator library
//!
//! This module exposes the refresh engine and its collaborators for the
//! binary and for integration tests.

pub mod app;
pub mod autostart;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod indicator;
pub mod logging;
pub mod notify;
pub mod refresh;
pub mod scheduler;
pub mod ui;
