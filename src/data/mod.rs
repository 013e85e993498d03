//! Core data models for the Tempo status indicator
//!
//! This module contains the day color enum, the shared `TempoState` published
//! after each refresh, the response shapes returned by the Tempo API and the
//! logical queries that identify each remote data point.

pub mod client;

pub use client::{build_http_client, FetchError, FetchMode, ResponseOrigin, TempoClient};

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Label published in place of the tariff name when the price fetch fails
pub const TARIFF_ERROR_LABEL: &str = "Erreur";

/// Color of a Tempo day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TempoColor {
    Blue,
    White,
    Red,
    /// The API answered with a code outside the known range
    #[default]
    Unknown,
    /// The fetch for this day failed
    Error,
}

impl TempoColor {
    /// Maps the API's day code to a color
    ///
    /// Codes: 1 = blue, 2 = white, 3 = red. Anything else (including 0, which
    /// the API uses before tomorrow's color is announced) is `Unknown`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => TempoColor::Blue,
            2 => TempoColor::White,
            3 => TempoColor::Red,
            _ => TempoColor::Unknown,
        }
    }

    /// Display name shown in menus and notifications
    pub fn label(self) -> &'static str {
        match self {
            TempoColor::Blue => "BLEU",
            TempoColor::White => "BLANC",
            TempoColor::Red => "ROUGE",
            TempoColor::Unknown => "INCONNU",
            TempoColor::Error => "ERREUR",
        }
    }
}

impl fmt::Display for TempoColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of everything the indicator displays
///
/// A single instance lives behind a lock for the whole process lifetime. It is
/// written only by the refresh orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoState {
    /// Color of the current day
    pub today_color: TempoColor,
    /// Color of the next day, `Unknown` until announced
    pub tomorrow_color: TempoColor,
    /// Current price in euros per kWh, 0 when unavailable
    pub current_tariff: f64,
    /// Name of the current tariff period (e.g. "HP Bleu")
    pub tariff_label: String,
    /// When the last refresh cycle published, `None` before the first one
    pub last_updated: Option<DateTime<Local>>,
}

impl Default for TempoState {
    fn default() -> Self {
        Self {
            today_color: TempoColor::Unknown,
            tomorrow_color: TempoColor::Unknown,
            current_tariff: 0.0,
            tariff_label: String::new(),
            last_updated: None,
        }
    }
}

/// Day record returned by `jourTempo/today` and `jourTempo/tomorrow`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayResponse {
    /// Date of the day, `YYYY-MM-DD`
    #[serde(default)]
    pub date_jour: Option<String>,
    /// Color code (1 blue, 2 white, 3 red)
    pub code_jour: i64,
    /// Tempo season, e.g. "2023-2024"
    #[serde(default)]
    pub periode: Option<String>,
}

impl DayResponse {
    /// Color of the day described by this record
    pub fn color(&self) -> TempoColor {
        TempoColor::from_code(self.code_jour)
    }
}

/// Current price record returned by `now`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowResponse {
    #[serde(default)]
    pub applicable_in: i64,
    #[serde(default)]
    pub code_couleur: i64,
    /// Peak/off-peak code
    #[serde(default)]
    pub code_horaire: i64,
    /// Price in euros per kWh
    pub tarif_kwh: f64,
    #[serde(default)]
    pub lib_tarif: String,
}

/// Logical remote query, one per independently refreshed data point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TempoQuery {
    Today,
    Tomorrow,
    CurrentPrice,
}

impl TempoQuery {
    /// Path of the endpoint relative to the API base URL
    pub fn path(self) -> &'static str {
        match self {
            TempoQuery::Today => "jourTempo/today",
            TempoQuery::Tomorrow => "jourTempo/tomorrow",
            TempoQuery::CurrentPrice => "now",
        }
    }

    /// Full request URL, which is also the cache identity
    pub fn url(self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.path())
    }
}

impl fmt::Display for TempoQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TempoQuery::Today => "today",
            TempoQuery::Tomorrow => "tomorrow",
            TempoQuery::CurrentPrice => "current-price",
        };
        f.write_str(name)
    }
}
