//! Indicator resolution and icon assets
//!
//! Maps the day color to one of three indicator states and loads the icon
//! shown for each state. Every state must have a non-empty icon on disk at
//! startup, otherwise the indicator is unusable and the application stops.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::data::TempoColor;

/// Presentation state of the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorState {
    Blue,
    White,
    Red,
}

impl IndicatorState {
    /// All states, in display order
    pub const ALL: [IndicatorState; 3] = [
        IndicatorState::Blue,
        IndicatorState::White,
        IndicatorState::Red,
    ];

    /// File stem of the icon for this state
    pub fn asset_stem(self) -> &'static str {
        match self {
            IndicatorState::Blue => "blue",
            IndicatorState::White => "white",
            IndicatorState::Red => "red",
        }
    }
}

impl fmt::Display for IndicatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asset_stem())
    }
}

/// Indicator for today's color
///
/// `Unknown` and `Error` fall back to white, the neutral icon.
pub fn resolve_indicator(today: TempoColor) -> IndicatorState {
    match today {
        TempoColor::Blue => IndicatorState::Blue,
        TempoColor::Red => IndicatorState::Red,
        TempoColor::White | TempoColor::Unknown | TempoColor::Error => IndicatorState::White,
    }
}

/// Errors loading indicator icons
#[derive(Debug, Error)]
pub enum AssetError {
    /// The icon file could not be read
    #[error("Failed to load asset {path}: {source}")]
    Missing { path: PathBuf, source: io::Error },

    /// The icon file exists but is empty
    #[error("Asset {path} is empty")]
    Empty { path: PathBuf },
}

/// Icon file extension used on this platform
pub fn icon_extension() -> &'static str {
    if cfg!(windows) {
        "ico"
    } else {
        "png"
    }
}

/// Icon bytes for every indicator state
#[derive(Debug, Clone)]
pub struct IconSet {
    blue: Vec<u8>,
    white: Vec<u8>,
    red: Vec<u8>,
}

impl IconSet {
    /// Loads `blue`, `white` and `red` icons from `dir`
    ///
    /// Fails on the first icon that is missing or empty.
    pub fn load(dir: &Path) -> Result<Self, AssetError> {
        Ok(Self {
            blue: load_asset(&icon_path(dir, IndicatorState::Blue))?,
            white: load_asset(&icon_path(dir, IndicatorState::White))?,
            red: load_asset(&icon_path(dir, IndicatorState::Red))?,
        })
    }

    /// Icon for `state`
    pub fn icon(&self, state: IndicatorState) -> &[u8] {
        match state {
            IndicatorState::Blue => &self.blue,
            IndicatorState::White => &self.white,
            IndicatorState::Red => &self.red,
        }
    }
}

/// Path of the icon for `state` inside `dir`
pub fn icon_path(dir: &Path, state: IndicatorState) -> PathBuf {
    dir.join(format!("{}.{}", state.asset_stem(), icon_extension()))
}

fn load_asset(path: &Path) -> Result<Vec<u8>, AssetError> {
    let data = fs::read(path).map_err(|source| AssetError::Missing {
        path: path.to_path_buf(),
        source,
    })?;
    if data.is_empty() {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ALL_COLORS: [TempoColor; 5] = [
        TempoColor::Blue,
        TempoColor::White,
        TempoColor::Red,
        TempoColor::Unknown,
        TempoColor::Error,
    ];

    fn write_icons(dir: &Path) {
        for state in IndicatorState::ALL {
            fs::write(icon_path(dir, state), state.asset_stem().as_bytes())
                .expect("Failed to write icon");
        }
    }

    #[test]
    fn test_resolve_indicator_known_colors() {
        assert_eq!(resolve_indicator(TempoColor::Blue), IndicatorState::Blue);
        assert_eq!(resolve_indicator(TempoColor::White), IndicatorState::White);
        assert_eq!(resolve_indicator(TempoColor::Red), IndicatorState::Red);
    }

    #[test]
    fn test_resolve_indicator_defaults_to_white() {
        assert_eq!(resolve_indicator(TempoColor::Unknown), IndicatorState::White);
        assert_eq!(resolve_indicator(TempoColor::Error), IndicatorState::White);
    }

    #[test]
    fn test_resolve_indicator_is_deterministic() {
        for color in ALL_COLORS {
            let first = resolve_indicator(color);
            for _ in 0..3 {
                assert_eq!(resolve_indicator(color), first);
            }
        }
    }

    #[test]
    fn test_icon_set_loads_all_states() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        write_icons(temp_dir.path());

        let icons = IconSet::load(temp_dir.path()).expect("icons should load");

        assert_eq!(icons.icon(IndicatorState::Blue), b"blue");
        assert_eq!(icons.icon(IndicatorState::White), b"white");
        assert_eq!(icons.icon(IndicatorState::Red), b"red");
    }

    #[test]
    fn test_shipped_assets_cover_every_platform() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        assert!(IconSet::load(&dir).is_ok());

        for extension in ["png", "ico"] {
            for state in IndicatorState::ALL {
                let path = dir.join(format!("{}.{}", state.asset_stem(), extension));
                let data = fs::read(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
                assert!(!data.is_empty(), "{} should not be empty", path.display());
            }
        }
    }

    #[test]
    fn test_icon_set_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        write_icons(temp_dir.path());
        fs::remove_file(icon_path(temp_dir.path(), IndicatorState::Red))
            .expect("Failed to remove icon");

        let err = IconSet::load(temp_dir.path()).unwrap_err();

        match err {
            AssetError::Missing { path, .. } => {
                assert_eq!(path, icon_path(temp_dir.path(), IndicatorState::Red))
            }
            other => panic!("Expected Missing error, got {:?}", other),
        }
    }

    #[test]
    fn test_icon_set_empty_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        write_icons(temp_dir.path());
        fs::write(icon_path(temp_dir.path(), IndicatorState::White), b"")
            .expect("Failed to truncate icon");

        let err = IconSet::load(temp_dir.path()).unwrap_err();

        assert!(matches!(err, AssetError::Empty { .. }));
    }
}
