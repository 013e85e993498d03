//! Session autostart registration
//!
//! On Windows the application is registered under the current user's `Run`
//! registry key through `reg.exe`. On Linux and the BSDs an XDG autostart
//! desktop entry is written. Other platforms report `Unsupported`.
//! Enabling or disabling twice is harmless.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use directories::BaseDirs;
use thiserror::Error;
use tracing::info;

/// Registry value and desktop entry name
const AUTOSTART_NAME: &str = "TempoEDF";

const RUN_KEY: &str = r"HKCU\SOFTWARE\Microsoft\Windows\CurrentVersion\Run";

/// Errors from autostart operations
#[derive(Debug, Error)]
pub enum AutostartError {
    /// Autostart is not available on this platform
    #[error("Autostart is not supported on this platform")]
    Unsupported,

    #[error("Autostart I/O error: {0}")]
    Io(#[from] io::Error),

    /// The registration command ran but failed
    #[error("Autostart command failed with {0}")]
    Command(ExitStatus),
}

/// Registers the application to start with the user session
pub trait Autostart: Send + Sync {
    /// Whether the application is currently registered
    fn is_enabled(&self) -> bool;

    fn enable(&self) -> Result<(), AutostartError>;

    fn disable(&self) -> Result<(), AutostartError>;
}

/// Autostart implementation for the current platform
pub fn platform_autostart() -> Result<Box<dyn Autostart>, AutostartError> {
    let exe = std::env::current_exe()?;

    if cfg!(windows) {
        Ok(Box::new(RegistryAutostart::new(exe)))
    } else if cfg!(any(
        target_os = "linux",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd"
    )) {
        let base_dirs = BaseDirs::new().ok_or(AutostartError::Unsupported)?;
        let dir = base_dirs.config_dir().join("autostart");
        Ok(Box::new(XdgAutostart::new(dir, exe)))
    } else {
        Err(AutostartError::Unsupported)
    }
}

/// Windows `Run` key registration via `reg.exe`
#[derive(Debug, Clone)]
pub struct RegistryAutostart {
    exe: PathBuf,
}

impl RegistryAutostart {
    pub fn new(exe: PathBuf) -> Self {
        Self { exe }
    }

    fn run_reg(args: &[&str]) -> Result<(), AutostartError> {
        let status = Command::new("reg")
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(AutostartError::Command(status))
        }
    }
}

impl Autostart for RegistryAutostart {
    fn is_enabled(&self) -> bool {
        Self::run_reg(&["query", RUN_KEY, "/v", AUTOSTART_NAME]).is_ok()
    }

    fn enable(&self) -> Result<(), AutostartError> {
        let quoted = format!("\"{}\"", self.exe.display());
        Self::run_reg(&[
            "add",
            RUN_KEY,
            "/v",
            AUTOSTART_NAME,
            "/t",
            "REG_SZ",
            "/d",
            &quoted,
            "/f",
        ])?;
        info!(exe = %self.exe.display(), "added to Windows startup");
        Ok(())
    }

    fn disable(&self) -> Result<(), AutostartError> {
        if !self.is_enabled() {
            return Ok(());
        }
        Self::run_reg(&["delete", RUN_KEY, "/v", AUTOSTART_NAME, "/f"])?;
        info!("removed from Windows startup");
        Ok(())
    }
}

/// XDG autostart desktop entry
#[derive(Debug, Clone)]
pub struct XdgAutostart {
    dir: PathBuf,
    exe: PathBuf,
}

impl XdgAutostart {
    /// `dir` is the autostart directory, usually `~/.config/autostart`
    pub fn new(dir: PathBuf, exe: PathBuf) -> Self {
        Self { dir, exe }
    }

    /// Path of the desktop entry
    pub fn entry_path(&self) -> PathBuf {
        self.dir.join("tempotray.desktop")
    }

    fn desktop_entry(exe: &Path) -> String {
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name={AUTOSTART_NAME}\n\
             Comment=EDF Tempo color and price\n\
             Exec=\"{}\"\n\
             X-GNOME-Autostart-enabled=true\n",
            exe.display()
        )
    }
}

impl Autostart for XdgAutostart {
    fn is_enabled(&self) -> bool {
        self.entry_path().is_file()
    }

    fn enable(&self) -> Result<(), AutostartError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.entry_path(), Self::desktop_entry(&self.exe))?;
        info!(path = %self.entry_path().display(), "autostart entry written");
        Ok(())
    }

    fn disable(&self) -> Result<(), AutostartError> {
        match fs::remove_file(self.entry_path()) {
            Ok(()) => {
                info!(path = %self.entry_path().display(), "autostart entry removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
