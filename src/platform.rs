//! Locating SecureCRT and its Sessions directory.
//!
//! One [`PlatformAdapter`] variant per supported OS, chosen once at startup
//! with [`Platform::detect`]. Each variant is built from explicit inputs so
//! the lookups can be exercised against temporary directories.

use log::debug;
use std::env;
use std::path::{Path, PathBuf};

use crate::error_handling::types::PlatformError;

/// Overrides the SecureCRT configuration directory on every platform.
pub const CONFIG_PATH_ENV: &str = "SECURECRT_CONFIG_PATH";

/// Name of the Sessions folder inside the SecureCRT configuration directory.
pub const SESSIONS_FOLDER: &str = "Sessions";

pub trait PlatformAdapter {
    fn name(&self) -> &'static str;

    /// Candidate executable paths, in lookup order.
    fn client_candidates(&self) -> Vec<PathBuf>;

    /// SecureCRT configuration directory.
    fn config_dir(&self) -> Option<PathBuf>;

    /// First existing executable among [`client_candidates`](Self::client_candidates).
    fn locate_client(&self) -> Result<PathBuf, PlatformError> {
        let candidates = self.client_candidates();
        match candidates.iter().find(|p| p.is_file()) {
            Some(found) => {
                debug!("Found SecureCRT at {}", found.display());
                Ok(found.clone())
            }
            None => Err(PlatformError::ClientNotFound(candidates)),
        }
    }

    /// `<config dir>/Sessions`; it must already exist.
    fn locate_sessions_dir(&self) -> Result<PathBuf, PlatformError> {
        let config_dir = self.config_dir().ok_or(PlatformError::ConfigDirUnknown)?;
        let sessions = config_dir.join(SESSIONS_FOLDER);
        if !sessions.is_dir() {
            return Err(PlatformError::SessionsDirNotFound(sessions));
        }
        Ok(sessions)
    }

    /// Arguments opening the saved session `session` in a new tab.
    fn launch_args(&self, session: &str) -> Vec<String> {
        vec!["/T".to_string(), "/S".to_string(), session.to_string()]
    }
}

/// Registry key SecureCRT records its configuration folder under.
pub const SECURECRT_REGISTRY_KEY: &str = r"SOFTWARE\VanDyke\SecureCRT";
pub const SECURECRT_REGISTRY_VALUE: &str = "Config Path";

#[derive(Debug, Clone)]
pub struct WindowsPlatform {
    pub program_dirs: Vec<PathBuf>,
    pub config_override: Option<PathBuf>,
    /// `Config Path` from the current user's SecureCRT registry key.
    pub registry_config: Option<PathBuf>,
    pub app_data: Option<PathBuf>,
}

#[cfg(windows)]
fn registry_config_path() -> Option<PathBuf> {
    use winreg::enums::HKEY_CURRENT_USER;
    use winreg::RegKey;

    let key = RegKey::predef(HKEY_CURRENT_USER)
        .open_subkey(SECURECRT_REGISTRY_KEY)
        .map_err(|e| debug!("No SecureCRT registry key: {}", e))
        .ok()?;
    let value: String = key
        .get_value(SECURECRT_REGISTRY_VALUE)
        .map_err(|e| debug!("No SecureCRT {} value: {}", SECURECRT_REGISTRY_VALUE, e))
        .ok()?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

#[cfg(not(windows))]
fn registry_config_path() -> Option<PathBuf> {
    None
}

impl WindowsPlatform {
    pub fn from_env() -> Self {
        // PROGRAMW6432 points at the 64-bit Program Files even from a 32-bit process.
        let program_dirs = ["PROGRAMW6432", "PROGRAMFILES"]
            .iter()
            .filter_map(|key| env::var_os(key).map(PathBuf::from))
            .collect();
        Self {
            program_dirs,
            config_override: env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
            registry_config: registry_config_path(),
            app_data: env::var_os("APPDATA").map(PathBuf::from),
        }
    }
}

impl PlatformAdapter for WindowsPlatform {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn client_candidates(&self) -> Vec<PathBuf> {
        self.program_dirs
            .iter()
            .map(|dir| {
                dir.join("VanDyke Software")
                    .join("SecureCRT")
                    .join("SecureCRT.exe")
            })
            .collect()
    }

    /// Environment override, then the registry, then `%APPDATA%\VanDyke\Config`.
    fn config_dir(&self) -> Option<PathBuf> {
        self.config_override
            .clone()
            .or_else(|| self.registry_config.clone())
            .or_else(|| self.app_data.as_ref().map(|d| d.join("VanDyke").join("Config")))
    }
}

#[derive(Debug, Clone)]
pub struct MacPlatform {
    pub applications: PathBuf,
    pub config_override: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl MacPlatform {
    pub fn from_env() -> Self {
        Self {
            applications: PathBuf::from("/Applications"),
            config_override: env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
            home: dirs::home_dir(),
        }
    }
}

impl PlatformAdapter for MacPlatform {
    fn name(&self) -> &'static str {
        "macos"
    }

    fn client_candidates(&self) -> Vec<PathBuf> {
        vec![self
            .applications
            .join("SecureCRT.app")
            .join("Contents")
            .join("MacOS")
            .join("SecureCRT")]
    }

    fn config_dir(&self) -> Option<PathBuf> {
        self.config_override.clone().or_else(|| {
            self.home.as_ref().map(|h| {
                h.join("Library")
                    .join("Application Support")
                    .join("VanDyke")
                    .join("SecureCRT")
                    .join("Config")
            })
        })
    }
}

#[derive(Debug, Clone)]
pub struct LinuxPlatform {
    pub bin_dirs: Vec<PathBuf>,
    pub config_override: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl LinuxPlatform {
    pub fn from_env() -> Self {
        Self {
            bin_dirs: vec![PathBuf::from("/usr/bin"), PathBuf::from("/usr/local/bin")],
            config_override: env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
            home: dirs::home_dir(),
        }
    }
}

impl PlatformAdapter for LinuxPlatform {
    fn name(&self) -> &'static str {
        "linux"
    }

    fn client_candidates(&self) -> Vec<PathBuf> {
        self.bin_dirs.iter().map(|d| d.join("SecureCRT")).collect()
    }

    fn config_dir(&self) -> Option<PathBuf> {
        self.config_override.clone().or_else(|| {
            self.home
                .as_ref()
                .map(|h| h.join(".vandyke").join("SecureCRT").join("Config"))
        })
    }
}

/// The adapter for the running OS.
#[derive(Debug, Clone)]
pub enum Platform {
    Windows(WindowsPlatform),
    Mac(MacPlatform),
    Linux(LinuxPlatform),
}

impl Platform {
    pub fn detect() -> Result<Self, PlatformError> {
        match env::consts::OS {
            "windows" => Ok(Platform::Windows(WindowsPlatform::from_env())),
            "macos" => Ok(Platform::Mac(MacPlatform::from_env())),
            "linux" => Ok(Platform::Linux(LinuxPlatform::from_env())),
            other => Err(PlatformError::Unsupported(other)),
        }
    }

    fn adapter(&self) -> &dyn PlatformAdapter {
        match self {
            Platform::Windows(p) => p as &dyn PlatformAdapter,
            Platform::Mac(p) => p as &dyn PlatformAdapter,
            Platform::Linux(p) => p as &dyn PlatformAdapter,
        }
    }
}

impl PlatformAdapter for Platform {
    fn name(&self) -> &'static str {
        self.adapter().name()
    }

    fn client_candidates(&self) -> Vec<PathBuf> {
        self.adapter().client_candidates()
    }

    fn config_dir(&self) -> Option<PathBuf> {
        self.adapter().config_dir()
    }

    fn launch_args(&self, session: &str) -> Vec<String> {
        self.adapter().launch_args(session)
    }
}

/// Uses `client` when given, otherwise the adapter's lookup.
pub fn resolve_client(
    adapter: &dyn PlatformAdapter,
    client: Option<&Path>,
) -> Result<PathBuf, PlatformError> {
    match client {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(PlatformError::ClientNotFound(vec![path.to_path_buf()])),
        None => adapter.locate_client(),
    }
}

/// Uses `sessions_dir` when given, otherwise the adapter's lookup.
pub fn resolve_sessions_dir(
    adapter: &dyn PlatformAdapter,
    sessions_dir: Option<&Path>,
) -> Result<PathBuf, PlatformError> {
    match sessions_dir {
        Some(path) if path.is_dir() => Ok(path.to_path_buf()),
        Some(path) => Err(PlatformError::SessionsDirNotFound(path.to_path_buf())),
        None => adapter.locate_sessions_dir(),
    }
}
