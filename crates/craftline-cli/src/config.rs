//! Driver configuration.
//!
//! A `craftline.toml` holds a `[solver]` table with long-lived solver
//! parameters and an `[options]` table with default solve options.
//! Command-line flags override individual options after loading.

use craftline_solver::config::SolverConfig;
use craftline_solver::options::SolveOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "craftline.toml";

/// Driver configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Solver parameters
    pub solver: SolverConfig,
    /// Default solve options
    pub options: SolveOptions,
}

impl CliConfig {
    /// Load configuration from the default file location.
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load configuration from a specific path.
    /// Returns defaults if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        let config: Self = match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                return Self::default();
            },
        };

        if let Err(e) = config.solver.validate() {
            warn!("Invalid solver config in {}: {e}, using defaults", path.display());
            return Self::default();
        }

        info!("Loaded config from {}", path.display());
        config
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs_config_path().map_or_else(
            || PathBuf::from(CONFIG_FILE),
            |dir| dir.join("craftline").join(CONFIG_FILE),
        )
    }
}

/// Platform-specific config directory.
fn dirs_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Application Support"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        None
    }
}
