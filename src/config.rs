//! Configuration file handling for handbloom.
//!
//! Loads configuration from `~/.config/handbloom/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration file structure for handbloom.
/// Loaded from ~/.config/handbloom/config.toml (or custom path via --config).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub device: Option<u32>,
    #[serde(default = "default_true")]
    pub mirror: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: None,
            mirror: default_true(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SamplerConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_particles")]
    pub particles: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            particles: default_particles(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    800
}

fn default_particles() -> usize {
    crate::engine::DEFAULT_PARTICLE_COUNT
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    directories::ProjectDirs::from("com", "handbloom", "handbloom")
        .map(|d| d.config_dir().to_path_buf().join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/handbloom/config.toml")
        })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.camera.device, None);
        assert!(config.camera.mirror);
        assert_eq!(config.sampler.interval_ms, 800);
        assert_eq!(config.engine.particles, 1200);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sampler]\ninterval_ms = 500").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.sampler.interval_ms, 500);
        assert_eq!(config.engine.particles, 1200);
        assert!(config.camera.mirror);
    }

    #[test]
    fn test_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[camera]\ndevice = 2\nmirror = false\n\n[sampler]\ninterval_ms = 1000\n\n[engine]\nparticles = 400"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.camera.device, Some(2));
        assert!(!config.camera.mirror);
        assert_eq!(config.sampler.interval_ms, 1000);
        assert_eq!(config.engine.particles, 400);
    }

    #[test]
    fn test_invalid_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml [[[").unwrap();

        let result = Config::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
