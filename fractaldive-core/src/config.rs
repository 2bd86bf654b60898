// fractaldive-core/src/config.rs

//! Viewer configuration.
//!
//! Everything has a built-in default; a JSON file may override any subset.

use crate::{ControlProfile, Variant, DEFAULT_MAX_ITERATIONS, MAX_ITERATION_CEILING};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable consulted when no config path is passed on the command line.
pub const CONFIG_ENV_VAR: &str = "FRACTALDIVE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 700,
            title: "Double-ish Fractal".to_string(),
        }
    }
}

/// Either the name of a built-in profile or a full custom profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlsConfig {
    Named(String),
    Custom(ControlProfile),
}

impl Default for ControlsConfig {
    fn default() -> Self {
        ControlsConfig::Named("compute".to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub max_iterations: u32,
    pub controls: ControlsConfig,
    pub start_variant: Variant,
    /// Optional WGSL file replacing the built-in kernel.
    pub kernel_path: Option<PathBuf>,
    pub vsync: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            controls: ControlsConfig::default(),
            start_variant: Variant::Mandelbrot,
            kernel_path: None,
            vsync: true,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, else from `$FRACTALDIVE_CONFIG`, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(env_path) => Self::from_file(Path::new(&env_path)),
            None => Ok(Self::default()),
        }
    }

    /// Resolve `controls` to a concrete profile.
    pub fn control_profile(&self) -> Result<ControlProfile, ConfigError> {
        match &self.controls {
            ControlsConfig::Named(name) => ControlProfile::by_name(name).ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "unknown control profile '{name}' (expected 'compute' or 'classic')"
                ))
            }),
            ControlsConfig::Custom(profile) => Ok(*profile),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be positive, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.max_iterations == 0 || self.max_iterations > MAX_ITERATION_CEILING {
            return Err(ConfigError::Invalid(format!(
                "max_iterations must be in 1..={MAX_ITERATION_CEILING}, got {}",
                self.max_iterations
            )));
        }
        self.control_profile()?
            .validate()
            .map_err(ConfigError::Invalid)
    }
}
