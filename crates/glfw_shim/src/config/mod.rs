//! Configuration system
//!
//! Window, interactor and logging settings, loadable from TOML or RON. Every
//! field has a default, so a config file only needs the values it changes.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

use crate::platform::ContextHints;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Render window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text
    pub title: String,
    /// Initial width; non-positive means 300
    pub width: i32,
    /// Initial height; non-positive means 300
    pub height: i32,
    /// Initial position; negative lets the window manager decide
    pub position: (i32, i32),
    /// Double-buffered framebuffer
    pub double_buffer: bool,
    /// Stencil buffer depth; 0 for none
    pub stencil_bits: u32,
    /// MSAA samples
    pub samples: u32,
    /// Context version `(major, minor)`
    pub gl_version: (u32, u32),
    /// Request OpenGL ES instead of desktop GL
    pub gles: bool,
    /// Swap interval applied after context creation
    pub swap_interval: Option<i32>,
    /// Window visible once created
    pub show_window: bool,
    /// Start in full screen
    pub full_screen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: crate::window::DEFAULT_WINDOW_NAME.to_string(),
            width: 300,
            height: 300,
            position: (-1, -1),
            double_buffer: true,
            stencil_bits: 8,
            samples: 0,
            gl_version: (3, 2),
            gles: false,
            swap_interval: None,
            show_window: true,
            full_screen: false,
        }
    }
}

impl WindowConfig {
    /// Context hints matching these settings
    pub const fn context_hints(&self) -> ContextHints {
        ContextHints {
            version: self.gl_version,
            gles: self.gles,
            core_profile: true,
            samples: self.samples,
            stencil_bits: self.stencil_bits,
            double_buffer: self.double_buffer,
            visible: self.show_window,
        }
    }
}

/// Interactor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractorConfig {
    /// Subscribe to native input channels on enable
    pub install_callbacks: bool,
    /// Block up to this long per event-loop iteration instead of spinning
    pub wait_timeout_ms: Option<u64>,
}

impl Default for InteractorConfig {
    fn default() -> Self {
        Self {
            install_callbacks: true,
            wait_timeout_ms: None,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter, e.g. `info` or `glfw_shim=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShimConfig {
    /// Render window
    pub window: WindowConfig,
    /// Interactor
    pub interactor: InteractorConfig,
    /// Logging
    pub logging: LoggingConfig,
}

impl Config for ShimConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("glfw_shim_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ShimConfig = toml::from_str(
            r#"
            [window]
            title = "Viewer"
            width = 1024

            [interactor]
            wait_timeout_ms = 16
            "#,
        )
        .unwrap();

        assert_eq!(config.window.title, "Viewer");
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 300);
        assert!(config.interactor.install_callbacks);
        assert_eq!(config.interactor.wait_timeout_ms, Some(16));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_save_and_load_toml() {
        let path = scratch_path("config.toml");
        let mut config = ShimConfig::default();
        config.window.full_screen = true;
        config.window.swap_interval = Some(1);
        config.save_to_file(&path).unwrap();

        let loaded = ShimConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_and_load_ron() {
        let path = scratch_path("config.ron");
        let mut config = ShimConfig::default();
        config.logging.level = "debug".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = ShimConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = ShimConfig::default().save_to_file(scratch_path("config.json"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_context_hints_follow_config() {
        let config = WindowConfig {
            gles: true,
            gl_version: (3, 0),
            show_window: false,
            ..WindowConfig::default()
        };
        let hints = config.context_hints();
        assert!(hints.gles);
        assert_eq!(hints.version, (3, 0));
        assert!(!hints.visible);
        assert_eq!(hints.stencil_bits, 8);
    }
}
