//! Site configuration
//!
//! Loaded from `realest.toml`. Every table is optional:
//!
//! ```toml
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [motion]
//! reduced = true        # omit to follow REALEST_REDUCED_MOTION
//!
//! [theme]
//! state_path = ".realest/theme.json"
//!
//! [engine]
//! target_fps = 60
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use realest_animation::EngineConfig;
use realest_core::{
    EnvMotionPreference, FixedMotionPreference, JsonThemePersistence, MemoryThemePersistence,
    MotionPreference, ThemePersistence, Viewport,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Default configuration file name
pub const CONFIG_FILE: &str = "realest.toml";

// =============================================================================
// realest.toml
// =============================================================================

/// Top-level site configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    pub viewport: ViewportConfig,
    pub motion: MotionConfig,
    pub theme: ThemeConfig,
    pub engine: EngineSettings,
}

/// Size of the rendering surface in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        let viewport = Viewport::default();
        Self {
            width: viewport.width,
            height: viewport.height,
        }
    }
}

/// Reduced-motion override
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Force the preference; `None` reads the environment on every activation
    pub reduced: Option<bool>,
}

/// Theme persistence
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Where the theme flag is stored; in-memory only when unset
    pub state_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    pub target_fps: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            target_fps: EngineConfig::default().target_fps,
        }
    }
}

impl SiteConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Load a config file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let ViewportConfig { width, height } = self.viewport;
        for (field, value) in [("viewport.width", width), ("viewport.height", height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AppError::InvalidConfig {
                    field,
                    reason: format!("expected a positive size, got {}", value),
                });
            }
        }
        if self.engine.target_fps == 0 {
            return Err(AppError::InvalidConfig {
                field: "engine.target_fps",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport.width, self.viewport.height)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            target_fps: self.engine.target_fps,
        }
    }

    /// The reduced-motion source this config asks for
    pub fn motion_preference(&self) -> Arc<dyn MotionPreference> {
        match self.motion.reduced {
            Some(reduced) => Arc::new(FixedMotionPreference(reduced)),
            None => Arc::new(EnvMotionPreference),
        }
    }

    /// Theme storage: a JSON file when a path is configured, memory otherwise
    pub fn theme_persistence(&self) -> Arc<dyn ThemePersistence> {
        match &self.theme.state_path {
            Some(path) => Arc::new(JsonThemePersistence::new(path)),
            None => Arc::new(MemoryThemePersistence::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::load_or_default(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.viewport(), Viewport::default());
        assert_eq!(config.engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "[viewport]\nheight = 800\n\n[motion]\nreduced = true\n",
        )
        .unwrap();

        let config = SiteConfig::load_or_default(&path).unwrap();
        assert_eq!(config.viewport.height, 800.0);
        assert_eq!(config.viewport.width, Viewport::default().width);
        assert_eq!(config.motion.reduced, Some(true));
        assert!(config.motion_preference().prefers_reduced_motion());
        assert_eq!(config.engine.target_fps, 120);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        fs::write(&path, "[engine]\ntarget_fps = 0\n").unwrap();
        assert!(matches!(
            SiteConfig::load(&path),
            Err(AppError::InvalidConfig {
                field: "engine.target_fps",
                ..
            })
        ));

        fs::write(&path, "[viewport]\nwidth = -3\n").unwrap();
        assert!(matches!(
            SiteConfig::load(&path),
            Err(AppError::InvalidConfig { .. })
        ));

        fs::write(&path, "[viewport\n").unwrap();
        assert!(matches!(
            SiteConfig::load(&path),
            Err(AppError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_theme_state_path_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig {
            theme: ThemeConfig {
                state_path: Some(dir.path().join("theme.json")),
            },
            ..SiteConfig::default()
        };
        config.theme_persistence().save(true).unwrap();
        assert_eq!(config.theme_persistence().load().unwrap(), Some(true));
    }
}
