//! Viewer configuration.
//!
//! Read from an optional TOML file. Every field has a default, so a partial
//! file only overrides what it names:
//!
//! ```toml
//! [scene]
//! mesh_color = "#c7ac96"
//!
//! [clipping]
//! capping = false
//! ```

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;
use thiserror::Error;

use crate::colors;
use crate::math::Vec3;

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "clipview.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("`{0}` is not a #rrggbb color")]
pub struct InvalidColor(String);

/// An opaque color written as `#rrggbb` in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct HexColor(pub u32);

impl TryFrom<String> for HexColor {
    type Error = InvalidColor;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        colors::parse_hex(&text).map(HexColor).ok_or(InvalidColor(text))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Frame rate cap for the interactive loop.
    pub fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "clipview".into(),
            width: 800,
            height: 600,
            fps: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub background: HexColor,
    pub floor_color: HexColor,
    /// Edge length of the square floor.
    pub floor_size: f32,
    pub mesh_color: HexColor,
    pub plane_color: HexColor,
    /// Edge length of new plane objects.
    pub plane_size: f32,
    /// Where loaded models and new planes appear.
    pub spawn_position: [f32; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: HexColor(colors::BACKGROUND),
            floor_color: HexColor(colors::FLOOR),
            floor_size: 4.0,
            mesh_color: HexColor(colors::MODEL),
            plane_color: HexColor(colors::PLANE),
            plane_size: 2.0,
            spawn_position: [1.0, 1.0, -1.0],
        }
    }
}

impl SceneConfig {
    pub fn spawn_position(&self) -> Vec3 {
        Vec3::from(self.spawn_position)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            near: 0.1,
            far: 10.0,
            position: [0.0, 1.6, 3.0],
            target: [0.0, 1.6, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClippingConfig {
    /// Fill cut faces with stencil caps.
    pub capping: bool,
    /// Edge length of the cap quads; must cover the largest model.
    pub cap_size: f32,
}

impl Default for ClippingConfig {
    fn default() -> Self {
        Self {
            capping: true,
            cap_size: 2000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Length of the ray line when it hits nothing.
    pub ray_length: f32,
    /// Scale change per key press.
    pub scale_step: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            ray_length: 5.0,
            scale_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub scene: SceneConfig,
    pub camera: CameraConfig,
    pub clipping: ClippingConfig,
    pub controller: ControllerConfig,
}

impl ViewerConfig {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text, path)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `explicit` if given, else [`DEFAULT_CONFIG_FILE`] when it exists,
    /// else the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ViewerConfig, ConfigError> {
        ViewerConfig::from_toml_str(text, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.scene.plane_color, HexColor(0xFF38382F));
        assert_eq!(config.scene.spawn_position(), Vec3::new(1.0, 1.0, -1.0));
        assert!(config.clipping.capping);
    }

    #[test]
    fn partial_sections_override_fields() {
        let config = parse(
            r##"
            [scene]
            mesh_color = "#c7ac96"

            [clipping]
            capping = false
            "##,
        )
        .unwrap();
        assert_eq!(config.scene.mesh_color, HexColor(0xFFC7AC96));
        assert_eq!(config.scene.plane_size, 2.0);
        assert!(!config.clipping.capping);
        assert_eq!(config.clipping.cap_size, 2000.0);
    }

    #[test]
    fn bad_color_is_rejected() {
        let err = parse("[scene]\nbackground = \"blue\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("blue"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse("[window]\nfullscreen = true\n").is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ViewerConfig::load(Path::new("/nonexistent/clipview.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
