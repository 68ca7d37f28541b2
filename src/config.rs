use crate::camera::CameraSettings;
use crate::mesh::{CylinderParams, ShapeKind, SphereParams, TorusParams};
use crate::texture::TextureKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Primitive Viewer".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
            vsync: true,
        }
    }
}

/// Startup configuration. Every field is optional in the JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowSettings,
    pub clear_color: [f32; 4],
    pub camera: CameraSettings,
    pub shape: ShapeKind,
    pub texture: TextureKind,
    pub cylinder: CylinderParams,
    pub sphere: SphereParams,
    pub torus: TorusParams,
    /// Directory searched for `Wood.jpg`, `Earth.jpg` and `Metal.png`.
    pub asset_dir: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            clear_color: [0.0, 0.1, 0.2, 1.0],
            camera: CameraSettings::default(),
            shape: ShapeKind::Cube,
            texture: TextureKind::Wood,
            cylinder: CylinderParams::default(),
            sphere: SphereParams::default(),
            torus: TorusParams::default(),
            asset_dir: PathBuf::from("image"),
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = ViewerConfig::from_json_str("{}").expect("empty config parses");
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = ViewerConfig::from_json_str(
            r#"{ "window": { "width": 640 }, "shape": "Torus", "torus": { "tube_segments": 12 } }"#,
        )
        .expect("partial config parses");
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.shape, ShapeKind::Torus);
        assert_eq!(config.torus.tube_segments, 12);
        assert_eq!(config.torus.ring_segments, 4);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ViewerConfig::from_json_str("{ window: ").expect_err("invalid json");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ViewerConfig::load("does/not/exist.json").expect_err("missing file");
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
