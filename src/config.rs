//! Viewer configuration loaded from TOML.
//!
//! Every section uses `#[serde(default)]`, so a config file only needs the
//! keys it wants to change:
//!
//! ```toml
//! [window]
//! title = "sphereplane"
//! background = [0.05, 0.05, 0.08]
//!
//! [morph]
//! transition = 0.25
//! width_segments = 48
//!
//! [camera]
//! auto_rotate = 0.3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::controls::{self, ParamSpec};
use crate::error::ConfigError;
use crate::morph::MorphParameters;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub morph: MorphParameters,
    pub camera: CameraConfig,
    pub transform: TransformConfig,
    pub animation: AnimationConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Clear colour, linear RGB.
    pub background: [f32; 3],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "sphereplane".to_string(),
            width: 1280,
            height: 800,
            background: [0.02, 0.02, 0.03],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Orbit distance. Zero or less frames the mesh radius automatically.
    pub distance: f32,
    pub fov_degrees: f32,
    /// Idle rotation in radians per second; 0 disables it.
    pub auto_rotate: f32,
    /// Initial elevation in radians.
    pub elevation: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 0.0,
            fov_degrees: 35.0,
            auto_rotate: 0.2,
            elevation: 0.35,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Uniform scale of the group holding the mesh.
    pub scale: f32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

/// Ping-pong animation of the transition, toggled with `Space`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enabled: bool,
    /// Transition units per second.
    pub speed: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            speed: 0.25,
        }
    }
}

impl ViewerConfig {
    /// Parses a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Clamps out-of-range values, logging a warning for each one changed.
    pub fn sanitized(mut self) -> Self {
        let morph = &mut self.morph;
        morph.radius = clamp_field(&controls::RADIUS, morph.radius);
        morph.transition = clamp_field(&controls::TRANSITION, morph.transition);
        morph.width_segments =
            clamp_field(&controls::WIDTH_SEGMENTS, morph.width_segments as f32) as u32;
        morph.height_segments =
            clamp_field(&controls::HEIGHT_SEGMENTS, morph.height_segments as f32) as u32;
        self.morph = self.morph.sanitized();

        if self.window.width == 0 || self.window.height == 0 {
            warn!(
                width = self.window.width,
                height = self.window.height,
                "window size must be non-zero, using defaults"
            );
            let defaults = WindowConfig::default();
            self.window.width = defaults.width;
            self.window.height = defaults.height;
        }

        if !(1.0..=170.0).contains(&self.camera.fov_degrees) {
            let fov = self.camera.fov_degrees.clamp(1.0, 170.0);
            warn!(value = self.camera.fov_degrees, clamped = fov, "camera.fov_degrees out of range");
            self.camera.fov_degrees = if fov.is_finite() { fov } else { 35.0 };
        }

        if !self.transform.scale.is_finite() || self.transform.scale <= 0.0 {
            warn!(value = self.transform.scale, "transform.scale must be positive, using 1.0");
            self.transform.scale = 1.0;
        }

        if !self.animation.speed.is_finite() || self.animation.speed < 0.0 {
            warn!(value = self.animation.speed, "animation.speed must be non-negative, using 0.25");
            self.animation.speed = AnimationConfig::default().speed;
        }

        self
    }
}

/// Bounds only; snapping to the step grid is left to the control panel so a
/// configured `radius = 1.55` stays 1.55.
fn clamp_field(spec: &ParamSpec, value: f32) -> f32 {
    let clamped = spec.bound(value);
    if clamped != value {
        warn!(field = spec.name, value, clamped, "config value out of range");
    }
    clamped
}

/// Loads and sanitizes a config file.
pub fn load_from_path(path: &Path) -> Result<ViewerConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config = ViewerConfig::from_toml_str(&content)?.sanitized();
    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Like [`load_from_path`], but a missing file yields the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ViewerConfig, ConfigError> {
    match path {
        Some(path) => match load_from_path(path) {
            Err(ConfigError::FileNotFound(missing)) => {
                info!("no config at {}, using defaults", missing.display());
                Ok(ViewerConfig::default())
            }
            other => other,
        },
        None => Ok(ViewerConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = ViewerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.morph.width_segments, 32);
        assert_eq!(config.morph.transition, 0.5);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ViewerConfig::from_toml_str(
            r#"
            [morph]
            radius = 2.5
            height_segments = 12

            [camera]
            auto_rotate = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.morph.radius, 2.5);
        assert_eq!(config.morph.height_segments, 12);
        assert_eq!(config.morph.width_segments, 32);
        assert_eq!(config.camera.auto_rotate, 0.0);
        assert_eq!(config.camera.fov_degrees, 35.0);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = ViewerConfig::from_toml_str("[morph\nradius = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn sanitize_clamps_into_control_bounds() {
        let mut config = ViewerConfig::default();
        config.morph.radius = 40.0;
        config.morph.transition = -1.0;
        config.morph.width_segments = 0;
        config.morph.height_segments = 1000;
        config.transform.scale = 0.0;
        config.camera.fov_degrees = 400.0;

        let config = config.sanitized();
        assert_eq!(config.morph.radius, 10.0);
        assert_eq!(config.morph.transition, 0.0);
        assert_eq!(config.morph.width_segments, 1);
        assert_eq!(config.morph.height_segments, 256);
        assert_eq!(config.transform.scale, 1.0);
        assert_eq!(config.camera.fov_degrees, 170.0);
    }

    #[test]
    fn sanitize_does_not_snap_in_range_values() {
        let mut config = ViewerConfig::default();
        config.morph.radius = 1.55;
        config.morph.transition = 0.12345;

        let config = config.sanitized();
        assert_eq!(config.morph.radius, 1.55);
        assert_eq!(config.morph.transition, 0.12345);
    }

    #[test]
    fn zero_radius_stays_positive() {
        let mut config = ViewerConfig::default();
        config.morph.radius = 0.0;
        let config = config.sanitized();
        assert!(config.morph.radius > 0.0);
    }

    #[test]
    fn missing_file() {
        let path = Path::new("/definitely/not/here/sphereplane.toml");
        assert!(matches!(load_from_path(path), Err(ConfigError::FileNotFound(_))));
        assert_eq!(load_or_default(Some(path)).unwrap(), ViewerConfig::default());
        assert_eq!(load_or_default(None).unwrap(), ViewerConfig::default());
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("sphereplane-{}.toml", std::process::id()));
        std::fs::write(&path, "[window]\ntitle = \"morph\"\n[transform]\nscale = 2.0\n").unwrap();

        let config = load_from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.window.title, "morph");
        assert_eq!(config.transform.scale, 2.0);
    }
}
