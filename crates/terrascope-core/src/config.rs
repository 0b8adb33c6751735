use serde::{Deserialize, Serialize};

use crate::constants::{
    CAMERA_EPSILON, CAMERA_LERP_RATE, MAX_ZOOM_DISTANCE, MIN_ZOOM_DISTANCE, ORBIT_DISTANCE,
    PROBE_DISTANCE, SATELLITE_COUNT, SATELLITE_RADIUS,
};
use crate::error::ConfigError;

/// Built-in scene configuration, compiled into the binary.
pub const DEFAULT_SCENE_RON: &str = include_str!("../../../config/scene.ron");

/// Default image for each texture slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureDefaults {
    pub day: String,
    /// Water mask.
    pub specular: String,
    pub normal: String,
    pub cloud: String,
}

const PLANET_TEXTURE_BASE: &str =
    "https://raw.githubusercontent.com/mrdoob/three.js/master/examples/textures/planets";

impl Default for TextureDefaults {
    fn default() -> Self {
        Self {
            day: format!("{PLANET_TEXTURE_BASE}/earth_atmos_2048.jpg"),
            specular: format!("{PLANET_TEXTURE_BASE}/earth_specular_2048.jpg"),
            normal: format!("{PLANET_TEXTURE_BASE}/earth_normal_2048.jpg"),
            cloud: format!("{PLANET_TEXTURE_BASE}/earth_clouds_1024.png"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub orbit_distance: f32,
    /// Distance used while the probe is landing.
    pub probe_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of the remaining distance covered per second.
    pub lerp_rate: f32,
    pub epsilon: f32,
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            orbit_distance: ORBIT_DISTANCE,
            probe_distance: PROBE_DISTANCE,
            min_distance: MIN_ZOOM_DISTANCE,
            max_distance: MAX_ZOOM_DISTANCE,
            lerp_rate: CAMERA_LERP_RATE,
            epsilon: CAMERA_EPSILON,
            fov_degrees: 45.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatelliteConfig {
    pub count: usize,
    pub radius: f32,
}

impl Default for SatelliteConfig {
    fn default() -> Self {
        Self {
            count: SATELLITE_COUNT,
            radius: SATELLITE_RADIUS,
        }
    }
}

/// Scene-wide settings loaded from RON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub textures: TextureDefaults,
    pub camera: CameraConfig,
    pub satellites: SatelliteConfig,
    /// Content service URL. Generation features are disabled without one.
    pub content_endpoint: Option<String>,
    /// Master audio volume, 0 to 1.
    pub audio_volume: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            textures: TextureDefaults::default(),
            camera: CameraConfig::default(),
            satellites: SatelliteConfig::default(),
            content_endpoint: None,
            audio_volume: 0.7,
        }
    }
}

impl SceneConfig {
    /// Parse a scene configuration from RON. Missing fields take their defaults.
    pub fn from_ron(ron_str: &str) -> Result<Self, ConfigError> {
        let options = ron::Options::default();
        let mut config: SceneConfig = options
            .from_str(ron_str)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.audio_volume = config.audio_volume.clamp(0.0, 1.0);
        if config.camera.min_distance > config.camera.max_distance {
            return Err(ConfigError::ParseError(format!(
                "camera min_distance {} exceeds max_distance {}",
                config.camera.min_distance, config.camera.max_distance
            )));
        }
        Ok(config)
    }

    /// The compiled-in configuration.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_ron(DEFAULT_SCENE_RON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_matches_defaults() {
        let config = SceneConfig::builtin().unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = SceneConfig::from_ron(
            r#"(camera: (orbit_distance: 8.0), content_endpoint: Some("http://localhost:8787/content"))"#,
        )
        .unwrap();
        assert_eq!(config.camera.orbit_distance, 8.0);
        assert_eq!(config.camera.probe_distance, PROBE_DISTANCE);
        assert_eq!(config.satellites.count, SATELLITE_COUNT);
        assert_eq!(
            config.content_endpoint.as_deref(),
            Some("http://localhost:8787/content")
        );
    }

    #[test]
    fn test_volume_clamped() {
        let config = SceneConfig::from_ron("(audio_volume: 3.0)").unwrap();
        assert_eq!(config.audio_volume, 1.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(SceneConfig::from_ron("(camera: [1, 2])").is_err());
        assert!(SceneConfig::from_ron("(camera: (min_distance: 20.0))").is_err());
    }
}
