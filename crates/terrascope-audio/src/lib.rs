pub mod noise;

#[cfg(target_arch = "wasm32")]
pub mod bridge;
#[cfg(target_arch = "wasm32")]
pub mod generators;
#[cfg(target_arch = "wasm32")]
pub mod mixer;

use terrascope_core::constants::{DRONE_GAIN_MAX, WIND_GAIN_MAX};
use terrascope_core::VisualParams;

/// Target gains of the two ambient layers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AmbientLevels {
    /// Pink-noise wind: faster spin and thicker clouds blow harder.
    pub wind: f32,
    /// Low sine hum that follows city activity.
    pub drone: f32,
}

impl AmbientLevels {
    pub fn from_params(params: &VisualParams) -> Self {
        let wind = (params.rotation_speed * 2.0 + params.cloud_density * 0.1).min(WIND_GAIN_MAX);
        let drone = (params.city_light_intensity * 0.05).min(DRONE_GAIN_MAX);
        Self {
            wind: wind.max(0.0),
            drone: drone.max(0.0),
        }
    }
}

/// Top-level audio facade. The Web Audio mixer (WASM-only) is created when
/// audio is enabled, since browsers require a user gesture, and torn down
/// when it is disabled. While disabled every call returns immediately.
pub struct AudioSystem {
    #[cfg(target_arch = "wasm32")]
    mixer: Option<mixer::AmbientMixer>,
    enabled: bool,
    volume: f32,
    /// Levels last handed to the mixer.
    applied: Option<AmbientLevels>,
}

impl Default for AudioSystem {
    fn default() -> Self {
        Self::new(0.7)
    }
}

impl AudioSystem {
    pub fn new(volume: f32) -> Self {
        Self {
            #[cfg(target_arch = "wasm32")]
            mixer: None,
            enabled: false,
            volume: volume.clamp(0.0, 1.0),
            applied: None,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        self.applied = None;

        #[cfg(target_arch = "wasm32")]
        {
            if enabled {
                match mixer::AmbientMixer::new(self.volume) {
                    Ok(m) => {
                        self.mixer = Some(m);
                        log::info!("Audio enabled");
                    }
                    Err(e) => {
                        log::error!("Failed to start ambient audio: {:?}", e);
                        self.enabled = false;
                    }
                }
            } else {
                if let Some(mut m) = self.mixer.take() {
                    m.shutdown();
                }
                log::info!("Audio disabled");
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        log::info!("Audio {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Master volume, clamped to `[0, 1]`.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        #[cfg(target_arch = "wasm32")]
        if let Some(ref m) = self.mixer {
            m.set_volume(self.volume);
        }
    }

    /// Retarget the ambient layers for a parameter revision. Returns the
    /// levels handed to the mixer, or `None` when disabled or unchanged.
    pub fn update(&mut self, params: &VisualParams) -> Option<AmbientLevels> {
        if !self.enabled {
            return None;
        }
        let levels = AmbientLevels::from_params(params);
        if self.applied == Some(levels) {
            return None;
        }
        self.applied = Some(levels);

        #[cfg(target_arch = "wasm32")]
        if let Some(ref mut m) = self.mixer {
            m.apply(levels);
        }

        Some(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrascope_core::ParamDelta;

    #[test]
    fn test_earth_levels() {
        let levels = AmbientLevels::from_params(&VisualParams::default());
        // 0.05 * 2 + 0.6 * 0.1
        assert!((levels.wind - 0.16).abs() < 1e-6);
        assert!((levels.drone - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_levels_saturate() {
        let params = VisualParams::default().apply(&ParamDelta {
            rotation_speed: Some(5.0),
            city_light_intensity: Some(2.0),
            ..Default::default()
        });
        let levels = AmbientLevels::from_params(&params);
        assert_eq!(levels.wind, 0.3);
        assert!((levels.drone - 0.1).abs() < 1e-6);

        let still = VisualParams::default().apply(&ParamDelta {
            rotation_speed: Some(0.0),
            cloud_density: Some(0.0),
            city_light_intensity: Some(0.0),
            ..Default::default()
        });
        assert_eq!(AmbientLevels::from_params(&still), AmbientLevels::default());
    }

    #[test]
    fn test_disabled_does_nothing() {
        let mut sys = AudioSystem::default();
        assert!(!sys.is_enabled());
        assert_eq!(sys.update(&VisualParams::default()), None);
    }

    #[test]
    fn test_update_only_on_change() {
        let mut sys = AudioSystem::default();
        sys.set_enabled(true);
        let params = VisualParams::default();
        assert!(sys.update(&params).is_some());
        assert!(sys.update(&params).is_none());

        let windy = params.apply(&ParamDelta {
            rotation_speed: Some(0.1),
            ..Default::default()
        });
        assert!(sys.update(&windy).is_some());

        // Re-enabling re-applies the current levels.
        sys.set_enabled(false);
        sys.set_enabled(true);
        assert!(sys.update(&windy).is_some());
    }

    #[test]
    fn test_volume_clamp() {
        let mut sys = AudioSystem::new(3.0);
        assert_eq!(sys.volume(), 1.0);
        sys.set_volume(-0.5);
        assert_eq!(sys.volume(), 0.0);
        sys.set_volume(0.5);
        assert_eq!(sys.volume(), 0.5);
    }
}
