use terrascope_core::{DataLayer, ParamDelta, SunType};

/// Custom day textures cycled by the texture-churn scene. More than the
/// cache keeps memoized, so some swaps always need a fresh load.
const CHURN_URLS: usize = 12;

/// What changes between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    /// Nothing but the clock.
    Idle,
    /// A slider held down: one continuous value changes every frame.
    SliderDrag,
    /// Sun type and data layer flip every `period` frames.
    SunCycle { period: u32 },
    /// The day texture changes every `period` frames.
    TextureChurn { period: u32 },
    /// The city-noise texture is regenerated every `period` frames.
    NoiseRegen { period: u32 },
}

/// Configuration for a single benchmark scene.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub name: &'static str,
    pub workload: Workload,
    pub probe_landing: bool,
}

impl SceneConfig {
    /// Parameter change for `frame`, if any.
    pub fn delta(&self, frame: u32) -> Option<ParamDelta> {
        match self.workload {
            Workload::Idle | Workload::NoiseRegen { .. } => None,
            Workload::SliderDrag => {
                let t = (frame % 100) as f32 / 100.0;
                Some(ParamDelta {
                    cloud_density: Some(t),
                    water_murkiness: Some(1.0 - t),
                    ..Default::default()
                })
            }
            Workload::SunCycle { period } => {
                if period == 0 || frame % period != 0 {
                    return None;
                }
                let step = (frame / period) as usize;
                Some(ParamDelta {
                    sun_type: Some(SunType::ALL[step % SunType::ALL.len()]),
                    data_layer: Some(DataLayer::ALL[step % DataLayer::ALL.len()]),
                    ..Default::default()
                })
            }
            Workload::TextureChurn { period } => {
                if period == 0 || frame % period != 0 {
                    return None;
                }
                let step = (frame / period) as usize;
                // Every fourth step goes back to the built-in map.
                let url = (step % 4 != 3)
                    .then(|| format!("bench://day/{}.jpg", step % CHURN_URLS));
                Some(ParamDelta {
                    texture_map_url: Some(url),
                    ..Default::default()
                })
            }
        }
    }

    /// Whether the noise texture is regenerated on `frame`.
    pub fn regenerates_noise(&self, frame: u32) -> bool {
        match self.workload {
            Workload::NoiseRegen { period } => period > 0 && frame > 0 && frame % period == 0,
            _ => false,
        }
    }
}

/// Return the standard suite of benchmark scenes, cheapest first.
pub fn standard_scenes() -> Vec<SceneConfig> {
    vec![
        SceneConfig {
            name: "idle",
            workload: Workload::Idle,
            probe_landing: false,
        },
        SceneConfig {
            name: "probe-descent",
            workload: Workload::Idle,
            probe_landing: true,
        },
        SceneConfig {
            name: "slider-drag",
            workload: Workload::SliderDrag,
            probe_landing: false,
        },
        SceneConfig {
            name: "sun-cycle",
            workload: Workload::SunCycle { period: 10 },
            probe_landing: false,
        },
        SceneConfig {
            name: "texture-churn",
            workload: Workload::TextureChurn { period: 5 },
            probe_landing: false,
        },
        SceneConfig {
            name: "noise-regen",
            workload: Workload::NoiseRegen { period: 30 },
            probe_landing: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(name: &str) -> SceneConfig {
        standard_scenes()
            .into_iter()
            .find(|s| s.name == name)
            .unwrap()
    }

    #[test]
    fn test_scene_names_unique() {
        let scenes = standard_scenes();
        for (i, a) in scenes.iter().enumerate() {
            assert!(scenes[i + 1..].iter().all(|b| b.name != a.name));
        }
    }

    #[test]
    fn test_idle_has_no_changes() {
        let idle = scene("idle");
        assert!((0..200).all(|f| idle.delta(f).is_none() && !idle.regenerates_noise(f)));
    }

    #[test]
    fn test_texture_churn_reverts_periodically() {
        let churn = scene("texture-churn");
        assert!(churn.delta(1).is_none());
        let first = churn.delta(0).unwrap();
        assert_eq!(
            first.texture_map_url,
            Some(Some("bench://day/0.jpg".to_string()))
        );
        assert_eq!(churn.delta(15).unwrap().texture_map_url, Some(None));
    }

    #[test]
    fn test_noise_regen_skips_first_frame() {
        let regen = scene("noise-regen");
        assert!(!regen.regenerates_noise(0));
        assert!(regen.regenerates_noise(30));
        assert!(!regen.regenerates_noise(31));
    }
}
