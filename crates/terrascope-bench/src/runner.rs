use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use terrascope_core::SimulationState;
use terrascope_render::{
    CityNoiseTexture, MaterialEngine, OrbitCamera, SatelliteRing, SlotMap, SwapOutcome,
    TextureCache, TextureSlot,
};

use crate::scenes::SceneConfig;

/// Simulated frame step (60 Hz).
const FRAME_DT: f32 = 1.0 / 60.0;

/// Timing data for a single benchmark run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub frame_count: u32,
    /// Material constructions after the initial three.
    pub rebuilds: u64,
    pub uniform_writes: u64,
    pub texture_loads: u32,
    pub timings: TimingSeries,
}

/// Runs the update pipeline on the CPU. Texture loads complete instantly
/// with a stand-in resource, so the timings cover bookkeeping only.
pub struct BenchmarkRunner {
    frame_count: u32,
    seed: u64,
    config: terrascope_core::SceneConfig,
}

impl BenchmarkRunner {
    pub fn new(frame_count: u32, seed: u64, config: terrascope_core::SceneConfig) -> Self {
        Self {
            frame_count,
            seed,
            config,
        }
    }

    /// Run a single benchmark scene and return timing results.
    pub fn run_scene(&self, scene: &SceneConfig) -> BenchmarkResult {
        log::info!("Running scene '{}' ({:?})...", scene.name, scene.workload);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut state = SimulationState::default();
        state.is_probe_landing = scene.probe_landing;

        let defaults = &self.config.textures;
        let mut textures: TextureCache<u32> = TextureCache::new(
            SlotMap {
                day: defaults.day.clone(),
                specular: defaults.specular.clone(),
                normal: defaults.normal.clone(),
                cloud: defaults.cloud.clone(),
            },
            SlotMap::default(),
        );
        for slot in TextureSlot::ALL {
            if let Some(ticket) = textures.request_default(slot) {
                textures.complete(ticket, Ok::<u32, String>(1));
            }
        }

        let noise = CityNoiseTexture::generate(&mut rng);
        let noise_id = textures.register(u32::from(noise.sample(0, 0)));
        let mut engine = MaterialEngine::new(state.params(), textures.current_ids(), noise_id);
        let initial_constructions = engine.construction_count();
        let initial_writes = engine.uniform_writes();

        let mut camera = OrbitCamera::new(self.config.camera.clone());
        camera.set_viewport(1280, 720);
        let mut satellites =
            SatelliteRing::new(&mut rng, self.config.satellites.count, self.config.satellites.radius);

        let mut synced_revision = state.revision();
        let mut synced_textures = textures.current_ids();
        let mut texture_loads = 0u32;
        let mut frame_times = Vec::with_capacity(self.frame_count as usize);

        for frame in 0..self.frame_count {
            let start = Instant::now();
            let elapsed = frame as f32 * FRAME_DT;

            if let Some(delta) = scene.delta(frame) {
                state.apply_params(&delta);
            }
            if scene.regenerates_noise(frame) {
                let noise = CityNoiseTexture::generate(&mut rng);
                let id = textures.register(u32::from(noise.sample(0, 0)));
                engine.set_noise_texture(id);
                // Force a sync on this frame.
                synced_revision = u64::MAX;
            }

            let revision = state.revision();
            if revision != synced_revision {
                let params = state.params().clone();
                for (slot, url) in [
                    (TextureSlot::Day, params.texture_map_url.as_deref()),
                    (TextureSlot::Cloud, params.cloud_map_url.as_deref()),
                ] {
                    if let SwapOutcome::Pending(ticket) = textures.request(slot, url) {
                        texture_loads += 1;
                        textures.complete(ticket, Ok::<u32, String>(frame));
                    }
                }
            }

            let ids = textures.current_ids();
            if revision != synced_revision || ids != synced_textures {
                engine.sync(state.params(), ids);
                synced_revision = revision;
                synced_textures = ids;
            }

            engine.advance_frame(elapsed, FRAME_DT);
            camera.advance(FRAME_DT, state.is_probe_landing);
            satellites.advance(FRAME_DT);
            let group = engine.transforms().group();
            std::hint::black_box((
                camera.to_uniforms(),
                engine.transforms().surface_model(),
                satellites.model(group),
            ));

            frame_times.push(start.elapsed().as_secs_f64() * 1000.0);
        }

        let timings = compute_timings(&frame_times);

        log::info!(
            "  mean={:.3}ms median={:.3}ms p95={:.3}ms p99={:.3}ms",
            timings.mean_ms,
            timings.median_ms,
            timings.p95_ms,
            timings.p99_ms
        );

        BenchmarkResult {
            scene_name: scene.name.to_string(),
            frame_count: self.frame_count,
            rebuilds: engine.construction_count() - initial_constructions,
            uniform_writes: engine.uniform_writes() - initial_writes,
            texture_loads,
            timings,
        }
    }
}

/// Compute timing statistics from a list of frame times in milliseconds.
pub fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;
    let p99_idx = ((n as f64) * 0.99).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        p99_ms: sorted[p99_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::standard_scenes;

    fn run(name: &str, frames: u32) -> BenchmarkResult {
        let runner = BenchmarkRunner::new(frames, 7, terrascope_core::SceneConfig::default());
        let scene = standard_scenes()
            .into_iter()
            .find(|s| s.name == name)
            .unwrap();
        runner.run_scene(&scene)
    }

    #[test]
    fn test_compute_timings() {
        let t = compute_timings(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(t.mean_ms, 2.5);
        assert_eq!(t.median_ms, 2.5);
        assert_eq!(t.min_ms, 1.0);
        assert_eq!(t.max_ms, 4.0);
        assert_eq!(t.p99_ms, 4.0);

        let empty = compute_timings(&[]);
        assert_eq!(empty.max_ms, 0.0);
    }

    #[test]
    fn test_idle_writes_nothing_but_the_clock() {
        let result = run("idle", 20);
        assert_eq!(result.rebuilds, 0);
        assert_eq!(result.texture_loads, 0);
        // Time uniform on surface and clouds, once per frame.
        assert_eq!(result.uniform_writes, 40);
        assert!(result.timings.mean_ms >= 0.0);
    }

    #[test]
    fn test_slider_drag_never_rebuilds() {
        let result = run("slider-drag", 50);
        assert_eq!(result.rebuilds, 0);
        assert!(result.uniform_writes > 100);
    }

    #[test]
    fn test_sun_cycle_rebuilds_surface_and_cloud() {
        // Frames 10..=50 each pick a different sun than the frame before;
        // frame 0 re-selects the default yellow and changes nothing.
        assert_eq!(run("sun-cycle", 60).rebuilds, 10);
    }

    #[test]
    fn test_noise_regen_rebuilds_surface_only() {
        let result = run("noise-regen", 91);
        assert_eq!(result.rebuilds, 3);
    }

    #[test]
    fn test_texture_churn_outruns_the_memo() {
        let result = run("texture-churn", 100);
        assert_eq!(result.rebuilds, 0);
        // 20 steps, five of them reverts. Nine distinct URLs cycle through an
        // eight-entry memo, so every custom step needs a load.
        assert_eq!(result.texture_loads, 15);
    }
}
