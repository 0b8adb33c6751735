use glam::{Mat4, Vec3, Vec4};
use terrascope_core::config::CameraConfig;

use crate::mesh::Ray;
use crate::renderer::CameraUniforms;

const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

/// Orbit camera around the planet center.
///
/// The rest distance is fixed: the orbit distance, or the closer landing
/// distance during a descent. Wheel zoom only displaces the camera, and
/// every frame `advance` eases it back toward the rest distance.
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    distance: f32,
    config: CameraConfig,
    pub aspect: f32,
}

impl OrbitCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: config.orbit_distance,
            config,
            aspect: 1.0,
        }
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Distance the camera is currently easing toward.
    pub fn target_distance(&self, probe_landing: bool) -> f32 {
        if probe_landing {
            self.config.probe_distance
        } else {
            self.config.orbit_distance
        }
    }

    /// Ease the radial distance toward its target. Returns whether the
    /// camera moved. The step fraction is `dt * lerp_rate` clamped to one, so
    /// the approach is monotonic and never overshoots.
    pub fn advance(&mut self, dt: f32, probe_landing: bool) -> bool {
        let target = self.target_distance(probe_landing);
        let diff = target - self.distance;
        if diff.abs() <= self.config.epsilon {
            return false;
        }
        let t = (dt * self.config.lerp_rate).clamp(0.0, 1.0);
        self.distance += diff * t;
        t > 0.0
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * 0.005;
        self.pitch = (self.pitch + dy * 0.005).clamp(-1.5, 1.5);
    }

    /// Wheel zoom. Positive `delta` moves in. The displacement is temporary:
    /// `advance` pulls the camera back to its rest distance.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta * self.distance * 0.1)
            .clamp(self.config.min_distance, self.config.max_distance);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn eye_position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        Vec3::new(x, y, z)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), Vec3::ZERO, Vec3::Y)
    }

    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.config.fov_degrees.to_radians(), self.aspect, NEAR, FAR)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }

    /// World-space ray through a point in normalized device coordinates
    /// (`x` right, `y` up, both in `[-1, 1]`).
    pub fn ray(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let inv = self.view_proj().inverse();
        let unproject = |z: f32| {
            let p = inv * Vec4::new(ndc_x, ndc_y, z, 1.0);
            p.truncate() / p.w
        };
        let near = unproject(0.0);
        let far = unproject(1.0);
        Ray::new(near, far - near)
    }

    pub fn to_uniforms(&self) -> CameraUniforms {
        let eye = self.eye_position();
        CameraUniforms {
            view: self.view().to_cols_array_2d(),
            proj: self.proj().to_cols_array_2d(),
            position: [eye.x, eye.y, eye.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::pick_uv;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_probe_landing_converges_without_overshoot() {
        let mut cam = OrbitCamera::new(CameraConfig::default());
        assert_eq!(cam.distance(), 6.0);

        let mut prev = cam.distance();
        let mut converged_at = None;
        for frame in 0..2000 {
            let moved = cam.advance(DT, true);
            let d = cam.distance();
            assert!(d >= 2.2, "overshot at frame {frame}: {d}");
            if moved {
                assert!(d < prev, "not decreasing at frame {frame}");
            } else {
                assert_eq!(d, prev);
                converged_at.get_or_insert(frame);
            }
            prev = d;
        }
        assert!(converged_at.is_some());
        assert!((cam.distance() - 2.2).abs() <= 0.01);
    }

    #[test]
    fn test_returns_to_orbit_after_probe() {
        let mut cam = OrbitCamera::new(CameraConfig::default());
        for _ in 0..600 {
            cam.advance(DT, true);
        }
        for _ in 0..600 {
            cam.advance(DT, false);
        }
        assert!((cam.distance() - 6.0).abs() <= 0.01);
    }

    #[test]
    fn test_large_dt_does_not_overshoot() {
        let mut cam = OrbitCamera::new(CameraConfig::default());
        cam.advance(5.0, true);
        assert_eq!(cam.distance(), 2.2);
        assert!(!cam.advance(DT, true));
    }

    #[test]
    fn test_zoom_clamped() {
        let mut cam = OrbitCamera::new(CameraConfig::default());
        for _ in 0..100 {
            cam.zoom(1.0);
        }
        assert_eq!(cam.distance(), 2.1);
        for _ in 0..100 {
            cam.zoom(-1.0);
        }
        assert_eq!(cam.distance(), 12.0);
        // The wheel never moves the rest distance.
        assert_eq!(cam.target_distance(false), 6.0);
        assert_eq!(cam.target_distance(true), 2.2);
    }

    #[test]
    fn test_zoom_settles_back_to_orbit() {
        let mut cam = OrbitCamera::new(CameraConfig::default());
        for _ in 0..20 {
            cam.zoom(1.0);
        }
        assert!(cam.distance() < 2.5);
        for _ in 0..2000 {
            cam.advance(DT, false);
        }
        assert!((cam.distance() - 6.0).abs() <= 0.01);

        for _ in 0..20 {
            cam.zoom(-1.0);
        }
        assert!(cam.distance() > 11.0);
        for _ in 0..2000 {
            cam.advance(DT, false);
        }
        assert!((cam.distance() - 6.0).abs() <= 0.01);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut cam = OrbitCamera::new(CameraConfig::default());
        cam.orbit(0.0, 10_000.0);
        assert_eq!(cam.pitch, 1.5);
        cam.orbit(0.0, -10_000.0);
        assert_eq!(cam.pitch, -1.5);
    }

    #[test]
    fn test_center_ray_hits_planet_facing_camera() {
        let cam = OrbitCamera::new(CameraConfig::default());
        let ray = cam.ray(0.0, 0.0);
        assert!((ray.origin.z - (6.0 - NEAR)).abs() < 1e-3);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
        let (u, v) = pick_uv(ray, Mat4::IDENTITY, 2.0).unwrap();
        assert!((u - 0.25).abs() < 1e-3);
        assert!((v - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_uniforms_carry_eye() {
        let cam = OrbitCamera::new(CameraConfig::default());
        let u = cam.to_uniforms();
        assert_eq!(u.position, [0.0, 0.0, 6.0, 1.0]);
    }
}
