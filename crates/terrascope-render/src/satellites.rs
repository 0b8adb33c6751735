//! Decorative point clouds: the satellite swarm and the background stars.
//!
//! Both are generated once from an injected random source and never change
//! shape afterwards. The swarm turns rigidly every frame.

use std::f32::consts::FRAC_PI_4;

use glam::{Mat4, Vec3};
use rand::Rng;
use terrascope_core::constants::{
    SATELLITE_RATE_DIVISOR_X, SATELLITE_RATE_DIVISOR_Y, STAR_COUNT, STAR_DEPTH, STAR_RADIUS,
};

use crate::uniforms::PointStyle;

pub const SATELLITE_STYLE: PointStyle = PointStyle {
    color: [1.0, 0.627, 0.878, 0.9],
    size: 0.02,
    _pad: [0.0; 3],
};

pub const STAR_STYLE: PointStyle = PointStyle {
    color: [1.0, 1.0, 1.0, 0.85],
    size: 0.45,
    _pad: [0.0; 3],
};

/// Uniform sample inside a ball. The direction comes from rejection sampling
/// the unit cube; the cube-root radius keeps volume density flat.
fn point_in_ball<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let dir = loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let len2 = p.length_squared();
        if len2 > 1e-6 && len2 <= 1.0 {
            break p / len2.sqrt();
        }
    };
    dir * radius * rng.gen::<f32>().cbrt()
}

pub struct SatelliteRing {
    points: Vec<[f32; 3]>,
    radius: f32,
    rotation_x: f32,
    rotation_y: f32,
}

impl SatelliteRing {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, count: usize, radius: f32) -> Self {
        let points = (0..count)
            .map(|_| point_in_ball(rng, radius).to_array())
            .collect();
        Self {
            points,
            radius,
            rotation_x: 0.0,
            rotation_y: 0.0,
        }
    }

    pub fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn rotation(&self) -> (f32, f32) {
        (self.rotation_x, self.rotation_y)
    }

    /// Rigid per-frame turn about x and y at independent rates.
    pub fn advance(&mut self, dt: f32) {
        self.rotation_x -= dt / SATELLITE_RATE_DIVISOR_X;
        self.rotation_y -= dt / SATELLITE_RATE_DIVISOR_Y;
    }

    /// Model matrix inside the tilted planet group. The swarm's own frame is
    /// rolled by a quarter of pi before it spins.
    pub fn model(&self, group: Mat4) -> Mat4 {
        group
            * Mat4::from_rotation_z(FRAC_PI_4)
            * Mat4::from_rotation_x(self.rotation_x)
            * Mat4::from_rotation_y(self.rotation_y)
    }
}

/// Static shell of stars between `STAR_RADIUS` and `STAR_RADIUS + STAR_DEPTH`.
pub fn starfield<R: Rng + ?Sized>(rng: &mut R) -> Vec<[f32; 3]> {
    starfield_with(rng, STAR_COUNT, STAR_RADIUS, STAR_DEPTH)
}

pub fn starfield_with<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    radius: f32,
    depth: f32,
) -> Vec<[f32; 3]> {
    (0..count)
        .map(|_| {
            let dir = point_in_ball(rng, 1.0).normalize_or_zero();
            let r = radius + depth * rng.gen::<f32>();
            (dir * r).to_array()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_points_inside_radius() {
        let ring = SatelliteRing::new(&mut StdRng::seed_from_u64(3), 3000, 3.5);
        assert_eq!(ring.points().len(), 3000);
        for p in ring.points() {
            assert!(Vec3::from_array(*p).length() <= 3.5 + 1e-4);
        }
    }

    #[test]
    fn test_volume_density_is_flat() {
        // Half the volume of a ball lies outside 0.7937 of its radius.
        let ring = SatelliteRing::new(&mut StdRng::seed_from_u64(11), 3000, 1.0);
        let outer = ring
            .points()
            .iter()
            .filter(|p| Vec3::from_array(**p).length() > 0.7937)
            .count();
        let fraction = outer as f32 / 3000.0;
        assert!((fraction - 0.5).abs() < 0.05, "{fraction}");
    }

    #[test]
    fn test_seeded_generation_repeats() {
        let a = SatelliteRing::new(&mut StdRng::seed_from_u64(5), 100, 3.5);
        let b = SatelliteRing::new(&mut StdRng::seed_from_u64(5), 100, 3.5);
        assert_eq!(a.points(), b.points());
    }

    #[test]
    fn test_advance_rates() {
        let mut ring = SatelliteRing::new(&mut StdRng::seed_from_u64(1), 10, 3.5);
        ring.advance(1.5);
        let (x, y) = ring.rotation();
        assert!((x + 0.15).abs() < 1e-6);
        assert!((y + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_model_preserves_distances() {
        let mut ring = SatelliteRing::new(&mut StdRng::seed_from_u64(2), 50, 3.5);
        ring.advance(7.0);
        let model = ring.model(Mat4::from_rotation_z(0.41));
        for p in ring.points() {
            let p = Vec3::from_array(*p);
            assert!((model.transform_point3(p).length() - p.length()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_starfield_shell() {
        let stars = starfield(&mut StdRng::seed_from_u64(9));
        assert_eq!(stars.len(), 5000);
        for s in &stars {
            let r = Vec3::from_array(*s).length();
            assert!((100.0 - 1e-3..=150.0 + 1e-3).contains(&r), "{r}");
        }
    }
}
