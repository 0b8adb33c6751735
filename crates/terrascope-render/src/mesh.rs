//! UV sphere geometry and surface picking.
//!
//! Vertex layout follows the usual latitude/longitude sphere: rows run from
//! the north pole (`v = 0`) to the south pole, columns wrap once around the
//! equator. The seam column is duplicated so texture coordinates do not jump.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};

/// One sphere vertex. Must match VertexIn in sphere.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Texture coordinate, `v = 0` at the north pole (top image row).
    pub uv: [f32; 2],
}

impl SphereVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub radius: f32,
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let w = width_segments.max(3);
        let h = height_segments.max(2);

        let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            let theta = v * PI;
            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let phi = u * TAU;
                let normal = Vec3::new(
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                );
                vertices.push(SphereVertex {
                    position: (normal * radius).to_array(),
                    normal: normal.to_array(),
                    uv: [u, v],
                });
            }
        }

        let row = w + 1;
        let mut indices = Vec::with_capacity((w * h * 6) as usize);
        for iy in 0..h {
            for ix in 0..w {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                // Pole rows collapse to a single triangle per quad.
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self {
            radius,
            vertices,
            indices,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// A world-space ray. `direction` is normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }
}

/// Intersect a ray with a sphere of `radius` centered in the mesh's local
/// frame and return the equirectangular coordinate of the nearest hit.
///
/// The returned `v` grows northwards (`0` at the south pole), the convention
/// latitude conversion expects. `inverse_model` maps world space into the
/// mesh's local space, so spin and tilt are accounted for.
pub fn pick_uv(ray: Ray, inverse_model: Mat4, radius: f32) -> Option<(f32, f32)> {
    let origin = inverse_model.transform_point3(ray.origin);
    let direction = inverse_model.transform_vector3(ray.direction).normalize_or_zero();
    if direction == Vec3::ZERO {
        return None;
    }

    let b = origin.dot(direction);
    let c = origin.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let t = if -b - root >= 0.0 { -b - root } else { -b + root };
    if t < 0.0 {
        return None;
    }

    let hit = origin + direction * t;
    let mut u = hit.z.atan2(-hit.x) / TAU;
    if u < 0.0 {
        u += 1.0;
    }
    let v = 1.0 - (hit.y / radius).clamp(-1.0, 1.0).acos() / PI;
    Some((u.clamp(0.0, 1.0), v.clamp(0.0, 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrascope_core::derived::uv_to_lat_lon;

    #[test]
    fn test_vertex_and_index_counts() {
        let mesh = SphereMesh::new(2.0, 8, 4);
        assert_eq!(mesh.vertices.len(), 9 * 5);
        // Two triangles per quad, minus one per quad on each pole row.
        assert_eq!(mesh.indices.len(), (8 * 4 * 2 - 8 * 2) * 3);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_vertices_lie_on_sphere() {
        let mesh = SphereMesh::new(2.0, 16, 8);
        for v in &mesh.vertices {
            let p = Vec3::from_array(v.position);
            assert!((p.length() - 2.0).abs() < 1e-5);
            assert!((Vec3::from_array(v.normal) - p / 2.0).length() < 1e-5);
        }
        assert_eq!(mesh.vertices[0].position[1], 2.0);
        assert_eq!(mesh.vertices[0].uv[1], 0.0);
    }

    #[test]
    fn test_pick_equator_faces() {
        // x = -r cos(2πu) sin θ, so a ray hitting -X lands on u = 0.
        let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::X);
        let (u, v) = pick_uv(ray, Mat4::IDENTITY, 2.0).unwrap();
        assert!(u.abs() < 1e-5 || (u - 1.0).abs() < 1e-5);
        assert!((v - 0.5).abs() < 1e-5);

        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::NEG_X);
        let (u, _) = pick_uv(ray, Mat4::IDENTITY, 2.0).unwrap();
        assert!((u - 0.5).abs() < 1e-5);
        assert_eq!(uv_to_lat_lon(u, 0.5), (0, 0));
    }

    #[test]
    fn test_pick_poles_and_miss() {
        let down = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y);
        let (_, v) = pick_uv(down, Mat4::IDENTITY, 2.0).unwrap();
        assert!((v - 1.0).abs() < 1e-5);

        let miss = Ray::new(Vec3::new(0.0, 5.0, 10.0), Vec3::NEG_Z);
        assert!(pick_uv(miss, Mat4::IDENTITY, 2.0).is_none());

        let away = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(pick_uv(away, Mat4::IDENTITY, 2.0).is_none());
    }

    #[test]
    fn test_pick_respects_spin() {
        // Spinning the mesh a quarter turn moves the hit a quarter of the way round.
        let model = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let (u0, _) = pick_uv(ray, Mat4::IDENTITY, 2.0).unwrap();
        let (u1, _) = pick_uv(ray, model.inverse(), 2.0).unwrap();
        let delta = (u1 - u0).rem_euclid(1.0);
        assert!((delta - 0.25).abs() < 1e-4 || (delta - 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_pick_matches_mesh_uv() {
        let mesh = SphereMesh::new(2.0, 32, 16);
        let vertex = mesh.vertices[5 * 33 + 7];
        let p = Vec3::from_array(vertex.position);
        let ray = Ray::new(p * 5.0, -p);
        let (u, v) = pick_uv(ray, Mat4::IDENTITY, 2.0).unwrap();
        assert!((u - vertex.uv[0]).abs() < 1e-4);
        assert!((v - (1.0 - vertex.uv[1])).abs() < 1e-4);
    }
}
