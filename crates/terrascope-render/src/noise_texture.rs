//! Seamless grayscale noise tile used to thin out city lights.
//!
//! A coarse grid of uniform random samples is upsampled with bilinear
//! interpolation. Neighbor lookups wrap on both axes, so the tile repeats
//! without a seam.

use rand::Rng;
use terrascope_core::constants::{NOISE_GRID_SIZE, NOISE_TEXTURE_SIZE};

#[derive(Debug, Clone)]
pub struct CityNoiseTexture {
    grid: Vec<f32>,
    grid_size: u32,
    size: u32,
    /// RGBA8, row-major, `size * size * 4` bytes.
    pixels: Vec<u8>,
}

impl CityNoiseTexture {
    /// 16x16 grid upsampled to 64x64.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_sizes(rng, NOISE_GRID_SIZE, NOISE_TEXTURE_SIZE)
    }

    pub fn with_sizes<R: Rng + ?Sized>(rng: &mut R, grid_size: u32, size: u32) -> Self {
        let grid_size = grid_size.max(1);
        let size = size.max(1);
        let grid = (0..grid_size * grid_size)
            .map(|_| rng.gen::<f32>())
            .collect();

        let mut texture = Self {
            grid,
            grid_size,
            size,
            pixels: Vec::with_capacity((size * size * 4) as usize),
        };
        for y in 0..size {
            for x in 0..size {
                let v = texture.sample(x, y);
                texture.pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        texture
    }

    pub fn width(&self) -> u32 {
        self.size
    }

    pub fn height(&self) -> u32 {
        self.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Quantized value at texel `(x, y)`. Coordinates past the edge continue
    /// the interpolation through the wrapped grid, so `sample(width, y)`
    /// equals `sample(0, y)`.
    pub fn sample(&self, x: u32, y: u32) -> u8 {
        let v = self.interpolate(x, y);
        (v * 255.0).floor().clamp(0.0, 255.0) as u8
    }

    fn interpolate(&self, x: u32, y: u32) -> f32 {
        let g = self.grid_size;
        let scale = g as f32 / self.size as f32;
        let gx = x as f32 * scale;
        let gy = y as f32 * scale;

        let x0 = gx.floor() as u32;
        let y0 = gy.floor() as u32;
        let tx = gx - x0 as f32;
        let ty = gy - y0 as f32;

        let at = |ix: u32, iy: u32| self.grid[((iy % g) * g + (ix % g)) as usize];
        let top = lerp(at(x0, y0), at(x0 + 1, y0), tx);
        let bottom = lerp(at(x0, y0 + 1), at(x0 + 1, y0 + 1), tx);
        lerp(top, bottom, ty)
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_dimensions_and_channels() {
        let tex = CityNoiseTexture::generate(&mut StdRng::seed_from_u64(1));
        assert_eq!(tex.width(), 64);
        assert_eq!(tex.pixels().len(), 64 * 64 * 4);
        for px in tex.pixels().chunks_exact(4) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn test_wraps_seamlessly_for_any_seed() {
        for seed in 0..20 {
            let tex = CityNoiseTexture::generate(&mut StdRng::seed_from_u64(seed));
            let w = tex.width();
            for i in 0..w {
                assert_eq!(tex.sample(0, i), tex.sample(w, i), "seed {seed} row {i}");
                assert_eq!(tex.sample(i, 0), tex.sample(i, w), "seed {seed} col {i}");
            }
        }
    }

    #[test]
    fn test_seeded_output_is_reproducible() {
        let a = CityNoiseTexture::generate(&mut StdRng::seed_from_u64(42));
        let b = CityNoiseTexture::generate(&mut StdRng::seed_from_u64(42));
        let c = CityNoiseTexture::generate(&mut StdRng::seed_from_u64(43));
        assert_eq!(a.pixels(), b.pixels());
        assert_ne!(a.pixels(), c.pixels());
    }

    #[test]
    fn test_grid_points_hit_exactly() {
        let tex = CityNoiseTexture::generate(&mut StdRng::seed_from_u64(7));
        // Every 4th texel sits on a grid sample.
        let expected = (tex.grid[1] * 255.0).floor() as u8;
        assert_eq!(tex.sample(4, 0), expected);
    }
}
