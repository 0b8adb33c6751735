//! Pink noise for the wind bed.
//!
//! Paul Kellet's refined filter: seven one-pole stages over white noise give
//! a -3 dB/octave slope that is accurate to within half a decibel across the
//! audible range.

use rand::Rng;

/// Output scale that brings the summed stages back to roughly unit peak.
const OUTPUT_GAIN: f32 = 0.11;

#[derive(Debug, Clone, Default)]
pub struct PinkNoise {
    b: [f32; 7],
}

impl PinkNoise {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter one white sample in `[-1, 1]`.
    pub fn next_sample(&mut self, white: f32) -> f32 {
        let b = &mut self.b;
        b[0] = 0.99886 * b[0] + white * 0.0555179;
        b[1] = 0.99332 * b[1] + white * 0.0750759;
        b[2] = 0.96900 * b[2] + white * 0.1538520;
        b[3] = 0.86650 * b[3] + white * 0.3104856;
        b[4] = 0.55000 * b[4] + white * 0.5329522;
        b[5] = -0.7616 * b[5] - white * 0.0168981;
        let out = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
        b[6] = white * 0.115926;
        out * OUTPUT_GAIN
    }

    pub fn fill<R: Rng + ?Sized>(&mut self, rng: &mut R, out: &mut [f32]) {
        for sample in out.iter_mut() {
            let white = rng.gen_range(-1.0f32..1.0);
            *sample = self.next_sample(white);
        }
    }
}

/// `len` samples of pink noise from a fresh filter.
pub fn pink_noise_buffer<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<f32> {
    let mut out = vec![0.0; len];
    PinkNoise::new().fill(rng, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_silence_in_silence_out() {
        let mut pink = PinkNoise::new();
        for _ in 0..100 {
            assert_eq!(pink.next_sample(0.0), 0.0);
        }
    }

    #[test]
    fn test_impulse_response() {
        let mut pink = PinkNoise::new();
        let first = pink.next_sample(1.0);
        let expected = (0.0555179 + 0.0750759 + 0.1538520 + 0.3104856 + 0.5329522
            - 0.0168981
            + 0.5362)
            * OUTPUT_GAIN;
        assert!((first - expected).abs() < 1e-6);
        // The b6 tap only shows up one sample later.
        let second = pink.next_sample(0.0);
        assert!(second > 0.0);
    }

    #[test]
    fn test_output_is_bounded() {
        let buf = pink_noise_buffer(&mut StdRng::seed_from_u64(4), 48_000);
        assert_eq!(buf.len(), 48_000);
        assert!(buf.iter().all(|s| s.is_finite() && s.abs() < 1.0));
        let mean = buf.iter().sum::<f32>() / buf.len() as f32;
        assert!(mean.abs() < 0.1, "{mean}");
    }

    #[test]
    fn test_low_frequencies_dominate() {
        // Pink noise is smoother than white: neighbouring samples correlate.
        let buf = pink_noise_buffer(&mut StdRng::seed_from_u64(8), 20_000);
        let energy: f32 = buf.iter().map(|s| s * s).sum();
        let lag1: f32 = buf.windows(2).map(|w| w[0] * w[1]).sum();
        assert!(lag1 / energy > 0.3, "{}", lag1 / energy);
    }
}
