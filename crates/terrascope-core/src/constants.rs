//! Single source of truth for shared constants.

/// Surface spin per second per unit of `rotation_speed`.
pub const SURFACE_SPIN_FACTOR: f32 = 0.1;

/// Cloud spin per second per unit of `rotation_speed`.
/// Clouds drift at 1.2x the surface rate.
pub const CLOUD_SPIN_FACTOR: f32 = 0.12;

/// Un-normalized sun direction. Constant for the lifetime of the scene.
pub const SUN_DIRECTION: [f32; 3] = [1.0, 0.5, 1.0];

/// Side length of the coarse random grid behind the city-noise texture.
pub const NOISE_GRID_SIZE: u32 = 16;

/// Side length of the city-noise texture in texels.
pub const NOISE_TEXTURE_SIZE: u32 = 64;

/// A challenge target is met when the live value is within this distance.
pub const CHALLENGE_TOLERANCE: f32 = 0.15;

/// Upper bound of `city_light_intensity`.
pub const MAX_CITY_INTENSITY: f32 = 2.0;

/// Planet geometry.
pub const SURFACE_RADIUS: f32 = 2.0;
pub const CLOUD_RADIUS: f32 = 2.03;
pub const ATMOSPHERE_SCALE: f32 = 1.2;
pub const SURFACE_SEGMENTS: u32 = 128;
pub const ATMOSPHERE_SEGMENTS: u32 = 64;

/// Camera distances and damping.
pub const ORBIT_DISTANCE: f32 = 6.0;
pub const PROBE_DISTANCE: f32 = 2.2;
pub const CAMERA_EPSILON: f32 = 0.01;
pub const CAMERA_LERP_RATE: f32 = 2.0;
pub const MIN_ZOOM_DISTANCE: f32 = 2.1;
pub const MAX_ZOOM_DISTANCE: f32 = 12.0;

/// Satellite ring: point count, enclosing radius and per-axis angular divisors.
pub const SATELLITE_COUNT: usize = 3000;
pub const SATELLITE_RADIUS: f32 = 3.5;
pub const SATELLITE_RATE_DIVISOR_X: f32 = 10.0;
pub const SATELLITE_RATE_DIVISOR_Y: f32 = 15.0;

/// Background starfield shell.
pub const STAR_COUNT: usize = 5000;
pub const STAR_RADIUS: f32 = 100.0;
pub const STAR_DEPTH: f32 = 50.0;

/// Ambient audio ceilings.
pub const WIND_GAIN_MAX: f32 = 0.3;
pub const DRONE_GAIN_MAX: f32 = 0.15;
pub const DRONE_FREQUENCY_HZ: f32 = 60.0;
pub const GAIN_RAMP_SECONDS: f64 = 0.5;
