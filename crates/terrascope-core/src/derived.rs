//! Shading inputs computed from [`VisualParams`] but never stored in it.

use glam::Vec3;

use crate::constants::SUN_DIRECTION;
use crate::params::VisualParams;
use crate::types::{DataLayer, SunType};

/// Light color of the host star.
pub fn sun_color(sun: SunType) -> [f32; 3] {
    match sun {
        SunType::Yellow => [1.0, 0.95, 0.9],
        SunType::Red => [1.0, 0.4, 0.3],
        SunType::Blue => [0.6, 0.8, 1.0],
    }
}

/// Same as [`sun_color`] for a raw name. Unknown names get the yellow color.
pub fn sun_color_by_name(name: &str) -> [f32; 3] {
    sun_color(SunType::from_name(name))
}

/// Shader mode integer for a data layer.
pub fn data_layer_mode(layer: DataLayer) -> i32 {
    match layer {
        DataLayer::Visual => 0,
        DataLayer::Thermal => 1,
        DataLayer::Population => 2,
        DataLayer::Vegetation => 3,
    }
}

/// Same as [`data_layer_mode`] for a raw name. Unknown names map to 0.
pub fn data_layer_mode_by_name(name: &str) -> i32 {
    data_layer_mode(DataLayer::from_name(name))
}

/// Normalized direction towards the sun. Constant for the scene.
pub fn sun_direction() -> Vec3 {
    Vec3::from_array(SUN_DIRECTION).normalize()
}

/// Equirectangular surface coordinates to whole-degree latitude/longitude.
/// `v = 0` is the south pole, `u = 0` the antimeridian.
pub fn uv_to_lat_lon(u: f32, v: f32) -> (i32, i32) {
    let lat = round_half_up(f64::from(v) * 180.0 - 90.0);
    let lon = round_half_up(f64::from(u) * 360.0 - 180.0);
    (lat, lon)
}

/// Halves round towards positive infinity, so -0.5 becomes 0 and 0.5 becomes 1.
fn round_half_up(x: f64) -> i32 {
    (x + 0.5).floor() as i32
}

/// Snapshot of everything the material engine needs from one parameter revision.
///
/// The engine diffs two snapshots field by field to decide what to write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedInputs {
    pub sun_direction: [f32; 3],
    pub sun_color: [f32; 3],
    pub mode: i32,
    pub atmosphere_color: [f32; 3],
    pub city_light_color: [f32; 3],
    pub city_light_intensity: f32,
    pub cloud_density: f32,
    pub snow_level: f32,
    pub water_murkiness: f32,
    pub tilt: f32,
    pub rotation_speed: f32,
}

impl DerivedInputs {
    pub fn from_params(params: &VisualParams) -> Self {
        Self {
            sun_direction: sun_direction().to_array(),
            sun_color: sun_color(params.sun_type),
            mode: data_layer_mode(params.data_layer),
            atmosphere_color: params.atmosphere_color.as_array(),
            city_light_color: params.city_light_color.as_array(),
            city_light_intensity: params.city_light_intensity,
            cloud_density: params.cloud_density,
            snow_level: params.snow_level,
            water_murkiness: params.water_murkiness,
            tilt: params.tilt,
            rotation_speed: params.rotation_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sun_colors_exact() {
        assert_eq!(sun_color_by_name("red"), [1.0, 0.4, 0.3]);
        assert_eq!(sun_color_by_name("blue"), [0.6, 0.8, 1.0]);
        assert_eq!(sun_color_by_name("yellow"), [1.0, 0.95, 0.9]);
        assert_eq!(sun_color_by_name("magenta"), [1.0, 0.95, 0.9]);
        assert_eq!(sun_color_by_name(""), [1.0, 0.95, 0.9]);
    }

    #[test]
    fn test_mode_mapping_total() {
        let cases = [
            ("visual", 0),
            ("thermal", 1),
            ("population", 2),
            ("vegetation", 3),
            ("infrared", 0),
            ("THERMAL", 0),
        ];
        for (name, mode) in cases {
            assert_eq!(data_layer_mode_by_name(name), mode, "layer {name}");
        }
    }

    #[test]
    fn test_sun_direction_normalized() {
        let d = sun_direction();
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!((d.x - d.z).abs() < 1e-6);
        assert!((d.y * 2.0 - d.x).abs() < 1e-6);
    }

    #[test]
    fn test_uv_to_lat_lon() {
        assert_eq!(uv_to_lat_lon(0.5, 0.5), (0, 0));
        assert_eq!(uv_to_lat_lon(0.0, 0.0), (-90, -180));
        assert_eq!(uv_to_lat_lon(1.0, 1.0), (90, 180));
        assert_eq!(uv_to_lat_lon(0.75, 0.25), (-45, 90));
    }

    #[test]
    fn test_rounding_halves_go_up() {
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(0.5), 1);
        assert_eq!(round_half_up(-1.5), -1);
        assert_eq!(round_half_up(2.4), 2);
    }

    #[test]
    fn test_derived_from_params() {
        let params = VisualParams {
            sun_type: SunType::Red,
            data_layer: DataLayer::Vegetation,
            ..Default::default()
        };
        let d = DerivedInputs::from_params(&params);
        assert_eq!(d.sun_color, [1.0, 0.4, 0.3]);
        assert_eq!(d.mode, 3);
        assert_eq!(d.cloud_density, params.cloud_density);
        assert_eq!(d, DerivedInputs::from_params(&params));
    }
}
