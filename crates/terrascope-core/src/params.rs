use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::MAX_CITY_INTENSITY;
use crate::types::{DataLayer, Rgb, SunType};

/// The authoritative configuration driving rendering.
///
/// Never mutated in place: `apply` returns a new revision built from the old
/// one plus a partial delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualParams {
    /// Angular speed multiplier, >= 0.
    pub rotation_speed: f32,
    /// Axial tilt in radians, applied about the roll axis.
    pub tilt: f32,
    pub atmosphere_color: Rgb,
    /// [0, 1]
    pub cloud_density: f32,
    /// [0, 1]
    pub snow_level: f32,
    /// [0, 1]
    pub water_murkiness: f32,
    pub sun_type: SunType,
    pub city_light_color: Rgb,
    /// [0, 2]
    pub city_light_intensity: f32,
    /// Custom day texture. `None` means the built-in default.
    pub texture_map_url: Option<String>,
    /// Custom cloud texture. `None` means the built-in default.
    pub cloud_map_url: Option<String>,
    pub data_layer: DataLayer,
    pub show_satellites: bool,
}

impl Default for VisualParams {
    /// Earth as first shown.
    fn default() -> Self {
        Self {
            rotation_speed: 0.05,
            tilt: 0.41,
            atmosphere_color: Rgb::new(59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0),
            cloud_density: 0.6,
            snow_level: 0.0,
            water_murkiness: 0.0,
            sun_type: SunType::Yellow,
            city_light_color: Rgb::new(1.0, 170.0 / 255.0, 51.0 / 255.0),
            city_light_intensity: 1.0,
            texture_map_url: None,
            cloud_map_url: None,
            data_layer: DataLayer::Visual,
            show_satellites: true,
        }
    }
}

impl VisualParams {
    /// Produce the next revision. Absent delta fields keep their current value,
    /// non-finite numbers are ignored and ranged fields are clamped.
    pub fn apply(&self, delta: &ParamDelta) -> VisualParams {
        let mut next = self.clone();

        merge_scalar(&mut next.rotation_speed, delta.rotation_speed, 0.0, f32::MAX);
        merge_scalar(&mut next.tilt, delta.tilt, f32::MIN, f32::MAX);
        merge_scalar(&mut next.cloud_density, delta.cloud_density, 0.0, 1.0);
        merge_scalar(&mut next.snow_level, delta.snow_level, 0.0, 1.0);
        merge_scalar(&mut next.water_murkiness, delta.water_murkiness, 0.0, 1.0);
        merge_scalar(
            &mut next.city_light_intensity,
            delta.city_light_intensity,
            0.0,
            MAX_CITY_INTENSITY,
        );

        if let Some(c) = delta.atmosphere_color {
            next.atmosphere_color = c;
        }
        if let Some(c) = delta.city_light_color {
            next.city_light_color = c;
        }
        if let Some(s) = delta.sun_type {
            next.sun_type = s;
        }
        if let Some(d) = delta.data_layer {
            next.data_layer = d;
        }
        if let Some(show) = delta.show_satellites {
            next.show_satellites = show;
        }
        if let Some(url) = &delta.texture_map_url {
            next.texture_map_url = normalize_url(url);
        }
        if let Some(url) = &delta.cloud_map_url {
            next.cloud_map_url = normalize_url(url);
        }

        next
    }
}

fn merge_scalar(slot: &mut f32, incoming: Option<f32>, min: f32, max: f32) {
    if let Some(v) = incoming.filter(|v| v.is_finite()) {
        *slot = v.clamp(min, max);
    }
}

/// An empty string resets to the default just like `null`.
fn normalize_url(url: &Option<String>) -> Option<String> {
    url.as_ref()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

/// A partial update to [`VisualParams`]. Every field is optional.
///
/// The texture URL fields are tri-state: absent keeps the current texture,
/// `null` reverts to the built-in default, a string selects a custom image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParamDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tilt: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atmosphere_color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_density: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snow_level: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_murkiness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sun_type: Option<SunType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_light_color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_light_intensity: Option<f32>,
    #[serde(
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub texture_map_url: Option<Option<String>>,
    #[serde(
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub cloud_map_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_layer: Option<DataLayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_satellites: Option<bool>,
}

impl ParamDelta {
    pub fn is_empty(&self) -> bool {
        *self == ParamDelta::default()
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(mut self, other: ParamDelta) -> ParamDelta {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            rotation_speed,
            tilt,
            atmosphere_color,
            cloud_density,
            snow_level,
            water_murkiness,
            sun_type,
            city_light_color,
            city_light_intensity,
            texture_map_url,
            cloud_map_url,
            data_layer,
            show_satellites
        );
        self
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
