use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorParseError;

/// Linear RGB color (0.0–1.0 per channel). Serialized as a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b])
    }

    /// Parse `#rrggbb` or the `#rgb` shorthand. The leading `#` is optional.
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(err()),
        };
        let value = u32::from_str_radix(&expanded, 16).map_err(|_| err())?;
        let channel = |shift: u32| ((value >> shift) & 0xFF) as f32 / 255.0;
        Ok(Self([channel(16), channel(8), channel(0)]))
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn as_array(&self) -> [f32; 3] {
        self.0
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Spectral class of the host star. Unknown names fall back to `Yellow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SunType {
    #[default]
    Yellow,
    Red,
    Blue,
}

impl SunType {
    pub const ALL: [SunType; 3] = [SunType::Yellow, SunType::Red, SunType::Blue];

    pub fn from_name(name: &str) -> Self {
        match name {
            "red" => SunType::Red,
            "blue" => SunType::Blue,
            _ => SunType::Yellow,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SunType::Yellow => "yellow",
            SunType::Red => "red",
            SunType::Blue => "blue",
        }
    }
}

impl From<String> for SunType {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl From<SunType> for String {
    fn from(s: SunType) -> Self {
        s.name().to_string()
    }
}

/// Shading mode of the surface. Unknown names fall back to `Visual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataLayer {
    #[default]
    Visual,
    Thermal,
    Population,
    Vegetation,
}

impl DataLayer {
    pub const ALL: [DataLayer; 4] = [
        DataLayer::Visual,
        DataLayer::Thermal,
        DataLayer::Population,
        DataLayer::Vegetation,
    ];

    pub fn from_name(name: &str) -> Self {
        match name {
            "thermal" => DataLayer::Thermal,
            "population" => DataLayer::Population,
            "vegetation" => DataLayer::Vegetation,
            _ => DataLayer::Visual,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DataLayer::Visual => "visual",
            DataLayer::Thermal => "thermal",
            DataLayer::Population => "population",
            DataLayer::Vegetation => "vegetation",
        }
    }
}

impl From<String> for DataLayer {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl From<DataLayer> for String {
    fn from(d: DataLayer) -> Self {
        d.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_hex() {
        let c = Rgb::from_hex("#ff8000").expect("valid color");
        assert!((c.0[0] - 1.0).abs() < 1e-6);
        assert!((c.0[1] - 128.0 / 255.0).abs() < 1e-6);
        assert!(c.0[2].abs() < 1e-6);
    }

    #[test]
    fn test_parse_short_hex() {
        let a = Rgb::from_hex("#fa3").expect("valid color");
        let b = Rgb::from_hex("#ffaa33").expect("valid color");
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Rgb::from_hex("").is_err());
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#gggggg").is_err());
        assert!(Rgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_parse_rejects_signs() {
        assert!(Rgb::from_hex("#+fffff").is_err());
        assert!(Rgb::from_hex("+ff").is_err());
        assert!(Rgb::from_hex("#-12345").is_err());
    }

    #[test]
    fn test_hex_display_roundtrip() {
        assert_eq!(Rgb::from_hex("#3b82f6").expect("valid").to_hex(), "#3b82f6");
    }

    #[test]
    fn test_unknown_enum_names_fall_back() {
        assert_eq!(SunType::from_name("green"), SunType::Yellow);
        assert_eq!(DataLayer::from_name("radar"), DataLayer::Visual);
        let s: SunType = serde_json::from_str("\"plasma\"").expect("never fails");
        assert_eq!(s, SunType::Yellow);
        let d: DataLayer = serde_json::from_str("\"thermal\"").expect("never fails");
        assert_eq!(d, DataLayer::Thermal);
    }
}
