//! Records exchanged with the generative content service.
//!
//! The service itself is an external collaborator. This module owns the
//! contract: the prompts sent, the JSON shapes expected back and the
//! defaults applied when optional fields are missing. Transport lives in the
//! web shell.

use serde::{Deserialize, Serialize};

use crate::derived::uv_to_lat_lon;
use crate::error::ContentError;
use crate::params::ParamDelta;
use crate::types::Rgb;

/// Narrative description of the current world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetLore {
    pub name: String,
    pub description: String,
    pub age: String,
    pub civilization_type: String,
    pub atmosphere_composition: Vec<String>,
    pub population: String,
    /// 0 to 100.
    pub habitability_score: f32,
}

impl Default for PlanetLore {
    fn default() -> Self {
        Self {
            name: "Earth (Terra)".into(),
            description: "The third planet from the Sun. A water-rich world currently hosting \
                          a Type 0.7 civilization."
                .into(),
            age: "4.54 Billion Years".into(),
            civilization_type: "Type 0.73 (Planetary)".into(),
            atmosphere_composition: vec!["Nitrogen".into(), "Oxygen".into()],
            population: "8.1 Billion".into(),
            habitability_score: 100.0,
        }
    }
}

impl PlanetLore {
    pub fn apply(&self, delta: &LoreDelta) -> PlanetLore {
        let mut next = self.clone();
        if let Some(d) = &delta.description {
            next.description = d.clone();
        }
        if let Some(c) = &delta.civilization_type {
            next.civilization_type = c.clone();
        }
        if let Some(p) = &delta.population {
            next.population = p.clone();
        }
        if let Some(h) = delta.habitability_score.filter(|h| h.is_finite()) {
            next.habitability_score = h;
        }
        next
    }
}

/// Partial lore update produced by world events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoreDelta {
    pub description: Option<String>,
    pub civilization_type: Option<String>,
    pub population: Option<String>,
    pub habitability_score: Option<f32>,
}

/// Status report for a clicked surface location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiReport {
    pub title: String,
    pub description: String,
    /// Equirectangular coordinates of the click.
    pub u: f32,
    pub v: f32,
}

impl PoiReport {
    /// Shown when the service cannot be reached or answers garbage.
    pub fn signal_lost(u: f32, v: f32) -> Self {
        Self {
            title: "Signal Lost".into(),
            description: "Unable to retrieve telemetry from this sector.".into(),
            u,
            v,
        }
    }

    pub fn lat_lon(&self) -> (i32, i32) {
        uv_to_lat_lon(self.u, self.v)
    }
}

/// Goal values a terraforming challenge checks against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStats {
    pub habitability_score: Option<f32>,
    pub cloud_density: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeTarget {
    pub active: bool,
    pub description: String,
    pub target_stats: TargetStats,
    pub success: bool,
}

/// What a content request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    World,
    Texture,
    Disaster,
    Evolve,
    Challenge,
    Poi,
}

/// Body POSTed to the content endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRequest {
    pub kind: RequestKind,
    pub prompt: String,
}

impl ContentRequest {
    pub fn world() -> Self {
        Self {
            kind: RequestKind::World,
            prompt: "Generate a scenario for an exoplanet or future Earth. Be creative with the \
                     biome and civilization status."
                .into(),
        }
    }

    /// `description` guides the synthesized surface map.
    pub fn texture(description: &str) -> Self {
        Self {
            kind: RequestKind::Texture,
            prompt: format!(
                "A high quality, seamless, equirectangular projection texture map of a planet \
                 surface: {description}. Flat lighting, no shadows, 4k resolution style. The map \
                 should show continents and oceans."
            ),
        }
    }

    /// Texture prompt for a freshly generated world.
    pub fn texture_for(lore: &PlanetLore) -> Self {
        let gases = lore.atmosphere_composition.join(", ");
        Self::texture(&format!("{} {}", lore.description, gases))
    }

    pub fn disaster(lore: &PlanetLore) -> Self {
        Self {
            kind: RequestKind::Disaster,
            prompt: format!(
                "Current Planet: {} ({}). Trigger a catastrophic global event (e.g. Gamma Ray \
                 Burst, Supervolcano, Artificial AI Takeover). Return the new visual and lore \
                 states.",
                lore.name, lore.description
            ),
        }
    }

    pub fn evolve(lore: &PlanetLore, years: u32) -> Self {
        Self {
            kind: RequestKind::Evolve,
            prompt: format!(
                "Advance (or regress) the civilization of {} by {years} years. Describe the \
                 technological changes or collapse.",
                lore.name
            ),
        }
    }

    pub fn challenge() -> Self {
        Self {
            kind: RequestKind::Challenge,
            prompt: "Create a terraforming challenge for a dead planet. Describe what needs to \
                     be fixed (e.g. 'Melting the ice caps', 'Clearing the smog')."
                .into(),
        }
    }

    pub fn poi(context: &str, u: f32, v: f32) -> Self {
        let (lat, lon) = uv_to_lat_lon(u, v);
        Self {
            kind: RequestKind::Poi,
            prompt: format!(
                "Context: {context}\nLocation: Latitude {lat}, Longitude {lon}.\nGenerate a short \
                 sci-fi status report for this specific location."
            ),
        }
    }
}

// -- Response shapes --

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WorldResponse {
    name: Option<String>,
    description: Option<String>,
    age: Option<String>,
    civilization_type: Option<String>,
    atmosphere_composition: Option<Vec<String>>,
    population: Option<String>,
    habitability_score: Option<f32>,
    atmosphere_color: Option<String>,
    rotation_speed: Option<f32>,
    city_light_color: Option<String>,
    water_murkiness: Option<f32>,
    snow_level: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EventResponse {
    event_title: Option<String>,
    new_description: Option<String>,
    atmosphere_color: Option<String>,
    water_murkiness: Option<f32>,
    snow_level: Option<f32>,
    city_light_intensity: Option<f32>,
    city_light_color: Option<String>,
    habitability_score: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChallengeResponse {
    description: Option<String>,
    target_cloud_density: Option<f32>,
    target_habitability: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PoiResponse {
    title: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TextureResponse {
    image_bytes: Option<String>,
    mime_type: Option<String>,
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ContentError> {
    value.ok_or(ContentError::MissingField(field))
}

/// A bad color string is treated as missing instead of failing the whole record.
fn lenient_color(raw: Option<&str>) -> Option<Rgb> {
    let raw = raw?;
    match Rgb::from_hex(raw) {
        Ok(c) => Some(c),
        Err(e) => {
            log::warn!("ignoring {e} in content response");
            None
        }
    }
}

/// Zero and missing both take the fallback.
fn nonzero_or(value: Option<f32>, fallback: f32) -> f32 {
    value.filter(|v| *v != 0.0 && v.is_finite()).unwrap_or(fallback)
}

const DEFAULT_ATMOSPHERE: Rgb = Rgb::new(59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0);
const DEFAULT_CITY_LIGHTS: Rgb = Rgb::new(1.0, 170.0 / 255.0, 51.0 / 255.0);
const DISASTER_CITY_LIGHTS: Rgb = Rgb::new(1.0, 0.0, 0.0);

/// Parse a "generate world" response into fresh lore and the matching parameters.
pub fn parse_world(json: &str) -> Result<(PlanetLore, ParamDelta), ContentError> {
    let data: WorldResponse = serde_json::from_str(json)?;

    let lore = PlanetLore {
        name: require(data.name, "name")?,
        description: require(data.description, "description")?,
        age: require(data.age, "age")?,
        civilization_type: require(data.civilization_type, "civilizationType")?,
        atmosphere_composition: require(data.atmosphere_composition, "atmosphereComposition")?,
        population: require(data.population, "population")?,
        habitability_score: require(data.habitability_score, "habitabilityScore")?,
    };

    let params = ParamDelta {
        rotation_speed: Some(nonzero_or(data.rotation_speed, 0.05)),
        atmosphere_color: Some(
            lenient_color(data.atmosphere_color.as_deref()).unwrap_or(DEFAULT_ATMOSPHERE),
        ),
        city_light_color: Some(
            lenient_color(data.city_light_color.as_deref()).unwrap_or(DEFAULT_CITY_LIGHTS),
        ),
        city_light_intensity: Some(1.0),
        water_murkiness: Some(nonzero_or(data.water_murkiness, 0.0)),
        snow_level: Some(nonzero_or(data.snow_level, 0.0)),
        ..Default::default()
    };

    Ok((lore, params))
}

/// Parse a catastrophic-event response.
pub fn parse_disaster(json: &str) -> Result<(LoreDelta, ParamDelta), ContentError> {
    let data: EventResponse = serde_json::from_str(json)?;
    let title = require(data.event_title, "eventTitle")?;
    let description = require(data.new_description, "newDescription")?;

    let lore = LoreDelta {
        description: Some(format!("[EVENT: {title}] {description}")),
        habitability_score: data.habitability_score,
        ..Default::default()
    };
    let params = ParamDelta {
        atmosphere_color: lenient_color(data.atmosphere_color.as_deref()),
        water_murkiness: data.water_murkiness,
        snow_level: data.snow_level,
        city_light_intensity: Some(data.city_light_intensity.unwrap_or(0.0)),
        city_light_color: Some(
            lenient_color(data.city_light_color.as_deref()).unwrap_or(DISASTER_CITY_LIGHTS),
        ),
        ..Default::default()
    };
    Ok((lore, params))
}

/// Parse a civilization time-skip response.
pub fn parse_evolve(json: &str, years: u32) -> Result<(LoreDelta, ParamDelta), ContentError> {
    let data: EventResponse = serde_json::from_str(json)?;
    let description = require(data.new_description, "newDescription")?;

    let lore = LoreDelta {
        description: Some(format!("[YEAR +{years}] {description}")),
        civilization_type: Some("Evolved State".into()),
        population: Some("Unknown".into()),
        habitability_score: data.habitability_score,
    };
    let params = ParamDelta {
        city_light_color: lenient_color(data.city_light_color.as_deref()),
        city_light_intensity: data.city_light_intensity,
        atmosphere_color: lenient_color(data.atmosphere_color.as_deref()),
        ..Default::default()
    };
    Ok((lore, params))
}

/// Parse a terraforming challenge. The returned challenge is active and unsolved.
pub fn parse_challenge(json: &str) -> Result<ChallengeTarget, ContentError> {
    let data: ChallengeResponse = serde_json::from_str(json)?;
    Ok(ChallengeTarget {
        active: true,
        description: require(data.description, "description")?,
        target_stats: TargetStats {
            habitability_score: Some(require(data.target_habitability, "targetHabitability")?),
            cloud_density: data.target_cloud_density,
        },
        success: false,
    })
}

/// Parse a location report. Never fails: anything unusable becomes "Signal Lost".
pub fn parse_poi(json: &str, u: f32, v: f32) -> PoiReport {
    match serde_json::from_str::<PoiResponse>(json) {
        Ok(PoiResponse {
            title: Some(title),
            description: Some(description),
        }) => PoiReport {
            title,
            description,
            u,
            v,
        },
        Ok(_) => {
            log::warn!("location report missing title or description");
            PoiReport::signal_lost(u, v)
        }
        Err(e) => {
            log::warn!("location report unreadable: {e}");
            PoiReport::signal_lost(u, v)
        }
    }
}

/// Parse a synthesized texture into a `data:` URL usable as a texture source.
/// `Ok(None)` means the service produced no image and the default stays.
pub fn parse_texture(json: &str) -> Result<Option<String>, ContentError> {
    let data: TextureResponse = serde_json::from_str(json)?;
    let Some(bytes) = data.image_bytes.filter(|b| !b.is_empty()) else {
        return Ok(None);
    };
    let mime = data.mime_type.unwrap_or_else(|| "image/png".into());
    Ok(Some(format!("data:{mime};base64,{bytes}")))
}
