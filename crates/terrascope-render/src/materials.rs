//! Material update engine.
//!
//! Owns the surface, cloud and atmosphere materials and decides, for each
//! parameter revision, which mutation path to take:
//!
//! * reconstruction, only when a material's dependency key changes (sun
//!   color, and for the surface the identity of the city-noise texture);
//! * in-place uniform writes for everything else, and only for values that
//!   actually changed since the last sync;
//! * per-frame writes restricted to the clock uniform and the spin angles.

use glam::Mat4;
use terrascope_core::constants::{ATMOSPHERE_SCALE, CLOUD_SPIN_FACTOR, SURFACE_SPIN_FACTOR};
use terrascope_core::{DerivedInputs, VisualParams};

use crate::shaders::{names, registry, ProgramKind};
use crate::texture_cache::SlotMap;
use crate::uniforms::{TextureId, UniformBag, UniformValue};

/// Inputs baked into a material when it is built. A different key means the
/// material must be rebuilt; anything outside the key is written in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DependencyKey {
    sun_color: [u32; 3],
    noise: Option<TextureId>,
}

impl DependencyKey {
    fn for_kind(kind: ProgramKind, inputs: &DerivedInputs, noise: TextureId) -> Option<Self> {
        let sun_color = inputs.sun_color.map(f32::to_bits);
        match kind {
            ProgramKind::Surface => Some(Self {
                sun_color,
                noise: Some(noise),
            }),
            ProgramKind::Cloud => Some(Self {
                sun_color,
                noise: None,
            }),
            // Built once, never rebuilt.
            ProgramKind::Atmosphere => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    kind: ProgramKind,
    key: Option<DependencyKey>,
    bag: UniformBag,
    /// Bumped on every (re)construction. The GPU side rebuilds its
    /// resources when this changes.
    generation: u64,
}

impl Material {
    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    pub fn uniforms(&self) -> &UniformBag {
        &self.bag
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn key(&self) -> Option<DependencyKey> {
        self.key
    }

    /// Textures bound to this material, in declaration order.
    pub fn bound_textures(&self) -> Vec<TextureId> {
        registry(self.kind)
            .texture_uniforms()
            .map(|name| self.bag.texture(name))
            .collect()
    }

    fn set(&mut self, name: &str, value: UniformValue) {
        self.bag.set(name, value);
    }
}

/// Orientation of the planet group and its spinning meshes.
#[derive(Debug, Clone)]
pub struct MeshTransforms {
    tilt: f32,
    tilt_matrix: Mat4,
    tilt_updates: u64,
    surface_spin: f32,
    cloud_spin: f32,
}

impl MeshTransforms {
    fn new(tilt: f32) -> Self {
        Self {
            tilt,
            tilt_matrix: Mat4::from_rotation_z(tilt),
            tilt_updates: 1,
            surface_spin: 0.0,
            cloud_spin: 0.0,
        }
    }

    fn set_tilt(&mut self, tilt: f32) {
        self.tilt = tilt;
        self.tilt_matrix = Mat4::from_rotation_z(tilt);
        self.tilt_updates += 1;
    }

    /// Roll of the whole planet group, shared by every child mesh.
    pub fn group(&self) -> Mat4 {
        self.tilt_matrix
    }

    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    /// How many times the tilt matrix has been rebuilt.
    pub fn tilt_updates(&self) -> u64 {
        self.tilt_updates
    }

    pub fn surface_spin(&self) -> f32 {
        self.surface_spin
    }

    pub fn cloud_spin(&self) -> f32 {
        self.cloud_spin
    }

    pub fn surface_model(&self) -> Mat4 {
        self.tilt_matrix * Mat4::from_rotation_y(self.surface_spin)
    }

    pub fn cloud_model(&self) -> Mat4 {
        self.tilt_matrix * Mat4::from_rotation_y(self.cloud_spin)
    }

    pub fn atmosphere_model(&self) -> Mat4 {
        self.tilt_matrix * Mat4::from_scale(glam::Vec3::splat(ATMOSPHERE_SCALE))
    }
}

/// What one `sync` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub reconstructed: Vec<ProgramKind>,
    pub uniform_writes: u64,
    pub tilt_changed: bool,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.reconstructed.is_empty() && self.uniform_writes == 0 && !self.tilt_changed
    }
}

pub struct MaterialEngine {
    surface: Material,
    cloud: Material,
    atmosphere: Material,
    last: DerivedInputs,
    textures: SlotMap<TextureId>,
    noise: TextureId,
    transforms: MeshTransforms,
    elapsed: f32,
    constructions: u64,
    /// Writes made by materials that have since been rebuilt.
    retired_writes: u64,
}

impl MaterialEngine {
    /// Build all three materials from the initial parameters.
    pub fn new(params: &VisualParams, textures: SlotMap<TextureId>, noise: TextureId) -> Self {
        let inputs = DerivedInputs::from_params(params);
        let mut engine = Self {
            surface: blank(ProgramKind::Surface),
            cloud: blank(ProgramKind::Cloud),
            atmosphere: blank(ProgramKind::Atmosphere),
            last: inputs,
            textures,
            noise,
            transforms: MeshTransforms::new(inputs.tilt),
            elapsed: 0.0,
            constructions: 0,
            retired_writes: 0,
        };
        for kind in ProgramKind::ALL {
            engine.construct(kind);
        }
        engine
    }

    pub fn material(&self, kind: ProgramKind) -> &Material {
        match kind {
            ProgramKind::Surface => &self.surface,
            ProgramKind::Cloud => &self.cloud,
            ProgramKind::Atmosphere => &self.atmosphere,
        }
    }

    fn material_mut(&mut self, kind: ProgramKind) -> &mut Material {
        match kind {
            ProgramKind::Surface => &mut self.surface,
            ProgramKind::Cloud => &mut self.cloud,
            ProgramKind::Atmosphere => &mut self.atmosphere,
        }
    }

    pub fn transforms(&self) -> &MeshTransforms {
        &self.transforms
    }

    /// Total material constructions, including the initial three.
    pub fn construction_count(&self) -> u64 {
        self.constructions
    }

    /// Sum of uniform writes across all materials since startup.
    pub fn uniform_writes(&self) -> u64 {
        self.retired_writes
            + ProgramKind::ALL
                .iter()
                .map(|&k| self.material(k).bag.writes())
                .sum::<u64>()
    }

    pub fn rotation_speed(&self) -> f32 {
        self.last.rotation_speed
    }

    /// Swap the procedural noise texture. The surface is rebuilt on the next sync.
    pub fn set_noise_texture(&mut self, noise: TextureId) {
        self.noise = noise;
    }

    /// Bring all materials in line with a parameter revision and the current
    /// texture slots, using the cheapest sufficient mutation.
    pub fn sync(&mut self, params: &VisualParams, textures: SlotMap<TextureId>) -> SyncReport {
        let writes_before = self.uniform_writes();
        let next = DerivedInputs::from_params(params);
        let prev = self.last;
        self.last = next;
        self.textures = textures;

        let mut report = SyncReport::default();
        for kind in ProgramKind::ALL {
            let key = DependencyKey::for_kind(kind, &next, self.noise);
            if key != self.material(kind).key {
                self.construct(kind);
                report.reconstructed.push(kind);
            }
        }
        let rebuilt = |k: ProgramKind| report.reconstructed.contains(&k);
        let (surface_fresh, cloud_fresh, atmosphere_fresh) = (
            rebuilt(ProgramKind::Surface),
            rebuilt(ProgramKind::Cloud),
            rebuilt(ProgramKind::Atmosphere),
        );

        // Surface and cloud carry the sun color in their key, so only the
        // atmosphere takes it in place.
        if !atmosphere_fresh && next.sun_color != prev.sun_color {
            self.atmosphere
                .set(names::SUN_COLOR, UniformValue::Vec3(next.sun_color));
        }
        if next.sun_direction != prev.sun_direction {
            let v = UniformValue::Vec3(next.sun_direction);
            for (fresh, m) in [(surface_fresh, &mut self.surface), (cloud_fresh, &mut self.cloud)] {
                if !fresh {
                    m.set(names::SUN_DIRECTION, v);
                }
            }
        }

        if !surface_fresh {
            let s = &mut self.surface;
            if next.mode != prev.mode {
                s.set(names::MODE, UniformValue::Int(next.mode));
            }
            if next.snow_level != prev.snow_level {
                s.set(names::SNOW_LEVEL, UniformValue::Float(next.snow_level));
            }
            if next.water_murkiness != prev.water_murkiness {
                s.set(names::WATER_MURKINESS, UniformValue::Float(next.water_murkiness));
            }
            if next.city_light_color != prev.city_light_color {
                s.set(names::CITY_COLOR, UniformValue::Vec3(next.city_light_color));
            }
            if next.city_light_intensity != prev.city_light_intensity {
                s.set(names::CITY_INTENSITY, UniformValue::Float(next.city_light_intensity));
            }
            for (name, id) in [
                (names::DAY_TEXTURE, textures.day),
                (names::SPECULAR_TEXTURE, textures.specular),
                (names::NORMAL_MAP, textures.normal),
            ] {
                if s.bag.texture(name) != id {
                    s.set(name, UniformValue::Texture(id));
                }
            }
        }

        if !cloud_fresh {
            let c = &mut self.cloud;
            if next.cloud_density != prev.cloud_density {
                c.set(names::CLOUD_DENSITY, UniformValue::Float(next.cloud_density));
            }
            if c.bag.texture(names::CLOUD_TEXTURE) != textures.cloud {
                c.set(names::CLOUD_TEXTURE, UniformValue::Texture(textures.cloud));
            }
        }

        if !atmosphere_fresh && next.atmosphere_color != prev.atmosphere_color {
            self.atmosphere.set(
                names::ATMOSPHERE_COLOR,
                UniformValue::Vec3(next.atmosphere_color),
            );
        }

        if next.tilt != self.transforms.tilt {
            self.transforms.set_tilt(next.tilt);
            report.tilt_changed = true;
        }

        report.uniform_writes = self.uniform_writes() - writes_before;
        report
    }

    /// Per-frame mutation: clock uniform on surface and clouds, plus spin.
    /// Clouds turn at 1.2x the surface rate.
    pub fn advance_frame(&mut self, elapsed: f32, dt: f32) {
        self.elapsed = elapsed;
        self.surface.set(names::TIME, UniformValue::Float(elapsed));
        self.cloud.set(names::TIME, UniformValue::Float(elapsed));

        let speed = self.last.rotation_speed;
        self.transforms.surface_spin += speed * dt * SURFACE_SPIN_FACTOR;
        self.transforms.cloud_spin += speed * dt * CLOUD_SPIN_FACTOR;
    }

    /// Build a material from scratch and load every current input into it.
    fn construct(&mut self, kind: ProgramKind) {
        let inputs = self.last;
        let textures = self.textures;
        let noise = self.noise;
        let time = self.elapsed;
        let previous_generation = self.material(kind).generation;

        let mut m = blank(kind);
        m.key = DependencyKey::for_kind(kind, &inputs, noise);
        m.generation = previous_generation + 1;
        let v3 = UniformValue::Vec3;
        match kind {
            ProgramKind::Surface => {
                m.set(names::TIME, UniformValue::Float(time));
                m.set(names::SUN_DIRECTION, v3(inputs.sun_direction));
                m.set(names::SUN_COLOR, v3(inputs.sun_color));
                m.set(names::MODE, UniformValue::Int(inputs.mode));
                m.set(names::SNOW_LEVEL, UniformValue::Float(inputs.snow_level));
                m.set(names::WATER_MURKINESS, UniformValue::Float(inputs.water_murkiness));
                m.set(names::CITY_COLOR, v3(inputs.city_light_color));
                m.set(names::CITY_INTENSITY, UniformValue::Float(inputs.city_light_intensity));
                m.set(names::DAY_TEXTURE, UniformValue::Texture(textures.day));
                m.set(names::SPECULAR_TEXTURE, UniformValue::Texture(textures.specular));
                m.set(names::NORMAL_MAP, UniformValue::Texture(textures.normal));
                m.set(names::CITY_NOISE, UniformValue::Texture(noise));
            }
            ProgramKind::Cloud => {
                m.set(names::TIME, UniformValue::Float(time));
                m.set(names::SUN_DIRECTION, v3(inputs.sun_direction));
                m.set(names::SUN_COLOR, v3(inputs.sun_color));
                m.set(names::CLOUD_DENSITY, UniformValue::Float(inputs.cloud_density));
                m.set(names::CLOUD_TEXTURE, UniformValue::Texture(textures.cloud));
            }
            ProgramKind::Atmosphere => {
                m.set(names::ATMOSPHERE_COLOR, v3(inputs.atmosphere_color));
                m.set(names::SUN_COLOR, v3(inputs.sun_color));
            }
        }

        // Construction writes are not counted as in-place refreshes.
        m.bag.reset_write_count();
        self.constructions += 1;
        self.retired_writes += self.material(kind).bag.writes();
        log::debug!(
            "constructed {} material (generation {})",
            kind.label(),
            m.generation
        );
        *self.material_mut(kind) = m;
    }
}

fn blank(kind: ProgramKind) -> Material {
    Material {
        kind,
        key: None,
        bag: UniformBag::from_decls(registry(kind).uniforms),
        generation: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrascope_core::{DataLayer, ParamDelta, Rgb, SunType};

    fn textures() -> SlotMap<TextureId> {
        SlotMap {
            day: TextureId(10),
            specular: TextureId(11),
            normal: TextureId(12),
            cloud: TextureId(13),
        }
    }

    fn engine() -> (MaterialEngine, VisualParams) {
        let params = VisualParams::default();
        (MaterialEngine::new(&params, textures(), TextureId(99)), params)
    }

    #[test]
    fn test_initial_construction() {
        let (e, _) = engine();
        assert_eq!(e.construction_count(), 3);
        let surface = e.material(ProgramKind::Surface).uniforms();
        assert_eq!(surface.texture(names::CITY_NOISE), TextureId(99));
        assert_eq!(surface.texture(names::DAY_TEXTURE), TextureId(10));
        assert_eq!(surface.vec3(names::SUN_COLOR), [1.0, 0.95, 0.9]);
        assert_eq!(e.uniform_writes(), 0);
    }

    #[test]
    fn test_frequent_fields_never_reconstruct() {
        let (mut e, mut params) = engine();
        let deltas = [
            ParamDelta {
                cloud_density: Some(0.2),
                ..Default::default()
            },
            ParamDelta {
                snow_level: Some(0.7),
                water_murkiness: Some(0.4),
                ..Default::default()
            },
            ParamDelta {
                city_light_color: Some(Rgb::new(0.0, 1.0, 1.0)),
                city_light_intensity: Some(1.8),
                ..Default::default()
            },
            ParamDelta {
                data_layer: Some(DataLayer::Thermal),
                tilt: Some(0.9),
                ..Default::default()
            },
            ParamDelta {
                cloud_density: Some(0.9),
                snow_level: Some(0.0),
                water_murkiness: Some(1.0),
                city_light_intensity: Some(0.0),
                data_layer: Some(DataLayer::Vegetation),
                tilt: Some(-0.3),
                ..Default::default()
            },
        ];
        for delta in &deltas {
            params = params.apply(delta);
            let report = e.sync(&params, textures());
            assert!(report.reconstructed.is_empty(), "{delta:?}");
            assert!(report.uniform_writes > 0 || report.tilt_changed);
        }
        assert_eq!(e.construction_count(), 3);

        let s = e.material(ProgramKind::Surface).uniforms();
        assert_eq!(s.int(names::MODE), 3);
        assert_eq!(s.float(names::WATER_MURKINESS), 1.0);
        let c = e.material(ProgramKind::Cloud).uniforms();
        assert_eq!(c.float(names::CLOUD_DENSITY), 0.9);
        assert_eq!(e.transforms().tilt(), -0.3);
    }

    #[test]
    fn test_sun_type_rebuilds_surface_and_cloud() {
        let (mut e, params) = engine();
        let atmosphere_gen = e.material(ProgramKind::Atmosphere).generation();
        let red = params.apply(&ParamDelta {
            sun_type: Some(SunType::Red),
            ..Default::default()
        });
        let report = e.sync(&red, textures());
        assert_eq!(
            report.reconstructed,
            vec![ProgramKind::Surface, ProgramKind::Cloud]
        );
        assert_eq!(e.construction_count(), 5);
        // Only the atmosphere's sun color is written in place.
        assert_eq!(report.uniform_writes, 1);
        assert_eq!(e.material(ProgramKind::Atmosphere).generation(), atmosphere_gen);
        for kind in ProgramKind::ALL {
            assert_eq!(
                e.material(kind).uniforms().vec3(names::SUN_COLOR),
                [1.0, 0.4, 0.3]
            );
        }

        // Same sun again: nothing to rebuild.
        assert!(e.sync(&red, textures()).is_noop());
    }

    #[test]
    fn test_sun_and_atmosphere_change_together() {
        let (mut e, params) = engine();
        let next = params.apply(&ParamDelta {
            sun_type: Some(SunType::Blue),
            atmosphere_color: Some(Rgb::new(0.2, 1.0, 0.4)),
            cloud_density: Some(0.3),
            ..Default::default()
        });
        let report = e.sync(&next, textures());
        assert_eq!(
            report.reconstructed,
            vec![ProgramKind::Surface, ProgramKind::Cloud]
        );
        // Atmosphere color and sun color, both in place.
        assert_eq!(report.uniform_writes, 2);
        let a = e.material(ProgramKind::Atmosphere);
        assert_eq!(a.generation(), 1);
        assert_eq!(a.uniforms().vec3(names::ATMOSPHERE_COLOR), [0.2, 1.0, 0.4]);
        assert_eq!(a.uniforms().vec3(names::SUN_COLOR), [0.6, 0.8, 1.0]);
        // The rebuilt cloud picked up the new density at construction.
        let c = e.material(ProgramKind::Cloud);
        assert_eq!(c.generation(), 2);
        assert_eq!(c.uniforms().float(names::CLOUD_DENSITY), 0.3);
    }

    #[test]
    fn test_atmosphere_color_refresh() {
        let (mut e, params) = engine();
        let gen = e.material(ProgramKind::Atmosphere).generation();
        let next = params.apply(&ParamDelta {
            atmosphere_color: Some(Rgb::new(1.0, 0.0, 0.0)),
            ..Default::default()
        });
        let report = e.sync(&next, textures());
        assert_eq!(report.uniform_writes, 1);
        assert_eq!(e.material(ProgramKind::Atmosphere).generation(), gen);
        assert_eq!(
            e.material(ProgramKind::Atmosphere)
                .uniforms()
                .vec3(names::ATMOSPHERE_COLOR),
            [1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_unchanged_sync_writes_nothing() {
        let (mut e, params) = engine();
        let report = e.sync(&params, textures());
        assert!(report.is_noop());
    }

    #[test]
    fn test_texture_swap_is_uniform_write() {
        let (mut e, params) = engine();
        let mut t = textures();
        t.day = TextureId(20);
        t.cloud = TextureId(21);
        let report = e.sync(&params, t);
        assert!(report.reconstructed.is_empty());
        assert_eq!(report.uniform_writes, 2);
        assert_eq!(
            e.material(ProgramKind::Surface).bound_textures(),
            vec![TextureId(20), TextureId(11), TextureId(12), TextureId(99)]
        );
    }

    #[test]
    fn test_noise_change_rebuilds_surface_only() {
        let (mut e, params) = engine();
        e.set_noise_texture(TextureId(100));
        let report = e.sync(&params, textures());
        assert_eq!(report.reconstructed, vec![ProgramKind::Surface]);
        assert_eq!(e.construction_count(), 4);
        assert_eq!(e.material(ProgramKind::Surface).generation(), 2);
        assert_eq!(
            e.material(ProgramKind::Surface)
                .uniforms()
                .texture(names::CITY_NOISE),
            TextureId(100)
        );
    }

    #[test]
    fn test_frame_writes_only_time() {
        let (mut e, _) = engine();
        let before = e.uniform_writes();
        for i in 1..=10 {
            e.advance_frame(i as f32 / 60.0, 1.0 / 60.0);
        }
        assert_eq!(e.uniform_writes() - before, 20);
        assert_eq!(e.construction_count(), 3);
        assert_eq!(e.transforms().tilt_updates(), 1);
    }

    #[test]
    fn test_cloud_spin_ratio() {
        let (mut e, params) = engine();
        let fast = params.apply(&ParamDelta {
            rotation_speed: Some(3.7),
            ..Default::default()
        });
        e.sync(&fast, textures());
        for dt in [0.016, 0.033, 0.25, 1.0] {
            let (s0, c0) = (e.transforms().surface_spin(), e.transforms().cloud_spin());
            e.advance_frame(0.0, dt);
            let ds = e.transforms().surface_spin() - s0;
            let dc = e.transforms().cloud_spin() - c0;
            assert!((dc / ds - 1.2).abs() < 1e-4, "dt {dt}: {}", dc / ds);
        }
    }

    #[test]
    fn test_tilt_applied_once_per_change() {
        let (mut e, params) = engine();
        let tilted = params.apply(&ParamDelta {
            tilt: Some(0.2),
            ..Default::default()
        });
        assert!(e.sync(&tilted, textures()).tilt_changed);
        assert!(!e.sync(&tilted, textures()).tilt_changed);
        e.advance_frame(1.0, 0.5);
        assert_eq!(e.transforms().tilt_updates(), 2);
        let expected = Mat4::from_rotation_z(0.2);
        assert!(e.transforms().group().abs_diff_eq(expected, 1e-6));
    }
}
