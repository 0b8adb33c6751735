use crate::shaders::{names, UniformDecl, UniformType};

/// Identity of a loaded texture resource. `TextureId::NONE` means "nothing bound".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TextureId(pub u32);

impl TextureId {
    pub const NONE: TextureId = TextureId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3([f32; 3]),
    Texture(TextureId),
}

impl UniformValue {
    pub const fn ty(&self) -> UniformType {
        match self {
            UniformValue::Float(_) => UniformType::Float,
            UniformValue::Int(_) => UniformType::Int,
            UniformValue::Vec3(_) => UniformType::Vec3,
            UniformValue::Texture(_) => UniformType::Texture2d,
        }
    }
}

#[derive(Debug, Clone)]
struct UniformEntry {
    name: &'static str,
    value: UniformValue,
}

/// Name to value mapping owned by one material.
///
/// Every accepted `set` counts as a write and bumps the revision, which is
/// what the GPU side watches to decide whether to re-upload.
#[derive(Debug, Clone)]
pub struct UniformBag {
    entries: Vec<UniformEntry>,
    revision: u64,
    writes: u64,
}

impl UniformBag {
    pub fn from_decls(decls: &[UniformDecl]) -> Self {
        Self {
            entries: decls
                .iter()
                .map(|d| UniformEntry {
                    name: d.name,
                    value: d.default,
                })
                .collect(),
            revision: 0,
            writes: 0,
        }
    }

    /// Overwrite a declared uniform. Unknown names and type mismatches are
    /// rejected and leave the bag untouched.
    pub fn set(&mut self, name: &str, value: UniformValue) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) else {
            log::warn!("write to undeclared uniform '{name}' ignored");
            return false;
        };
        if entry.value.ty() != value.ty() {
            log::warn!("type mismatch writing uniform '{name}': {value:?}");
            return false;
        }
        entry.value = value;
        self.revision += 1;
        self.writes += 1;
        true
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value)
    }

    pub fn float(&self, name: &str) -> f32 {
        match self.get(name) {
            Some(UniformValue::Float(v)) => v,
            _ => 0.0,
        }
    }

    pub fn int(&self, name: &str) -> i32 {
        match self.get(name) {
            Some(UniformValue::Int(v)) => v,
            _ => 0,
        }
    }

    pub fn vec3(&self, name: &str) -> [f32; 3] {
        match self.get(name) {
            Some(UniformValue::Vec3(v)) => v,
            _ => [0.0; 3],
        }
    }

    pub fn texture(&self, name: &str) -> TextureId {
        match self.get(name) {
            Some(UniformValue::Texture(id)) => id,
            _ => TextureId::NONE,
        }
    }

    /// Increases on every accepted write.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub(crate) fn reset_write_count(&mut self) {
        self.writes = 0;
    }
}

/// GPU-uploadable surface uniforms. Must match SurfaceUniforms in surface.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceUniforms {
    pub sun_direction: [f32; 3],
    pub time: f32,
    pub sun_color: [f32; 3],
    pub snow_level: f32,
    pub city_color: [f32; 3],
    pub water_murkiness: f32,
    pub city_intensity: f32,
    pub mode: i32,
    pub _pad: [f32; 2],
}

impl SurfaceUniforms {
    pub fn from_bag(bag: &UniformBag) -> Self {
        Self {
            sun_direction: bag.vec3(names::SUN_DIRECTION),
            time: bag.float(names::TIME),
            sun_color: bag.vec3(names::SUN_COLOR),
            snow_level: bag.float(names::SNOW_LEVEL),
            city_color: bag.vec3(names::CITY_COLOR),
            water_murkiness: bag.float(names::WATER_MURKINESS),
            city_intensity: bag.float(names::CITY_INTENSITY),
            mode: bag.int(names::MODE),
            _pad: [0.0; 2],
        }
    }
}

/// GPU-uploadable cloud uniforms. Must match CloudUniforms in cloud.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CloudUniforms {
    pub sun_direction: [f32; 3],
    pub time: f32,
    pub sun_color: [f32; 3],
    pub cloud_density: f32,
}

impl CloudUniforms {
    pub fn from_bag(bag: &UniformBag) -> Self {
        Self {
            sun_direction: bag.vec3(names::SUN_DIRECTION),
            time: bag.float(names::TIME),
            sun_color: bag.vec3(names::SUN_COLOR),
            cloud_density: bag.float(names::CLOUD_DENSITY),
        }
    }
}

/// GPU-uploadable atmosphere uniforms. Must match AtmosphereUniforms in atmosphere.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AtmosphereUniforms {
    pub atmosphere_color: [f32; 3],
    pub _pad0: f32,
    pub sun_color: [f32; 3],
    pub _pad1: f32,
}

impl AtmosphereUniforms {
    pub fn from_bag(bag: &UniformBag) -> Self {
        Self {
            atmosphere_color: bag.vec3(names::ATMOSPHERE_COLOR),
            _pad0: 0.0,
            sun_color: bag.vec3(names::SUN_COLOR),
            _pad1: 0.0,
        }
    }
}

/// GPU-uploadable point sprite style. Must match PointStyle in points.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointStyle {
    pub color: [f32; 4],
    pub size: f32,
    pub _pad: [f32; 3],
}

/// Per-mesh model transform. Must match Model in globals.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::{registry, ProgramKind};

    #[test]
    fn test_uniform_struct_sizes() {
        assert_eq!(std::mem::size_of::<SurfaceUniforms>(), 64);
        assert_eq!(std::mem::size_of::<CloudUniforms>(), 32);
        assert_eq!(std::mem::size_of::<AtmosphereUniforms>(), 32);
        assert_eq!(std::mem::size_of::<PointStyle>(), 32);
        assert_eq!(std::mem::size_of::<ModelUniforms>(), 64);
    }

    #[test]
    fn test_bag_starts_at_defaults() {
        let bag = UniformBag::from_decls(registry(ProgramKind::Cloud).uniforms);
        assert_eq!(bag.float(names::CLOUD_DENSITY), 0.5);
        assert_eq!(bag.texture(names::CLOUD_TEXTURE), TextureId::NONE);
        assert_eq!(bag.writes(), 0);
    }

    #[test]
    fn test_bag_rejects_unknown_and_mistyped() {
        let mut bag = UniformBag::from_decls(registry(ProgramKind::Atmosphere).uniforms);
        assert!(!bag.set(names::TIME, UniformValue::Float(1.0)));
        assert!(!bag.set(names::SUN_COLOR, UniformValue::Float(1.0)));
        assert_eq!(bag.revision(), 0);
        assert!(bag.set(names::SUN_COLOR, UniformValue::Vec3([1.0, 0.4, 0.3])));
        assert_eq!(bag.vec3(names::SUN_COLOR), [1.0, 0.4, 0.3]);
        assert_eq!(bag.revision(), 1);
    }

    #[test]
    fn test_surface_pack() {
        let mut bag = UniformBag::from_decls(registry(ProgramKind::Surface).uniforms);
        bag.set(names::MODE, UniformValue::Int(2));
        bag.set(names::SNOW_LEVEL, UniformValue::Float(0.3));
        let packed = SurfaceUniforms::from_bag(&bag);
        assert_eq!(packed.mode, 2);
        assert_eq!(packed.snow_level, 0.3);
        assert_eq!(packed.city_intensity, 1.0);
    }
}
