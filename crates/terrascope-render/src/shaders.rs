//! Static registry of the three planet programs and their uniform contracts.
//!
//! Pure data. Nothing here changes at runtime.

use crate::uniforms::{TextureId, UniformValue};

const GLOBALS_WGSL: &str = include_str!("../../../shaders/common/globals.wgsl");
const NOISE_WGSL: &str = include_str!("../../../shaders/common/noise.wgsl");
const SPHERE_VS_WGSL: &str = include_str!("../../../shaders/planet/sphere.wgsl");
const SURFACE_FS_WGSL: &str = include_str!("../../../shaders/planet/surface.wgsl");
const CLOUD_FS_WGSL: &str = include_str!("../../../shaders/planet/cloud.wgsl");
const ATMOSPHERE_FS_WGSL: &str = include_str!("../../../shaders/planet/atmosphere.wgsl");
const POINTS_WGSL: &str = include_str!("../../../shaders/planet/points.wgsl");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    Surface,
    Cloud,
    Atmosphere,
}

impl ProgramKind {
    pub const ALL: [ProgramKind; 3] = [
        ProgramKind::Surface,
        ProgramKind::Cloud,
        ProgramKind::Atmosphere,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProgramKind::Surface => "surface",
            ProgramKind::Cloud => "cloud",
            ProgramKind::Atmosphere => "atmosphere",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Float,
    Int,
    Vec3,
    Texture2d,
}

/// One declared uniform: name, type and the value a fresh material starts with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformDecl {
    pub name: &'static str,
    pub ty: UniformType,
    pub default: UniformValue,
}

const fn float(name: &'static str, v: f32) -> UniformDecl {
    UniformDecl {
        name,
        ty: UniformType::Float,
        default: UniformValue::Float(v),
    }
}

const fn int(name: &'static str, v: i32) -> UniformDecl {
    UniformDecl {
        name,
        ty: UniformType::Int,
        default: UniformValue::Int(v),
    }
}

const fn vec3(name: &'static str, v: [f32; 3]) -> UniformDecl {
    UniformDecl {
        name,
        ty: UniformType::Vec3,
        default: UniformValue::Vec3(v),
    }
}

const fn texture(name: &'static str) -> UniformDecl {
    UniformDecl {
        name,
        ty: UniformType::Texture2d,
        default: UniformValue::Texture(TextureId::NONE),
    }
}

/// Uniform names, shared with the engine and the GPU packers.
pub mod names {
    pub const TIME: &str = "time";
    pub const SUN_DIRECTION: &str = "sun_direction";
    pub const SUN_COLOR: &str = "sun_color";
    pub const MODE: &str = "mode";
    pub const SNOW_LEVEL: &str = "snow_level";
    pub const WATER_MURKINESS: &str = "water_murkiness";
    pub const CITY_COLOR: &str = "city_color";
    pub const CITY_INTENSITY: &str = "city_intensity";
    pub const CLOUD_DENSITY: &str = "cloud_density";
    pub const ATMOSPHERE_COLOR: &str = "atmosphere_color";
    pub const DAY_TEXTURE: &str = "day_texture";
    pub const SPECULAR_TEXTURE: &str = "specular_texture";
    pub const NORMAL_MAP: &str = "normal_map";
    pub const CITY_NOISE: &str = "city_noise";
    pub const CLOUD_TEXTURE: &str = "cloud_texture";
}

const SURFACE_UNIFORMS: &[UniformDecl] = &[
    float(names::TIME, 0.0),
    vec3(names::SUN_DIRECTION, [0.0, 0.0, 1.0]),
    vec3(names::SUN_COLOR, [1.0, 1.0, 1.0]),
    int(names::MODE, 0),
    float(names::SNOW_LEVEL, 0.0),
    float(names::WATER_MURKINESS, 0.0),
    vec3(names::CITY_COLOR, [1.0, 1.0, 1.0]),
    float(names::CITY_INTENSITY, 1.0),
    texture(names::DAY_TEXTURE),
    texture(names::SPECULAR_TEXTURE),
    texture(names::NORMAL_MAP),
    texture(names::CITY_NOISE),
];

const CLOUD_UNIFORMS: &[UniformDecl] = &[
    float(names::TIME, 0.0),
    vec3(names::SUN_DIRECTION, [0.0, 0.0, 1.0]),
    vec3(names::SUN_COLOR, [1.0, 1.0, 1.0]),
    float(names::CLOUD_DENSITY, 0.5),
    texture(names::CLOUD_TEXTURE),
];

const ATMOSPHERE_UNIFORMS: &[UniformDecl] = &[
    vec3(names::ATMOSPHERE_COLOR, [1.0, 1.0, 1.0]),
    vec3(names::SUN_COLOR, [1.0, 1.0, 1.0]),
];

/// Immutable description of one shader program.
#[derive(Debug, Clone, Copy)]
pub struct ProgramDescriptor {
    pub kind: ProgramKind,
    pub vertex_source: &'static str,
    pub fragment_source: &'static str,
    pub uniforms: &'static [UniformDecl],
    /// Whether the shared noise library is composed into the module.
    pub uses_noise: bool,
}

static SURFACE: ProgramDescriptor = ProgramDescriptor {
    kind: ProgramKind::Surface,
    vertex_source: SPHERE_VS_WGSL,
    fragment_source: SURFACE_FS_WGSL,
    uniforms: SURFACE_UNIFORMS,
    uses_noise: true,
};

static CLOUD: ProgramDescriptor = ProgramDescriptor {
    kind: ProgramKind::Cloud,
    vertex_source: SPHERE_VS_WGSL,
    fragment_source: CLOUD_FS_WGSL,
    uniforms: CLOUD_UNIFORMS,
    uses_noise: true,
};

static ATMOSPHERE: ProgramDescriptor = ProgramDescriptor {
    kind: ProgramKind::Atmosphere,
    vertex_source: SPHERE_VS_WGSL,
    fragment_source: ATMOSPHERE_FS_WGSL,
    uniforms: ATMOSPHERE_UNIFORMS,
    uses_noise: false,
};

/// Descriptor for a program.
pub fn registry(kind: ProgramKind) -> &'static ProgramDescriptor {
    match kind {
        ProgramKind::Surface => &SURFACE,
        ProgramKind::Cloud => &CLOUD,
        ProgramKind::Atmosphere => &ATMOSPHERE,
    }
}

impl ProgramDescriptor {
    /// Full WGSL module: shared bindings, vertex stage, optional noise library, fragment stage.
    pub fn module_source(&self) -> String {
        let noise = if self.uses_noise { NOISE_WGSL } else { "" };
        format!(
            "{GLOBALS_WGSL}\n{}\n{noise}\n{}",
            self.vertex_source, self.fragment_source
        )
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformDecl> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    /// Declared sampler uniforms, in binding order.
    pub fn texture_uniforms(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.uniforms
            .iter()
            .filter(|u| u.ty == UniformType::Texture2d)
            .map(|u| u.name)
    }
}

/// WGSL module for the point sprites (satellites and stars).
pub fn points_module_source() -> String {
    format!("{GLOBALS_WGSL}\n{POINTS_WGSL}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_only_in_surface_and_cloud() {
        let noise_marker = "fn snoise(";
        assert!(registry(ProgramKind::Surface)
            .module_source()
            .contains(noise_marker));
        assert!(registry(ProgramKind::Cloud)
            .module_source()
            .contains(noise_marker));
        assert!(!registry(ProgramKind::Atmosphere)
            .module_source()
            .contains(noise_marker));
    }

    #[test]
    fn test_every_module_has_both_stages() {
        for kind in ProgramKind::ALL {
            let src = registry(kind).module_source();
            assert!(src.contains("fn vs_main("), "{kind:?} vertex");
            assert!(src.contains("fn fs_main("), "{kind:?} fragment");
            assert!(src.contains("var<uniform> camera"), "{kind:?} globals");
        }
    }

    #[test]
    fn test_uniform_names_unique() {
        for kind in ProgramKind::ALL {
            let decls = registry(kind).uniforms;
            for (i, a) in decls.iter().enumerate() {
                assert!(
                    decls[i + 1..].iter().all(|b| b.name != a.name),
                    "duplicate {} in {kind:?}",
                    a.name
                );
            }
        }
    }

    #[test]
    fn test_texture_binding_order() {
        let surface: Vec<_> = registry(ProgramKind::Surface).texture_uniforms().collect();
        assert_eq!(
            surface,
            vec![
                names::DAY_TEXTURE,
                names::SPECULAR_TEXTURE,
                names::NORMAL_MAP,
                names::CITY_NOISE
            ]
        );
        assert_eq!(registry(ProgramKind::Atmosphere).texture_uniforms().count(), 0);
    }

    #[test]
    fn test_declared_types_match_defaults() {
        for kind in ProgramKind::ALL {
            for decl in registry(kind).uniforms {
                assert_eq!(decl.default.ty(), decl.ty, "{}", decl.name);
            }
        }
    }
}
