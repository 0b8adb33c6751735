pub mod camera;
pub mod error;
pub mod materials;
pub mod mesh;
pub mod noise_texture;
pub mod renderer;
pub mod satellites;
pub mod shaders;
pub mod texture;
pub mod texture_cache;
pub mod uniforms;

pub use camera::OrbitCamera;
pub use error::TextureError;
pub use materials::{MaterialEngine, MeshTransforms, SyncReport};
pub use mesh::{pick_uv, Ray, SphereMesh};
pub use noise_texture::CityNoiseTexture;
pub use renderer::{CameraUniforms, PlanetRenderer};
pub use satellites::{starfield, SatelliteRing};
pub use shaders::{registry, ProgramDescriptor, ProgramKind};
pub use texture::{decode, DecodedImage, GpuTexture};
pub use texture_cache::{Completion, LoadTarget, LoadTicket, SlotMap, SwapOutcome, TextureCache, TextureSlot};
pub use uniforms::{TextureId, UniformValue};
