use thiserror::Error;

/// Failures while turning a texture source into a GPU resource.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Texture fetch failed: {0}")]
    Fetch(String),

    #[error("Texture decode failed: {0}")]
    Decode(String),

    #[error("Texture {width}x{height} exceeds the device limit of {max}")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("Texture has zero size")]
    Empty,
}
