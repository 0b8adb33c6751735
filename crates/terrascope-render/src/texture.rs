use image::imageops::FilterType;

use crate::error::TextureError;

/// RGBA8 pixels decoded on the CPU, ready to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    pub fn solid(color: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: color.to_vec(),
        }
    }
}

/// Decode PNG or JPEG bytes. Images with a side longer than `max_dimension`
/// are scaled down to fit, keeping their aspect ratio.
pub fn decode(bytes: &[u8], max_dimension: u32) -> Result<DecodedImage, TextureError> {
    if bytes.is_empty() {
        return Err(TextureError::Empty);
    }
    let mut img =
        image::load_from_memory(bytes).map_err(|e| TextureError::Decode(e.to_string()))?;
    if img.width() > max_dimension || img.height() > max_dimension {
        if max_dimension == 0 {
            return Err(TextureError::TooLarge {
                width: img.width(),
                height: img.height(),
                max: max_dimension,
            });
        }
        log::debug!(
            "Scaling {}x{} texture to fit {max_dimension}",
            img.width(),
            img.height()
        );
        img = img.resize(max_dimension, max_dimension, FilterType::Triangle);
    }
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::Empty);
    }
    Ok(DecodedImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

/// Reject pixel data the device could not hold or that does not match its
/// stated size.
pub fn check_upload(width: u32, height: u32, len: usize, max: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::Empty);
    }
    if width > max || height > max {
        return Err(TextureError::TooLarge { width, height, max });
    }
    if len != width as usize * height as usize * 4 {
        return Err(TextureError::Decode(format!(
            "{len} bytes for a {width}x{height} RGBA image"
        )));
    }
    Ok(())
}

/// A sampled 2D texture and its default view.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl GpuTexture {
    /// Upload decoded pixels. Color imagery is sRGB; masks, normals and
    /// noise are linear data.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &DecodedImage,
        srgb: bool,
    ) -> Result<Self, TextureError> {
        check_upload(
            image.width,
            image.height,
            image.rgba.len(),
            device.limits().max_texture_dimension_2d,
        )?;
        Ok(Self::from_rgba(device, queue, label, image.width, image.height, &image.rgba, srgb))
    }

    /// 1x1 texture of one color.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        color: [u8; 4],
        srgb: bool,
    ) -> Self {
        Self::from_rgba(device, queue, label, 1, 1, &color, srgb)
    }

    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
        srgb: bool,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let format = if srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([x as u8, y as u8, 7, 255])
        });
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let decoded = decode(&png_bytes(3, 2), 8192).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.rgba.len(), 3 * 2 * 4);
        assert_eq!(&decoded.rgba[4..8], &[1, 0, 7, 255]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode(&[], 8192), Err(TextureError::Empty)));
        assert!(matches!(
            decode(b"<html>not found</html>", 8192),
            Err(TextureError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_scales_oversize_image() {
        let decoded = decode(&png_bytes(40, 10), 16).unwrap();
        assert_eq!((decoded.width, decoded.height), (16, 4));
        assert_eq!(decoded.rgba.len(), 16 * 4 * 4);

        let tall = decode(&png_bytes(8, 32), 16).unwrap();
        assert_eq!((tall.width, tall.height), (4, 16));

        let fits = decode(&png_bytes(16, 16), 16).unwrap();
        assert_eq!((fits.width, fits.height), (16, 16));

        assert!(matches!(
            decode(&png_bytes(2, 2), 0),
            Err(TextureError::TooLarge { max: 0, .. })
        ));
    }

    #[test]
    fn test_check_upload_limits() {
        assert!(check_upload(16, 16, 16 * 16 * 4, 16).is_ok());
        assert!(matches!(
            check_upload(17, 4, 17 * 4 * 4, 16),
            Err(TextureError::TooLarge { width: 17, height: 4, max: 16 })
        ));
        assert!(matches!(check_upload(0, 4, 0, 16), Err(TextureError::Empty)));
        assert!(matches!(
            check_upload(2, 2, 12, 16),
            Err(TextureError::Decode(_))
        ));
    }

    #[test]
    fn test_solid_image() {
        let img = DecodedImage::solid([1, 2, 3, 4]);
        assert_eq!(img.rgba, vec![1, 2, 3, 4]);
        assert_eq!((img.width, img.height), (1, 1));
    }
}
