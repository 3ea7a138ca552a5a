use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use thiserror::Error;

const METERS_PER_INCH: f64 = 0.0254;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("failed to decode PNG: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Physical resolution as stored in a PNG `pHYs` chunk.
pub fn pixels_per_meter(dpi: u32) -> u32 {
    (dpi as f64 / METERS_PER_INCH).round() as u32
}

/// Encode an RGB raster as PNG bytes, tagging both axes with `dpi`.
pub fn encode_png(image: &RgbImage, dpi: u32) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let ppm = pixels_per_meter(dpi);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
        writer.finish()?;
    }
    Ok(bytes)
}

pub fn decode_png(bytes: &[u8]) -> Result<RgbImage, CodecError> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    Ok(decoded.to_rgb8())
}

pub fn write_png(image: &RgbImage, path: &Path, dpi: u32) -> Result<(), CodecError> {
    let bytes = encode_png(image, dpi)?;
    fs::write(path, bytes).map_err(|source| CodecError::Write {
        path: path.to_path_buf(),
        source,
    })
}
