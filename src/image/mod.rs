//! Rasterising barcodes and moving them through PNG bytes.

mod codec;
mod paint;

pub use codec::{CodecError, decode_png, encode_png, pixels_per_meter, write_png};
pub use paint::{
    BarcodeImageOptions, GLYPH_HEIGHT, GLYPH_WIDTH, RenderError, render_barcode_image,
};
