//! Core library for rendering sheets of sequential Code128 barcodes.

pub mod core;
pub mod image;
mod sheet;

pub use crate::core::{
    BarcodeEncoding, BarcodeId, BarcodeRange, Code128Encoder, CodeSet, EncodeError, GridLayout,
    LayoutError, RangeError, Symbol,
};
pub use crate::image::{BarcodeImageOptions, CodecError, RenderError, render_barcode_image};
pub use sheet::{
    BarcodeError, BarcodeRenderer, Code128Renderer, RenderedBarcode, RenderedBatch, SheetConfig,
    SheetError, SheetEvent, SheetSummary, compose_sheet, generate_sheet, render_batch,
};
