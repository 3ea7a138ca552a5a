//! Core domain primitives for barcode IDs, Code128 encoding, and grid layout.

pub mod encoding;
pub mod ids;
pub mod layout;

pub use encoding::{BarcodeEncoding, Code128Encoder, CodeSet, EncodeError, Symbol};
pub use ids::{BarcodeId, BarcodeRange, LABEL_DIGITS, RangeError};
pub use layout::{GridLayout, LayoutError};
