use std::fmt;

use thiserror::Error;

/// Number of digits every label is padded to.
pub const LABEL_DIGITS: usize = 3;

/// Sequential identifier printed on (and encoded into) a single barcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BarcodeId(pub u32);

impl BarcodeId {
    /// Zero-padded decimal label, e.g. `7` → `"007"`.
    pub fn label(&self) -> String {
        format!("{:0width$}", self.0, width = LABEL_DIGITS)
    }
}

impl fmt::Display for BarcodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = LABEL_DIGITS)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("id range {first}..={last} is empty")]
    Empty { first: u32, last: u32 },
}

/// Inclusive range of IDs making up one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarcodeRange {
    pub first: u32,
    pub last: u32,
}

impl BarcodeRange {
    pub fn new(first: u32, last: u32) -> Result<Self, RangeError> {
        if first > last {
            return Err(RangeError::Empty { first, last });
        }
        Ok(Self { first, last })
    }

    /// Nominal number of IDs in the range, successful or not.
    pub fn len(&self) -> usize {
        (self.last - self.first) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = BarcodeId> {
        (self.first..=self.last).map(BarcodeId)
    }

    /// Zero-based position of `id` inside the range.
    pub fn slot(&self, id: BarcodeId) -> Option<usize> {
        if id.0 < self.first || id.0 > self.last {
            return None;
        }
        Some((id.0 - self.first) as usize)
    }

    /// File name used for the composed sheet, e.g. `barcodes_000-099.png`.
    pub fn sheet_file_name(&self) -> String {
        format!(
            "barcodes_{}-{}.png",
            BarcodeId(self.first),
            BarcodeId(self.last)
        )
    }
}
