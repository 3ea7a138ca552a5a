use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use thiserror::Error;

use crate::core::encoding::Symbol;

const MM_PER_INCH: f32 = 25.4;
const PT_PER_INCH: f32 = 72.0;
pub const GLYPH_WIDTH: usize = 5;
pub const GLYPH_HEIGHT: usize = 7;

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("render option {name} must be positive, got {value}")]
    InvalidOption { name: &'static str, value: f32 },
    #[error("dpi must be positive")]
    ZeroDpi,
}

/// Physical style of a single rendered barcode.
///
/// Lengths are millimetres except `font_size_pt`, converted to pixels at `dpi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarcodeImageOptions {
    pub module_width_mm: f32,
    pub module_height_mm: f32,
    pub quiet_zone_mm: f32,
    pub font_size_pt: f32,
    pub text_distance_mm: f32,
    /// Blank band above the bars and below the label.
    pub margin_mm: f32,
    pub dpi: u32,
    pub background: Rgb<u8>,
    pub foreground: Rgb<u8>,
}

impl Default for BarcodeImageOptions {
    fn default() -> Self {
        Self {
            module_width_mm: 0.5,
            module_height_mm: 15.0,
            quiet_zone_mm: 6.0,
            font_size_pt: 10.0,
            text_distance_mm: 3.0,
            margin_mm: 1.0,
            dpi: 300,
            background: Rgb([0xff, 0xff, 0xff]),
            foreground: Rgb([0x00, 0x00, 0x00]),
        }
    }
}

impl BarcodeImageOptions {
    fn validate(&self) -> Result<(), RenderError> {
        if self.dpi == 0 {
            return Err(RenderError::ZeroDpi);
        }
        for (name, value) in [
            ("module_width_mm", self.module_width_mm),
            ("module_height_mm", self.module_height_mm),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(RenderError::InvalidOption { name, value });
            }
        }
        for (name, value) in [
            ("quiet_zone_mm", self.quiet_zone_mm),
            ("font_size_pt", self.font_size_pt),
            ("text_distance_mm", self.text_distance_mm),
            ("margin_mm", self.margin_mm),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(RenderError::InvalidOption { name, value });
            }
        }
        Ok(())
    }

    fn mm_to_px(&self, mm: f32) -> f32 {
        mm * self.dpi as f32 / MM_PER_INCH
    }

    fn pt_to_px(&self, pt: f32) -> f32 {
        pt * self.dpi as f32 / PT_PER_INCH
    }
}

/// Rasterise `symbol` with `label` centred underneath.
///
/// An empty label or a zero font size leaves out the text band entirely.
pub fn render_barcode_image(
    symbol: &Symbol,
    label: &str,
    options: &BarcodeImageOptions,
) -> Result<RgbImage, RenderError> {
    options.validate()?;

    let modules = symbol.modules();
    let quiet_px = options.mm_to_px(options.quiet_zone_mm);
    let module_px = options.mm_to_px(options.module_width_mm);
    let module_x = |idx: usize| (quiet_px + idx as f32 * module_px).round() as i32;

    let width = (2.0 * quiet_px + modules.len() as f32 * module_px).round() as u32;
    let margin = options.mm_to_px(options.margin_mm).round() as u32;
    let bar_top = margin;
    let bar_height = (options.mm_to_px(options.module_height_mm).round() as u32).max(1);
    let mut height = bar_top + bar_height;

    let text = if label.is_empty() || options.font_size_pt <= 0.0 {
        None
    } else {
        let scale =
            ((options.pt_to_px(options.font_size_pt) / GLYPH_HEIGHT as f32).round() as u32).max(1);
        let top = height + options.mm_to_px(options.text_distance_mm).round() as u32;
        height = top + GLYPH_HEIGHT as u32 * scale;
        Some((top, scale))
    };
    height += margin;

    let mut img = RgbImage::from_pixel(width.max(1), height, options.background);

    let mut idx = 0;
    while idx < modules.len() {
        if !modules[idx] {
            idx += 1;
            continue;
        }
        let start = idx;
        while idx < modules.len() && modules[idx] {
            idx += 1;
        }
        let x0 = module_x(start);
        let bar_width = (module_x(idx) - x0).max(1) as u32;
        draw_filled_rect_mut(
            &mut img,
            Rect::at(x0, bar_top as i32).of_size(bar_width, bar_height),
            options.foreground,
        );
    }

    if let Some((top, scale)) = text {
        let advance = (GLYPH_WIDTH as u32 + 1) * scale;
        let text_width = label.chars().count() as u32 * advance - scale;
        let mut x = (width as i32 - text_width as i32) / 2;
        for ch in label.chars() {
            draw_glyph(&mut img, x, top as i32, ch, options.foreground, scale);
            x += advance as i32;
        }
    }

    Ok(img)
}

fn draw_glyph(image: &mut RgbImage, x: i32, y: i32, ch: char, color: Rgb<u8>, scale: u32) {
    let Some(pattern) = glyph_pattern(ch) else {
        return;
    };
    for (row, bits) in pattern.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                let px = x + (col as i32 * scale as i32);
                let py = y + (row as i32 * scale as i32);
                draw_filled_rect_mut(image, Rect::at(px, py).of_size(scale, scale), color);
            }
        }
    }
}

/// 5x7 bitmap glyphs, most significant bit on the left. Unknown characters render blank.
#[rustfmt::skip]
const FONT: [(char, [u8; GLYPH_HEIGHT]); 40] = [
    ('0', [0x0e, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0e]),
    ('1', [0x04, 0x0c, 0x04, 0x04, 0x04, 0x04, 0x0e]),
    ('2', [0x0e, 0x11, 0x01, 0x06, 0x08, 0x10, 0x1f]),
    ('3', [0x1e, 0x01, 0x01, 0x0e, 0x01, 0x01, 0x1e]),
    ('4', [0x02, 0x06, 0x0a, 0x12, 0x1f, 0x02, 0x02]),
    ('5', [0x1f, 0x10, 0x1e, 0x01, 0x01, 0x11, 0x0e]),
    ('6', [0x06, 0x08, 0x10, 0x1e, 0x11, 0x11, 0x0e]),
    ('7', [0x1f, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
    ('8', [0x0e, 0x11, 0x11, 0x0e, 0x11, 0x11, 0x0e]),
    ('9', [0x0e, 0x11, 0x11, 0x0f, 0x01, 0x02, 0x0c]),
    ('A', [0x0e, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11]),
    ('B', [0x1e, 0x11, 0x11, 0x1e, 0x11, 0x11, 0x1e]),
    ('C', [0x0e, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0e]),
    ('D', [0x1e, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1e]),
    ('E', [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x1f]),
    ('F', [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x10]),
    ('G', [0x0e, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0e]),
    ('H', [0x11, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11]),
    ('I', [0x0e, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0e]),
    ('J', [0x07, 0x02, 0x02, 0x02, 0x12, 0x12, 0x0c]),
    ('K', [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11]),
    ('L', [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1f]),
    ('M', [0x11, 0x1b, 0x15, 0x15, 0x11, 0x11, 0x11]),
    ('N', [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11]),
    ('O', [0x0e, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e]),
    ('P', [0x1e, 0x11, 0x11, 0x1e, 0x10, 0x10, 0x10]),
    ('Q', [0x0e, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0d]),
    ('R', [0x1e, 0x11, 0x11, 0x1e, 0x14, 0x12, 0x11]),
    ('S', [0x0f, 0x10, 0x10, 0x0e, 0x01, 0x01, 0x1e]),
    ('T', [0x1f, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    ('U', [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e]),
    ('V', [0x11, 0x11, 0x11, 0x0a, 0x0a, 0x04, 0x04]),
    ('W', [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0a]),
    ('X', [0x11, 0x11, 0x0a, 0x04, 0x0a, 0x11, 0x11]),
    ('Y', [0x11, 0x11, 0x0a, 0x04, 0x04, 0x04, 0x04]),
    ('Z', [0x1f, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1f]),
    ('-', [0x00, 0x00, 0x00, 0x1f, 0x00, 0x00, 0x00]),
    ('.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x06, 0x06]),
    ('/', [0x01, 0x02, 0x04, 0x08, 0x10, 0x10, 0x00]),
    ('_', [0x00, 0x00, 0x00, 0x00, 0x00, 0x1f, 0x00]),
];

fn glyph_pattern(ch: char) -> Option<[u8; GLYPH_HEIGHT]> {
    let up = ch.to_ascii_uppercase();
    FONT.iter().find(|(c, _)| *c == up).map(|(_, rows)| *rows)
}
