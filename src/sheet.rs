//! Barcode sheet generation: render every ID, composite them onto one grid, save the PNG.

use std::path::PathBuf;

use image::RgbImage;
use image::imageops::overlay;
use log::{debug, info, warn};
use thiserror::Error;

use crate::core::{
    BarcodeEncoding, BarcodeId, BarcodeRange, Code128Encoder, EncodeError, GridLayout,
    LayoutError,
};
use crate::image::{
    BarcodeImageOptions, CodecError, RenderError, decode_png, encode_png, render_barcode_image,
    write_png,
};

/// Failure while producing one barcode image. Never fatal for the sheet.
#[derive(Debug, Error)]
pub enum BarcodeError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Failure of the sheet as a whole.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("none of the {total} barcodes rendered; nothing to composite")]
    NothingRendered { total: usize },
    #[error("invalid grid: {0}")]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Save(#[from] CodecError),
}

/// Turns a label into a raster. The seam between generation and compositing.
pub trait BarcodeRenderer {
    fn render(&self, label: &str) -> Result<RgbImage, BarcodeError>;
}

/// Production renderer: Code128 symbol, rasterised, round-tripped through in-memory PNG bytes.
#[derive(Debug, Clone, Default)]
pub struct Code128Renderer {
    encoder: Code128Encoder,
    options: BarcodeImageOptions,
}

impl Code128Renderer {
    pub fn new(options: BarcodeImageOptions) -> Self {
        Self {
            encoder: Code128Encoder::new(),
            options,
        }
    }
}

impl BarcodeRenderer for Code128Renderer {
    fn render(&self, label: &str) -> Result<RgbImage, BarcodeError> {
        let symbol = self.encoder.encode(label)?;
        let raster = render_barcode_image(&symbol, label, &self.options)?;
        let bytes = encode_png(&raster, self.options.dpi)?;
        Ok(decode_png(&bytes)?)
    }
}

/// Fixed parameters of a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetConfig {
    pub range: BarcodeRange,
    pub columns: u32,
    pub padding: u32,
    pub dpi: u32,
    pub output: PathBuf,
}

impl Default for SheetConfig {
    fn default() -> Self {
        let range = BarcodeRange { first: 0, last: 99 };
        Self {
            output: PathBuf::from(range.sheet_file_name()),
            range,
            columns: 10,
            padding: 10,
            dpi: 300,
        }
    }
}

/// Notifications emitted while a sheet is generated.
#[derive(Debug)]
pub enum SheetEvent<'a> {
    Started {
        first: BarcodeId,
        last: BarcodeId,
        total: usize,
    },
    Progress { done: usize, total: usize },
    Failed { id: BarcodeId, error: &'a BarcodeError },
    Compositing { rendered: usize },
}

#[derive(Debug, Clone)]
pub struct RenderedBarcode {
    pub id: BarcodeId,
    /// Position of the ID within the range; decides the grid cell.
    pub slot: usize,
    pub image: RgbImage,
}

/// Result of the render loop, before anything is composited.
#[derive(Debug, Clone)]
pub struct RenderedBatch {
    pub barcodes: Vec<RenderedBarcode>,
    pub failed: Vec<BarcodeId>,
    /// Width/height of the first successful render, shared by every cell.
    pub cell_size: Option<(u32, u32)>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub rows: u32,
    pub columns: u32,
    pub rendered: usize,
    pub failed: usize,
}

/// Render every ID in the range, skipping (and reporting) the ones that fail.
pub fn render_batch<R, F>(renderer: &R, range: &BarcodeRange, mut on_event: F) -> RenderedBatch
where
    R: BarcodeRenderer + ?Sized,
    F: FnMut(SheetEvent<'_>),
{
    let total = range.len();
    on_event(SheetEvent::Started {
        first: BarcodeId(range.first),
        last: BarcodeId(range.last),
        total,
    });

    let mut batch = RenderedBatch {
        barcodes: Vec::with_capacity(total),
        failed: Vec::new(),
        cell_size: None,
        total,
    };

    for (slot, id) in range.iter().enumerate() {
        let label = id.label();
        match renderer.render(&label) {
            Ok(image) => {
                debug!("rendered {} ({}x{})", label, image.width(), image.height());
                if batch.cell_size.is_none() {
                    batch.cell_size = Some(image.dimensions());
                }
                batch.barcodes.push(RenderedBarcode { id, slot, image });
                let done = slot + 1;
                if done % 10 == 0 {
                    on_event(SheetEvent::Progress { done, total });
                }
            }
            Err(error) => {
                warn!("skipping {}: {}", label, error);
                on_event(SheetEvent::Failed { id, error: &error });
                batch.failed.push(id);
            }
        }
    }
    batch
}

/// Paste each rendered barcode at the origin of its cell on a white canvas.
pub fn compose_sheet(
    batch: &RenderedBatch,
    columns: u32,
    padding: u32,
) -> Result<(RgbImage, GridLayout), SheetError> {
    let (cell_width, cell_height) = batch.cell_size.ok_or(SheetError::NothingRendered {
        total: batch.total,
    })?;
    let layout = GridLayout::for_total(batch.total, columns, padding, cell_width, cell_height)?;
    let (width, height) = layout.canvas_size();
    let mut canvas = RgbImage::from_pixel(width, height, image::Rgb([0xff, 0xff, 0xff]));

    for barcode in &batch.barcodes {
        let (x, y) = layout.cell_origin(barcode.slot);
        overlay(&mut canvas, &barcode.image, x as i64, y as i64);
    }
    Ok((canvas, layout))
}

/// Run the whole pipeline and write the sheet to `config.output`.
pub fn generate_sheet<R, F>(
    renderer: &R,
    config: &SheetConfig,
    mut on_event: F,
) -> Result<SheetSummary, SheetError>
where
    R: BarcodeRenderer + ?Sized,
    F: FnMut(SheetEvent<'_>),
{
    let batch = render_batch(renderer, &config.range, &mut on_event);
    on_event(SheetEvent::Compositing {
        rendered: batch.barcodes.len(),
    });

    let (canvas, layout) = compose_sheet(&batch, config.columns, config.padding)?;
    write_png(&canvas, &config.output, config.dpi)?;

    let summary = SheetSummary {
        output: config.output.clone(),
        width: canvas.width(),
        height: canvas.height(),
        rows: layout.rows,
        columns: layout.columns,
        rendered: batch.barcodes.len(),
        failed: batch.failed.len(),
    };
    info!(
        "wrote {} ({}x{}, {} rendered, {} failed)",
        summary.output.display(),
        summary.width,
        summary.height,
        summary.rendered,
        summary.failed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use pretty_assertions::assert_eq;

    const WHITE: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
    const INK: Rgb<u8> = Rgb([0x00, 0x00, 0x00]);

    /// Solid black tiles of a fixed size; fails for labels matching `fails`.
    struct TileRenderer {
        width: u32,
        height: u32,
        fails: fn(&str) -> bool,
    }

    impl TileRenderer {
        fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                fails: |_| false,
            }
        }

        fn failing(self, fails: fn(&str) -> bool) -> Self {
            Self { fails, ..self }
        }
    }

    impl BarcodeRenderer for TileRenderer {
        fn render(&self, label: &str) -> Result<RgbImage, BarcodeError> {
            if (self.fails)(label) {
                return Err(EncodeError::Unsupported('?', '?' as u32).into());
            }
            Ok(RgbImage::from_pixel(self.width, self.height, INK))
        }
    }

    fn full_range() -> BarcodeRange {
        BarcodeRange::new(0, 99).unwrap()
    }

    #[test]
    fn cell_size_comes_from_first_success() {
        let renderer = TileRenderer::new(8, 4).failing(|l| l == "000");
        let batch = render_batch(&renderer, &full_range(), |_| {});
        assert_eq!(batch.cell_size, Some((8, 4)));
        assert_eq!(batch.barcodes.len(), 99);
        assert_eq!(batch.failed, vec![BarcodeId(0)]);
        assert_eq!(batch.barcodes[0].id, BarcodeId(1));
        assert_eq!(batch.barcodes[0].slot, 1);
    }

    #[test]
    fn progress_fires_every_tenth_id() {
        let mut progress = Vec::new();
        let mut failures = Vec::new();
        render_batch(
            &TileRenderer::new(2, 2).failing(|l| l == "019"),
            &full_range(),
            |event| match event {
                SheetEvent::Progress { done, total } => progress.push(format!("{done}/{total}")),
                SheetEvent::Failed { id, error } => failures.push(format!("{id}: {error}")),
                _ => {}
            },
        );
        // ID 019 is the 20th ordinal and failed, so no 20/100 line
        assert_eq!(
            progress,
            vec![
                "10/100", "30/100", "40/100", "50/100", "60/100", "70/100", "80/100", "90/100",
                "100/100",
            ]
        );
        assert_eq!(failures, vec!["019: unsupported character: '?' (U+003F)"]);
    }

    #[test]
    fn compose_places_cells_row_major() {
        let batch = render_batch(&TileRenderer::new(6, 3), &full_range(), |_| {});
        let (canvas, layout) = compose_sheet(&batch, 10, 10).unwrap();
        assert_eq!(canvas.dimensions(), (10 * 6 + 90, 10 * 3 + 90));
        assert_eq!((layout.rows, layout.columns), (10, 10));

        for idx in [0usize, 9, 10, 99] {
            let (x, y) = layout.cell_origin(idx);
            assert_eq!(*canvas.get_pixel(x, y), INK, "cell {idx}");
            assert_eq!(*canvas.get_pixel(x + 5, y + 2), INK, "cell {idx}");
        }
        // padding between cells stays white
        assert_eq!(*canvas.get_pixel(6, 0), WHITE);
        assert_eq!(*canvas.get_pixel(0, 3), WHITE);
    }

    #[test]
    fn failed_id_leaves_its_cell_white() {
        let renderer = TileRenderer::new(6, 3).failing(|l| l == "042");
        let batch = render_batch(&renderer, &full_range(), |_| {});
        let (canvas, layout) = compose_sheet(&batch, 10, 10).unwrap();

        assert_eq!(layout.position(42), (4, 2));
        let (x, y) = layout.cell_origin(42);
        for dy in 0..3 {
            for dx in 0..6 {
                assert_eq!(*canvas.get_pixel(x + dx, y + dy), WHITE);
            }
        }
        let (x, y) = layout.cell_origin(43);
        assert_eq!(*canvas.get_pixel(x, y), INK);
        let (x, y) = layout.cell_origin(99);
        assert_eq!(*canvas.get_pixel(x, y), INK);
    }

    #[test]
    fn nothing_rendered_fails_fast() {
        let renderer = TileRenderer::new(6, 3).failing(|_| true);
        let batch = render_batch(&renderer, &full_range(), |_| {});
        assert_eq!(batch.cell_size, None);
        assert!(matches!(
            compose_sheet(&batch, 10, 10),
            Err(SheetError::NothingRendered { total: 100 })
        ));
    }

    #[test]
    fn oversized_later_images_do_not_change_the_grid() {
        struct Growing;
        impl BarcodeRenderer for Growing {
            fn render(&self, label: &str) -> Result<RgbImage, BarcodeError> {
                let n: u32 = label.parse().unwrap();
                Ok(RgbImage::from_pixel(4 + n % 3, 2, INK))
            }
        }
        let batch = render_batch(&Growing, &full_range(), |_| {});
        let (canvas, _) = compose_sheet(&batch, 10, 10).unwrap();
        assert_eq!(canvas.dimensions(), (10 * 4 + 90, 10 * 2 + 90));
    }

    #[test]
    fn generate_writes_the_sheet_and_summarises_it() {
        let dir = tempfile::tempdir().unwrap();
        let config = SheetConfig {
            output: dir.path().join("sheet.png"),
            ..SheetConfig::default()
        };
        let mut compositing = None;
        let renderer = TileRenderer::new(6, 3).failing(|l| l == "042");
        let summary = generate_sheet(&renderer, &config, |event| {
            if let SheetEvent::Compositing { rendered } = event {
                compositing = Some(rendered);
            }
        })
        .unwrap();

        assert_eq!(compositing, Some(99));
        assert_eq!(
            summary,
            SheetSummary {
                output: config.output.clone(),
                width: 150,
                height: 120,
                rows: 10,
                columns: 10,
                rendered: 99,
                failed: 1,
            }
        );
        let written = image::open(&config.output).unwrap();
        assert_eq!((written.width(), written.height()), (150, 120));
    }

    #[test]
    fn production_renderer_round_trips_through_png() {
        let renderer = Code128Renderer::default();
        let image = renderer.render("007").unwrap();
        assert_eq!(image.dimensions(), (543, 278));
        assert!(matches!(
            renderer.render(""),
            Err(BarcodeError::Encode(EncodeError::Empty))
        ));
    }

    #[test]
    fn default_config_matches_the_fixed_sheet() {
        let config = SheetConfig::default();
        assert_eq!(config.range.len(), 100);
        assert_eq!(config.output, PathBuf::from("barcodes_000-099.png"));
        assert_eq!((config.columns, config.padding, config.dpi), (10, 10, 300));
    }
}
