//! Sheet generation (`barcode-sheet`), printing progress to stdout.

use anyhow::{Context, Result};
use barcode_sheet::{Code128Renderer, SheetConfig, SheetEvent, SheetSummary, generate_sheet};

/// Generate the fixed sheet into the working directory.
pub fn handle() -> Result<()> {
    let config = SheetConfig::default();
    let renderer = Code128Renderer::default();
    let summary = generate_sheet(&renderer, &config, print_event).with_context(|| {
        format!("failed to generate {}", config.output.display())
    })?;
    print_summary(&summary);
    Ok(())
}

fn print_event(event: SheetEvent<'_>) {
    match event {
        SheetEvent::Started { first, last, total } => {
            println!("Generating {} barcodes from {} to {}...\n", total, first, last);
        }
        SheetEvent::Progress { done, total } => println!("Progress... {}/{}", done, total),
        SheetEvent::Failed { id, error } => println!("✗ {} failed: {}", id, error),
        SheetEvent::Compositing { .. } => println!("\nCombining barcode images into one sheet..."),
    }
}

fn print_summary(summary: &SheetSummary) {
    println!("\n✓ Done! Created {}.", summary.output.display());
    println!("  Size: {}x{} pixels", summary.width, summary.height);
    println!("  Layout: {} rows x {} columns", summary.rows, summary.columns);
    if summary.failed > 0 {
        println!("  Skipped: {} barcode(s) failed to render", summary.failed);
    }
}
