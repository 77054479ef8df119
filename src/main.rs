#![windows_subsystem = "windows"]

use clap::Parser;
use eframe::egui;
use std::path::PathBuf;

use pixelart::app::PixelArtApp;
use pixelart::settings::Settings;
use pixelart::{log_info, logger};

/// Minimal pixel-art editor.
///
/// Arrows move the cursor, Space paints, Y samples, C picks a color,
/// O opens, S saves as PNG, N creates a blank canvas.
#[derive(Parser, Debug)]
#[command(name = "pixelart", version)]
struct CliArgs {
    /// Images to open in extra windows next to the default one.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() -> Result<(), eframe::Error> {
    let args = CliArgs::parse();

    // Initialize session log (overwrites previous session log)
    logger::init();

    let settings = Settings::load();
    log_info!(
        "Starting with {} startup file(s), new canvas {}x{}",
        args.files.len(),
        settings.new_canvas_width,
        settings.new_canvas_height
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.window_width, settings.window_height])
            .with_title("pixelart"),
        ..Default::default()
    };

    eframe::run_native(
        "pixelart",
        options,
        Box::new(move |cc| Box::new(PixelArtApp::new(cc, settings, args.files))),
    )
}
