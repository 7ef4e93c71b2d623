mod app;
mod geometry;
mod layout;
mod routing;
mod schema;
mod util;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long)]
    file: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "erdraft",
        options,
        Box::new(move |cc| Ok(Box::new(app::EditorApp::new(cc, args.file.clone())))),
    )
}
