use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use fnplot::app::FnPlotApp;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fnplot", version)]
#[command(about = "Plot the real and imaginary parts of a function of one variable")]
struct Cli {
    /// Settings file read at startup and rewritten whenever preferences change
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("FnPlot")
            .with_inner_size([1000.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "FnPlot",
        options,
        Box::new(move |cc| Ok(Box::new(FnPlotApp::new(cc, cli.settings)))),
    )
}
