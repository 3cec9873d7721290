mod engine;
mod error;
mod ops;
mod renderer;
mod types;
mod ui;

use crate::ops::transport::TransportController;
use crate::renderer::display::DisplayState;
use crate::types::config::PlayerConfig;
use crate::ui::app::PlayerApp;
use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Desktop audio player with a bar visualizer", long_about = None)]
struct Cli {
    /// Audio file to start playing right away.
    file: Option<PathBuf>,
    /// JSON settings file. Missing sections use defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PlayerConfig::load_or_default(path).unwrap_or_else(|err| {
            tracing::warn!(?path, %err, "ignoring invalid config");
            PlayerConfig::new()
        }),
        None => PlayerConfig::new(),
    };

    let engine = match engine::default_engine() {
        Ok(engine) => Some(engine),
        Err(err) => {
            tracing::error!(%err, "starting without a media engine");
            None
        }
    };
    let transport =
        TransportController::new(engine, DisplayState::new(), config.transport.clone());
    let mut app = PlayerApp::new(transport, config, cli.config.clone());
    if let Some(file) = &cli.file {
        app.on_open(file);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("barplay")
            .with_inner_size([640.0, 320.0]),
        ..Default::default()
    };
    eframe::run_native(
        "barplay",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
