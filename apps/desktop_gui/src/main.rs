mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::RuvaApp;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides `ruva.toml` and BACKEND_URL.
    #[arg(long)]
    backend_url: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = client_core::load_settings();
    if let Some(url) = args.backend_url {
        settings.backend_url = url;
    }

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("RUVA")
            .with_inner_size([520.0, 760.0])
            .with_min_inner_size([440.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "RUVA",
        options,
        Box::new(|_cc| Ok(Box::new(RuvaApp::new(cmd_tx, ui_rx)))),
    )
}
