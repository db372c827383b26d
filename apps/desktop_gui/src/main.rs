mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use coach_core::gemini::load_settings;
use crossbeam_channel::bounded;
use eframe::egui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;

#[derive(Parser, Debug)]
#[command(name = "tutor-ally", about = "Desktop coaching companion for tutors")]
struct Cli {
    /// Override the configured model name.
    #[arg(long)]
    model: Option<String>,
    /// Override the configured API base URL.
    #[arg(long)]
    api_base_url: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(model) = cli.model {
        settings.model = model;
    }
    if let Some(api_base_url) = cli.api_base_url {
        settings.api_base_url = api_base_url;
    }

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::worker::spawn_backend_thread(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("TutorAlly")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([860.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "TutorAlly",
        options,
        Box::new(|_cc| Ok(Box::new(ui::app::TutorAllyApp::new(cmd_tx, ui_rx)))),
    )
}
