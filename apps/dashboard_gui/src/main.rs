use clap::Parser;
use crossbeam_channel::bounded;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use backend_bridge::{commands::BackendCommand, runtime};
use controller::events::UiEvent;
use ui::app::{DashboardApp, PersistedDashboardSettings, SETTINGS_STORAGE_KEY};

#[derive(Parser, Debug)]
#[command(about = "Operator dashboard mirroring a robot key-value table")]
struct Args {
    /// Table server endpoint; overrides config file and environment.
    #[arg(long)]
    server_url: Option<String>,
    /// Watched namespace prefix; overrides config file and environment.
    #[arg(long)]
    namespace: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let settings = config::load_settings(args.server_url, args.namespace);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Robot Dashboard")
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Robot Dashboard",
        options,
        Box::new(move |cc| {
            let persisted = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedDashboardSettings>(&text).ok())
            });
            Ok(Box::new(DashboardApp::new(cmd_tx, ui_rx, settings, persisted)))
        }),
    )
}
