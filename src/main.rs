use eframe::egui;
use insightboard::app::DashboardApp;
use insightboard::assistant::DemoAssistant;
use insightboard::config::{self, DashboardConfig};
use insightboard::session::store::StateStore;
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("insightboard=info")),
        )
        .init();

    let home = config::home_dir();
    let config = DashboardConfig::load_or_default(&home);
    let storage = StateStore::new(config.state_dir(&home));
    tracing::info!(state_dir = %storage.dir().display(), "starting insightboard");

    let (tx, rx) = mpsc::channel();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("insightboard-runtime")
        .build()?;

    let assistant = runtime.block_on(async { DemoAssistant::new(tx, &config) })?;
    let app = DashboardApp::new(rx, assistant, &config, storage);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 900.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Insightboard",
        native_options,
        Box::new(move |creation_context| {
            app.theme().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
