//! Application entry point: HighlightReader.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the synthesis client ([`ApiSynthesisClient`]) from config.
//! 5. Create session channels (`command`, `result`).
//! 6. Spawn the session orchestrator on the tokio runtime.
//! 7. Build the rodio playback engine from config.
//! 8. Run [`eframe::run_native`]: blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use eframe::egui;
use tokio::sync::mpsc;

use highlight_reader::{
    app::ReaderApp,
    config::{AppConfig, AppPaths},
    playback::engine_from_config,
    session::{SessionCommand, SessionOrchestrator, SessionResult},
    synth::{ApiSynthesisClient, SynthesisClient},
};

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let viewport = egui::ViewportBuilder::default()
        .with_title("HighlightReader")
        .with_inner_size([width, height])
        .with_min_inner_size([320.0, 240.0]);

    eframe::NativeOptions {
        viewport,
        ..Default::default()
    }
}

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("HighlightReader starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    log::info!("Synthesis service: {}", config.service.base_url);

    // 3. Tokio runtime (network I/O only; the UI thread owns all reader state)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Synthesis client
    let client: Arc<dyn SynthesisClient> =
        Arc::new(ApiSynthesisClient::from_config(&config.service));

    // 5. Channel setup
    let (command_tx, command_rx) = mpsc::channel::<SessionCommand>(16);
    let (result_tx, result_rx) = mpsc::channel::<SessionResult>(16);

    // 6. Session orchestrator
    rt.spawn(SessionOrchestrator::new(client, result_tx).run(command_rx));

    // 7. Playback engine
    let player = engine_from_config(&config.playback);

    // 8. Build the egui app and run it (blocks until the window is closed)
    let app = ReaderApp::new(command_tx, result_rx, player, config.clone())
        .with_settings_file(AppPaths::new().settings_file);
    let options = native_options(&config);

    let result = eframe::run_native(
        "HighlightReader",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    );

    // Dropping the runtime aborts any request still in flight.
    drop(rt);
    result
}
