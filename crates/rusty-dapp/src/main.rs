//! Rusty-Dapp: a Rust-native dapp shell that routes transaction batches to
//! the logged-in signing provider.

use eframe::egui;
use eyre::WrapErr;

mod app;
mod components;
mod signing_bridge;
mod state;
mod ui;

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let bridge = signing_bridge::SigningBridge::from_env().wrap_err("invalid configuration")?;
    let runtime = tokio::runtime::Runtime::new().wrap_err("failed to start worker runtime")?;

    tracing::info!(network = %bridge.network().id, "Starting Rusty-Dapp");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Rusty-Dapp")
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty-Dapp",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::App::new(cc, bridge, runtime)))),
    )
    .map_err(|e| eyre::eyre!("eframe exited with an error: {e}"))
}
