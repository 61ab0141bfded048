// Subscriber Dashboard - Main Entry Point
// Native Rust GUI client for the email-subscriber backend

use anyhow::Context;
use eframe::egui;
use subscriber_dashboard::{Config, DashboardApp};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("subscriber_dashboard=info")
            }),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(config = ?config, "Loaded configuration");

    // Network calls run here; the UI thread never blocks on them
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let mut app = DashboardApp::new(config, runtime.handle().clone())
        .context("failed to create dashboard")?;

    // Configure window options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Subscriber Dashboard")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Subscriber Dashboard",
        options,
        Box::new(move |cc| {
            app.attach_context(cc.egui_ctx.clone());
            app.start();
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {}", e))
}
