// Agent Console - Main Entry Point
// Native GUI over the agent marketplace store and router

use agent_console::config::Config;
use agent_console::state::Store;
use agent_console::ui::{render_app_layout, Console};
use anyhow::Context;
use eframe::egui;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        api_base_url = %config.api.base_url,
        data_dir = %config.storage.data_dir.display(),
        "Starting Agent Console"
    );

    // Actions run here while eframe owns the main thread
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("agent-console-worker")
        .build()
        .context("Failed to start async runtime")?;
    let store = Store::from_config(&config).context("Invalid API configuration")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Agent Console")
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    let handle = runtime.handle().clone();
    eframe::run_native(
        "Agent Console",
        options,
        Box::new(move |cc| {
            let mut console = Console::new(store, handle, Some(cc.egui_ctx.clone()));
            console.start();
            Box::new(ConsoleApp { console })
        }),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))?;

    tracing::info!("Agent Console closed");
    Ok(())
}

/// eframe application wrapper
struct ConsoleApp {
    console: Console,
}

impl eframe::App for ConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        render_app_layout(ctx, &mut self.console);
    }
}
