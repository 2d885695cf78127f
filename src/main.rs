mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;
mod view;

use anyhow::Context;
use app::LaunchDashApp;
use clap::Parser;
use eframe::egui;

use config::Settings;
use data::filter::{FilterSelection, PayloadRange};
use data::loader::load_file;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let settings = Settings::parse();

    // Without data there is nothing to show: load failures end the process.
    let dataset = match load_file(&settings.data) {
        Ok(ds) => ds,
        Err(e) => {
            log::error!("Failed to load {}: {e}", settings.data.display());
            return Err(e).with_context(|| {
                format!("loading launch records from {}", settings.data.display())
            });
        }
    };

    let selection = FilterSelection {
        site: settings.initial_site(),
        payload_range: PayloadRange::full(dataset.bounds()),
    };
    // A bad --site is not fatal: the dashboard opens on all sites instead.
    let state = AppState::with_initial_selection(dataset, selection, settings.data.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.width, settings.height])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Launch Records Dashboard",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(LaunchDashApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("dashboard window failed: {e}"))
}
