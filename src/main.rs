use std::sync::Arc;

use anyhow::Context;
use avocado_dash::app::DashboardApp;
use avocado_dash::config::DashboardConfig;
use avocado_dash::{load_file, ReactiveBinder};
use eframe::egui;

fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::from_args(std::env::args().skip(1));
    config.init_logging();

    // The dashboard never starts without a valid dataset.
    let dataset = match load_file(&config.dataset_path, &config.load) {
        Ok(ds) => ds,
        Err(e) => {
            log::error!("Failed to load {}: {e}", config.dataset_path.display());
            return Err(e).with_context(|| format!("loading {}", config.dataset_path.display()));
        }
    };
    let binder = ReactiveBinder::new(Arc::new(dataset), &config.preferred_organic);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        &config.window_title,
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, binder)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
