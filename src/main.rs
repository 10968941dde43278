// Plan Grid Application
// Main entry point

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use plan_grid::services::database::Database;
use plan_grid::services::settings::SettingsService;
use plan_grid::ui_egui::PlannerApp;

const DATABASE_FILE: &str = "plan-grid.db";

fn database_path() -> PathBuf {
    ProjectDirs::from("com", "PlanGrid", "PlanGrid")
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Plan Grid");

    let settings = match SettingsService::for_user() {
        Some(service) => service.load_or_default(),
        None => {
            log::warn!("No configuration directory, using default settings");
            Default::default()
        }
    };

    let path = database_path();
    log::info!("Using database at {}", path.display());
    let database = Database::open_file(&path).context("Failed to open database")?;
    database
        .initialize_schema()
        .context("Failed to initialize database schema")?;
    // the app borrows the connection for its whole lifetime
    let database: &'static Database = Box::leak(Box::new(database));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Plan Grid"),
        ..Default::default()
    };

    eframe::run_native(
        "Plan Grid",
        options,
        Box::new(move |cc| Ok(Box::new(PlannerApp::new(cc, database, settings)))),
    )
    .map_err(|e| anyhow!("Failed to run application: {}", e))
}
