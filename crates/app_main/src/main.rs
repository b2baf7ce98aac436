//! Image Gallery - browse, filter, view, upload and download images
//!
//! Main entry point.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;

use anyhow::Result;

fn main() -> Result<()> {
    // Configuration first: it carries the default log filter
    let (config, config_error) = match app_core::AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (app_core::AppConfig::default(), Some(e)),
    };

    // Initialize logging and panic hook; the guard flushes the log file on exit
    let _log_guard = app_log::init(&config.general.log_level)?;

    match config_error {
        Some(e) => tracing::warn!("Failed to load configuration, using defaults: {:#}", e),
        // First run: write the defaults out so they can be edited
        None if !app_core::AppConfig::config_path().exists() => {
            if let Err(e) = config.save() {
                tracing::warn!("Failed to write default configuration: {:#}", e);
            }
        }
        None => {}
    }

    match app_log::cleanup_old_logs(&app_log::log_dir(), config.general.log_retention_days) {
        Ok(0) => {}
        Ok(n) => tracing::info!("Removed {} old log file(s)", n),
        Err(e) => tracing::warn!("Failed to cleanup old logs: {}", e),
    }

    tracing::info!("ImageGallery {} starting...", env!("CARGO_PKG_VERSION"));

    // Background work runs here; the UI stays on the main thread
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("gallery-worker")
        .build()?;

    let result = app::run(config, runtime.handle().clone());

    runtime.shutdown_timeout(std::time::Duration::from_secs(2));
    tracing::info!("ImageGallery stopped");
    result
}
