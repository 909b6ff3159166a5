//! Wiring shared by the commands: settings → dispatcher.

use mediaide_core::{config::AppConfig, AppError, AppResult};
use mediaide_datasets::DatasetCatalog;
use mediaide_dispatch::{ConfiguredTools, MediAide};
use mediaide_tools::{SearchSettings, Settings};
use serde::Serialize;
use std::sync::Arc;

/// Build and initialize the dispatcher for `config`.
///
/// Invalid settings are reported and leave the dataset tools unbound; web
/// search still binds when a search key resolves.
pub fn start(config: &AppConfig) -> AppResult<MediAide> {
    let settings = match Settings::from_config(config) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!("Settings not loaded: {}", e);
            None
        }
    };

    let provider = ConfiguredTools::new(settings.clone())
        .with_search(SearchSettings::from_config(config));
    let mut app = MediAide::new(
        settings,
        Arc::new(DatasetCatalog::from_config(config)),
        Arc::new(provider),
    );
    if !app.initialize() {
        return Err(AppError::Other(
            "Failed to initialize MediAide. Please check your configuration.".to_string(),
        ));
    }

    Ok(app)
}

pub fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
