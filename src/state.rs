// src/state.rs
use reqwest::Client;

use crate::config::AppConfig;
use crate::errors::ScrapeError;
use crate::services::source::build_client;
use crate::services::store::CsvPriceStore;

/// Shared by every request handler.
pub struct AppState {
    pub config: AppConfig,
    pub store: CsvPriceStore,
    pub client: Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ScrapeError> {
        let client = build_client(config.fetch_timeout)?;
        let store = CsvPriceStore::new(config.data_dir.clone());
        Ok(AppState { config, store, client })
    }
}
