//! Feature-flag lookup backed by `GET /settings/`, cached so static config
//! is not refetched on every check. The provider is injected (client plus
//! storage), not a process-wide singleton, so tests can swap in doubles.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::settings::AppSettings;
use crate::storage::UserStorage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const SETTINGS_CACHE_KEY: &str = "app_settings";

pub struct SettingsService {
    client: Arc<ApiClient>,
    storage: UserStorage,
    cache: Mutex<Option<AppSettings>>,
}

impl SettingsService {
    pub fn new(client: Arc<ApiClient>, storage: UserStorage) -> Self {
        Self {
            client,
            storage,
            cache: Mutex::new(None),
        }
    }

    /// Fetch settings: in-process cache, then the session-scoped store, then
    /// the API. Both cache layers are filled on a network fetch.
    pub async fn fetch_settings(&self) -> Result<AppSettings, ApiError> {
        if let Some(cached) = self.cache.lock().unwrap().clone() {
            return Ok(cached);
        }

        if let Some(raw) = self.storage.get_session_only(SETTINGS_CACHE_KEY) {
            if let Ok(settings) = serde_json::from_str::<AppSettings>(&raw) {
                tracing::debug!("settings served from storage cache");
                *self.cache.lock().unwrap() = Some(settings.clone());
                return Ok(settings);
            }
            // Unreadable cache entry, drop it and refetch.
            self.storage.remove_session_only(SETTINGS_CACHE_KEY);
        }

        let settings = self.client.get_settings().await?;
        if let Ok(raw) = serde_json::to_string(&settings) {
            self.storage.set_session_only(SETTINGS_CACHE_KEY, &raw);
        }
        *self.cache.lock().unwrap() = Some(settings.clone());
        tracing::info!(flags = settings.features.len(), "app settings fetched");
        Ok(settings)
    }

    /// Check one flag, degrading to `default` when settings cannot be
    /// fetched.
    pub async fn is_feature_enabled(&self, feature: &str, default: bool) -> bool {
        match self.fetch_settings().await {
            Ok(settings) => settings.feature(feature, default),
            Err(e) => {
                tracing::warn!(feature, error = %e, "settings fetch failed, using default");
                default
            }
        }
    }

    pub async fn all_features(&self) -> Result<HashMap<String, bool>, ApiError> {
        Ok(self.fetch_settings().await?.features)
    }

    /// Invalidate both cache layers; the next read refetches. Call after an
    /// admin updates a flag.
    pub fn clear_cache(&self) {
        self.storage.remove_session_only(SETTINGS_CACHE_KEY);
        *self.cache.lock().unwrap() = None;
    }
}
