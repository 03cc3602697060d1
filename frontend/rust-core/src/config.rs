use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    /// Delay between revealed characters in the chat typewriter effect.
    pub stream_tick_ms: u64,
    /// Quiet period before a slide-position change is pushed to the backend.
    pub progress_debounce_ms: u64,
    /// Duration of the slide transition before the index commits.
    pub transition_ms: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let api_base_url = settings
            .get_string("api.base_url")
            .or_else(|_| env::var("API_BASE_URL"))
            .unwrap_or_else(|_| "http://localhost:8000/api".to_string());

        let stream_tick_ms = settings
            .get_int("chat.stream_tick_ms")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(20);

        let progress_debounce_ms = settings
            .get_int("progress.debounce_ms")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(1000);

        let transition_ms = settings
            .get_int("slides.transition_ms")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(300);

        Ok(Config {
            api_base_url,
            stream_tick_ms,
            progress_debounce_ms,
            transition_ms,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            stream_tick_ms: 20,
            progress_debounce_ms: 1000,
            transition_ms: 300,
        }
    }
}
