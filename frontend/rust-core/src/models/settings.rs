use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// App settings as served by `GET /settings/`: a flag-name to boolean map
/// plus the usual success envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub features: HashMap<String, bool>,
}

impl AppSettings {
    pub fn feature(&self, name: &str, default: bool) -> bool {
        self.features.get(name).copied().unwrap_or(default)
    }
}
