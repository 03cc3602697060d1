use serde::{Deserialize, Serialize};

/// Wire shape for module progress, both directions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleProgress {
    #[serde(default)]
    pub current_slide: u32,
    #[serde(default)]
    pub total_slides: u32,
}
