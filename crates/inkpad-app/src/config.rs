//! Mount configuration: which page elements to bind and how the surface
//! behaves.

use crate::error::MountError;
use inkpad_core::SurfaceConfig;
use serde::{Deserialize, Serialize};

/// Element ids of the canvas and its controls in the host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub canvas: String,
    pub color: String,
    pub size: String,
    pub mode: String,
    pub undo: String,
    pub clear: String,
    pub save: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            canvas: "draw".to_string(),
            color: "color".to_string(),
            size: "size".to_string(),
            mode: "mode".to_string(),
            undo: "undo".to_string(),
            clear: "clear".to_string(),
            save: "save".to_string(),
        }
    }
}

/// Everything needed to mount one drawing surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    pub elements: ElementIds,
    #[serde(flatten)]
    pub surface: SurfaceConfig,
}

impl MountConfig {
    /// Parse from JSON; an absent or blank string yields the defaults.
    pub fn from_json(json: Option<&str>) -> Result<Self, MountError> {
        match json.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(json) => Ok(serde_json::from_str(json)?),
        }
    }
}
