//! Surface configuration.

use crate::brush::{BrushSettings, DEFAULT_WIDTH, SerializableColor};
use crate::error::SurfaceResult;
use crate::history::DEFAULT_UNDO_LIMIT;
use serde::{Deserialize, Serialize};

/// What happens to existing content when the host view is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizePolicy {
    /// Start over from a blank background.
    #[default]
    Reset,
    /// Rescale the previous content into the new backing buffer.
    Preserve,
}

/// Configuration for one drawing surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Maximum number of undo snapshots kept.
    pub undo_limit: usize,
    pub resize_policy: ResizePolicy,
    /// Background painted on initialize, resize, and clear.
    pub background: SerializableColor,
    /// Brush color before the color control reports a value.
    pub default_color: SerializableColor,
    /// Brush width before the size control reports a value.
    pub default_width: u32,
    /// File name offered for exported images.
    pub export_file_name: String,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            undo_limit: DEFAULT_UNDO_LIMIT,
            resize_policy: ResizePolicy::Reset,
            background: SerializableColor::white(),
            default_color: SerializableColor::black(),
            default_width: DEFAULT_WIDTH,
            export_file_name: "drawing.png".to_string(),
        }
    }
}

impl SurfaceConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> SurfaceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Brush settings a freshly mounted surface starts with.
    pub fn initial_brush(&self) -> BrushSettings {
        BrushSettings {
            color: self.default_color,
            width: if self.default_width == 0 {
                DEFAULT_WIDTH
            } else {
                self.default_width
            },
            ..BrushSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushMode;
    use crate::error::SurfaceError;

    #[test]
    fn test_defaults() {
        let config = SurfaceConfig::default();
        assert_eq!(config.undo_limit, 30);
        assert_eq!(config.resize_policy, ResizePolicy::Reset);
        assert_eq!(config.background, SerializableColor::white());
        assert_eq!(config.export_file_name, "drawing.png");
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            SurfaceConfig::from_json(r#"{"undo_limit": 5, "resize_policy": "preserve"}"#).unwrap();
        assert_eq!(config.undo_limit, 5);
        assert_eq!(config.resize_policy, ResizePolicy::Preserve);
        assert_eq!(config.default_width, DEFAULT_WIDTH);
    }

    #[test]
    fn test_from_json_colors() {
        let config =
            SurfaceConfig::from_json(r#"{"background": {"r": 1, "g": 2, "b": 3, "a": 255}}"#)
                .unwrap();
        assert_eq!(config.background, SerializableColor::new(1, 2, 3, 255));
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            SurfaceConfig::from_json("{not json"),
            Err(SurfaceError::Config(_))
        ));
        assert!(SurfaceConfig::from_json(r#"{"resize_policy": "stretch"}"#).is_err());
    }

    #[test]
    fn test_initial_brush() {
        let config = SurfaceConfig {
            default_width: 0,
            default_color: SerializableColor::new(9, 9, 9, 255),
            ..SurfaceConfig::default()
        };
        let brush = config.initial_brush();
        assert_eq!(brush.width, DEFAULT_WIDTH);
        assert_eq!(brush.color, SerializableColor::new(9, 9, 9, 255));
        assert_eq!(brush.mode, BrushMode::Draw);
    }
}
