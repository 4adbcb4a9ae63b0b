//! Brush settings and parsing of control values.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Width used when the size control holds nothing usable.
pub const DEFAULT_WIDTH: u32 = 6;

/// Whether strokes paint or erase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    #[default]
    Draw,
    Erase,
}

impl BrushMode {
    /// Interpret a mode selector value. Only `"erase"` selects erase.
    pub fn from_control_value(value: &str) -> Self {
        if value == "erase" {
            BrushMode::Erase
        } else {
            BrushMode::Draw
        }
    }

    /// The raster compositing behaviour this mode strokes with.
    pub fn composite(self) -> CompositeMode {
        match self {
            BrushMode::Draw => CompositeMode::SourceOver,
            BrushMode::Erase => CompositeMode::DestinationOut,
        }
    }
}

/// Raster compositing behaviour for strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompositeMode {
    /// Normal painting over existing content.
    #[default]
    SourceOver,
    /// Removes existing content where the stroke covers it.
    DestinationOut,
}

impl From<CompositeMode> for tiny_skia::BlendMode {
    fn from(mode: CompositeMode) -> Self {
        match mode {
            CompositeMode::SourceOver => tiny_skia::BlendMode::SourceOver,
            CompositeMode::DestinationOut => tiny_skia::BlendMode::DestinationOut,
        }
    }
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl From<SerializableColor> for tiny_skia::Color {
    fn from(color: SerializableColor) -> Self {
        tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Current values of the brush controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushSettings {
    pub color: SerializableColor,
    pub width: u32,
    pub mode: BrushMode,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: SerializableColor::black(),
            width: DEFAULT_WIDTH,
            mode: BrushMode::Draw,
        }
    }
}

impl BrushSettings {
    /// Stroke width as a float for the drawing context.
    pub fn line_width(&self) -> f64 {
        self.width as f64
    }
}

/// Parse a CSS color string like "#ff0000", "#f00", or "rgb(255, 0, 0)".
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        return match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color::from_rgba8(r, g, b, 255))
            }
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
                let (r, g, b) = (digit(0)?, digit(1)?, digit(2)?);
                Some(Color::from_rgba8(r * 17, g * 17, b * 17, 255))
            }
            _ => None,
        };
    }

    let inner = s.strip_prefix("rgb(")?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Color::from_rgba8(r, g, b, 255))
}

/// Parse a size control value the way `parseInt` reads it: the leading
/// run of digits counts and anything after is ignored.
///
/// Missing, unparsable, or zero widths fall back to [`DEFAULT_WIDTH`].
pub fn parse_width(s: &str) -> u32 {
    let digits: String = s
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => DEFAULT_WIDTH,
        Ok(width) => width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(color: Color) -> (u8, u8, u8) {
        let c = color.to_rgba8();
        (c.r, c.g, c.b)
    }

    #[test]
    fn test_mode_from_control_value() {
        assert_eq!(BrushMode::from_control_value("erase"), BrushMode::Erase);
        assert_eq!(BrushMode::from_control_value("draw"), BrushMode::Draw);
        assert_eq!(BrushMode::from_control_value("anything"), BrushMode::Draw);
    }

    #[test]
    fn test_mode_composite() {
        assert_eq!(BrushMode::Draw.composite(), CompositeMode::SourceOver);
        assert_eq!(BrushMode::Erase.composite(), CompositeMode::DestinationOut);
        assert_eq!(
            tiny_skia::BlendMode::from(BrushMode::Erase.composite()),
            tiny_skia::BlendMode::DestinationOut
        );
    }

    #[test]
    fn test_serializable_color_conversion() {
        let color = SerializableColor::new(10, 20, 30, 255);
        assert_eq!(SerializableColor::from(Color::from(color)), color);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(rgb(parse_color("#ff8000").unwrap()), (255, 128, 0));
        assert_eq!(rgb(parse_color("  #0000FF ").unwrap()), (0, 0, 255));
        assert_eq!(rgb(parse_color("#f0a").unwrap()), (255, 0, 170));
    }

    #[test]
    fn test_parse_rgb_color() {
        assert_eq!(rgb(parse_color("rgb(1, 2, 3)").unwrap()), (1, 2, 3));
        assert!(parse_color("rgb(1, 2)").is_none());
        assert!(parse_color("rgb(1, 2, 3, 4)").is_none());
        assert!(parse_color("rgb(300, 0, 0)").is_none());
    }

    #[test]
    fn test_parse_invalid_color() {
        assert!(parse_color("").is_none());
        assert!(parse_color("red").is_none());
        assert!(parse_color("#12345").is_none());
        assert!(parse_color("#gggggg").is_none());
        assert!(parse_color("#ééé").is_none());
    }

    #[test]
    fn test_parse_width() {
        assert_eq!(parse_width("12"), 12);
        assert_eq!(parse_width("12px"), 12);
        assert_eq!(parse_width(" 3"), 3);
        assert_eq!(parse_width(""), DEFAULT_WIDTH);
        assert_eq!(parse_width("abc"), DEFAULT_WIDTH);
        assert_eq!(parse_width("0"), DEFAULT_WIDTH);
        assert_eq!(parse_width("-4"), DEFAULT_WIDTH);
    }
}
