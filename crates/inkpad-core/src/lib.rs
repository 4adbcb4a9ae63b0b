//! Inkpad Core Library
//!
//! Platform-agnostic core of the Inkpad freehand drawing surface: a raster
//! surface with a persistent drawing context, brush settings, a bounded undo
//! history of PNG snapshots, and the controller that turns pointer and
//! keyboard input into raster mutations.

pub mod brush;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod input;
pub mod raster;
pub mod shortcuts;
pub mod surface;

pub use brush::{
    BrushMode, BrushSettings, CompositeMode, DEFAULT_WIDTH, SerializableColor, parse_color,
    parse_width,
};
pub use config::{ResizePolicy, SurfaceConfig};
pub use controller::{DrawingController, ExportedImage, Response, StrokeState};
pub use error::{SurfaceError, SurfaceResult};
pub use history::{DEFAULT_UNDO_LIMIT, Snapshot, UndoHistory};
pub use input::{KeyPress, Modifiers, PointerEvent};
pub use raster::{Damage, Raster};
pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};
pub use surface::{DrawContext, Surface, Viewport};
