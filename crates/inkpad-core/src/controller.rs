//! Drawing surface controller.
//!
//! One controller owns everything a mounted drawing surface needs: the
//! raster surface, the live brush settings, the undo history, and the
//! stroke state machine. Hosts feed it [`PointerEvent`]s and [`KeyPress`]es
//! and act on the returned [`Response`].

use crate::brush::{BrushMode, BrushSettings, SerializableColor};
use crate::config::SurfaceConfig;
use crate::error::SurfaceResult;
use crate::history::UndoHistory;
use crate::input::{KeyPress, PointerEvent};
use crate::shortcuts::{ShortcutAction, ShortcutRegistry};
use crate::surface::{Surface, Viewport};
use kurbo::Point;
use std::fmt;

/// State of the stroke gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StrokeState {
    /// Waiting for a pointer down.
    #[default]
    Idle,
    /// A stroke is in progress.
    Stroking {
        /// Last recorded pointer position in surface-local CSS pixels.
        last: Point,
    },
}

/// A PNG rendering of the surface ready to be saved.
#[derive(Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl fmt::Debug for ExportedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedImage")
            .field("file_name", &self.file_name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.png.len())
            .finish()
    }
}

/// What the host should do after an event was handled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// Suppress the platform's default handling (scrolling, browser save).
    pub prevent_default: bool,
    /// Surface pixels changed and should be presented.
    pub repaint: bool,
    /// An image to offer as a file download.
    pub download: Option<ExportedImage>,
}

impl Response {
    fn prevent_default() -> Self {
        Self {
            prevent_default: true,
            ..Self::default()
        }
    }

    fn repaint(mut self, repaint: bool) -> Self {
        self.repaint = repaint;
        self
    }
}

/// Controller for one mounted drawing surface.
#[derive(Debug, Clone)]
pub struct DrawingController {
    config: SurfaceConfig,
    surface: Surface,
    brush: BrushSettings,
    history: UndoHistory,
    stroke: StrokeState,
}

impl DrawingController {
    /// Create a controller and initialize its surface for `viewport`.
    pub fn new(config: SurfaceConfig, viewport: Viewport) -> Self {
        let brush = config.initial_brush();
        let mut surface = Surface::new(viewport, config.background);
        surface.apply_brush(&brush);
        let history = UndoHistory::new(config.undo_limit);
        Self {
            config,
            surface,
            brush,
            history,
            stroke: StrokeState::Idle,
        }
    }

    /// Dispatch a pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Response {
        match event {
            PointerEvent::Down { .. } => {
                if let Some(at) = event.local_position() {
                    self.begin_stroke(at);
                }
                Response::prevent_default()
            }
            PointerEvent::Move { .. } => match event.local_position() {
                Some(to) if self.is_stroking() => {
                    self.continue_stroke(to);
                    Response::prevent_default().repaint(true)
                }
                _ => Response::default(),
            },
            PointerEvent::Up | PointerEvent::Leave => {
                self.end_stroke();
                Response::default()
            }
        }
    }

    /// Dispatch a key press against the shortcut registry.
    pub fn handle_key(&mut self, press: &KeyPress) -> Response {
        match ShortcutRegistry::resolve(press) {
            Some(ShortcutAction::Undo) => {
                let restored = self.undo();
                Response::prevent_default().repaint(restored)
            }
            Some(ShortcutAction::Save) => {
                let mut response = Response::prevent_default();
                match self.export() {
                    Ok(image) => response.download = Some(image),
                    Err(e) => log::warn!("Export failed: {}", e),
                }
                response
            }
            None => Response::default(),
        }
    }

    /// Start a stroke at `at` (surface-local CSS pixels).
    pub fn begin_stroke(&mut self, at: Point) {
        self.push_undo();
        self.stroke = StrokeState::Stroking { last: at };
        self.surface.apply_brush(&self.brush);
        self.surface.begin_path(at);
        log::debug!("Stroke started at ({:.1}, {:.1})", at.x, at.y);
    }

    /// Extend the active stroke to `to`. Returns false when idle.
    pub fn continue_stroke(&mut self, to: Point) -> bool {
        let StrokeState::Stroking { .. } = self.stroke else {
            return false;
        };
        self.surface.apply_brush(&self.brush);
        self.surface.line_to(to);
        self.stroke = StrokeState::Stroking { last: to };
        true
    }

    /// Finish the active stroke. Returns false when idle.
    pub fn end_stroke(&mut self) -> bool {
        let StrokeState::Stroking { last } = self.stroke else {
            return false;
        };
        self.stroke = StrokeState::Idle;
        self.surface.close_path();
        log::debug!("Stroke ended at ({:.1}, {:.1})", last.x, last.y);
        true
    }

    /// Color control changed. The stroke color only follows in draw mode.
    pub fn set_color(&mut self, color: SerializableColor) {
        self.brush.color = color;
        if self.brush.mode == BrushMode::Draw {
            self.surface.set_stroke_color(color);
        }
    }

    /// Size control changed. Zero widths are ignored.
    pub fn set_width(&mut self, width: u32) {
        if width == 0 {
            return;
        }
        self.brush.width = width;
        self.surface.apply_brush(&self.brush);
    }

    /// Mode control changed.
    pub fn set_mode(&mut self, mode: BrushMode) {
        self.brush.mode = mode;
        self.surface.apply_brush(&self.brush);
        log::debug!("Brush mode set to {:?}", mode);
    }

    /// Restore the most recent snapshot. Returns false when nothing was
    /// restored.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop() else {
            return false;
        };
        match self.surface.restore(&snapshot) {
            Ok(()) => {
                log::debug!("Undo restored ({} left)", self.history.len());
                true
            }
            Err(e) => {
                log::warn!("Failed to restore undo snapshot: {}", e);
                false
            }
        }
    }

    /// Erase the surface back to its background, keeping an undo entry.
    pub fn clear(&mut self) {
        self.push_undo();
        self.surface.reset();
        self.surface.apply_brush(&self.brush);
        log::debug!("Surface cleared");
    }

    /// Encode the surface as PNG at full backing resolution.
    pub fn export(&self) -> SurfaceResult<ExportedImage> {
        let png = self.surface.encode_png()?;
        let raster = self.surface.raster();
        log::info!(
            "Exported {} ({}x{}, {} bytes)",
            self.config.export_file_name,
            raster.width(),
            raster.height(),
            png.len()
        );
        Ok(ExportedImage {
            file_name: self.config.export_file_name.clone(),
            width: raster.width(),
            height: raster.height(),
            png,
        })
    }

    /// The host view changed size or density.
    pub fn resize(&mut self, viewport: Viewport) {
        self.surface.resize(viewport, self.config.resize_policy);
        self.surface.apply_brush(&self.brush);
    }

    /// Snapshot the surface onto the undo history. Encoding failures are
    /// logged and skipped.
    fn push_undo(&mut self) {
        match self.surface.snapshot() {
            Ok(snapshot) => self.history.push(snapshot),
            Err(e) => log::warn!("Skipping undo snapshot: {}", e),
        }
    }

    pub fn is_stroking(&self) -> bool {
        matches!(self.stroke, StrokeState::Stroking { .. })
    }

    pub fn stroke_state(&self) -> StrokeState {
        self.stroke
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Mutable surface access, e.g. to take accumulated damage.
    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }
}
