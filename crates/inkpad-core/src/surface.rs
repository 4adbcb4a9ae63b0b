//! Raster surface with a persistent drawing context.
//!
//! The surface keeps two coordinate spaces apart: callers draw in CSS
//! pixels, and the context transform scales those onto a backing raster
//! that is `density` times larger so strokes stay sharp on high-density
//! displays.

use crate::brush::{BrushMode, BrushSettings, CompositeMode, SerializableColor};
use crate::config::ResizePolicy;
use crate::error::SurfaceResult;
use crate::history::Snapshot;
use crate::raster::{Damage, Raster};
use kurbo::{Affine, Point, Size};
use tiny_skia::{LineCap, LineJoin, Paint, Stroke};

/// Displayed size of the surface and the display density it is shown at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Size in CSS pixels.
    pub size: Size,
    /// Physical pixels per CSS pixel.
    pub density: f64,
}

impl Viewport {
    /// Create a viewport. Unusable densities fall back to 1 and negative or
    /// non-finite sizes to 0.
    pub fn new(width: f64, height: f64, density: f64) -> Self {
        let sanitize = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        let density = if density.is_finite() && density > 0.0 {
            density
        } else {
            1.0
        };
        Self {
            size: Size::new(sanitize(width), sanitize(height)),
            density,
        }
    }

    /// Backing raster size in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.size.width * self.density).floor() as u32,
            (self.size.height * self.density).floor() as u32,
        )
    }
}

/// Drawing state applied to every stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawContext {
    /// CSS-to-device transform.
    pub transform: Affine,
    pub stroke_color: SerializableColor,
    /// Line width in CSS pixels. Caps and joins are always round.
    pub line_width: f64,
    pub composite: CompositeMode,
}

impl Default for DrawContext {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            stroke_color: SerializableColor::black(),
            line_width: 1.0,
            composite: CompositeMode::SourceOver,
        }
    }
}

impl DrawContext {
    /// Paint for the current stroke color and composite mode.
    pub fn paint(&self) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(self.stroke_color.into());
        paint.anti_alias = true;
        paint.blend_mode = self.composite.into();
        paint
    }

    /// Round-capped, round-joined stroke of the current line width.
    pub fn stroke(&self) -> Stroke {
        Stroke {
            width: self.line_width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        }
    }
}

/// A raster canvas plus its drawing context and open path.
#[derive(Debug, Clone)]
pub struct Surface {
    viewport: Viewport,
    raster: Raster,
    context: DrawContext,
    background: SerializableColor,
    /// Last point of the open path, in CSS pixels.
    cursor: Option<Point>,
    damage: Option<Damage>,
}

impl Surface {
    /// Create and initialize a surface.
    pub fn new(viewport: Viewport, background: SerializableColor) -> Self {
        let (width, height) = viewport.backing_size();
        let mut surface = Self {
            viewport,
            raster: Raster::new(width, height),
            context: DrawContext::default(),
            background,
            cursor: None,
            damage: None,
        };
        surface.initialize();
        surface
    }

    /// Re-create the backing raster for a new viewport.
    ///
    /// Prior content is discarded under [`ResizePolicy::Reset`] and stretched
    /// into the new raster under [`ResizePolicy::Preserve`].
    pub fn resize(&mut self, viewport: Viewport, policy: ResizePolicy) {
        let (width, height) = viewport.backing_size();
        let previous = std::mem::replace(&mut self.raster, Raster::new(width, height));
        self.viewport = viewport;
        self.initialize();
        if policy == ResizePolicy::Preserve {
            self.raster.draw_scaled(&previous);
        }
        log::info!(
            "Surface resized to {}x{} CSS px at density {} ({}x{} device px)",
            viewport.size.width,
            viewport.size.height,
            viewport.density,
            width,
            height
        );
    }

    /// Erase everything back to the background.
    pub fn reset(&mut self) {
        self.raster.clear();
        self.initialize();
    }

    /// Reset the transform to the density scale and paint the background.
    fn initialize(&mut self) {
        self.context.transform = Affine::scale(self.viewport.density);
        self.cursor = None;
        self.raster.fill(self.background.into());
        self.mark_all_damaged();
    }

    /// Load brush settings into the context.
    ///
    /// The stroke color is only taken in draw mode; erasing ignores color.
    pub fn apply_brush(&mut self, brush: &BrushSettings) {
        self.context.line_width = brush.line_width();
        self.context.composite = brush.mode.composite();
        if brush.mode == BrushMode::Draw {
            self.context.stroke_color = brush.color;
        }
    }

    pub fn set_stroke_color(&mut self, color: SerializableColor) {
        self.context.stroke_color = color;
    }

    pub fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.context.line_width = width;
        }
    }

    pub fn set_composite(&mut self, composite: CompositeMode) {
        self.context.composite = composite;
    }

    /// Open a new path at `at` (CSS pixels).
    pub fn begin_path(&mut self, at: Point) {
        self.cursor = Some(at);
    }

    /// Stroke a segment from the path's last point to `to` and advance.
    ///
    /// Without an open path this only moves the cursor.
    pub fn line_to(&mut self, to: Point) {
        let Some(from) = self.cursor.replace(to) else {
            return;
        };
        let damage = self.raster.stroke_segment(
            from,
            to,
            &self.context.paint(),
            &self.context.stroke(),
            self.context.transform,
        );
        if let Some(damage) = damage {
            self.add_damage(damage);
        }
    }

    /// Close the open path.
    pub fn close_path(&mut self) {
        self.cursor = None;
    }

    /// Encode the current content for the undo history.
    pub fn snapshot(&self) -> SurfaceResult<Snapshot> {
        Snapshot::capture(&self.raster)
    }

    /// Replace the current content with a snapshot, stretched to fit.
    ///
    /// On decode failure the surface is left untouched.
    pub fn restore(&mut self, snapshot: &Snapshot) -> SurfaceResult<()> {
        let decoded = snapshot.decode()?;
        self.raster.clear();
        self.raster.draw_scaled(&decoded);
        self.mark_all_damaged();
        Ok(())
    }

    /// Encode the content as PNG at full backing resolution.
    pub fn encode_png(&self) -> SurfaceResult<Vec<u8>> {
        self.raster.encode_png()
    }

    /// Take the region changed since the last call.
    pub fn take_damage(&mut self) -> Option<Damage> {
        self.damage.take()
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn context(&self) -> &DrawContext {
        &self.context
    }

    /// Whether a path is currently open.
    pub fn has_open_path(&self) -> bool {
        self.cursor.is_some()
    }

    fn add_damage(&mut self, damage: Damage) {
        self.damage = Some(match self.damage {
            Some(existing) => existing.union(damage),
            None => damage,
        });
    }

    fn mark_all_damaged(&mut self) {
        self.damage = if self.raster.is_empty() {
            None
        } else {
            Some(Damage::full(self.raster.width(), self.raster.height()))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn surface(width: f64, height: f64, density: f64) -> Surface {
        Surface::new(
            Viewport::new(width, height, density),
            SerializableColor::white(),
        )
    }

    #[test]
    fn test_backing_size_scales_with_density() {
        let surface = surface(400.0, 300.0, 2.0);
        assert_eq!(surface.raster().width(), 800);
        assert_eq!(surface.raster().height(), 600);
        assert!((surface.context().transform.as_coeffs()[0] - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_backing_size_truncates() {
        assert_eq!(Viewport::new(333.0, 10.0, 1.5).backing_size(), (499, 15));
    }

    #[test]
    fn test_invalid_density_falls_back_to_one() {
        assert!((Viewport::new(10.0, 10.0, 0.0).density - 1.0).abs() < f64::EPSILON);
        assert!((Viewport::new(10.0, 10.0, f64::NAN).density - 1.0).abs() < f64::EPSILON);
        assert_eq!(Viewport::new(-5.0, 10.0, 1.0).backing_size(), (0, 10));
    }

    #[test]
    fn test_initialize_fills_background() {
        let surface = surface(4.0, 4.0, 1.0);
        assert!(surface.raster().pixels().all(|px| px == WHITE));
    }

    #[test]
    fn test_stroke_in_css_space_lands_scaled() {
        let mut surface = surface(20.0, 20.0, 2.0);
        surface.set_line_width(2.0);
        surface.begin_path(Point::new(2.0, 10.0));
        surface.line_to(Point::new(18.0, 10.0));

        // CSS (10, 10) is device (20, 20).
        assert_eq!(surface.raster().pixel(20, 19), Some([0, 0, 0, 255]));
        assert_eq!(surface.raster().pixel(20, 10), Some(WHITE));
    }

    #[test]
    fn test_context_maps_to_round_stroke() {
        let mut surface = surface(10.0, 10.0, 1.0);
        surface.set_line_width(5.0);
        surface.set_composite(CompositeMode::DestinationOut);

        let stroke = surface.context().stroke();
        assert!((stroke.width - 5.0).abs() < f32::EPSILON);
        assert_eq!(stroke.line_cap, LineCap::Round);
        assert_eq!(stroke.line_join, LineJoin::Round);
        assert_eq!(
            surface.context().paint().blend_mode,
            tiny_skia::BlendMode::DestinationOut
        );
    }

    #[test]
    fn test_line_to_without_path_only_moves() {
        let mut surface = surface(10.0, 10.0, 1.0);
        surface.take_damage();
        surface.line_to(Point::new(5.0, 5.0));
        assert!(surface.take_damage().is_none());
        assert!(surface.has_open_path());
    }

    #[test]
    fn test_apply_brush_keeps_color_when_erasing() {
        let mut surface = surface(10.0, 10.0, 1.0);
        let red = SerializableColor::new(255, 0, 0, 255);
        surface.apply_brush(&BrushSettings {
            color: red,
            width: 4,
            mode: BrushMode::Draw,
        });
        surface.apply_brush(&BrushSettings {
            color: SerializableColor::new(0, 0, 255, 255),
            width: 8,
            mode: BrushMode::Erase,
        });

        let context = surface.context();
        assert_eq!(context.stroke_color, red);
        assert!((context.line_width - 8.0).abs() < f64::EPSILON);
        assert_eq!(context.composite, CompositeMode::DestinationOut);
    }

    #[test]
    fn test_resize_reset_discards_content() {
        let mut surface = surface(10.0, 10.0, 1.0);
        surface.begin_path(Point::new(0.0, 5.0));
        surface.line_to(Point::new(10.0, 5.0));
        surface.resize(Viewport::new(20.0, 10.0, 1.0), ResizePolicy::Reset);

        assert_eq!(surface.raster().width(), 20);
        assert!(surface.raster().pixels().all(|px| px == WHITE));
        assert!(!surface.has_open_path());
    }

    #[test]
    fn test_resize_preserve_rescales_content() {
        let mut surface = surface(10.0, 10.0, 1.0);
        surface.set_line_width(4.0);
        surface.begin_path(Point::new(0.0, 5.0));
        surface.line_to(Point::new(10.0, 5.0));
        surface.resize(Viewport::new(10.0, 10.0, 2.0), ResizePolicy::Preserve);

        assert_eq!(surface.raster().width(), 20);
        assert_eq!(surface.raster().pixel(10, 9), Some([0, 0, 0, 255]));
        assert_eq!(surface.raster().pixel(10, 0), Some(WHITE));
    }

    #[test]
    fn test_reset_restores_background_in_erase_mode() {
        let mut surface = surface(10.0, 10.0, 1.0);
        surface.set_composite(CompositeMode::DestinationOut);
        surface.reset();
        assert!(surface.raster().pixels().all(|px| px == WHITE));
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut surface = surface(10.0, 10.0, 1.0);
        let before = surface.raster().clone();
        let snapshot = surface.snapshot().unwrap();
        surface.begin_path(Point::new(0.0, 0.0));
        surface.line_to(Point::new(10.0, 10.0));
        assert_ne!(surface.raster(), &before);

        surface.restore(&snapshot).unwrap();
        assert_eq!(surface.raster(), &before);
    }

    #[test]
    fn test_damage_accumulates_until_taken() {
        let mut surface = surface(40.0, 40.0, 1.0);
        surface.take_damage();
        surface.begin_path(Point::new(5.0, 5.0));
        surface.line_to(Point::new(6.0, 5.0));
        surface.line_to(Point::new(30.0, 30.0));

        let damage = surface.take_damage().unwrap();
        assert!(damage.x <= 5 && damage.y <= 5);
        assert!(damage.x + damage.width >= 30 && damage.y + damage.height >= 30);
        assert!(surface.take_damage().is_none());
    }
}
