//! Device-pixel raster backed by a `tiny_skia::Pixmap`.
//!
//! Coordinates handed to [`Raster::stroke_segment`] are in CSS pixels and
//! mapped to device pixels by the context transform. Pixel reads return
//! straight (non-premultiplied) RGBA8, which is what `ImageData` expects.

use crate::error::{SurfaceError, SurfaceResult};
use kurbo::{Affine, Point, Rect};
use std::fmt;
use tiny_skia::{
    Color, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8, Stroke,
    Transform,
};

/// Extra device pixels around a stroke's geometric bounds for anti-aliasing.
const AA_MARGIN: f64 = 1.0;

/// A rectangular region of device pixels that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Damage {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Damage {
    /// Damage covering a whole `width` x `height` buffer.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Pixels touched by `bounds`, clipped to a `width` x `height` buffer.
    fn clipped(bounds: Rect, width: u32, height: u32) -> Option<Self> {
        let x0 = bounds.x0.floor().max(0.0);
        let y0 = bounds.y0.floor().max(0.0);
        let x1 = bounds.x1.ceil().min(width as f64);
        let y1 = bounds.y1.ceil().min(height as f64);
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    /// Smallest region containing both.
    pub fn union(self, other: Damage) -> Damage {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + self.width).max(other.x + other.width);
        let y1 = (self.y + self.height).max(other.y + other.height);
        Damage {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

/// A device-pixel RGBA buffer. Zero-sized rasters hold no pixmap.
#[derive(Clone, PartialEq)]
pub struct Raster {
    pixmap: Option<Pixmap>,
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

impl Raster {
    /// Create a fully transparent raster.
    pub fn new(width: u32, height: u32) -> Self {
        let pixmap = Pixmap::new(width, height);
        if pixmap.is_none() && width > 0 && height > 0 {
            log::warn!("Cannot allocate a {}x{} raster", width, height);
        }
        Self { pixmap }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, Pixmap::width)
    }

    pub fn height(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, Pixmap::height)
    }

    /// True when the raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixmap.is_none()
    }

    /// Read one pixel, `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.as_ref()?.pixel(x, y).map(straight)
    }

    /// Every pixel in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.pixmap
            .iter()
            .flat_map(|pixmap| pixmap.pixels().iter().copied().map(straight))
    }

    /// Copy out the RGBA8 bytes of a sub-rectangle (used for partial uploads).
    pub fn region(&self, damage: Damage) -> Vec<u8> {
        let Some(pixmap) = &self.pixmap else {
            return Vec::new();
        };
        let stride = pixmap.width() as usize;
        let pixels = pixmap.pixels();
        let mut out = Vec::with_capacity(damage.width as usize * damage.height as usize * 4);
        for y in damage.y..damage.y + damage.height {
            let start = y as usize * stride + damage.x as usize;
            for &pixel in &pixels[start..start + damage.width as usize] {
                out.extend_from_slice(&straight(pixel));
            }
        }
        out
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.fill(Color::TRANSPARENT);
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Color) {
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.fill(color);
        }
    }

    /// Stroke the segment `from`-`to` through `transform`.
    ///
    /// Returns the touched region, or `None` when the segment lies entirely
    /// outside the buffer.
    pub fn stroke_segment(
        &mut self,
        from: Point,
        to: Point,
        paint: &Paint,
        stroke: &Stroke,
        transform: Affine,
    ) -> Option<Damage> {
        let pixmap = self.pixmap.as_mut()?;
        let reach =
            f64::from(stroke.width) * transform.determinant().abs().sqrt() / 2.0 + AA_MARGIN;
        let bounds = transform
            .transform_rect_bbox(Rect::from_points(from, to))
            .inflate(reach, reach);
        let damage = Damage::clipped(bounds, pixmap.width(), pixmap.height())?;

        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let path = pb.finish()?;
        pixmap.stroke_path(&path, paint, stroke, skia_transform(transform), None);
        Some(damage)
    }

    /// Draw `src` stretched over the whole buffer with normal compositing.
    ///
    /// Sampling is nearest neighbour; identical sizes copy pixels 1:1.
    pub fn draw_scaled(&mut self, src: &Raster) {
        let (Some(dst), Some(src)) = (self.pixmap.as_mut(), src.pixmap.as_ref()) else {
            return;
        };
        let transform = Transform::from_scale(
            dst.width() as f32 / src.width() as f32,
            dst.height() as f32 / src.height() as f32,
        );
        let paint = PixmapPaint {
            quality: FilterQuality::Nearest,
            ..PixmapPaint::default()
        };
        dst.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
    }

    /// Encode as an 8-bit RGBA PNG.
    pub fn encode_png(&self) -> SurfaceResult<Vec<u8>> {
        let Some(pixmap) = &self.pixmap else {
            return Err(SurfaceError::InvalidSize {
                width: 0,
                height: 0,
            });
        };
        Ok(pixmap.encode_png()?)
    }

    /// Decode a PNG of any color type into a raster.
    pub fn decode_png(bytes: &[u8]) -> SurfaceResult<Self> {
        let pixmap = Pixmap::decode_png(bytes)?;
        Ok(Self {
            pixmap: Some(pixmap),
        })
    }
}

fn straight(pixel: PremultipliedColorU8) -> [u8; 4] {
    let c = pixel.demultiply();
    [c.red(), c.green(), c.blue(), c.alpha()]
}

fn skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}
