//! Frame abstraction for drawing primitives
//!
//! Provides a simple, safe API for pixel buffer operations instead of
//! direct buffer indexing scattered throughout rendering code.

use crate::geometry::Rect;

/// Blend a foreground color onto a background color using alpha compositing.
///
/// Both colors are in ARGB format (0xAARRGGBB). The alpha value from the
/// foreground color determines the blend ratio.
///
/// Returns the blended color with full opacity (alpha = 0xFF).
#[inline]
pub fn blend_colors(bg: u32, fg: u32, alpha: f32) -> u32 {
    let bg_r = ((bg >> 16) & 0xFF) as f32;
    let bg_g = ((bg >> 8) & 0xFF) as f32;
    let bg_b = (bg & 0xFF) as f32;

    let fg_r = ((fg >> 16) & 0xFF) as f32;
    let fg_g = ((fg >> 8) & 0xFF) as f32;
    let fg_b = (fg & 0xFF) as f32;

    let final_r = (bg_r * (1.0 - alpha) + fg_r * alpha) as u32;
    let final_g = (bg_g * (1.0 - alpha) + fg_g * alpha) as u32;
    let final_b = (bg_b * (1.0 - alpha) + fg_b * alpha) as u32;

    0xFF000000 | (final_r << 16) | (final_g << 8) | final_b
}

/// Clipping rectangle in pixel coordinates (inclusive start, exclusive end).
#[derive(Clone, Copy, Debug)]
struct ClipRect {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

/// A frame buffer wrapper providing safe drawing primitives.
///
/// All coordinates are in device pixels. Out-of-bounds operations are
/// safely clipped.
pub struct Frame<'a> {
    buffer: &'a mut [u32],
    width: usize,
    height: usize,
    clip: Option<ClipRect>,
}

impl<'a> Frame<'a> {
    /// Create a new frame from a mutable pixel buffer
    ///
    /// If the buffer is smaller than width*height, dimensions are adjusted
    /// to match the actual buffer size to prevent out-of-bounds access.
    pub fn new(buffer: &'a mut [u32], width: usize, height: usize) -> Self {
        let expected_size = width * height;
        let actual_size = buffer.len();

        let (width, height) = if actual_size < expected_size && width > 0 {
            (width, actual_size / width)
        } else {
            (width, height)
        };

        Self {
            buffer,
            width,
            height,
            clip: None,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Set a clipping rectangle. All subsequent drawing operations will be
    /// constrained to this region.
    pub fn set_clip(&mut self, rect: Rect) {
        let x0 = (rect.x.max(0.0) as usize).min(self.width);
        let y0 = (rect.y.max(0.0) as usize).min(self.height);
        let x1 = (rect.right().max(0.0) as usize).min(self.width);
        let y1 = (rect.bottom().max(0.0) as usize).min(self.height);
        self.clip = Some(ClipRect { x0, y0, x1, y1 });
    }

    /// Remove the clipping rectangle, restoring full-frame drawing.
    pub fn clear_clip(&mut self) {
        self.clip = None;
    }

    #[inline]
    fn max_x(&self) -> usize {
        self.clip.map_or(self.width, |c| c.x1)
    }

    #[inline]
    fn max_y(&self) -> usize {
        self.clip.map_or(self.height, |c| c.y1)
    }

    #[inline]
    fn min_x(&self) -> usize {
        self.clip.map_or(0, |c| c.x0)
    }

    #[inline]
    fn min_y(&self) -> usize {
        self.clip.map_or(0, |c| c.y0)
    }

    /// Pixel span of a rect after clipping: `(x0, y0, x1, y1)`
    fn span(&self, rect: Rect) -> (usize, usize, usize, usize) {
        let x0 = (rect.x.max(0.0) as usize).max(self.min_x());
        let y0 = (rect.y.max(0.0) as usize).max(self.min_y());
        let x1 = (rect.right().max(0.0) as usize).min(self.max_x());
        let y1 = (rect.bottom().max(0.0) as usize).min(self.max_y());
        (x0, y0, x1, y1)
    }

    /// Clear the entire buffer with a solid color
    #[inline]
    pub fn clear(&mut self, color: u32) {
        self.buffer.fill(color);
    }

    /// Fill a rectangle with a solid color (no alpha blending)
    pub fn fill_rect(&mut self, rect: Rect, color: u32) {
        let (x0, y0, x1, y1) = self.span(rect);
        for y in y0..y1 {
            let row_start = y * self.width;
            if x0 < x1 {
                self.buffer[row_start + x0..row_start + x1].fill(color);
            }
        }
    }

    /// Fill a rectangle specified by pixel coordinates
    pub fn fill_rect_px(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        let x0 = x.max(self.min_x());
        let y0 = y.max(self.min_y());
        let x1 = x.saturating_add(w).min(self.max_x());
        let y1 = y.saturating_add(h).min(self.max_y());

        for py in y0..y1 {
            let row_start = py * self.width;
            if x0 < x1 {
                self.buffer[row_start + x0..row_start + x1].fill(color);
            }
        }
    }

    /// Fill a rectangle with alpha blending (color is ARGB format)
    pub fn fill_rect_blended(&mut self, rect: Rect, color: u32) {
        let alpha = ((color >> 24) & 0xFF) as f32 / 255.0;
        if alpha <= 0.0 {
            return;
        }
        if alpha >= 1.0 {
            return self.fill_rect(rect, color | 0xFF000000);
        }

        let (x0, y0, x1, y1) = self.span(rect);
        for y in y0..y1 {
            let row_start = y * self.width;
            for x in x0..x1 {
                let idx = row_start + x;
                self.buffer[idx] = blend_colors(self.buffer[idx], color, alpha);
            }
        }
    }

    /// Fill with `color`, blending when it carries alpha
    pub fn paint_rect(&mut self, rect: Rect, color: u32) {
        if (color >> 24) == 0xFF {
            self.fill_rect(rect, color);
        } else {
            self.fill_rect_blended(rect, color);
        }
    }

    /// Set a single pixel (bounds-checked, respects clip rect)
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x >= self.min_x() && x < self.max_x() && y >= self.min_y() && y < self.max_y() {
            self.buffer[y * self.width + x] = color;
        }
    }

    /// Get a single pixel (bounds-checked, returns 0 if out of bounds)
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.buffer[y * self.width + x]
        } else {
            0
        }
    }

    /// Blend a pixel with alpha (ARGB format, alpha in high byte)
    #[inline]
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: u32) {
        let alpha = ((color >> 24) & 0xFF) as u8;
        self.blend_coverage(x as isize, y as isize, color, alpha);
    }

    /// Blend `color` at signed coordinates with an explicit coverage value.
    ///
    /// Used for glyph bitmaps whose origin may lie left of or above the frame.
    #[inline]
    pub fn blend_coverage(&mut self, x: isize, y: isize, color: u32, coverage: u8) {
        if x < 0 || y < 0 || coverage == 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.min_x() || x >= self.max_x() || y < self.min_y() || y >= self.max_y() {
            return;
        }
        let idx = y * self.width + x;
        if coverage == 0xFF {
            self.buffer[idx] = color | 0xFF000000;
        } else {
            self.buffer[idx] = blend_colors(self.buffer[idx], color, coverage as f32 / 255.0);
        }
    }

    /// Horizontal line of the given thickness
    pub fn hline(&mut self, x: f32, y: f32, length: f32, thickness: f32, color: u32) {
        self.fill_rect(Rect::new(x, y, length, thickness.max(1.0)), color);
    }

    /// Vertical line of the given thickness
    pub fn vline(&mut self, x: f32, y: f32, length: f32, thickness: f32, color: u32) {
        self.fill_rect(Rect::new(x, y, thickness.max(1.0), length), color);
    }

    /// Draw a rectangle outline of the given thickness
    pub fn stroke_rect(&mut self, rect: Rect, thickness: f32, color: u32) {
        let t = thickness.max(1.0);
        self.hline(rect.x, rect.y, rect.width, t, color);
        self.hline(rect.x, rect.bottom() - t, rect.width, t, color);
        self.vline(rect.x, rect.y, rect.height, t, color);
        self.vline(rect.right() - t, rect.y, rect.height, t, color);
    }

    /// Fill an isosceles triangle with a horizontal base.
    ///
    /// `pointing_up` puts the apex at the top of `rect`.
    pub fn fill_triangle(&mut self, rect: Rect, pointing_up: bool, color: u32) {
        if rect.is_empty() {
            return;
        }
        let rows = rect.height.ceil() as usize;
        let cx = rect.x + rect.width / 2.0;
        for i in 0..rows {
            // Fraction of the way from apex to base
            let t = (i as f32 + 0.5) / rect.height;
            let half = rect.width * t.min(1.0) / 2.0;
            let y = if pointing_up {
                rect.y + i as f32
            } else {
                rect.bottom() - 1.0 - i as f32
            };
            self.paint_rect(Rect::new(cx - half, y, half * 2.0, 1.0), color);
        }
    }
}
