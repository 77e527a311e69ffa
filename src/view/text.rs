//! Text measurement and drawing
//!
//! The renderer never owns a font directly: it talks to a [`TextRenderer`]
//! injected at construction. [`FontdueText`] rasterizes real glyphs with a
//! per-size glyph cache; [`MonospaceText`] is a font-free stand-in with fixed
//! advances, used headless and in tests.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings, Metrics};

use crate::error::{GridError, Result};
use crate::theme::FontStyle;

use super::frame::Frame;

/// Appended when text is truncated to fit
pub const ELLIPSIS: &str = "…";

pub type GlyphCacheKey = (char, u32);
pub type GlyphCache = HashMap<GlyphCacheKey, (Metrics, Vec<u8>)>;

/// Measures and paints single-line text in device pixels
pub trait TextRenderer: std::fmt::Debug {
    /// Advance width of `text`
    fn measure(&mut self, text: &str, style: FontStyle) -> f32;

    /// Height of one line box
    fn line_height(&mut self, style: FontStyle) -> f32;

    /// Paint `text` with the top of its line box at `y`
    fn draw(&mut self, frame: &mut Frame, x: f32, y: f32, text: &str, style: FontStyle, color: u32);
}

/// Truncate `text` with an ellipsis so that it measures at most `max_width`.
///
/// Returns the input unchanged when it already fits and an empty string
/// when not even the ellipsis fits.
pub fn fit_text<'a>(
    text: &mut dyn TextRenderer,
    content: &'a str,
    max_width: f32,
    style: FontStyle,
) -> Cow<'a, str> {
    if max_width <= 0.0 || content.is_empty() {
        return Cow::Borrowed("");
    }
    if text.measure(content, style) <= max_width {
        return Cow::Borrowed(content);
    }
    if text.measure(ELLIPSIS, style) > max_width {
        return Cow::Borrowed("");
    }

    let boundaries: Vec<usize> = content.char_indices().map(|(i, _)| i).collect();
    // Largest prefix (in chars) whose ellipsized form fits
    let (mut lo, mut hi) = (0usize, boundaries.len() - 1);
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        let candidate = format!("{}{}", &content[..boundaries[mid]], ELLIPSIS);
        if text.measure(&candidate, style) <= max_width {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    let prefix = &content[..boundaries[lo]];
    Cow::Owned(format!("{}{}", prefix.trim_end(), ELLIPSIS))
}

/// Font-free renderer with a fixed advance per character.
///
/// Glyphs are drawn as solid bars ("greeked"), enough to see layout in a
/// headless render without any font file.
#[derive(Debug, Clone)]
pub struct MonospaceText {
    /// Advance as a fraction of the font size
    pub advance_ratio: f32,
    /// Line box height as a fraction of the font size
    pub line_ratio: f32,
}

impl MonospaceText {
    pub fn new() -> Self {
        Self {
            advance_ratio: 0.6,
            line_ratio: 1.25,
        }
    }
}

impl Default for MonospaceText {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRenderer for MonospaceText {
    fn measure(&mut self, text: &str, style: FontStyle) -> f32 {
        text.chars().count() as f32 * style.size * self.advance_ratio
    }

    fn line_height(&mut self, style: FontStyle) -> f32 {
        (style.size * self.line_ratio).ceil()
    }

    fn draw(&mut self, frame: &mut Frame, x: f32, y: f32, text: &str, style: FontStyle, color: u32) {
        let advance = style.size * self.advance_ratio;
        let line = self.line_height(style);
        let glyph_h = (style.size * 0.5).max(1.0);
        let top = y + (line - glyph_h) / 2.0;
        let bar = if style.is_bold() { 0.8 } else { 0.6 };
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let gx = x + i as f32 * advance + advance * (1.0 - bar) / 2.0;
            frame.fill_rect(
                crate::geometry::Rect::new(gx, top, advance * bar, glyph_h),
                color | 0xFF000000,
            );
        }
    }
}

/// Glyph rasterizer backed by a TrueType/OpenType font
pub struct FontdueText {
    font: Font,
    glyph_cache: GlyphCache,
}

impl std::fmt::Debug for FontdueText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontdueText")
            .field("font", &self.font.name())
            .field("cached_glyphs", &self.glyph_cache.len())
            .finish()
    }
}

/// Fonts tried by [`FontdueText::system_default`], in order
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

impl FontdueText {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| GridError::Font(e.to_string()))?;
        Ok(Self {
            font,
            glyph_cache: HashMap::new(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| GridError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!("Loaded font from {}", path.display());
        Self::from_bytes(&bytes)
    }

    /// First readable font from a list of common system locations
    pub fn system_default() -> Result<Self> {
        SYSTEM_FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .filter(|p| p.exists())
            .find_map(|p| Self::load(&p).ok())
            .ok_or_else(|| GridError::Font("no usable system font found".to_string()))
    }

    pub fn glyph_cache_size(&self) -> usize {
        self.glyph_cache.len()
    }

    /// Horizontal offset of the second pass used to embolden regular faces
    fn bold_offset(style: FontStyle) -> f32 {
        if style.is_bold() {
            (style.size / 16.0).round().max(1.0)
        } else {
            0.0
        }
    }

    fn glyph(&mut self, ch: char, size: f32) -> &(Metrics, Vec<u8>) {
        let font = &self.font;
        self.glyph_cache
            .entry((ch, size.to_bits()))
            .or_insert_with(|| font.rasterize(ch, size))
    }

    fn ascent(&self, size: f32) -> f32 {
        self.font
            .horizontal_line_metrics(size)
            .map_or(size * 0.8, |m| m.ascent)
    }
}

impl TextRenderer for FontdueText {
    fn measure(&mut self, text: &str, style: FontStyle) -> f32 {
        let mut width = 0.0;
        for ch in text.chars() {
            width += self.glyph(ch, style.size).0.advance_width;
        }
        width + Self::bold_offset(style)
    }

    fn line_height(&mut self, style: FontStyle) -> f32 {
        self.font
            .horizontal_line_metrics(style.size)
            .map_or(style.size * 1.25, |m| m.new_line_size)
            .ceil()
    }

    fn draw(&mut self, frame: &mut Frame, x: f32, y: f32, text: &str, style: FontStyle, color: u32) {
        let baseline = (y + self.ascent(style.size)).round();
        let passes = if style.is_bold() { 2 } else { 1 };

        for dx in [0.0, Self::bold_offset(style)].into_iter().take(passes) {
            let mut current_x = x + dx;
            for ch in text.chars() {
                let (metrics, bitmap) = self.glyph(ch, style.size);
                let glyph_top = baseline - metrics.height as f32 - metrics.ymin as f32;

                for bitmap_y in 0..metrics.height {
                    for bitmap_x in 0..metrics.width {
                        let Some(&alpha) = bitmap.get(bitmap_y * metrics.width + bitmap_x) else {
                            continue;
                        };
                        let px = current_x as isize + bitmap_x as isize + metrics.xmin as isize;
                        let py = (glyph_top + bitmap_y as f32) as isize;
                        frame.blend_coverage(px, py, color, alpha);
                    }
                }

                current_x += metrics.advance_width;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLE: FontStyle = FontStyle::new(10.0, 400);

    #[test]
    fn test_fit_text_keeps_short_text() {
        let mut text = MonospaceText::new();
        assert_eq!(fit_text(&mut text, "abc", 100.0, STYLE), "abc");
        assert!(matches!(fit_text(&mut text, "abc", 18.0, STYLE), Cow::Borrowed(_)));
    }

    #[test]
    fn test_fit_text_truncates_with_ellipsis() {
        let mut text = MonospaceText::new();
        // 6px per char: 5 chars fit in 30px, so 4 chars + ellipsis
        let fitted = fit_text(&mut text, "abcdefghij", 30.0, STYLE);
        assert_eq!(fitted, "abcd…");
        assert!(text.measure(&fitted, STYLE) <= 30.0);
    }

    #[test]
    fn test_fit_text_degenerate_widths() {
        let mut text = MonospaceText::new();
        assert_eq!(fit_text(&mut text, "abcdef", 5.0, STYLE), "");
        assert_eq!(fit_text(&mut text, "abcdef", 0.0, STYLE), "");
        assert_eq!(fit_text(&mut text, "abcdef", 6.0, STYLE), "…");
    }

    #[test]
    fn test_fit_text_multibyte_boundaries() {
        let mut text = MonospaceText::new();
        let fitted = fit_text(&mut text, "äöüßéè", 24.0, STYLE);
        assert_eq!(fitted, "äöü…");
    }

    #[test]
    fn test_monospace_draw_paints_inside_line_box() {
        let mut buffer = vec![0u32; 40 * 20];
        let mut frame = Frame::new(&mut buffer, 40, 20);
        let mut text = MonospaceText::new();
        text.draw(&mut frame, 0.0, 0.0, "a b", STYLE, 0xFF000000);
        let painted = (0..40 * 20)
            .filter(|i| frame.get_pixel(i % 40, i / 40) != 0)
            .count();
        assert!(painted > 0);
        // Nothing below the line box
        assert!((0..40).all(|x| frame.get_pixel(x, 19) == 0));
    }
}
