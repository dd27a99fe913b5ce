//! Glyph rasterization using swash
//!
//! Loads glyph outlines from a parsed face, applies the style transforms that
//! change glyph geometry (italic shear, emboldening), strokes borders for the
//! outline effect and rasterizes anti-aliased coverage bitmaps.
//!
//! Face metrics and glyph advances are reported in 26.6 fixed point. Outlines
//! are kept in floating-point pixels with the y axis pointing up.

use crate::bitmap::{Channels, GlyphBitmap};
use crate::fixed::{self, F26Dot6};
use crate::outline::{self, PixelBox};
use crate::{Result, TextError};
use std::path::Path;
use swash::scale::image::Content;
use swash::scale::outline::Outline;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::zeno::{Cap, Fill, Format, Join, Mask, Stroke, Style};
use swash::{CacheKey, FontRef};

/// Bold widening per pixel of font size
pub const BOLD_ADD_RATE: f32 = 0.02;

/// Horizontal shear applied to synthesize italics
pub const ITALIC_SHEAR: f32 = 0.35;

/// Stroker radius in 26.6 units per unit of requested outline size
pub const STROKER_RADIUS_SCALE: i32 = 24;

/// DPI at which character sizes map one point to one pixel
pub const REFERENCE_DPI: u32 = 72;

/// Fraction of the outline size reserved around a stroked border
pub const OUTLINE_PADDING_SCALE: f32 = 0.5;

/// Embolden strength in whole pixels for a given pixel size, always even
pub fn bold_strength(pixel_size: u32) -> u32 {
    let k = (pixel_size as f32 * BOLD_ADD_RATE + 1.0) as u32;
    if k % 2 == 1 {
        k + 1
    } else {
        k
    }
}

/// An owned, parsed font face
pub struct FontFace {
    data: Vec<u8>,
    index: u32,
    offset: u32,
    key: CacheKey,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    line_gap: i16,
}

impl FontFace {
    pub fn from_data(data: Vec<u8>) -> Result<Self> {
        Self::from_data_with_index(data, 0)
    }

    /// Parse face `index` of a font file or collection
    pub fn from_data_with_index(data: Vec<u8>, index: u32) -> Result<Self> {
        let (units_per_em, ascender, descender, line_gap) = {
            let face = ttf_parser::Face::parse(&data, index)
                .map_err(|e| TextError::FontParseError(e.to_string()))?;
            (
                face.units_per_em(),
                face.ascender(),
                face.descender(),
                face.line_gap(),
            )
        };

        if units_per_em == 0 {
            return Err(TextError::FontParseError("units per em is zero".to_string()));
        }
        let (offset, key) = FontRef::from_index(&data, index as usize)
            .map(|font| (font.offset, font.key))
            .ok_or(TextError::InvalidFontData)?;

        Ok(Self {
            data,
            index,
            offset,
            key,
            units_per_em,
            ascender,
            descender,
            line_gap,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| TextError::FontLoadError(format!("{}: {}", path.display(), e)))?;
        Self::from_data(data)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn face_index(&self) -> u32 {
        self.index
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Borrowed swash view of the face. Reuses the cache key from
    /// construction so scaler caches stay warm across calls.
    pub fn font_ref(&self) -> FontRef<'_> {
        FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        }
    }

    /// Glyph mapped to a code point by the face's character map
    pub fn glyph_id(&self, code_point: u32) -> Option<u16> {
        let c = char::from_u32(code_point)?;
        match self.font_ref().charmap().map(c) {
            0 => None,
            id => Some(id),
        }
    }

    /// Horizontal and vertical advances in pixels at `ppem`. Faces without
    /// vertical metrics get a synthesized vertical advance.
    fn advances(&self, glyph_id: u16, ppem: f32) -> (f32, f32) {
        let metrics = self.font_ref().glyph_metrics(&[]).scale(ppem);
        (metrics.advance_width(glyph_id), metrics.advance_height(glyph_id))
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("index", &self.index)
            .field("units_per_em", &self.units_per_em)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Face metrics at the current character size, in 26.6
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeMetrics {
    /// Pixels per em
    pub ppem: f32,
    pub ascender: F26Dot6,
    /// Negative below the baseline
    pub descender: F26Dot6,
    /// Baseline-to-baseline distance
    pub height: F26Dot6,
}

/// Border stroker configuration (round caps and joins)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stroker {
    outline_size: u32,
    radius: F26Dot6,
}

impl Stroker {
    pub fn new(outline_size: u32) -> Self {
        let radius = i32::try_from(outline_size)
            .unwrap_or(i32::MAX)
            .saturating_mul(STROKER_RADIUS_SCALE);
        Self {
            outline_size,
            radius,
        }
    }

    pub fn outline_size(&self) -> u32 {
        self.outline_size
    }

    pub fn radius(&self) -> F26Dot6 {
        self.radius
    }

    /// Full stroke width in pixels
    pub fn width_px(&self) -> f32 {
        fixed::to_f32(self.radius) * 2.0
    }

    /// Margin added around the glyph box before rasterizing the border
    pub fn padding(&self) -> f32 {
        self.outline_size as f32 * OUTLINE_PADDING_SCALE
    }

    fn style(&self) -> Stroke<'static> {
        let mut stroke = Stroke::new(self.width_px());
        stroke.cap(Cap::Round).join(Join::Round);
        stroke
    }
}

/// Glyph geometry as loaded from the face
#[derive(Clone)]
pub enum GlyphImage {
    /// Scaled outline in pixels, y up
    Outline(Outline),
    /// Embedded bitmap strike with its bearings (y up)
    Bitmap {
        bitmap: GlyphBitmap,
        left: i32,
        top: i32,
    },
}

impl std::fmt::Debug for GlyphImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlyphImage::Outline(outline) => f
                .debug_struct("Outline")
                .field("points", &outline.points().len())
                .field("verbs", &outline.verbs().len())
                .finish(),
            GlyphImage::Bitmap { bitmap, left, top } => f
                .debug_struct("Bitmap")
                .field("bitmap", bitmap)
                .field("left", left)
                .field("top", top)
                .finish(),
        }
    }
}

/// A glyph loaded at the current size, before rasterization
#[derive(Debug, Clone)]
pub struct LoadedGlyph {
    pub code_point: u32,
    pub glyph_id: u16,
    pub image: GlyphImage,
    pub advance_x: F26Dot6,
    pub advance_y: F26Dot6,
    pub vert_advance: F26Dot6,
}

impl LoadedGlyph {
    /// Shear the glyph horizontally in place
    pub fn shear(&mut self, factor: f32) {
        match &mut self.image {
            GlyphImage::Outline(outline) => outline.transform(&outline::italic_transform(factor)),
            GlyphImage::Bitmap { bitmap, left, top } => {
                let (sheared, left_delta) = bitmap.shear_rows(factor, *top);
                *bitmap = sheared;
                *left += left_delta;
            }
        }
    }

    /// Widen the glyph by `strength` and grow its horizontal advance by the
    /// resulting box growth. Returns the (x, y) box growth in 26.6.
    pub fn embolden(&mut self, strength: F26Dot6) -> (F26Dot6, F26Dot6) {
        if strength <= 0 {
            return (0, 0);
        }
        let (dx, dy) = match &mut self.image {
            GlyphImage::Outline(outline) => {
                let Some(before) = outline::outline_bounds(outline) else {
                    return (0, 0);
                };
                // swash offsets each side, so half the strength per side
                let half = fixed::to_f32(strength) / 2.0;
                outline.embolden(half, half);
                let after = outline::outline_bounds(outline).unwrap_or(before);
                (
                    fixed::from_f32(after.width() - before.width()),
                    fixed::from_f32(after.height() - before.height()),
                )
            }
            GlyphImage::Bitmap { bitmap, top, .. } => {
                if bitmap.is_empty() {
                    return (0, 0);
                }
                let k = fixed::trunc(strength).max(0) as u32;
                *bitmap = bitmap.dilate(k, k);
                *top += k as i32;
                (fixed::from_int(k as i32), fixed::from_int(k as i32))
            }
        };
        self.advance_x += fixed::round(dx);
        (dx, dy)
    }
}

/// Rasterized single-channel coverage with bearings (y up)
#[derive(Debug, Clone)]
pub struct RasterizedGlyph {
    pub bitmap: GlyphBitmap,
    /// Offset from the pen position to the left edge
    pub left: i32,
    /// Offset from the baseline to the top edge
    pub top: i32,
}

impl RasterizedGlyph {
    pub fn empty(channels: Channels) -> Self {
        Self {
            bitmap: GlyphBitmap::empty(channels),
            left: 0,
            top: 0,
        }
    }

    pub fn pixel_box(&self) -> PixelBox {
        PixelBox::from_placement(
            self.left,
            self.top,
            self.bitmap.width(),
            self.bitmap.height(),
        )
    }
}

/// Border coverage together with the pixel box it was rasterized into
#[derive(Debug, Clone)]
pub struct StrokedGlyph {
    pub bitmap: GlyphBitmap,
    pub bbox: PixelBox,
}

/// Glyph rasterizer for one font face
///
/// The rasterizer owns its face and scaling state and must only be driven
/// from one thread at a time.
pub struct GlyphRasterizer {
    face: FontFace,
    scale_context: ScaleContext,
    size: Option<SizeMetrics>,
}

impl GlyphRasterizer {
    pub fn new(face: FontFace) -> Self {
        Self {
            face,
            scale_context: ScaleContext::new(),
            size: None,
        }
    }

    pub fn face(&self) -> &FontFace {
        &self.face
    }

    /// Set the character size in 26.6 points at the given resolution. A zero
    /// width means "same as height".
    pub fn set_char_size(
        &mut self,
        char_width: F26Dot6,
        char_height: F26Dot6,
        hdpi: u32,
        vdpi: u32,
    ) -> Result<()> {
        let (points, dpi) = if char_height > 0 {
            (char_height, vdpi)
        } else {
            (char_width, hdpi)
        };
        let ppem = fixed::to_f32(points) * dpi as f32 / REFERENCE_DPI as f32;
        if ppem <= 0.0 {
            return Err(TextError::FontLoadError(format!(
                "invalid character size {}x{} at {}x{} dpi",
                char_width, char_height, hdpi, vdpi
            )));
        }

        let scale = ppem / self.face.units_per_em as f32;
        let ascender = self.face.ascender as f32;
        let descender = self.face.descender as f32;
        let line_gap = self.face.line_gap as f32;

        self.size = Some(SizeMetrics {
            ppem,
            ascender: fixed::ceil(fixed::from_f32(ascender * scale)),
            descender: fixed::floor(fixed::from_f32(descender * scale)),
            height: fixed::round(fixed::from_f32((ascender - descender + line_gap) * scale)),
        });
        Ok(())
    }

    /// Metrics for the current size; zeroed until a size has been set
    pub fn size_metrics(&self) -> SizeMetrics {
        self.size.unwrap_or_default()
    }

    /// Load the glyph for a code point at the current size
    pub fn load_glyph(&mut self, code_point: u32) -> Result<LoadedGlyph> {
        let size = self
            .size
            .ok_or(TextError::UninitializedUse("glyph load before a size was set"))?;
        let glyph_id = self
            .face
            .glyph_id(code_point)
            .ok_or(TextError::GlyphMissing(code_point))?;

        let (hor, ver) = self.face.advances(glyph_id, size.ppem);
        let advance_x = fixed::round(fixed::from_f32(hor));
        let vert_advance = fixed::round(fixed::from_f32(ver));

        let mut scaler = self
            .scale_context
            .builder(self.face.font_ref())
            .size(size.ppem)
            .hint(false)
            .build();

        let image = match scaler.scale_outline(glyph_id) {
            Some(outline) => GlyphImage::Outline(outline),
            None => {
                let strike = Render::new(&[Source::Bitmap(StrikeWith::BestFit)])
                    .format(Format::Alpha)
                    .render(&mut scaler, glyph_id);
                match strike {
                    Some(img) if matches!(img.content, Content::Mask) => GlyphImage::Bitmap {
                        bitmap: GlyphBitmap::from_coverage(
                            img.placement.width,
                            img.placement.height,
                            img.data,
                        )?,
                        left: img.placement.left,
                        top: img.placement.top,
                    },
                    // Nothing to draw (e.g. whitespace)
                    _ => GlyphImage::Outline(Outline::new()),
                }
            }
        };

        Ok(LoadedGlyph {
            code_point,
            glyph_id,
            image,
            advance_x,
            advance_y: 0,
            vert_advance,
        })
    }

    /// Rasterize the fill of a loaded glyph into single-channel coverage
    pub fn render(&self, glyph: &LoadedGlyph) -> Result<RasterizedGlyph> {
        match &glyph.image {
            GlyphImage::Bitmap { bitmap, left, top } => Ok(RasterizedGlyph {
                bitmap: bitmap.clone(),
                left: *left,
                top: *top,
            }),
            GlyphImage::Outline(outline) => {
                let Some(bounds) = outline::outline_bounds(outline) else {
                    return Ok(RasterizedGlyph::empty(Channels::One));
                };
                let pixels = PixelBox::grid_fit(&bounds);
                if pixels.is_empty() {
                    return Ok(RasterizedGlyph::empty(Channels::One));
                }
                let bitmap = render_mask(outline, pixels, Style::Fill(Fill::NonZero))?;
                Ok(RasterizedGlyph {
                    bitmap,
                    left: pixels.x_min,
                    top: pixels.y_max,
                })
            }
        }
    }

    /// Rasterize the outside border of a glyph: the fill expanded by the
    /// stroke. Bitmap-only glyphs have no outline to stroke and fail.
    pub fn stroke_border(&self, glyph: &LoadedGlyph, stroker: &Stroker) -> Result<StrokedGlyph> {
        let GlyphImage::Outline(outline) = &glyph.image else {
            return Err(TextError::OutlineRasterizationFailure(glyph.code_point));
        };
        let Some(bounds) = outline::outline_bounds(outline) else {
            return Ok(StrokedGlyph {
                bitmap: GlyphBitmap::empty(Channels::One),
                bbox: PixelBox::default(),
            });
        };

        let bbox = PixelBox::grid_fit(&outline::expand_bounds(&bounds, stroker.padding()));
        let mut border = render_mask(outline, bbox, Style::Fill(Fill::NonZero))?;
        let stroke = render_mask(outline, bbox, Style::Stroke(stroker.style()))?;
        border.max_with(&stroke);

        Ok(StrokedGlyph {
            bitmap: border,
            bbox,
        })
    }
}

/// Rasterize `outline` into a bitmap covering exactly `pixels`
fn render_mask(outline: &Outline, pixels: PixelBox, style: Style<'_>) -> Result<GlyphBitmap> {
    let (data, _placement) = Mask::new(outline.path())
        .style(style)
        .transform(Some(outline::mask_transform(&pixels)))
        .format(Format::Alpha)
        .size(pixels.width(), pixels.height())
        .render();

    GlyphBitmap::from_coverage(pixels.width(), pixels.height(), data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_FONT: &[u8] = include_bytes!("../fonts/DejaVuSansMono.ttf");

    fn rasterizer(pixel_size: i32) -> GlyphRasterizer {
        let face = FontFace::from_data(TEST_FONT.to_vec()).unwrap();
        let mut rasterizer = GlyphRasterizer::new(face);
        rasterizer
            .set_char_size(
                fixed::from_int(pixel_size),
                fixed::from_int(pixel_size),
                REFERENCE_DPI,
                REFERENCE_DPI,
            )
            .unwrap();
        rasterizer
    }

    #[test]
    fn test_bold_strength_is_even() {
        assert_eq!(bold_strength(16), 2);
        assert_eq!(bold_strength(32), 2);
        assert_eq!(bold_strength(60), 2);
        assert_eq!(bold_strength(120), 4);
    }

    #[test]
    fn test_invalid_font_data() {
        assert!(FontFace::from_data(vec![0, 1, 2, 3]).is_err());
        assert!(FontFace::from_data(Vec::new()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = FontFace::from_file("/nonexistent/font.ttf");
        assert!(matches!(result, Err(TextError::FontLoadError(_))));
    }

    #[test]
    fn test_size_metrics() {
        let metrics = rasterizer(32).size_metrics();

        assert_eq!(metrics.ppem, 32.0);
        assert!(metrics.ascender > 0);
        assert!(metrics.descender < 0);
        assert_eq!(metrics.ascender % 64, 0);
        assert_eq!(metrics.descender % 64, 0);
        assert_eq!(metrics.height % 64, 0);
        assert!(metrics.height >= metrics.ascender - metrics.descender - 64);
    }

    #[test]
    fn test_zero_size_rejected() {
        let face = FontFace::from_data(TEST_FONT.to_vec()).unwrap();
        let mut rasterizer = GlyphRasterizer::new(face);
        assert!(rasterizer.set_char_size(0, 0, REFERENCE_DPI, REFERENCE_DPI).is_err());
    }

    #[test]
    fn test_load_before_size_is_uninitialized() {
        let face = FontFace::from_data(TEST_FONT.to_vec()).unwrap();
        let mut rasterizer = GlyphRasterizer::new(face);
        let result = rasterizer.load_glyph('A' as u32);
        assert!(matches!(result, Err(TextError::UninitializedUse(_))));
    }

    #[test]
    fn test_load_and_render_glyph() {
        let mut rasterizer = rasterizer(32);
        let glyph = rasterizer.load_glyph('A' as u32).unwrap();

        assert!(glyph.advance_x > 0);
        assert_eq!(glyph.advance_x % 64, 0);
        assert!(glyph.vert_advance > 0);

        let raster = rasterizer.render(&glyph).unwrap();
        assert!(!raster.bitmap.is_empty());
        assert!(raster.top > 0);
        assert!(raster.bitmap.data().iter().any(|&v| v > 0));
    }

    #[test]
    fn test_unmapped_code_point_is_missing() {
        let mut rasterizer = rasterizer(16);
        assert!(matches!(
            rasterizer.load_glyph(0x10FFFD),
            Err(TextError::GlyphMissing(0x10FFFD))
        ));
        // Surrogates are not characters
        assert!(matches!(
            rasterizer.load_glyph(0xD800),
            Err(TextError::GlyphMissing(_))
        ));
    }

    #[test]
    fn test_space_renders_empty() {
        let mut rasterizer = rasterizer(16);
        let glyph = rasterizer.load_glyph(' ' as u32).unwrap();
        let raster = rasterizer.render(&glyph).unwrap();

        assert!(glyph.advance_x > 0);
        assert!(raster.bitmap.is_empty());
    }

    #[test]
    fn test_bold_widens_glyph_and_advance() {
        let mut rasterizer = rasterizer(32);
        let regular = rasterizer.load_glyph('H' as u32).unwrap();
        let mut bold = regular.clone();
        let (dx, _) = bold.embolden(fixed::from_int(bold_strength(32) as i32));

        assert!(dx > 0);
        assert!(bold.advance_x > regular.advance_x);

        let regular_box = rasterizer.render(&regular).unwrap().pixel_box();
        let bold_box = rasterizer.render(&bold).unwrap().pixel_box();
        assert!(bold_box.width() > regular_box.width());
    }

    #[test]
    fn test_italic_leans_right() {
        let mut rasterizer = rasterizer(32);
        let upright = rasterizer.load_glyph('l' as u32).unwrap();
        let mut italic = upright.clone();
        italic.shear(ITALIC_SHEAR);

        let upright_box = rasterizer.render(&upright).unwrap().pixel_box();
        let italic_box = rasterizer.render(&italic).unwrap().pixel_box();
        assert!(italic_box.x_max > upright_box.x_max);
        assert_eq!(italic.advance_x, upright.advance_x);
    }

    #[test]
    fn test_border_encloses_fill() {
        let mut rasterizer = rasterizer(32);
        let glyph = rasterizer.load_glyph('O' as u32).unwrap();
        let stroker = Stroker::new(4);

        let fill = rasterizer.render(&glyph).unwrap().pixel_box();
        let border = rasterizer.stroke_border(&glyph, &stroker).unwrap();

        assert!(border.bbox.x_min < fill.x_min);
        assert!(border.bbox.y_max > fill.y_max);
        assert_eq!(border.bitmap.width(), border.bbox.width());
        assert_eq!(border.bitmap.height(), border.bbox.height());
        assert!(border.bitmap.data().iter().any(|&v| v == 255));
    }

    #[test]
    fn test_bold_border_encloses_bold_fill() {
        let mut rasterizer = rasterizer(32);
        let mut glyph = rasterizer.load_glyph('O' as u32).unwrap();
        glyph.embolden(fixed::from_int(bold_strength(32) as i32));

        let fill = rasterizer.render(&glyph).unwrap().pixel_box();
        let border = rasterizer.stroke_border(&glyph, &Stroker::new(4)).unwrap().bbox;

        assert!(border.x_min < fill.x_min);
        assert!(border.y_min < fill.y_min);
        assert!(border.x_max > fill.x_max);
        assert!(border.y_max > fill.y_max);
    }

    #[test]
    fn test_stroker_geometry() {
        let stroker = Stroker::new(4);
        assert_eq!(stroker.radius(), 96);
        assert_eq!(stroker.width_px(), 3.0);
        assert_eq!(stroker.padding(), 2.0);
    }

    #[test]
    fn test_stroker_radius_saturates() {
        let stroker = Stroker::new(u32::MAX);
        assert_eq!(stroker.radius(), i32::MAX);
        assert!(Stroker::new(1 << 28).radius() > 0);
    }

    #[test]
    fn test_charmap_lookup() {
        let face = FontFace::from_data(TEST_FONT.to_vec()).unwrap();
        let a = face.glyph_id('A' as u32).unwrap();
        assert_ne!(a, 0);
        assert_eq!(face.glyph_id('A' as u32), Some(a));
        assert_ne!(face.glyph_id('B' as u32), Some(a));
        assert_eq!(face.glyph_id(0x10FFFD), None);
    }

    #[test]
    fn test_advances_scale_with_size() {
        let face = FontFace::from_data(TEST_FONT.to_vec()).unwrap();
        let id = face.glyph_id('M' as u32).unwrap();
        let (small, _) = face.advances(id, 16.0);
        let (large, vertical) = face.advances(id, 32.0);

        assert!(small > 0.0);
        assert!((large - small * 2.0).abs() < 1e-3);
        assert!(vertical > 0.0);
    }

    #[test]
    fn test_bitmap_glyph_cannot_be_stroked() {
        let glyph = LoadedGlyph {
            code_point: 'x' as u32,
            glyph_id: 1,
            image: GlyphImage::Bitmap {
                bitmap: GlyphBitmap::new(2, 2, Channels::One),
                left: 0,
                top: 2,
            },
            advance_x: 128,
            advance_y: 0,
            vert_advance: 128,
        };
        let rasterizer = rasterizer(16);
        assert!(matches!(
            rasterizer.stroke_border(&glyph, &Stroker::new(2)),
            Err(TextError::OutlineRasterizationFailure(_))
        ));
    }
}
