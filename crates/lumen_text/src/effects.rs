//! Effect compositing
//!
//! Combines the fill coverage of a glyph with its stroked border into a
//! two-channel bitmap and pads glyph bitmaps for drop-shadow drawing. The
//! shadow itself is blurred by the GPU context at draw time; here we only
//! reserve the margin the blur spills into.

use crate::bitmap::{Channels, GlyphBitmap};
use crate::rasterizer::{RasterizedGlyph, StrokedGlyph};
use lumen_core::Color;

/// Channel holding the border coverage in two-channel bitmaps
pub const OUTLINE_CHANNEL: usize = 0;

/// Channel holding the fill coverage in two-channel bitmaps
pub const FILL_CHANNEL: usize = 1;

/// Resolved drop-shadow state of a font
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowStyle {
    pub enabled: bool,
    pub color: Color,
    pub blur_radius: u32,
    pub offset: [f32; 2],
}

impl ShadowStyle {
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            color: Color::TRANSPARENT,
            blur_radius: 0,
            offset: [0.0, 0.0],
        }
    }
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Merge fill and border coverage into one two-channel bitmap covering the
/// union of both boxes. Channel 0 is the border, channel 1 the fill; each
/// source keeps its own position relative to the baseline.
pub fn composite_outline(fill: RasterizedGlyph, border: StrokedGlyph) -> RasterizedGlyph {
    let fill_box = fill.pixel_box();
    let border_box = border.bbox;

    let union = match (fill_box.is_empty(), border_box.is_empty()) {
        (true, true) => return RasterizedGlyph::empty(Channels::Two),
        (true, false) => border_box,
        (false, true) => fill_box,
        (false, false) => fill_box.union(&border_box),
    };

    let mut out = GlyphBitmap::new(union.width(), union.height(), Channels::Two);
    if !border_box.is_empty() {
        out.blit_channel(
            &border.bitmap,
            border_box.x_min - union.x_min,
            union.y_max - border_box.y_max,
            OUTLINE_CHANNEL,
        );
    }
    if !fill_box.is_empty() {
        out.blit_channel(
            &fill.bitmap,
            fill_box.x_min - union.x_min,
            union.y_max - fill_box.y_max,
            FILL_CHANNEL,
        );
    }

    RasterizedGlyph {
        bitmap: out,
        left: union.x_min,
        top: union.y_max,
    }
}

/// Largest blur radius a shadow pads for
pub const MAX_SHADOW_BLUR: u32 = 256;

/// Pad a glyph bitmap by the blur radius on every side for shadow drawing.
///
/// The padding is transparent and the channel layout is kept. The top
/// bearing grows by the radius; the left bearing is left alone.
pub fn apply_drop_shadow(glyph: RasterizedGlyph, shadow: &ShadowStyle) -> RasterizedGlyph {
    if !shadow.enabled || glyph.bitmap.is_empty() {
        return glyph;
    }

    let blur = shadow.blur_radius.min(MAX_SHADOW_BLUR);
    let src = &glyph.bitmap;
    let mut padded = GlyphBitmap::new(
        src.width().saturating_add(blur * 2),
        src.height().saturating_add(blur * 2),
        src.channels(),
    );
    padded.copy_from(src, blur, blur);

    RasterizedGlyph {
        bitmap: padded,
        left: glyph.left,
        top: glyph.top.saturating_add(blur as i32),
    }
}
