//! GPU context collaborator
//!
//! Texture upload and drawing live outside this crate. The text renderer
//! reaches them through [`RenderContext`] and holds uploaded glyphs as
//! [`TextureRef`]s; dropping the last reference releases the GPU texture.

use lumen_core::Color;
use std::sync::Arc;

/// Texture pixel layouts used for glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One 8-bit coverage channel
    Alpha,
    /// Two interleaved 8-bit channels (outline, fill)
    DualAlpha,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Alpha => 1,
            PixelFormat::DualAlpha => 2,
        }
    }
}

/// An uploaded GPU texture
pub trait Texture: Send + Sync + std::fmt::Debug {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn format(&self) -> PixelFormat;
}

/// Shared handle to an uploaded texture
pub type TextureRef = Arc<dyn Texture>;

/// Destination rectangle in context coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quad {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Quad {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Colors applied when drawing a glyph texture
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LabelColors {
    pub fill: Color,
    pub gradient: Option<Color>,
    pub stroke: Option<Color>,
}

/// The GPU drawing surface text is rendered onto
pub trait RenderContext {
    /// Upload a coverage buffer. `stride_w`/`stride_h` give the buffer's
    /// allocated dimensions in pixels.
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        stride_w: u32,
        stride_h: u32,
        pixels: &[u8],
        format: PixelFormat,
    ) -> TextureRef;

    /// Draw a glyph texture tinted with `colors`
    fn draw_label_image(&mut self, quad: Quad, texture: &TextureRef, flip: bool, colors: &LabelColors);

    /// Draw a blurred shadow of a glyph texture
    fn draw_texture_shadow(
        &mut self,
        quad: Quad,
        texture: &TextureRef,
        flip: bool,
        blur_radius: f32,
        color: Color,
    );

    /// Debug overlay line
    fn draw_diag_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Color);
}
