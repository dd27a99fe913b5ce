//! Text rendering for the Lumen scene graph
//!
//! This crate provides:
//! - Font resources with async loading and reference-counted lifetime
//! - Glyph rasterization (outline loading, italic shear, emboldening, stroking)
//! - Effect compositing (two-channel outline + fill bitmaps, drop-shadow padding)
//! - A glyph cache keyed on every style axis that affects rendering
//! - A font manager that deduplicates loads and prefers local font overrides
//!
//! GPU texture creation and drawing, downloads, and the UI-thread task queue
//! are collaborators reached through [`RenderContext`], [`ResourceLoader`] and
//! [`lumen_core::TaskQueue`].

pub mod bitmap;
pub mod cache;
pub mod config;
pub mod context;
pub mod effects;
pub mod fixed;
pub mod font;
pub mod loader;
pub mod manager;
pub mod metrics;
pub mod outline;
pub mod rasterizer;
pub mod system;

pub use bitmap::{Channels, GlyphBitmap};
pub use cache::{CachedGlyph, GlyphCache, GlyphFingerprint, GlyphMetrics, SharedGlyphCache};
pub use config::FontConfig;
pub use context::{LabelColors, PixelFormat, Quad, RenderContext, Texture, TextureRef};
pub use effects::{apply_drop_shadow, composite_outline, ShadowStyle, MAX_SHADOW_BLUR};
pub use font::{
    DropShadow, FontId, FontResource, FontServices, SharedFont, TextStyle, MAX_OUTLINE_SIZE,
};
pub use loader::{
    Download, DownloadCallback, DownloadRequest, LoadOutcome, OfflineLoader, ResourceLoader,
    ResourceStatus,
};
pub use manager::FontManager;
pub use metrics::{FontMetrics, TextMeasurement, TextMetrics};
pub use outline::PixelBox;
pub use rasterizer::{
    FontFace, GlyphImage, GlyphRasterizer, LoadedGlyph, RasterizedGlyph, SizeMetrics,
    StrokedGlyph, Stroker,
};
pub use system::SystemFonts;

use thiserror::Error;

/// Text rendering errors
#[derive(Error, Debug)]
pub enum TextError {
    #[error("Failed to load font: {0}")]
    FontLoadError(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Glyph not found for code point: U+{0:04X}")]
    GlyphMissing(u32),

    #[error("Failed to rasterize outline for code point: U+{0:04X}")]
    OutlineRasterizationFailure(u32),

    #[error("Font used before it was initialized: {0}")]
    UninitializedUse(&'static str),

    #[error("Invalid font data")]
    InvalidFontData,

    #[error("Download failed: {0}")]
    DownloadError(String),
}

pub type Result<T> = std::result::Result<T, TextError>;
