//! Glyph cache
//!
//! Rendered glyphs are cached per fingerprint: every style axis that changes
//! the produced bitmap is part of the key, so changing a font's style between
//! calls misses instead of returning a stale render. Entries live until
//! [`GlyphCache::clear_all`]; there is no eviction.

use crate::context::{PixelFormat, TextureRef};
use crate::fixed::F26Dot6;
use crate::font::FontId;
use lumen_core::lock;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Cache key covering every rendering input of a glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlyphFingerprint {
    pub font_id: FontId,
    pub pixel_size: u32,
    pub code_point: u32,
    pub outline_size: u32,
    pub bold: bool,
    pub italic: bool,
    pub shadow: bool,
    pub shadow_blur_radius: u32,
}

/// Placement and advance of a cached glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphMetrics {
    /// Pen position to bitmap left edge, in pixels
    pub left: i32,
    /// Baseline to bitmap top edge, in pixels
    pub top: i32,
    /// 26.6
    pub advance_x: F26Dot6,
    /// 26.6
    pub advance_y: F26Dot6,
    /// 26.6
    pub vert_advance: F26Dot6,
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
}

/// A rendered glyph and its uploaded texture
#[derive(Debug)]
pub struct CachedGlyph {
    pub metrics: GlyphMetrics,
    pub format: PixelFormat,
    texture: Mutex<Option<TextureRef>>,
}

impl CachedGlyph {
    pub fn new(metrics: GlyphMetrics, format: PixelFormat, texture: Option<TextureRef>) -> Self {
        Self {
            metrics,
            format,
            texture: Mutex::new(texture),
        }
    }

    /// Texture to draw, or `None` for empty glyphs and released entries
    pub fn texture(&self) -> Option<TextureRef> {
        lock(&self.texture).clone()
    }

    /// Drop this entry's texture reference
    pub fn release_texture(&self) {
        let texture = lock(&self.texture).take();
        drop(texture);
    }
}

/// Glyph cache shared by every font of a [`crate::FontManager`]
pub type SharedGlyphCache = Arc<Mutex<GlyphCache>>;

#[derive(Debug, Default)]
pub struct GlyphCache {
    entries: BTreeMap<GlyphFingerprint, Arc<CachedGlyph>>,
    hits: u64,
    misses: u64,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// New cache behind a shared handle
    pub fn shared() -> SharedGlyphCache {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn lookup(&mut self, fingerprint: &GlyphFingerprint) -> Option<Arc<CachedGlyph>> {
        match self.entries.get(fingerprint) {
            Some(glyph) => {
                self.hits += 1;
                tracing::trace!("Glyph cache hit: {:?}", fingerprint);
                Some(Arc::clone(glyph))
            }
            None => {
                self.misses += 1;
                tracing::trace!("Glyph cache miss: {:?}", fingerprint);
                None
            }
        }
    }

    pub fn contains(&self, fingerprint: &GlyphFingerprint) -> bool {
        self.entries.contains_key(fingerprint)
    }

    /// Insert a freshly rendered glyph.
    ///
    /// Callers look up first. If an entry already exists it is kept and
    /// returned, and the new glyph is discarded.
    pub fn insert(&mut self, fingerprint: GlyphFingerprint, glyph: CachedGlyph) -> Arc<CachedGlyph> {
        match self.entries.entry(fingerprint) {
            std::collections::btree_map::Entry::Occupied(existing) => {
                tracing::warn!("Glyph already cached, keeping existing entry: {:?}", fingerprint);
                Arc::clone(existing.get())
            }
            std::collections::btree_map::Entry::Vacant(slot) => Arc::clone(slot.insert(Arc::new(glyph))),
        }
    }

    /// Release every texture, then drop every entry
    pub fn clear_all(&mut self) {
        for glyph in self.entries.values() {
            glyph.release_texture();
        }
        let count = self.entries.len();
        self.entries.clear();
        tracing::debug!("Cleared {} cached glyphs", count);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
