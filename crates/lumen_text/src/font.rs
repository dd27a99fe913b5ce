//! Font resources
//!
//! A [`FontResource`] is one font face plus the style state used for its next
//! measure or render call. Style is call-scoped: every render call applies the
//! caller's style before laying out glyphs, and the glyph cache key covers
//! every style axis.
//!
//! Fonts are shared as [`SharedFont`]. Loading is asynchronous: completion is
//! reported through the UI [`TaskQueue`] by a pending-load token that keeps
//! the font alive until the task runs or is removed from the queue. Dropping
//! the last reference tears the font down and removes whatever the queue
//! still holds for it.

use crate::cache::{CachedGlyph, GlyphCache, GlyphFingerprint, GlyphMetrics, SharedGlyphCache};
use crate::context::{LabelColors, PixelFormat, Quad, RenderContext};
use crate::effects::{apply_drop_shadow, composite_outline, ShadowStyle, MAX_SHADOW_BLUR};
use crate::fixed;
use crate::loader::{
    is_remote_url, Download, DownloadRequest, LoadOutcome, OfflineLoader, ResourceLoader,
    ResourceStatus,
};
use crate::manager::FontRegistry;
use crate::metrics::{FontMetrics, TextMeasurement, TextMetrics};
use crate::rasterizer::{
    bold_strength, FontFace, GlyphRasterizer, Stroker, ITALIC_SHEAR, REFERENCE_DPI,
};
use crate::system::SystemFonts;
use crate::{bitmap::Channels, Result, TextError};
use lumen_core::{lock, Color, TaskQueue, TaskTarget};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Weak};

static NEXT_FONT_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique font identity, assigned in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontId(u32);

impl FontId {
    fn next() -> Self {
        Self(NEXT_FONT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Task queue key for work targeting this font
    pub const fn target(self) -> TaskTarget {
        TaskTarget::new(self.0 as u64)
    }
}

/// Shared handle to a font resource
pub type SharedFont = Arc<Mutex<FontResource>>;

type ReadyCallback = Box<dyn FnOnce(LoadOutcome) + Send + 'static>;

/// Collaborators a font uses while loading and rendering
#[derive(Clone)]
pub struct FontServices {
    pub cache: SharedGlyphCache,
    pub tasks: TaskQueue,
    pub loader: Arc<dyn ResourceLoader>,
    /// Used when a font marked for system fallback cannot be read
    pub system_fonts: Option<Arc<SystemFonts>>,
    /// Pixel size applied once a face is loaded
    pub default_pixel_size: u32,
}

impl FontServices {
    /// Services with a fresh glyph cache, no network and no system fallback
    pub fn new(tasks: TaskQueue) -> Self {
        Self {
            cache: GlyphCache::shared(),
            tasks,
            loader: Arc::new(OfflineLoader),
            system_fonts: None,
            default_pixel_size: 16,
        }
    }

    pub fn with_cache(mut self, cache: SharedGlyphCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_system_fonts(mut self, system_fonts: Arc<SystemFonts>) -> Self {
        self.system_fonts = Some(system_fonts);
        self
    }

    pub fn with_default_pixel_size(mut self, pixel_size: u32) -> Self {
        self.default_pixel_size = pixel_size;
        self
    }
}

impl std::fmt::Debug for FontServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontServices")
            .field("tasks", &self.tasks)
            .field("system_fonts", &self.system_fonts.is_some())
            .field("default_pixel_size", &self.default_pixel_size)
            .finish()
    }
}

/// Drop shadow requested by a render call
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DropShadow {
    pub enabled: bool,
    pub color: Option<Color>,
    pub offset: [f32; 2],
    pub blur_radius: u32,
}

/// Style applied by [`FontResource::render_text`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub scale_x: f32,
    pub scale_y: f32,
    pub colors: LabelColors,
    /// Outline (stroke) width; zero disables the outline
    pub outline_size: u32,
    pub bold: bool,
    pub italic: bool,
    pub shadow: DropShadow,
    /// Draw the first line's baseline when the pen sits at x = 0
    pub debug_baseline: bool,
    /// Length of the debug baseline
    pub max_width: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            colors: LabelColors::default(),
            outline_size: 0,
            bold: false,
            italic: false,
            shadow: DropShadow::default(),
            debug_baseline: false,
            max_width: 0.0,
        }
    }
}

/// Shadows this faint are not drawn
const MIN_SHADOW_ALPHA: f32 = 0.01;

/// Shadow quads are nudged by this many pixels past the requested offset
const SHADOW_NUDGE: [f32; 2] = [1.0, 2.0];

/// Extra blur handed to the context on top of the padded radius
const SHADOW_EXTRA_BLUR: f32 = 2.0;

/// Largest outline size accepted from callers
pub const MAX_OUTLINE_SIZE: u32 = 256;

enum PendingOutcome {
    Settled(LoadOutcome),
    Downloaded(std::result::Result<Download, TextError>),
}

/// Queued load completion. Holds the font open until it runs or is dropped
/// from the queue.
struct PendingLoad {
    font: SharedFont,
    outcome: PendingOutcome,
}

impl PendingLoad {
    fn post(font: SharedFont, outcome: PendingOutcome, tasks: &TaskQueue, target: TaskTarget) {
        let pending = PendingLoad { font, outcome };
        tasks.add_task(target, move || pending.run());
    }

    fn run(self) {
        let PendingLoad { font, outcome } = self;
        let (outcome, listeners) = {
            let mut resource = lock(&font);
            let outcome = match outcome {
                PendingOutcome::Settled(outcome) => outcome,
                PendingOutcome::Downloaded(result) => resource.finish_download(result),
            };
            resource.download = None;
            resource.settled = Some(outcome);
            (outcome, std::mem::take(&mut resource.listeners))
        };

        tracing::debug!("Font load settled: {:?}", outcome);
        for listener in listeners {
            listener(outcome);
        }
    }
}

/// A font face with its per-call style state
pub struct FontResource {
    id: FontId,
    url: String,
    services: FontServices,
    registry: Weak<FontRegistry>,
    system_fallback: bool,

    rasterizer: Option<GlyphRasterizer>,
    stroker: Option<Stroker>,

    pixel_size: u32,
    bold: bool,
    italic: bool,
    outline_size: u32,
    shadow: ShadowStyle,

    status: ResourceStatus,
    settled: Option<LoadOutcome>,
    listeners: Vec<ReadyCallback>,
    download: Option<Box<dyn DownloadRequest>>,
}

impl FontResource {
    pub fn new(url: impl Into<String>, services: FontServices) -> Self {
        Self {
            id: FontId::next(),
            url: url.into(),
            services,
            registry: Weak::new(),
            system_fallback: false,
            rasterizer: None,
            stroker: None,
            pixel_size: 0,
            bold: false,
            italic: false,
            outline_size: 0,
            shadow: ShadowStyle::disabled(),
            status: ResourceStatus::Pending,
            settled: None,
            listeners: Vec::new(),
            download: None,
        }
    }

    pub(crate) fn with_registry(mut self, registry: Weak<FontRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub(crate) fn with_system_fallback(mut self, enabled: bool) -> Self {
        self.system_fallback = enabled;
        self
    }

    pub fn into_shared(self) -> SharedFont {
        Arc::new(Mutex::new(self))
    }

    pub fn id(&self) -> FontId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_initialized(&self) -> bool {
        self.rasterizer.is_some()
    }

    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    pub fn outline_size(&self) -> u32 {
        self.outline_size
    }

    pub fn has_stroker(&self) -> bool {
        self.stroker.is_some()
    }

    /// Parse an owned copy of font data
    pub fn init_from_memory(&mut self, data: Vec<u8>, logical_name: &str, outline_size: u32) -> Result<()> {
        let face = FontFace::from_data(data)
            .map_err(|e| TextError::FontLoadError(format!("{}: {}", logical_name, e)))?;
        self.install_face(face);
        self.set_outline_size(outline_size);
        tracing::info!("Loaded font {} from memory", logical_name);
        Ok(())
    }

    pub fn init_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let face = FontFace::from_file(path).map_err(|e| match e {
            TextError::FontLoadError(_) => e,
            other => TextError::FontLoadError(format!("{}: {}", path.display(), other)),
        })?;
        self.install_face(face);
        tracing::info!("Loaded font {}", path.display());
        Ok(())
    }

    fn install_face(&mut self, face: FontFace) {
        self.rasterizer = Some(GlyphRasterizer::new(face));
        self.pixel_size = 0;
        self.set_pixel_size(self.services.default_pixel_size);
    }

    /// Reconfigure the face's character size; no-op when unchanged or before
    /// a face is loaded
    pub fn set_pixel_size(&mut self, pixel_size: u32) {
        if pixel_size == self.pixel_size {
            return;
        }
        let Some(rasterizer) = self.rasterizer.as_mut() else {
            return;
        };
        let size = fixed::from_int(pixel_size as i32);
        match rasterizer.set_char_size(size, size, REFERENCE_DPI, REFERENCE_DPI) {
            Ok(()) => self.pixel_size = pixel_size,
            Err(e) => tracing::warn!("Font {}: cannot set pixel size {}: {}", self.url, pixel_size, e),
        }
    }

    /// Replace the stroker when the outline size changes. Sizes above
    /// [`MAX_OUTLINE_SIZE`] are clamped.
    pub fn set_outline_size(&mut self, outline_size: u32) {
        let outline_size = outline_size.min(MAX_OUTLINE_SIZE);
        if outline_size == self.outline_size {
            return;
        }
        self.outline_size = outline_size;
        self.stroker = (outline_size > 0).then(|| Stroker::new(outline_size));
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.bold = bold;
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.italic = italic;
    }

    pub fn shadow(&self) -> &ShadowStyle {
        &self.shadow
    }

    pub fn set_shadow(&mut self, enabled: bool, color: Color, blur_radius: u32, offset: [f32; 2]) {
        self.shadow = ShadowStyle {
            enabled,
            color,
            blur_radius: blur_radius.min(MAX_SHADOW_BLUR),
            offset,
        };
    }

    /// Line metrics at `pixel_size`, or `None` before the face is loaded
    pub fn get_metrics(&mut self, pixel_size: u32) -> Option<FontMetrics> {
        if !self.is_initialized() {
            tracing::warn!("Font getMetrics called on font {} before it is initialized", self.url);
            return None;
        }
        if pixel_size == 0 {
            tracing::warn!("Font getMetrics called with pixelSize=0 on {}", self.url);
        }
        self.set_pixel_size(pixel_size);

        let size = self.rasterizer.as_ref()?.size_metrics();
        let height = fixed::trunc(size.height) as f32;
        let ascent = fixed::trunc(size.ascender) as f32;
        let descent = fixed::trunc(-size.descender) as f32;
        Some(FontMetrics {
            height,
            ascent,
            descent,
            natural_leading: height - (ascent + descent),
        })
    }

    /// Line height at `pixel_size`
    pub fn get_height(&mut self, pixel_size: u32) -> Option<f32> {
        if !self.is_initialized() {
            tracing::warn!("getHeight called on font {} before it is initialized", self.url);
            return None;
        }
        self.set_pixel_size(pixel_size);
        let size = self.rasterizer.as_ref()?.size_metrics();
        Some(fixed::trunc(size.height) as f32)
    }

    /// Script-facing metrics; zeroed before the face is loaded
    pub fn get_font_metrics(&mut self, pixel_size: u32) -> TextMetrics {
        self.get_metrics(pixel_size)
            .map(TextMetrics::from)
            .unwrap_or_default()
    }

    fn fingerprint(&self, code_point: u32) -> GlyphFingerprint {
        GlyphFingerprint {
            font_id: self.id,
            pixel_size: self.pixel_size,
            code_point,
            outline_size: self.outline_size,
            bold: self.bold,
            italic: self.italic,
            shadow: self.shadow.enabled,
            shadow_blur_radius: self.shadow.blur_radius,
        }
    }

    /// Cached glyph for a code point in the current style, rendering and
    /// uploading it on a miss
    pub fn fetch_glyph(&mut self, code_point: u32, ctx: &mut dyn RenderContext) -> Result<Arc<CachedGlyph>> {
        if !self.is_initialized() {
            return Err(TextError::UninitializedUse("fetch_glyph"));
        }
        let fingerprint = self.fingerprint(code_point);
        if let Some(glyph) = lock(&self.services.cache).lookup(&fingerprint) {
            return Ok(glyph);
        }

        let glyph = self.render_glyph(code_point, ctx)?;
        Ok(lock(&self.services.cache).insert(fingerprint, glyph))
    }

    /// Like [`fetch_glyph`](Self::fetch_glyph), logging and swallowing failures
    pub fn get_glyph(&mut self, code_point: u32, ctx: &mut dyn RenderContext) -> Option<Arc<CachedGlyph>> {
        match self.fetch_glyph(code_point, ctx) {
            Ok(glyph) => Some(glyph),
            Err(TextError::GlyphMissing(cp)) => {
                tracing::debug!("Font {}: no glyph for U+{:04X}, skipping", self.url, cp);
                None
            }
            Err(e) => {
                tracing::warn!("Font {}: glyph fetch failed for U+{:04X}: {}", self.url, code_point, e);
                None
            }
        }
    }

    fn render_glyph(&mut self, code_point: u32, ctx: &mut dyn RenderContext) -> Result<CachedGlyph> {
        let rasterizer = self
            .rasterizer
            .as_mut()
            .ok_or(TextError::UninitializedUse("render_glyph"))?;

        let mut glyph = rasterizer.load_glyph(code_point)?;
        if self.italic {
            glyph.shear(ITALIC_SHEAR);
        }
        let border_source = self.stroker.map(|stroker| (stroker, glyph.clone()));

        let strength = fixed::from_int(bold_strength(self.pixel_size) as i32);
        if self.bold {
            glyph.embolden(strength);
        }
        let fill = rasterizer.render(&glyph)?;

        let composed = match border_source {
            Some((stroker, mut border_glyph)) => {
                if self.bold {
                    border_glyph.embolden(strength);
                }
                let border = rasterizer.stroke_border(&border_glyph, &stroker).map_err(|e| {
                    tracing::warn!("Font {}: outline pass failed for U+{:04X}: {}", self.url, code_point, e);
                    e
                })?;
                let fill_width = fill.bitmap.width();
                let composed = composite_outline(fill, border);
                if self.bold {
                    // Bold outlined glyphs also advance past the border
                    let grown = composed.bitmap.width().saturating_sub(fill_width);
                    let grown = fixed::from_int(i32::try_from(grown).unwrap_or(0));
                    glyph.advance_x += grown;
                    glyph.vert_advance += grown;
                }
                composed
            }
            None => fill,
        };
        let output = apply_drop_shadow(composed, &self.shadow);

        let format = match output.bitmap.channels() {
            Channels::One => PixelFormat::Alpha,
            Channels::Two => PixelFormat::DualAlpha,
        };
        let (width, height) = (output.bitmap.width(), output.bitmap.height());
        let texture = (!output.bitmap.is_empty())
            .then(|| ctx.create_texture(width, height, width, height, output.bitmap.data(), format));

        let metrics = GlyphMetrics {
            left: output.left,
            top: output.top,
            advance_x: glyph.advance_x,
            advance_y: glyph.advance_y,
            vert_advance: glyph.vert_advance,
            width,
            height,
        };
        Ok(CachedGlyph::new(metrics, format, texture))
    }

    fn line_height(&self) -> f32 {
        self.rasterizer
            .as_ref()
            .map(|r| fixed::trunc(r.size_metrics().height) as f32)
            .unwrap_or(0.0)
    }

    /// Width of the longest line and total height of `text`, scaled
    pub fn measure_text_scaled(
        &mut self,
        text: &str,
        pixel_size: u32,
        scale_x: f32,
        scale_y: f32,
        ctx: &mut dyn RenderContext,
    ) -> TextMeasurement {
        if !self.is_initialized() {
            tracing::warn!("measureText called TOO EARLY on {}: font not loaded", self.url);
            return TextMeasurement::default();
        }
        self.set_pixel_size(pixel_size);

        let line_height = self.line_height();
        let mut w: f32 = 0.0;
        let mut h = line_height * scale_y;
        let mut line_width = 0.0;

        for c in text.chars() {
            if c == '\n' {
                h += line_height * scale_y;
                line_width = 0.0;
                continue;
            }
            let Some(glyph) = self.get_glyph(c as u32, ctx) else {
                continue;
            };
            line_width += fixed::trunc(glyph.metrics.advance_x) as f32 * scale_x;
            w = w.max(line_width);
        }
        TextMeasurement::new(w, h)
    }

    pub fn measure_text(&mut self, text: &str, pixel_size: u32, ctx: &mut dyn RenderContext) -> TextMeasurement {
        self.measure_text_scaled(text, pixel_size, 1.0, 1.0, ctx)
    }

    /// Script-facing measurement; warns on a zero pixel size
    pub fn measure_text_object(&mut self, pixel_size: u32, text: &str, ctx: &mut dyn RenderContext) -> TextMeasurement {
        if self.is_initialized() && pixel_size == 0 {
            tracing::warn!("Font measureText called with pixelSize=0 on {}", self.url);
        }
        self.measure_text(text, pixel_size, ctx)
    }

    /// Advance and line height of a single code point, scaled
    pub fn measure_char(
        &mut self,
        code_point: u32,
        pixel_size: u32,
        scale_x: f32,
        scale_y: f32,
        ctx: &mut dyn RenderContext,
    ) -> TextMeasurement {
        if !self.is_initialized() {
            tracing::warn!("measureTextChar called TOO EARLY on {}: font not loaded", self.url);
            return TextMeasurement::default();
        }
        self.set_pixel_size(pixel_size);

        let h = self.line_height() * scale_y;
        let w = self
            .get_glyph(code_point, ctx)
            .map(|glyph| fixed::trunc(glyph.metrics.advance_x) as f32 * scale_x)
            .unwrap_or(0.0);
        TextMeasurement::new(w, h)
    }

    fn apply_style(&mut self, pixel_size: u32, style: &TextStyle) {
        self.set_pixel_size(pixel_size);
        self.set_bold(style.bold);
        self.set_italic(style.italic);
        self.set_outline_size(style.outline_size);

        let shadow = &style.shadow;
        match shadow.color {
            Some(color) if shadow.enabled && color.a > MIN_SHADOW_ALPHA => {
                self.set_shadow(true, color, shadow.blur_radius, shadow.offset)
            }
            _ => self.set_shadow(false, Color::TRANSPARENT, 0, [0.0, 0.0]),
        }
    }

    /// Draw `text` with its top-left line origin at (`x`, `y`).
    ///
    /// Returns the number of glyph quads submitted.
    pub fn render_text(
        &mut self,
        text: &str,
        pixel_size: u32,
        x: f32,
        y: f32,
        style: &TextStyle,
        ctx: &mut dyn RenderContext,
    ) -> usize {
        if !self.is_initialized() {
            tracing::warn!("renderText called on font {} before it is initialized", self.url);
            return 0;
        }
        self.apply_style(pixel_size, style);

        let Some(size) = self.rasterizer.as_ref().map(|r| r.size_metrics()) else {
            return 0;
        };
        let ascender = fixed::trunc(size.ascender) as f32;
        let line_height = fixed::trunc(size.height) as f32;
        let (sx, sy) = (style.scale_x, style.scale_y);

        let mut pen_x = x;
        let mut pen_y = y;
        let mut drawn = 0;

        for c in text.chars() {
            if c == '\n' {
                pen_x = x;
                pen_y += line_height * sy;
                continue;
            }
            let Some(glyph) = self.get_glyph(c as u32, ctx) else {
                continue;
            };
            let m = glyph.metrics;

            if style.debug_baseline && pen_x == 0.0 {
                let baseline = pen_y + ascender;
                ctx.draw_diag_line(0.0, baseline, style.max_width, baseline, Color::GREEN);
            }

            if let Some(texture) = glyph.texture() {
                let quad = Quad::new(
                    pen_x + m.left as f32 * sx,
                    pen_y - m.top as f32 * sy + ascender,
                    m.width as f32 * sx,
                    m.height as f32 * sy,
                );
                if self.shadow.enabled {
                    let shadow_quad = Quad {
                        x: quad.x + self.shadow.offset[0] + SHADOW_NUDGE[0],
                        y: quad.y + self.shadow.offset[1] + SHADOW_NUDGE[1],
                        ..quad
                    };
                    ctx.draw_texture_shadow(
                        shadow_quad,
                        &texture,
                        false,
                        self.shadow.blur_radius as f32 + SHADOW_EXTRA_BLUR,
                        self.shadow.color,
                    );
                }
                ctx.draw_label_image(quad, &texture, false, &style.colors);
                drawn += 1;
            }

            pen_x += fixed::trunc(m.advance_x) as f32 * sx;
        }
        drawn
    }

    /// Register a callback for when loading settles. Callbacks registered
    /// after settlement are queued to run on the next task drain.
    pub fn on_ready(&mut self, callback: impl FnOnce(LoadOutcome) + Send + 'static) {
        match self.settled {
            Some(outcome) => self
                .services
                .tasks
                .add_task(self.id.target(), move || callback(outcome)),
            None => self.listeners.push(Box::new(callback)),
        }
    }

    /// Start loading the font's url. Remote urls go through the resource
    /// loader; anything else is read from disk right away. Either way the
    /// outcome is reported through the task queue.
    pub fn load_resource(font: &SharedFont) {
        let (url, tasks, loader, target) = {
            let resource = lock(font);
            (
                resource.url.clone(),
                resource.services.tasks.clone(),
                Arc::clone(&resource.services.loader),
                resource.id.target(),
            )
        };

        if is_remote_url(&url) {
            tracing::info!("Downloading font {}", url);
            let weak = Arc::downgrade(font);
            let completion_tasks = tasks.clone();
            let request = loader.fetch(
                &url,
                Box::new(move |result| match weak.upgrade() {
                    Some(font) => PendingLoad::post(
                        font,
                        PendingOutcome::Downloaded(result),
                        &completion_tasks,
                        target,
                    ),
                    None => tracing::debug!("Font released before its download finished"),
                }),
            );
            lock(font).download = Some(request);
        } else {
            let outcome = lock(font).load_from_file();
            PendingLoad::post(Arc::clone(font), PendingOutcome::Settled(outcome), &tasks, target);
        }
    }

    fn load_from_file(&mut self) -> LoadOutcome {
        let url = self.url.clone();
        let result = self.init_from_file(&url).or_else(|e| {
            if !self.system_fallback {
                return Err(e);
            }
            let Some(system_fonts) = self.services.system_fonts.clone() else {
                return Err(e);
            };
            tracing::info!("Font {} unavailable ({}), using system sans-serif", url, e);
            let (data, index) = system_fonts.load_sans_serif()?;
            let face = FontFace::from_data_with_index(data, index)?;
            self.install_face(face);
            Ok(())
        });

        match result {
            Ok(()) => {
                self.status = ResourceStatus::Ok;
                LoadOutcome::Resolved
            }
            Err(e) => {
                tracing::warn!("Could not load font face {}: {}", url, e);
                self.status = ResourceStatus::FileNotFound;
                LoadOutcome::Rejected(ResourceStatus::FileNotFound)
            }
        }
    }

    fn finish_download(&mut self, result: std::result::Result<Download, TextError>) -> LoadOutcome {
        let status = match result {
            Ok(download) => {
                let source = download.url.clone();
                match self.init_from_memory(download.data, &source, 0) {
                    Ok(()) => ResourceStatus::Ok,
                    Err(e) => {
                        tracing::warn!("Could not decode font {}: {}", self.url, e);
                        ResourceStatus::DecodeFailure
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Font download failed for {}: {}", self.url, e);
                ResourceStatus::NetworkError
            }
        };
        self.status = status;
        match status {
            ResourceStatus::Ok => LoadOutcome::Resolved,
            other => LoadOutcome::Rejected(other),
        }
    }
}

impl Drop for FontResource {
    fn drop(&mut self) {
        tracing::info!("Releasing font {}", self.url);
        let removed = self.services.tasks.remove_all_tasks_for_object(self.id.target());
        if removed > 0 {
            tracing::debug!("Dropped {} queued tasks for font {}", removed, self.url);
        }
        if let Some(request) = self.download.take() {
            request.cancel();
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove_if_current(&self.url, self.id);
        }
        self.stroker = None;
        self.rasterizer = None;
    }
}

impl std::fmt::Debug for FontResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResource")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("initialized", &self.is_initialized())
            .field("status", &self.status)
            .field("pixel_size", &self.pixel_size)
            .field("outline_size", &self.outline_size)
            .field("bold", &self.bold)
            .field("italic", &self.italic)
            .finish()
    }
}
