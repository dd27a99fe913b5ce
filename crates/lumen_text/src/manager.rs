//! Font manager
//!
//! Resolves font urls to shared [`FontResource`]s. Each url is loaded once;
//! later requests get the same font for as long as someone holds it. A local
//! file `<fonts_dir>/<name>.ttf` takes precedence over the name itself.
//!
//! The registry only holds weak references. A font removes its own entry
//! when it is dropped.

use crate::cache::SharedGlyphCache;
use crate::config::FontConfig;
use crate::font::{FontId, FontResource, FontServices, SharedFont};
use crate::loader::ResourceLoader;
use crate::system::SystemFonts;
use lumen_core::{lock, TaskQueue};
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Weak};

struct RegistryEntry {
    id: FontId,
    font: Weak<Mutex<FontResource>>,
}

/// Url to font map shared between the manager and the fonts it created
///
/// Strong font references are never dropped while the map is locked, since
/// dropping the last one re-enters the registry from the font's teardown.
#[derive(Default)]
pub(crate) struct FontRegistry {
    entries: Mutex<FxHashMap<String, RegistryEntry>>,
}

impl FontRegistry {
    fn get(&self, url: &str) -> Option<SharedFont> {
        lock(&self.entries).get(url).and_then(|entry| entry.font.upgrade())
    }

    /// Live font for `url`, or a new one created by `create` and registered
    fn get_or_insert_with(
        &self,
        url: &str,
        create: impl FnOnce() -> FontResource,
    ) -> (SharedFont, bool) {
        let mut entries = lock(&self.entries);
        if let Some(font) = entries.get(url).and_then(|entry| entry.font.upgrade()) {
            return (font, false);
        }
        let font = create();
        let id = font.id();
        let shared = font.into_shared();
        entries.insert(
            url.to_string(),
            RegistryEntry {
                id,
                font: Arc::downgrade(&shared),
            },
        );
        (shared, true)
    }

    fn remove(&self, url: &str) -> bool {
        let removed = lock(&self.entries).remove(url);
        removed.is_some()
    }

    /// Remove the entry for `url` only if it still belongs to font `id`
    pub(crate) fn remove_if_current(&self, url: &str, id: FontId) {
        let mut entries = lock(&self.entries);
        if entries.get(url).is_some_and(|entry| entry.id == id) {
            entries.remove(url);
            tracing::debug!("Removed font {} from registry", url);
        }
    }

    fn live_count(&self) -> usize {
        lock(&self.entries)
            .values()
            .filter(|entry| entry.font.strong_count() > 0)
            .count()
    }
}

/// Owns the font registry and the services every font shares
pub struct FontManager {
    config: FontConfig,
    registry: Arc<FontRegistry>,
    services: FontServices,
}

impl FontManager {
    /// Manager reporting load completions on `tasks`, with no network loader
    pub fn new(config: FontConfig, tasks: TaskQueue) -> Self {
        let mut services =
            FontServices::new(tasks).with_default_pixel_size(config.default_pixel_size);
        if config.system_fallback {
            services = services.with_system_fonts(Arc::new(SystemFonts::new()));
        }
        Self {
            config,
            registry: Arc::new(FontRegistry::default()),
            services,
        }
    }

    /// Route remote font urls through `loader`
    pub fn with_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.services.loader = loader;
        self
    }

    pub fn config(&self) -> &FontConfig {
        &self.config
    }

    pub fn glyph_cache(&self) -> &SharedGlyphCache {
        &self.services.cache
    }

    pub fn task_queue(&self) -> &TaskQueue {
        &self.services.tasks
    }

    pub fn local_font_path(&self, name: &str) -> PathBuf {
        self.config.local_font_path(name)
    }

    /// Shared font for `url`, loading it on first use.
    ///
    /// An empty url means the configured default font. Otherwise a local
    /// `<fonts_dir>/<url>.ttf` is preferred when it exists. A freshly created
    /// font may still be loading when this returns.
    pub fn get_font(&self, url: &str) -> SharedFont {
        let url = if url.is_empty() {
            self.config.default_font.clone()
        } else {
            let local = self.local_font_path(url);
            let local_key = local.to_string_lossy().into_owned();
            if let Some(font) = self.registry.get(&local_key) {
                tracing::debug!("Found font in registry for {} at {}", url, local_key);
                return font;
            }
            if local.is_file() {
                tracing::info!("Using local font {} for {}", local_key, url);
                local_key
            } else {
                tracing::debug!("No local font at {}", local_key);
                url.to_string()
            }
        };

        let fallback = self.config.system_fallback && url == self.config.default_font;
        let (font, created) = self.registry.get_or_insert_with(&url, || {
            FontResource::new(url.clone(), self.services.clone())
                .with_registry(Arc::downgrade(&self.registry))
                .with_system_fallback(fallback)
        });

        if created {
            tracing::debug!("Created font for {}", url);
            FontResource::load_resource(&font);
        } else {
            tracing::debug!("Found font in registry for {}", url);
        }
        font
    }

    /// Drop the registry entry for `url`. Fonts already handed out stay alive.
    pub fn remove_font(&self, url: &str) -> bool {
        self.registry.remove(url)
    }

    /// Release every cached glyph and its texture
    pub fn clear_all_fonts(&self) {
        lock(&self.services.cache).clear_all();
    }

    /// Number of registered fonts that are still alive
    pub fn font_count(&self) -> usize {
        self.registry.live_count()
    }
}

impl std::fmt::Debug for FontManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontManager")
            .field("config", &self.config)
            .field("fonts", &self.font_count())
            .finish()
    }
}
