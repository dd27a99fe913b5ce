//! Font manager configuration

use std::path::PathBuf;

/// Settings shared by every font a [`crate::FontManager`] creates
#[derive(Debug, Clone, PartialEq)]
pub struct FontConfig {
    /// Font url used when a caller asks for an empty one
    pub default_font: String,
    /// Directory searched for local overrides, as `<fonts_dir>/<name>.ttf`
    pub fonts_dir: PathBuf,
    /// Pixel size applied after a font finishes loading
    pub default_pixel_size: u32,
    /// Fall back to a system sans-serif face when the default font file
    /// cannot be read
    pub system_fallback: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            default_font: "FreeSans.ttf".to_string(),
            fonts_dir: PathBuf::from("fonts"),
            default_pixel_size: 16,
            system_fallback: true,
        }
    }
}

impl FontConfig {
    pub fn with_default_font(mut self, name: impl Into<String>) -> Self {
        self.default_font = name.into();
        self
    }

    pub fn with_fonts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fonts_dir = dir.into();
        self
    }

    pub fn with_default_pixel_size(mut self, pixel_size: u32) -> Self {
        self.default_pixel_size = pixel_size;
        self
    }

    pub fn with_system_fallback(mut self, enabled: bool) -> Self {
        self.system_fallback = enabled;
        self
    }

    /// Local override candidate for a font name
    pub fn local_font_path(&self, name: &str) -> PathBuf {
        self.fonts_dir.join(format!("{}.ttf", name))
    }
}
