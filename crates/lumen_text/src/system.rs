//! System font fallback
//!
//! Uses fontdb to find a sans-serif face when the configured default font is
//! not available on disk.

use crate::{Result, TextError};
use fontdb::{Database, Family, Query, Source, Stretch, Style, Weight};
use std::sync::OnceLock;

/// Lazily populated system font database
#[derive(Default)]
pub struct SystemFonts {
    db: OnceLock<Database>,
}

impl SystemFonts {
    pub fn new() -> Self {
        Self::default()
    }

    fn database(&self) -> &Database {
        self.db.get_or_init(|| {
            let mut db = Database::new();
            db.load_system_fonts();
            tracing::debug!("Loaded {} system font faces", db.len());
            db
        })
    }

    /// Raw data and face index of the system's regular sans-serif face
    pub fn load_sans_serif(&self) -> Result<(Vec<u8>, u32)> {
        let db = self.database();
        let query = Query {
            families: &[Family::SansSerif],
            weight: Weight::NORMAL,
            style: Style::Normal,
            stretch: Stretch::Normal,
        };
        let id = db
            .query(&query)
            .ok_or_else(|| TextError::FontLoadError("no system sans-serif font".to_string()))?;

        let (src, face_index) = db
            .face_source(id)
            .ok_or_else(|| TextError::FontLoadError("Font source not found".to_string()))?;

        let data = match src {
            Source::File(path) => std::fs::read(&path).map_err(|e| {
                TextError::FontLoadError(format!("Failed to read font file {:?}: {}", path, e))
            })?,
            Source::Binary(arc) => arc.as_ref().as_ref().to_vec(),
            Source::SharedFile(_path, data) => data.as_ref().as_ref().to_vec(),
        };
        Ok((data, face_index))
    }
}

impl std::fmt::Debug for SystemFonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemFonts")
            .field("loaded", &self.db.get().is_some())
            .finish()
    }
}
