//! Owned coverage bitmaps
//!
//! Every compositing stage takes a [`GlyphBitmap`] by value and returns a new
//! one, so intermediate buffers are freed as soon as the next stage is done
//! with them, including on early-return error paths.

use crate::{Result, TextError};

/// Channel layout of a glyph bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// Fill coverage only
    One,
    /// Interleaved outline coverage (channel 0) and fill coverage (channel 1)
    Two,
}

impl Channels {
    pub const fn count(self) -> usize {
        match self {
            Channels::One => 1,
            Channels::Two => 2,
        }
    }
}

/// Row-major 8-bit coverage buffer with explicit dimensions and channel count
#[derive(Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl GlyphBitmap {
    /// Zero-filled (fully transparent) bitmap
    pub fn new(width: u32, height: u32, channels: Channels) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0; width as usize * height as usize * channels.count()],
        }
    }

    pub fn empty(channels: Channels) -> Self {
        Self::new(0, 0, channels)
    }

    /// Wrap a single-channel coverage buffer produced by the rasterizer
    pub fn from_coverage(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(TextError::FontLoadError(format!(
                "coverage buffer holds {} bytes, expected {}x{} = {}",
                data.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            channels: Channels::One,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn index(&self, x: u32, y: u32, channel: usize) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels.count() + channel
    }

    /// Value of one channel at (x, y); zero outside the bitmap
    pub fn get(&self, x: u32, y: u32, channel: usize) -> u8 {
        if x >= self.width || y >= self.height || channel >= self.channels.count() {
            return 0;
        }
        self.data[self.index(x, y, channel)]
    }

    /// Copy a single-channel `src` into `channel` of this bitmap with its
    /// top-left corner at (`dst_x`, `dst_y`). Pixels falling outside are clipped.
    pub fn blit_channel(&mut self, src: &GlyphBitmap, dst_x: i32, dst_y: i32, channel: usize) {
        debug_assert_eq!(src.channels, Channels::One);
        if channel >= self.channels.count() {
            return;
        }
        for sy in 0..src.height {
            let ty = dst_y + sy as i32;
            if ty < 0 || ty >= self.height as i32 {
                continue;
            }
            for sx in 0..src.width {
                let tx = dst_x + sx as i32;
                if tx < 0 || tx >= self.width as i32 {
                    continue;
                }
                let value = src.data[src.index(sx, sy, 0)];
                let i = self.index(tx as u32, ty as u32, channel);
                self.data[i] = value;
            }
        }
    }

    /// Copy every channel of `src` (same layout) with its top-left corner at (`dst_x`, `dst_y`)
    pub fn copy_from(&mut self, src: &GlyphBitmap, dst_x: u32, dst_y: u32) {
        debug_assert_eq!(src.channels, self.channels);
        let stride = self.channels.count();
        for sy in 0..src.height {
            let ty = dst_y + sy;
            if ty >= self.height {
                break;
            }
            let cols = src.width.min(self.width.saturating_sub(dst_x)) as usize;
            let from = src.index(0, sy, 0);
            let to = self.index(dst_x, ty, 0);
            self.data[to..to + cols * stride].copy_from_slice(&src.data[from..from + cols * stride]);
        }
    }

    /// Per-byte maximum with another bitmap of identical size and layout
    pub fn max_with(&mut self, other: &GlyphBitmap) {
        debug_assert_eq!(self.data.len(), other.data.len());
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a = (*a).max(*b);
        }
    }

    /// Dilate a single-channel bitmap `x_px` pixels to the right and `y_px`
    /// pixels upward, growing it by the same amounts. The caller raises the
    /// bitmap top by `y_px`. Used to embolden glyphs that only exist as bitmaps.
    pub fn dilate(&self, x_px: u32, y_px: u32) -> GlyphBitmap {
        debug_assert_eq!(self.channels, Channels::One);
        let mut out = GlyphBitmap::new(self.width + x_px, self.height + y_px, Channels::One);
        for sy in 0..self.height {
            for sx in 0..self.width {
                let v = self.data[self.index(sx, sy, 0)];
                if v == 0 {
                    continue;
                }
                for j in 0..=y_px {
                    for i in 0..=x_px {
                        let idx = out.index(sx + i, sy + y_px - j, 0);
                        out.data[idx] = out.data[idx].max(v);
                    }
                }
            }
        }
        out
    }

    /// Shear a single-channel bitmap horizontally: each row shifts right by
    /// `factor` times its height above the baseline (`top` is the distance
    /// from the baseline to row 0). Returns the sheared bitmap and the change
    /// in left bearing.
    pub fn shear_rows(&self, factor: f32, top: i32) -> (GlyphBitmap, i32) {
        debug_assert_eq!(self.channels, Channels::One);
        if self.is_empty() || factor == 0.0 {
            return (self.clone(), 0);
        }

        let shifts: Vec<i32> = (0..self.height as i32)
            .map(|row| (factor * (top - row) as f32).round() as i32)
            .collect();
        let min_shift = shifts.iter().copied().min().unwrap_or(0);
        let max_shift = shifts.iter().copied().max().unwrap_or(0);

        let mut out = GlyphBitmap::new(
            self.width + (max_shift - min_shift) as u32,
            self.height,
            Channels::One,
        );
        for (row, shift) in shifts.iter().enumerate() {
            let from = self.index(0, row as u32, 0);
            let to = out.index((shift - min_shift) as u32, row as u32, 0);
            let len = self.width as usize;
            out.data[to..to + len].copy_from_slice(&self.data[from..from + len]);
        }
        (out, min_shift)
    }
}

impl std::fmt::Debug for GlyphBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .finish()
    }
}
