//! Shared helpers for lumen_text integration tests
#![allow(dead_code)]

use lumen_core::{Color, TaskQueue};
use lumen_text::{
    Download, DownloadCallback, DownloadRequest, FontResource, FontServices, LabelColors,
    PixelFormat, Quad, RenderContext, ResourceLoader, TextError, Texture, TextureRef,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_FONT: &[u8] = include_bytes!("../../fonts/DejaVuSansMono.ttf");

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Font loaded from the embedded test face, with its own cache and queue
pub fn loaded_font() -> FontResource {
    loaded_font_with(FontServices::new(TaskQueue::new()))
}

pub fn loaded_font_with(services: FontServices) -> FontResource {
    init_tracing();
    let mut font = FontResource::new("memory://DejaVuSansMono", services);
    font.init_from_memory(TEST_FONT.to_vec(), "DejaVuSansMono", 0)
        .unwrap();
    font
}

#[derive(Debug)]
pub struct TestTexture {
    width: u32,
    height: u32,
    format: PixelFormat,
    released: Arc<AtomicUsize>,
}

impl Texture for TestTexture {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> PixelFormat {
        self.format
    }
}

impl Drop for TestTexture {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Label {
        quad: Quad,
        format: PixelFormat,
    },
    Shadow {
        quad: Quad,
        blur_radius: f32,
        color: Color,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
}

/// Render context that records every call instead of drawing
#[derive(Debug, Default)]
pub struct RecordingContext {
    pub created: Vec<(u32, u32, PixelFormat)>,
    pub draws: Vec<DrawCall>,
    released: Arc<AtomicUsize>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Textures created by this context that have since been dropped
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn labels(&self) -> Vec<Quad> {
        self.draws
            .iter()
            .filter_map(|call| match call {
                DrawCall::Label { quad, .. } => Some(*quad),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> usize {
        self.draws
            .iter()
            .filter(|call| matches!(call, DrawCall::Line { .. }))
            .count()
    }
}

impl RenderContext for RecordingContext {
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        stride_w: u32,
        stride_h: u32,
        pixels: &[u8],
        format: PixelFormat,
    ) -> TextureRef {
        assert_eq!((stride_w, stride_h), (width, height));
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * format.bytes_per_pixel()
        );
        self.created.push((width, height, format));
        Arc::new(TestTexture {
            width,
            height,
            format,
            released: self.released.clone(),
        })
    }

    fn draw_label_image(&mut self, quad: Quad, texture: &TextureRef, _flip: bool, _colors: &LabelColors) {
        self.draws.push(DrawCall::Label {
            quad,
            format: texture.format(),
        });
    }

    fn draw_texture_shadow(
        &mut self,
        quad: Quad,
        _texture: &TextureRef,
        _flip: bool,
        blur_radius: f32,
        color: Color,
    ) {
        self.draws.push(DrawCall::Shadow {
            quad,
            blur_radius,
            color,
        });
    }

    fn draw_diag_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, _color: Color) {
        self.draws.push(DrawCall::Line { x1, y1, x2, y2 });
    }
}

struct ManualRequest {
    cancelled: Arc<AtomicUsize>,
}

impl DownloadRequest for ManualRequest {
    fn cancel(&self) {
        self.cancelled.fetch_add(1, Ordering::SeqCst);
    }
}

/// Loader whose downloads finish only when the test says so
#[derive(Default)]
pub struct ManualLoader {
    pending: Mutex<Vec<(String, DownloadCallback)>>,
    cancelled: Arc<AtomicUsize>,
}

impl ManualLoader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Finish the oldest download with `data`
    pub fn complete(&self, data: &[u8]) {
        let (url, callback) = self.pending.lock().unwrap().remove(0);
        callback(Ok(Download::new(url, data.to_vec())));
    }

    /// Fail the oldest download
    pub fn fail(&self) {
        let (url, callback) = self.pending.lock().unwrap().remove(0);
        callback(Err(TextError::DownloadError(format!("{} unreachable", url))));
    }
}

impl ResourceLoader for ManualLoader {
    fn fetch(&self, url: &str, on_complete: DownloadCallback) -> Box<dyn DownloadRequest> {
        self.pending
            .lock()
            .unwrap()
            .push((url.to_string(), on_complete));
        Box::new(ManualRequest {
            cancelled: self.cancelled.clone(),
        })
    }
}
