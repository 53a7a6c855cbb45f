//! QR code rendering for creation responses

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use qrcode::QrCode;
use qrcode::render::svg;

use crate::errors::{LinkpulseError, Result};

/// Turns a short URL into image bytes
pub trait QrRenderer: Send + Sync {
    fn render(&self, short_url: &str) -> Result<Vec<u8>>;

    /// MIME type of the bytes returned by [`render`](Self::render)
    fn mime_type(&self) -> &'static str;
}

/// Renders SVG documents
#[derive(Debug, Clone, Copy)]
pub struct SvgQrRenderer {
    min_dimension: u32,
}

impl SvgQrRenderer {
    pub fn new(min_dimension: u32) -> Self {
        Self { min_dimension }
    }
}

impl Default for SvgQrRenderer {
    fn default() -> Self {
        Self::new(200)
    }
}

impl QrRenderer for SvgQrRenderer {
    fn render(&self, short_url: &str) -> Result<Vec<u8>> {
        let code = QrCode::new(short_url.as_bytes())
            .map_err(|e| LinkpulseError::qr_render(format!("cannot encode '{}': {}", short_url, e)))?;
        let image = code
            .render::<svg::Color>()
            .min_dimensions(self.min_dimension, self.min_dimension)
            .build();
        Ok(image.into_bytes())
    }

    fn mime_type(&self) -> &'static str {
        "image/svg+xml"
    }
}

/// `data:<mime>;base64,<payload>`，前端可直接作为 `<img src>` 使用
pub fn to_data_url(renderer: &dyn QrRenderer, short_url: &str) -> Result<String> {
    let bytes = renderer.render(short_url)?;
    Ok(format!(
        "data:{};base64,{}",
        renderer.mime_type(),
        STANDARD.encode(bytes)
    ))
}
