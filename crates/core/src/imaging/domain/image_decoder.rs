use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum ImageDecodeError {
    #[error("empty image payload")]
    Empty,
    #[error("unrecognized or corrupt image data: {0}")]
    Corrupt(String),
    #[error("image has zero area ({width}x{height})")]
    ZeroArea { width: u32, height: u32 },
}

/// Decodes encoded image bytes (PNG, JPEG, ...) into an RGB [`Frame`].
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Frame, ImageDecodeError>;
}
