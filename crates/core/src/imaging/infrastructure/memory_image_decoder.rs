use crate::imaging::domain::image_decoder::{ImageDecodeError, ImageDecoder};
use crate::shared::frame::Frame;

/// Decodes in-memory image bytes with the `image` crate.
///
/// The format is sniffed from the content, never from a file name. Alpha
/// and grayscale inputs are converted to 8-bit RGB.
#[derive(Clone, Debug, Default)]
pub struct MemoryImageDecoder;

impl MemoryImageDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl ImageDecoder for MemoryImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Frame, ImageDecodeError> {
        if bytes.is_empty() {
            return Err(ImageDecodeError::Empty);
        }

        let img = image::load_from_memory(bytes)
            .map_err(|e| ImageDecodeError::Corrupt(e.to_string()))?
            .to_rgb8();

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageDecodeError::ZeroArea { width, height });
        }

        Ok(Frame::new(img.into_raw(), width, height, 3))
    }
}
