pub mod base64_payload;
pub mod memory_image_decoder;
