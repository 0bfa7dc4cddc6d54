use base64::Engine;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("malformed base64 payload: {0}")]
pub struct PayloadError(#[from] base64::DecodeError);

/// Decode a standard-alphabet, padded base64 image payload.
///
/// ASCII whitespace anywhere in the payload is skipped, so MIME line-wrapped
/// encodings decode the same as single-line ones.
pub fn decode_base64_payload(encoded: &str) -> Result<Vec<u8>, PayloadError> {
    let compact: Vec<u8> = encoded
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
}
