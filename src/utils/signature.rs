use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::AppError;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

pub const SIGNATURE_REQUIRED: &str = "La firma es requerida para pagar la factura.";

/// Decode the signature pad output (base64 PNG, optionally as a data URL)
pub fn decode_signature(raw: Option<&str>) -> Result<Vec<u8>, AppError> {
    let encoded = raw
        .map(str::trim)
        .map(|s| s.strip_prefix(DATA_URL_PREFIX).unwrap_or(s))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest(SIGNATURE_REQUIRED.to_string()))?;

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| AppError::BadRequest("La firma no es base64 válido".to_string()))?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest(SIGNATURE_REQUIRED.to_string()));
    }

    if !is_png(&bytes) {
        tracing::warn!(bytes = bytes.len(), "Signature payload is not a PNG image");
    }

    Ok(bytes)
}

pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(PNG_MAGIC)
}
