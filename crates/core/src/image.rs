use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::CoreError;
use crate::ids::BlobHash;

/// URL prefix under which stored blobs are served.
pub const IMAGE_ROUTE_PREFIX: &str = "/images/";

/// Image bytes lifted out of an inline `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl EmbeddedImage {
    /// Content-addressed file name for these bytes.
    pub fn file_name(&self) -> String {
        blob_file_name(&self.bytes, &self.extension)
    }
}

pub fn is_data_uri(content: &str) -> bool {
    content
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:"))
}

/// Decodes `data:image/<subtype>;base64,<payload>`.
///
/// Returns `Ok(None)` for content that is not a data URI at all (it is taken
/// to be a reference path already).
pub fn decode_data_uri(content: &str) -> Result<Option<EmbeddedImage>, CoreError> {
    if !is_data_uri(content) {
        return Ok(None);
    }
    let rest = &content[5..];
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CoreError::DecodeFailure("data URI has no payload separator".into()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| CoreError::DecodeFailure("data URI is not base64 encoded".into()))?;
    let subtype = mime
        .strip_prefix("image/")
        .ok_or_else(|| CoreError::DecodeFailure(format!("not an image media type: {mime}")))?;
    if subtype.is_empty() || !subtype.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(CoreError::DecodeFailure(format!("unsupported image type: {mime}")));
    }
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(CoreError::DecodeFailure("empty image payload".into()));
    }
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| CoreError::DecodeFailure(e.to_string()))?;

    Ok(Some(EmbeddedImage {
        extension: normalize_extension(subtype),
        bytes,
    }))
}

pub fn normalize_extension(ext: &str) -> String {
    match ext.to_ascii_lowercase().as_str() {
        "jpeg" => "jpg".to_string(),
        other => other.to_string(),
    }
}

pub fn blob_file_name(bytes: &[u8], extension: &str) -> String {
    format!("{}.{}", BlobHash::of(bytes), normalize_extension(extension))
}

/// Extension taken from an uploaded file name, `bin` when there is none.
pub fn extension_of(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(normalize_extension)
        .unwrap_or_else(|| "bin".to_string())
}

pub fn content_type_for(file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" => "image/jpeg".to_string(),
        "svg" => "image/svg+xml".to_string(),
        "" | "bin" => "application/octet-stream".to_string(),
        other => format!("image/{other}"),
    }
}

/// A served file name must be a single plain path segment.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(['/', '\\', '\0'])
}

pub fn reference_path(file_name: &str) -> String {
    format!("{IMAGE_ROUTE_PREFIX}{file_name}")
}
