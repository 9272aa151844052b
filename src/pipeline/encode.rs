//! Payload encoding: binary inputs ↔ base64 data URIs.
//!
//! Chat-completions APIs accept images and files as base64 data URIs
//! embedded in the JSON request body (`data:<mime>;base64,<payload>`). This
//! module wraps raw bytes into that form, normalises bare base64 strings a
//! caller may already hold, and strips the prefix again when raw bytes are
//! needed (e.g. handing a PDF to the text extractor).

use crate::error::LensError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Sniff the MIME type of a binary payload.
///
/// Images are detected via their magic bytes; PDFs via `%PDF`. Anything
/// unrecognised falls back to `application/octet-stream`, which the
/// provider will reject with a useful error rather than us guessing wrong.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"%PDF") {
        return "application/pdf";
    }
    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type(),
        Err(_) => "application/octet-stream",
    }
}

/// Encode raw bytes as a data URI, sniffing the MIME type unless one is
/// supplied.
pub fn to_data_uri(bytes: &[u8], mime: Option<&str>) -> String {
    let mime = mime.unwrap_or_else(|| sniff_mime(bytes));
    let b64 = STANDARD.encode(bytes);
    debug!("encoded {} bytes as {} data URI", bytes.len(), mime);
    format!("data:{mime};base64,{b64}")
}

/// Normalise a string that is either already a data URI or a bare base64
/// payload into a data URI with the given MIME type.
pub fn ensure_data_uri(value: &str, mime: &str) -> String {
    if value.starts_with("data:") {
        value.to_string()
    } else {
        format!("data:{mime};base64,{value}")
    }
}

/// Decode a data URI (or bare base64 string) back into raw bytes.
pub fn decode_payload(value: &str) -> Result<Vec<u8>, LensError> {
    let b64 = match value.split_once(";base64,") {
        Some((_, payload)) => payload,
        None => value,
    };
    STANDARD
        .decode(b64.trim())
        .map_err(|e| LensError::Internal(format!("invalid base64 payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_pdf_magic() {
        assert_eq!(sniff_mime(b"%PDF-1.7 rest"), "application/pdf");
    }

    #[test]
    fn sniffs_png_magic() {
        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(sniff_mime(&png_magic), "image/png");
    }

    #[test]
    fn unknown_bytes_fall_back() {
        assert_eq!(sniff_mime(b"??"), "application/octet-stream");
    }

    #[test]
    fn data_uri_roundtrip() {
        let bytes = b"%PDF-1.4 tiny";
        let uri = to_data_uri(bytes, None);
        assert!(uri.starts_with("data:application/pdf;base64,"));
        assert_eq!(decode_payload(&uri).unwrap(), bytes);
    }

    #[test]
    fn ensure_data_uri_wraps_bare_base64() {
        let wrapped = ensure_data_uri("aGVsbG8=", "image/jpeg");
        assert_eq!(wrapped, "data:image/jpeg;base64,aGVsbG8=");
        // Already a URI: untouched.
        assert_eq!(ensure_data_uri(&wrapped, "image/png"), wrapped);
    }

    #[test]
    fn decode_accepts_bare_base64() {
        assert_eq!(decode_payload("aGVsbG8=").unwrap(), b"hello");
    }
}
