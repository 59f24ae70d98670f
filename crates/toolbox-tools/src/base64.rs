//! Text and image Base64 conversion, both directions.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::error::ToolError;

/// Base64 of the UTF-8 bytes of `text`.
pub fn encode_text(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode Base64 back into UTF-8 text.
///
/// ASCII whitespace anywhere in the input is ignored, so wrapped output
/// decodes too. Input that is not Base64, or decodes to bytes that are not
/// UTF-8, is rejected with [`ToolError::InvalidBase64`].
pub fn decode_text(input: &str) -> Result<String, ToolError> {
    let compact: String = input.split_ascii_whitespace().collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| ToolError::InvalidBase64)?;
    String::from_utf8(bytes).map_err(|_| ToolError::InvalidBase64)
}

/// An image rendered as Base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageBase64 {
    /// `data:<mime>;base64,<payload>`
    pub data_uri: String,
    /// The payload alone.
    pub base64: String,
}

pub fn encode_image(mime: &str, bytes: &[u8]) -> ImageBase64 {
    let base64 = STANDARD.encode(bytes);
    ImageBase64 {
        data_uri: format!("data:{mime};base64,{base64}"),
        base64,
    }
}

/// Image bytes recovered from Base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// MIME type from the data URI header; `None` for a bare payload.
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Decode a `data:<mime>;base64,<payload>` URI or a bare payload.
pub fn decode_image(input: &str) -> Result<DecodedImage, ToolError> {
    let input = input.trim();
    let (mime, payload) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or(ToolError::InvalidBase64)?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or(ToolError::InvalidBase64)?;
            (Some(mime.to_owned()).filter(|m| !m.is_empty()), payload)
        }
        None => (None, input),
    };
    let compact: String = payload.split_ascii_whitespace().collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| ToolError::InvalidBase64)?;
    Ok(DecodedImage { mime, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_roundtrips_through_utf8() {
        let encoded = encode_text("héllo, 世界");
        assert_eq!(encoded, "aMOpbGxvLCDkuJbnlYw=");
        assert_eq!(decode_text(&encoded).unwrap(), "héllo, 世界");
    }

    #[test]
    fn decode_ignores_whitespace() {
        assert_eq!(decode_text("  aGVs\nbG8=\n").unwrap(), "hello");
    }

    #[test]
    fn decode_rejects_garbage_and_binary() {
        assert_eq!(decode_text("not base64!").unwrap_err(), ToolError::InvalidBase64);
        // 0xff 0xfe is not UTF-8.
        assert_eq!(decode_text("//4=").unwrap_err(), ToolError::InvalidBase64);
        assert_eq!(
            decode_text("%%%").unwrap_err().to_string(),
            "Invalid Base64 string"
        );
    }

    #[test]
    fn empty_input_decodes_to_empty_text() {
        assert_eq!(decode_text("").unwrap(), "");
        assert_eq!(encode_text(""), "");
    }

    #[test]
    fn image_payload_follows_the_comma() {
        let img = encode_image("image/gif", b"GIF89a");
        assert_eq!(img.base64, "R0lGODlh");
        assert_eq!(img.data_uri, "data:image/gif;base64,R0lGODlh");
        assert_eq!(img.data_uri.split_once(',').unwrap().1, img.base64);
    }

    #[test]
    fn image_decodes_from_data_uri_or_bare_payload() {
        let img = encode_image("image/png", b"\x89PNG\r\n");
        let from_uri = decode_image(&img.data_uri).unwrap();
        assert_eq!(from_uri.mime.as_deref(), Some("image/png"));
        assert_eq!(from_uri.bytes, b"\x89PNG\r\n");

        let bare = decode_image(&format!("  {}\n", img.base64)).unwrap();
        assert_eq!(bare.mime, None);
        assert_eq!(bare.bytes, from_uri.bytes);
    }

    #[test]
    fn image_decode_rejects_non_base64_uris() {
        for input in ["data:image/png,plain", "data:image/png;base64", "@@@"] {
            assert_eq!(
                decode_image(input).unwrap_err(),
                ToolError::InvalidBase64,
                "{input:?}"
            );
        }
    }
}
