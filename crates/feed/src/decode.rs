// ABOUTME: Converts raw feed bytes to UTF-8 before XML parsing.
// ABOUTME: Honors a byte-order mark, then the XML declaration's encoding, then charset detection.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use once_cell::sync::Lazy;
use regex::bytes::Regex;

static XML_DECL_ENCODING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?-u)^\s*<\?xml[^>]*?\bencoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#).unwrap()
});

/// Declarations are only looked for near the start of the document.
const DECL_SCAN_BYTES: usize = 256;

/// Returns the encoding label from the XML declaration, if any.
pub fn declared_encoding(data: &[u8]) -> Option<&'static Encoding> {
    let head = &data[..data.len().min(DECL_SCAN_BYTES)];
    let label = XML_DECL_ENCODING.captures(head)?.get(1)?.as_bytes();
    let encoding = Encoding::for_label(label)?;
    // A declaration readable as ASCII cannot be UTF-16 without a BOM.
    if encoding == UTF_16LE || encoding == UTF_16BE {
        return None;
    }
    Some(encoding)
}

/// Decodes feed bytes to UTF-8 text. Valid UTF-8 without a conflicting
/// declaration is borrowed as-is.
pub fn decode_feed_bytes(data: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(data) {
        let (text, _) = encoding.decode_without_bom_handling(&data[bom_len..]);
        return text;
    }

    if let Some(encoding) = declared_encoding(data) {
        let (text, _) = encoding.decode_without_bom_handling(data);
        return text;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        return Cow::Borrowed(text);
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(data, true);
    let encoding = detector.guess(None, true);
    let (text, _) = encoding.decode_without_bom_handling(data);
    text
}
