//! Content type detection from the leading bytes of a file. Image formats
//! are recognised by the `image` crate, the rest follows the WHATWG MIME
//! sniffing table for markup, text and common media containers.

use image::ImageFormat;

use crate::traits::DEFAULT_CONTENT_TYPE;

/// Number of leading bytes considered when sniffing.
pub const SNIFF_LEN: usize = 512;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";

enum Signature {
    /// Case-insensitive tag after optional leading whitespace, terminated by
    /// a space or `>`.
    HtmlTag(&'static [u8]),
    /// Exact prefix after optional leading whitespace.
    Markup(&'static [u8], &'static str),
    Exact(&'static [u8], &'static str),
    Masked {
        mask: &'static [u8],
        pattern: &'static [u8],
        content_type: &'static str,
    },
    Mp4,
}

// checked before image formats
const MARKUP_SIGNATURES: &[Signature] = &[
    Signature::HtmlTag(b"<!DOCTYPE HTML"),
    Signature::HtmlTag(b"<HTML"),
    Signature::HtmlTag(b"<HEAD"),
    Signature::HtmlTag(b"<SCRIPT"),
    Signature::HtmlTag(b"<IFRAME"),
    Signature::HtmlTag(b"<H1"),
    Signature::HtmlTag(b"<DIV"),
    Signature::HtmlTag(b"<FONT"),
    Signature::HtmlTag(b"<TABLE"),
    Signature::HtmlTag(b"<A"),
    Signature::HtmlTag(b"<STYLE"),
    Signature::HtmlTag(b"<TITLE"),
    Signature::HtmlTag(b"<B"),
    Signature::HtmlTag(b"<BODY"),
    Signature::HtmlTag(b"<BR"),
    Signature::HtmlTag(b"<P"),
    Signature::HtmlTag(b"<!--"),
    Signature::Markup(b"<svg", "image/svg+xml"),
    Signature::Markup(b"<?xml", "text/xml; charset=utf-8"),
    Signature::Exact(b"%PDF-", "application/pdf"),
    Signature::Exact(b"%!PS-Adobe-", "application/postscript"),
    Signature::Exact(b"\xFE\xFF", "text/plain; charset=utf-16be"),
    Signature::Exact(b"\xFF\xFE", "text/plain; charset=utf-16le"),
    Signature::Exact(b"\xEF\xBB\xBF", TEXT_PLAIN),
];

// checked after image formats
const MEDIA_SIGNATURES: &[Signature] = &[
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WAVE",
        content_type: "audio/wave",
    },
    Signature::Exact(b"ID3", "audio/mpeg"),
    Signature::Exact(b"OggS\x00", "application/ogg"),
    Signature::Mp4,
    Signature::Exact(b"\x1A\x45\xDF\xA3", "video/webm"),
    Signature::Exact(b"PK\x03\x04", "application/zip"),
    Signature::Exact(b"\x1F\x8B\x08", "application/x-gzip"),
    Signature::Exact(b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    Signature::Exact(b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    Signature::Exact(b"\x00asm", "application/wasm"),
];

/// Guesses a content type from at most the first `SNIFF_LEN` bytes of
/// `data`. Always returns a valid type.
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    if data.is_empty() {
        return DEFAULT_CONTENT_TYPE;
    }

    find_signature(MARKUP_SIGNATURES, data)
        .or_else(|| image_content_type(data))
        .or_else(|| find_signature(MEDIA_SIGNATURES, data))
        .unwrap_or_else(|| {
            if data.iter().copied().any(is_binary_byte) {
                DEFAULT_CONTENT_TYPE
            } else {
                TEXT_PLAIN
            }
        })
}

fn find_signature(signatures: &[Signature], data: &[u8]) -> Option<&'static str> {
    signatures
        .iter()
        .find_map(|signature| signature.matches(data))
}

fn image_content_type(data: &[u8]) -> Option<&'static str> {
    match image::guess_format(data).ok()? {
        // netpbm magic is two printable bytes, plain text starts like that too
        ImageFormat::Pnm => None,
        format => Some(format.to_mime_type()),
    }
}

impl Signature {
    fn matches(&self, data: &[u8]) -> Option<&'static str> {
        match self {
            Self::HtmlTag(tag) => {
                let data = skip_whitespace(data);

                // tag plus its terminating byte
                if data.len() <= tag.len() {
                    return None;
                }

                let tag_matches = tag.iter().zip(data).all(|(expected, actual)| {
                    if expected.is_ascii_uppercase() {
                        expected == &actual.to_ascii_uppercase()
                    } else {
                        expected == actual
                    }
                });

                let terminated = matches!(data[tag.len()], b' ' | b'>');

                (tag_matches && terminated).then_some(TEXT_HTML)
            }
            Self::Markup(prefix, content_type) => skip_whitespace(data)
                .starts_with(prefix)
                .then_some(*content_type),
            Self::Exact(prefix, content_type) => data.starts_with(prefix).then_some(*content_type),
            Self::Masked {
                mask,
                pattern,
                content_type,
            } => {
                if data.len() < pattern.len() {
                    return None;
                }

                mask.iter()
                    .zip(pattern.iter())
                    .zip(data)
                    .all(|((mask, pattern), byte)| byte & mask == *pattern)
                    .then_some(*content_type)
            }
            Self::Mp4 => mp4_type(data),
        }
    }
}

/// `ftyp` box with an `mp4` brand.
fn mp4_type(data: &[u8]) -> Option<&'static str> {
    if data.len() < 12 {
        return None;
    }

    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;

    if data.len() < box_size || box_size % 4 != 0 || &data[4..8] != b"ftyp" {
        return None;
    }

    // skip the minor version at offset 12
    (8..box_size)
        .step_by(4)
        .filter(|offset| *offset != 12)
        .any(|offset| &data[offset..offset + 3] == b"mp4")
        .then_some("video/mp4")
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|byte| !matches!(byte, b'\t' | b'\n' | b'\x0C' | b'\r' | b' '))
        .unwrap_or(data.len());

    &data[start..]
}

fn is_binary_byte(byte: u8) -> bool {
    matches!(byte, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_images() {
        assert_eq!(
            detect_content_type(b"\x89PNG\x0D\x0A\x1A\x0A\x00\x00\x00\x0DIHDR"),
            "image/png"
        );
        assert_eq!(detect_content_type(b"\xFF\xD8\xFF\xE0\x00\x10JFIF"), "image/jpeg");
        assert_eq!(detect_content_type(b"GIF89a\x01\x00\x01\x00"), "image/gif");
        assert_eq!(
            detect_content_type(b"RIFF\x24\x00\x00\x00WEBPVP8 "),
            "image/webp"
        );
        assert_eq!(detect_content_type(b"\x00\x00\x01\x00\x01\x00"), "image/x-icon");
        assert_eq!(detect_content_type(b"BM\x36\x00\x0C\x00"), "image/bmp");
        assert_eq!(
            detect_content_type(b"  <svg xmlns=\"http://www.w3.org/2000/svg\"/>"),
            "image/svg+xml"
        );
    }

    #[test]
    fn detects_avif_and_mp4() {
        let mut avif = vec![0x00, 0x00, 0x00, 0x1C];
        avif.extend_from_slice(b"ftypavif\x00\x00\x00\x00avifmif1miaf");
        assert_eq!(detect_content_type(&avif), "image/avif");

        let mut mp4 = vec![0x00, 0x00, 0x00, 0x18];
        mp4.extend_from_slice(b"ftypisom\x00\x00\x02\x00isomiso2");
        assert_eq!(detect_content_type(&mp4), DEFAULT_CONTENT_TYPE);

        let mut mp4 = vec![0x00, 0x00, 0x00, 0x18];
        mp4.extend_from_slice(b"ftypisom\x00\x00\x02\x00isommp41");
        assert_eq!(detect_content_type(&mp4), "video/mp4");
    }

    #[test]
    fn detects_html_case_insensitively() {
        assert_eq!(detect_content_type(b"\n <!doctype html><html>"), TEXT_HTML);
        assert_eq!(detect_content_type(b"<p>hello</p>"), TEXT_HTML);
        // no terminator after the tag
        assert_eq!(detect_content_type(b"<pre"), TEXT_PLAIN);
    }

    #[test]
    fn falls_back_on_text_or_binary() {
        assert_eq!(detect_content_type(b"my-hostname\n"), TEXT_PLAIN);
        assert_eq!(detect_content_type(b"P3 launcher notes\n"), TEXT_PLAIN);
        assert_eq!(detect_content_type(b"\x01\x02\x03"), DEFAULT_CONTENT_TYPE);
        assert_eq!(detect_content_type(b""), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn only_looks_at_the_sniff_window() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0x00);

        assert_eq!(detect_content_type(&data), TEXT_PLAIN);
    }
}
