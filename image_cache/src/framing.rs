//! Container layout of a cache entry:
//!
//! ```text
//! [u16 big-endian content type length N][N bytes content type][body ...]
//! ```

use thiserror::Error;

pub(crate) const LENGTH_PREFIX_LEN: u64 = 2;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FramingError {
    #[error("content type is {0} bytes, the header holds at most 65535")]
    ContentTypeTooLong(usize),
    #[error("entry is {0} bytes, too short for the length prefix")]
    MissingLengthPrefix(u64),
    #[error("declared content type length {declared} exceeds the {remaining} bytes left")]
    Truncated { declared: u16, remaining: u64 },
    #[error("content type is not valid UTF-8")]
    InvalidContentType,
}

/// Length prefix followed by the content type bytes. Oversized content
/// types are rejected, never cut short.
pub(crate) fn encode_header(content_type: &str) -> Result<Vec<u8>, FramingError> {
    let length = u16::try_from(content_type.len())
        .map_err(|_| FramingError::ContentTypeTooLong(content_type.len()))?;

    let mut header = Vec::with_capacity(LENGTH_PREFIX_LEN as usize + content_type.len());
    header.extend_from_slice(&length.to_be_bytes());
    header.extend_from_slice(content_type.as_bytes());

    Ok(header)
}

/// Checks a declared content type length against the size of the entry
/// before anything is allocated for it.
pub(crate) fn check_declared_length(declared: u16, entry_len: u64) -> Result<(), FramingError> {
    let remaining = entry_len.saturating_sub(LENGTH_PREFIX_LEN);

    if u64::from(declared) > remaining {
        return Err(FramingError::Truncated {
            declared,
            remaining,
        });
    }

    Ok(())
}

pub(crate) fn decode_content_type(raw: Vec<u8>) -> Result<String, FramingError> {
    String::from_utf8(raw).map_err(|_| FramingError::InvalidContentType)
}
