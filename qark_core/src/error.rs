use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors surfaced by encode and decode.
///
/// Every failure is a deterministic function of the input. Nothing is
/// retried internally; the caller decides what to do with a bad payload.
/// A magic mismatch is deliberately NOT an error: `Qark::decode` returns
/// `Ok(None)` so callers can fall back to other formats.
#[derive(Debug, Error)]
pub enum QarkError {
    /// A read needed more bytes than remain in the payload.
    #[error("payload underflow: need {needed} byte(s), only {remaining} remain")]
    Underflow { needed: usize, remaining: usize },

    /// A tag byte outside the closed wire enumeration.
    #[error("unknown wire type tag 0x{0:02x}")]
    UnknownTag(u8),

    /// A compression flag outside the supported set.
    #[error("invalid compression flag 0x{0:02x}")]
    InvalidFlag(u8),

    #[error("compressing payload")]
    Compression(#[source] io::Error),

    #[error("corrupt compressed payload")]
    Decompression(#[source] io::Error),

    /// A bitmap tag was decoded but no bitmap capability was injected.
    #[error("bitmap support is not available in this environment")]
    BitmapUnavailable,

    /// Decoded text was not valid UTF-8.
    #[error("decoded text is not valid UTF-8")]
    InvalidText(#[from] FromUtf8Error),

    /// A count or length does not fit its 16-bit wire field.
    /// Detected before any bytes are emitted, never silently truncated.
    #[error("{what} length {len} exceeds the 16-bit wire limit")]
    Oversized { what: &'static str, len: usize },
}
