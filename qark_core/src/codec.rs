use std::io;

/// Envelope compression abstraction.
///
/// Each `Codec` implementation:
/// - Is identified by a stable `flag()` recorded in the envelope header.
/// - Must be a pure transform over one whole payload; no cross-call
///   state is permitted, so a payload compressed on one machine always
///   decompresses on another with nothing but the flag byte.
/// - Registration order on [`crate::Qark`] doubles as tie-break priority
///   when two candidates compress to the same size.
pub trait Codec: Send + Sync {
    /// Stable compression flag stored in the envelope header.
    fn flag(&self) -> u8;

    /// Human-readable codec name for CLI display.
    fn name(&self) -> &'static str;

    /// Compress one whole payload.
    fn compress(&self, raw: &[u8]) -> io::Result<Vec<u8>>;

    /// Inverse of [`compress`](Codec::compress). Fails on corrupt input.
    fn decompress(&self, compressed: &[u8]) -> io::Result<Vec<u8>>;
}
