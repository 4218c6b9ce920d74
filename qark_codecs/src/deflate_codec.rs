use std::io::{self, Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use qark_core::format::FLAG_DEFLATE;
use qark_core::Codec;

/// Raw deflate envelope codec (flag 2).
///
/// Bare RFC 1951 data with no container header or checksum. The leanest
/// candidate the envelope knows, and the usual winner whenever the
/// payload compresses at all.
pub struct DeflateCodec {
    /// Compression level (0 = store, 9 = smallest).
    pub level: u32,
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl DeflateCodec {
    pub fn new(level: u32) -> Self {
        Self { level }
    }
}

impl Codec for DeflateCodec {
    fn flag(&self) -> u8 {
        FLAG_DEFLATE
    }

    fn name(&self) -> &'static str {
        "deflate"
    }

    fn compress(&self, raw: &[u8]) -> io::Result<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(raw)?;
        encoder.finish()
    }

    fn decompress(&self, compressed: &[u8]) -> io::Result<Vec<u8>> {
        let mut raw = Vec::new();
        DeflateDecoder::new(compressed).read_to_end(&mut raw)?;
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let codec = DeflateCodec::default();
        let raw = b"aaaaabbbbbcccccdddddeeeee".repeat(40);
        let compressed = codec.compress(&raw).unwrap();
        assert!(compressed.len() < raw.len());
        assert_eq!(codec.decompress(&compressed).unwrap(), raw);
    }

    #[test]
    fn leaner_than_zlib_at_equal_level() {
        let raw = b"repetitive payload text, repetitive payload text".repeat(20);
        let deflate = DeflateCodec::default().compress(&raw).unwrap();
        let zlib = crate::ZlibCodec::default().compress(&raw).unwrap();
        assert_eq!(zlib.len(), deflate.len() + 6);
    }
}
