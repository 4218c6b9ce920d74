use std::io::{self, Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use qark_core::format::FLAG_ZLIB;
use qark_core::Codec;

/// Zlib envelope codec (flag 1).
///
/// Produces an RFC 1950 stream: a 2-byte header and a 4-byte Adler-32
/// trailer around the deflate data, so at equal levels it always runs
/// 6 bytes larger than [`crate::DeflateCodec`]. It stays registered as a
/// candidate because the flag is part of the wire contract and payloads
/// flagged with it must keep decoding.
pub struct ZlibCodec {
    /// Compression level (0 = store, 9 = smallest).
    pub level: u32,
}

impl Default for ZlibCodec {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl ZlibCodec {
    pub fn new(level: u32) -> Self {
        Self { level }
    }
}

impl Codec for ZlibCodec {
    fn flag(&self) -> u8 {
        FLAG_ZLIB
    }

    fn name(&self) -> &'static str {
        "zlib"
    }

    fn compress(&self, raw: &[u8]) -> io::Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(raw)?;
        encoder.finish()
    }

    fn decompress(&self, compressed: &[u8]) -> io::Result<Vec<u8>> {
        let mut raw = Vec::new();
        ZlibDecoder::new(compressed).read_to_end(&mut raw)?;
        Ok(raw)
    }
}
