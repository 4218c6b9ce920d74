mod deflate_codec;
mod zlib_codec;

pub use deflate_codec::DeflateCodec;
pub use zlib_codec::ZlibCodec;

use qark_core::format::{FLAG_DEFLATE, FLAG_ZLIB};
use qark_core::{Codec, MemoryBitmaps, Qark};

/// Resolve a codec from its envelope flag.
///
/// Used by the CLI when inspecting an existing envelope, so the payload
/// can be unpacked with the right algorithm automatically.
pub fn codec_for_flag(flag: u8) -> anyhow::Result<Box<dyn Codec>> {
    match flag {
        FLAG_ZLIB => Ok(Box::new(ZlibCodec::default())),
        FLAG_DEFLATE => Ok(Box::new(DeflateCodec::default())),
        _ => anyhow::bail!("unknown compression flag {}; supported: 1 (zlib), 2 (deflate)", flag),
    }
}

/// A fully wired codec: both compression candidates registered in flag
/// order and in-memory bitmap support injected.
pub fn standard() -> Qark {
    Qark::new()
        .with_codec(Box::new(ZlibCodec::default()))
        .with_codec(Box::new(DeflateCodec::default()))
        .with_bitmaps(Box::new(MemoryBitmaps))
}
