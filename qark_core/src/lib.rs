pub mod codec;
pub mod envelope;
pub mod error;
pub mod format;
pub mod reader;
pub mod value;
pub mod writer;

pub use codec::Codec;
pub use envelope::Qark;
pub use error::QarkError;
pub use format::{Tag, ENVELOPE_OVERHEAD, FLAG_DEFLATE, FLAG_NONE, FLAG_ZLIB, MAGIC};
pub use reader::{decode_value, ByteReader};
pub use value::{
    classify, BitmapCapability, MemoryBitmap, MemoryBitmaps, PixelBuffer, Value,
};
pub use writer::{encode_value, ByteWriter};
