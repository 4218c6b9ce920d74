/// Magic number identifying a Qark envelope.
/// Written big-endian as the first four bytes: `31 21 32 2b`.
pub const MAGIC: u32 = 0x3121_322b;

/// Fixed envelope overhead in bytes:
///   magic:u32 + compression flag:u8 = 4 + 1 = 5
pub const ENVELOPE_OVERHEAD: usize = 5;

// ── Compression flags ──────────────────────────────────────────────────────

/// Payload stored verbatim.
pub const FLAG_NONE: u8 = 0;

/// Payload is an RFC 1950 zlib stream.
pub const FLAG_ZLIB: u8 = 1;

/// Payload is a raw RFC 1951 deflate stream.
pub const FLAG_DEFLATE: u8 = 2;

// ── Wire type tags ─────────────────────────────────────────────────────────

/// One-byte discriminator prefixed to every encoded value.
///
/// The numeric values are wire-stable and must never be renumbered:
/// payloads produced by older encoders carry them forever.
///
/// `Custom` shares the keyed-container wire layout with `Object` — the
/// format carries no class name, so both decode to a plain keyed container.
/// The encoder never emits `Custom`; it is accepted on decode for
/// compatibility with payloads from producers that do.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Custom = 0,
    Object = 1,
    Array = 2,
    Int = 3,
    UInt = 4,
    Float = 5,
    String = 6,
    Bytes = 7,
    Boolean = 8,
    Bitmap = 9,
}

impl Tag {
    /// Map a wire byte back to its tag. `None` for bytes outside the
    /// closed enumeration.
    pub fn from_byte(byte: u8) -> Option<Tag> {
        match byte {
            0 => Some(Tag::Custom),
            1 => Some(Tag::Object),
            2 => Some(Tag::Array),
            3 => Some(Tag::Int),
            4 => Some(Tag::UInt),
            5 => Some(Tag::Float),
            6 => Some(Tag::String),
            7 => Some(Tag::Bytes),
            8 => Some(Tag::Boolean),
            9 => Some(Tag::Bitmap),
            _ => None,
        }
    }

    /// Human-readable tag name for CLI display.
    pub fn name(self) -> &'static str {
        match self {
            Tag::Custom => "custom",
            Tag::Object => "object",
            Tag::Array => "array",
            Tag::Int => "int",
            Tag::UInt => "uint",
            Tag::Float => "float",
            Tag::String => "string",
            Tag::Bytes => "bytes",
            Tag::Boolean => "boolean",
            Tag::Bitmap => "bitmap",
        }
    }
}
