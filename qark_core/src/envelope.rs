use crate::codec::Codec;
use crate::error::QarkError;
use crate::format::{ENVELOPE_OVERHEAD, FLAG_NONE, MAGIC};
use crate::reader::{decode_value, ByteReader};
use crate::value::{BitmapCapability, Value};
use crate::writer::{encode_value, ByteWriter};

/// A configured Qark codec: compression candidates plus the optional
/// image capability.
///
/// # Envelope layout
/// ```text
/// [MAGIC: 4 bytes, big-endian 0x3121322b]
/// [FLAG:  1 byte — 0 none, or a registered codec's flag]
/// [PAYLOAD: tagged value, verbatim or compressed per FLAG]
/// ```
///
/// On encode the payload is compressed once per registered codec and the
/// byte-smallest of {verbatim, candidates} wins; ties favor the verbatim
/// payload, then the earlier-registered codec. The emitted envelope is
/// therefore never larger than the raw payload plus 5 bytes of framing.
///
/// All configuration is immutable after construction, so a `Qark` can be
/// shared freely across threads — encode and decode are synchronous,
/// pure, and hold no state between calls. Recursion depth equals the
/// nesting depth of the input; callers feeding untrusted payloads should
/// bound nesting/size before invoking, as the codec itself does not.
#[derive(Default)]
pub struct Qark {
    codecs: Vec<Box<dyn Codec>>,
    bitmaps: Option<Box<dyn BitmapCapability>>,
}

impl Qark {
    /// Bare codec: no compression candidates, no bitmap support.
    /// Every encode is emitted verbatim under flag 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a compression candidate. Registration order is the
    /// tie-break priority on encode and the lookup order on decode.
    pub fn with_codec(mut self, codec: Box<dyn Codec>) -> Self {
        self.codecs.push(codec);
        self
    }

    /// Inject the image capability required to decode bitmap values.
    pub fn with_bitmaps(mut self, bitmaps: Box<dyn BitmapCapability>) -> Self {
        self.bitmaps = Some(bitmaps);
        self
    }

    /// Encode one value into a self-describing envelope.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, QarkError> {
        let mut w = ByteWriter::new();
        encode_value(&mut w, value)?;
        let raw = w.into_bytes();

        // Three-way (or N-way) candidate selection: strict `<` against the
        // current best keeps the verbatim payload on ties, then the
        // earliest-registered codec.
        let mut flag = FLAG_NONE;
        let mut best: Option<Vec<u8>> = None;
        for codec in &self.codecs {
            let candidate = codec.compress(&raw).map_err(QarkError::Compression)?;
            let best_len = best.as_ref().map_or(raw.len(), Vec::len);
            if candidate.len() < best_len {
                flag = codec.flag();
                best = Some(candidate);
            }
        }
        let payload = best.unwrap_or(raw);

        let mut out = Vec::with_capacity(ENVELOPE_OVERHEAD + payload.len());
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.push(flag);
        out.extend_from_slice(&payload);
        Ok(out)
    }

    /// Decode one envelope back into a value.
    ///
    /// Returns `Ok(None)` when the input does not start with the magic —
    /// "not our format" is a fallback signal for the caller, not an
    /// error. Everything after a matching magic is held to the format:
    /// a missing flag byte, an unsupported flag, a corrupt compressed
    /// stream, or a truncated value all fail with the matching error.
    /// Trailing bytes beyond the outermost value are ignored.
    pub fn decode(&self, bytes: &[u8]) -> Result<Option<Value>, QarkError> {
        if bytes.len() < 4 || bytes[..4] != MAGIC.to_be_bytes() {
            return Ok(None);
        }

        let mut r = ByteReader::new(&bytes[4..]);
        let flag = r.get_u8()?;
        let payload = r.rest();

        let value = if flag == FLAG_NONE {
            let mut vr = ByteReader::new(payload);
            decode_value(&mut vr, self.bitmaps.as_deref())?
        } else {
            let codec = self
                .codecs
                .iter()
                .find(|c| c.flag() == flag)
                .ok_or(QarkError::InvalidFlag(flag))?;
            let data = codec.decompress(payload).map_err(QarkError::Decompression)?;
            let mut vr = ByteReader::new(&data);
            decode_value(&mut vr, self.bitmaps.as_deref())?
        };

        Ok(Some(value))
    }
}
