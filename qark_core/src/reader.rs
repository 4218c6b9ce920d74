use crate::error::QarkError;
use crate::format::Tag;
use crate::value::{BitmapCapability, Value};

/// Read cursor over a byte slice.
///
/// Every read checks the remaining length first and fails with
/// [`QarkError::Underflow`] if the payload is truncated — no read ever
/// succeeds partially or silently wraps. Multi-byte primitives are
/// big-endian, matching the write side.
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Consume and return everything left in the buffer.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = &self.buf[self.pos..];
        self.pos = self.buf.len();
        rest
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], QarkError> {
        if self.remaining() < n {
            return Err(QarkError::Underflow {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn get_u8(&mut self) -> Result<u8, QarkError> {
        Ok(self.take(1)?[0])
    }

    pub fn get_u16(&mut self) -> Result<u16, QarkError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn get_i32(&mut self) -> Result<i32, QarkError> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn get_u32(&mut self) -> Result<u32, QarkError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn get_f32(&mut self) -> Result<f32, QarkError> {
        let bytes = self.take(4)?;
        Ok(f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Raw byte blob: `len:u16` then the bytes.
    pub fn get_blob(&mut self) -> Result<&'a [u8], QarkError> {
        let len = self.get_u16()? as usize;
        self.take(len)
    }

    /// Length-prefixed text: `byte_len:u16` then UTF-8 bytes, validated.
    pub fn get_utf(&mut self) -> Result<String, QarkError> {
        let bytes = self.get_blob()?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

/// Recursively decode one tagged value.
///
/// Reads the tag byte, rejects bytes outside the closed enumeration, and
/// dispatches to the tag's body decoder — the symmetric inverse of
/// `encode_value`. Every body length is fully determined by its own
/// prefixes, so the cursor always lands exactly past the value.
///
/// `bitmaps` is the optional image capability: a `Bitmap` tag without it
/// fails with [`QarkError::BitmapUnavailable`] rather than guessing.
pub fn decode_value(
    r: &mut ByteReader<'_>,
    bitmaps: Option<&dyn BitmapCapability>,
) -> Result<Value, QarkError> {
    let byte = r.get_u8()?;
    let tag = Tag::from_byte(byte).ok_or(QarkError::UnknownTag(byte))?;

    match tag {
        // Custom carries no type identity on the wire; both tags decode
        // to a generic keyed container.
        Tag::Custom | Tag::Object => {
            let count = r.get_u16()?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let key = r.get_utf()?;
                let child = decode_value(r, bitmaps)?;
                entries.push((key, child));
            }
            Ok(Value::Object(entries))
        }
        Tag::Array => {
            let count = r.get_u16()?;
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                items.push(decode_value(r, bitmaps)?);
            }
            Ok(Value::Array(items))
        }
        Tag::Int => Ok(Value::Int(r.get_i32()?)),
        Tag::UInt => Ok(Value::UInt(r.get_u32()?)),
        Tag::Float => Ok(Value::Float(r.get_f32()?)),
        Tag::String => Ok(Value::String(r.get_utf()?)),
        Tag::Bytes => Ok(Value::Bytes(r.get_blob()?.to_vec())),
        // Any nonzero byte reads back as true.
        Tag::Boolean => Ok(Value::Boolean(r.get_u8()? != 0)),
        Tag::Bitmap => {
            let capability = bitmaps.ok_or(QarkError::BitmapUnavailable)?;
            let width = r.get_u16()?;
            let height = r.get_u16()?;
            let mut buffer = capability.new_buffer(width, height);
            for y in 0..height {
                for x in 0..width {
                    buffer.set_pixel(x, y, r.get_u32()?);
                }
            }
            Ok(Value::Bitmap(buffer))
        }
    }
}
