use crate::error::QarkError;
use crate::format::Tag;
use crate::value::{digit_string_as_u32, Value};

/// Growable byte buffer with an implicit write cursor.
///
/// All multi-byte primitives are written big-endian, the single fixed
/// byte order of the format. Length-prefixed operations refuse anything
/// that does not fit the 16-bit count field instead of truncating.
#[derive(Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// IEEE-754 binary32.
    pub fn put_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Raw byte blob: `len:u16` then the bytes.
    pub fn put_blob(&mut self, bytes: &[u8]) -> Result<(), QarkError> {
        self.put_count(bytes.len(), "byte blob")?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Length-prefixed text: `byte_len:u16` then the UTF-8 bytes, written
    /// as-is. Text is guaranteed UTF-8 by the value model — no re-encoding
    /// happens at this layer.
    pub fn put_utf(&mut self, text: &str) -> Result<(), QarkError> {
        self.put_count(text.len(), "text")?;
        self.buf.extend_from_slice(text.as_bytes());
        Ok(())
    }

    /// Write a `u16` element count, rejecting anything wider.
    pub fn put_count(&mut self, len: usize, what: &'static str) -> Result<(), QarkError> {
        let count = u16::try_from(len).map_err(|_| QarkError::Oversized { what, len })?;
        self.put_u16(count);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Recursively encode one tagged value: classify, write the tag byte,
/// then the tag-specific body, recursing for container children.
///
/// The arms below mirror the classification precedence exactly: the
/// digit-string arm must stay first so an all-digit string lands on the
/// wire as an unsigned integer, not text.
pub fn encode_value(w: &mut ByteWriter, value: &Value) -> Result<(), QarkError> {
    match value {
        Value::String(s) => match digit_string_as_u32(s) {
            Some(n) => {
                w.put_u8(Tag::UInt as u8);
                w.put_u32(n);
            }
            None => {
                w.put_u8(Tag::String as u8);
                w.put_utf(s)?;
            }
        },
        Value::Int(n) => {
            w.put_u8(Tag::Int as u8);
            w.put_i32(*n);
        }
        Value::UInt(n) => {
            w.put_u8(Tag::UInt as u8);
            w.put_u32(*n);
        }
        Value::Float(x) => {
            w.put_u8(Tag::Float as u8);
            w.put_f32(*x);
        }
        Value::Bytes(b) => {
            w.put_u8(Tag::Bytes as u8);
            w.put_blob(b)?;
        }
        Value::Object(entries) => {
            w.put_u8(Tag::Object as u8);
            w.put_count(entries.len(), "keyed container")?;
            for (key, child) in entries {
                w.put_utf(key)?;
                encode_value(w, child)?;
            }
        }
        Value::Array(items) => {
            w.put_u8(Tag::Array as u8);
            w.put_count(items.len(), "ordered container")?;
            for item in items {
                encode_value(w, item)?;
            }
        }
        Value::Bitmap(bitmap) => {
            w.put_u8(Tag::Bitmap as u8);
            let (width, height) = (bitmap.width(), bitmap.height());
            w.put_u16(width);
            w.put_u16(height);
            // Row-major, rows outer.
            for y in 0..height {
                for x in 0..width {
                    w.put_u32(bitmap.pixel_at(x, y));
                }
            }
        }
        Value::Boolean(b) => {
            w.put_u8(Tag::Boolean as u8);
            w.put_u8(*b as u8);
        }
    }
    Ok(())
}
