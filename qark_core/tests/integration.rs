//! Envelope-level tests through the fully wired codec: round-trips,
//! compression candidate selection, magic handling, and every decode
//! failure mode reachable from the outside.

use qark_core::format::{ENVELOPE_OVERHEAD, FLAG_DEFLATE, FLAG_NONE, FLAG_ZLIB, MAGIC};
use qark_core::{encode_value, ByteWriter, Codec, MemoryBitmap, Qark, QarkError, Value};

/// The two-codec, bitmap-capable wiring used by real callers.
fn standard() -> Qark {
    qark_codecs::standard()
}

fn raw_payload_len(value: &Value) -> usize {
    let mut w = ByteWriter::new();
    encode_value(&mut w, value).unwrap();
    w.len()
}

/// Keyed container with enough repeated text to be worth compressing.
fn compressible_object(entries: usize) -> Value {
    let filler = "the quick brown fox jumps over the lazy dog. ".repeat(4);
    Value::Object(
        (0..entries)
            .map(|i| (format!("entry-{i}"), Value::String(filler.clone())))
            .collect(),
    )
}

// ── round-trips ────────────────────────────────────────────────────────────

#[test]
fn scalars_round_trip() {
    let qark = standard();
    let samples = [
        Value::Int(42),
        Value::Int(-40_000),
        Value::UInt(4_000_000_000),
        Value::Float(-2.25),
        Value::String("hello world".into()),
        Value::Bytes(vec![0xff, 0x00, 0xfe, 0x01]),
        Value::Boolean(true),
        Value::Boolean(false),
    ];
    for value in samples {
        let envelope = qark.encode(&value).unwrap();
        let decoded = qark.decode(&envelope).unwrap();
        assert_eq!(decoded, Some(value));
    }
}

#[test]
fn nested_containers_round_trip_with_key_order() {
    let qark = standard();
    let value = Value::Object(vec![
        ("zulu".into(), Value::Array(vec![Value::Int(1), Value::Int(2)])),
        ("alpha".into(), Value::Object(Vec::new())),
        ("mike".into(), Value::Bytes(vec![9, 9, 9])),
    ]);
    let decoded = qark.decode(&qark.encode(&value).unwrap()).unwrap();
    assert_eq!(decoded, Some(value));
}

#[test]
fn digit_string_round_trips_as_unsigned() {
    let qark = standard();
    let envelope = qark.encode(&Value::String("7".into())).unwrap();
    assert_eq!(qark.decode(&envelope).unwrap(), Some(Value::UInt(7)));
}

#[test]
fn bitmap_round_trips_pixel_for_pixel() {
    let qark = standard();
    let bitmap = MemoryBitmap::from_pixels(
        3,
        2,
        vec![
            0xff00_0000,
            0x00ff_0000,
            0x0000_ff00,
            0x0000_00ff,
            0x1234_5678,
            0x8765_4321,
        ],
    );
    let value = Value::Bitmap(Box::new(bitmap));
    let decoded = qark.decode(&qark.encode(&value).unwrap()).unwrap();
    assert_eq!(decoded, Some(value));
}

// ── compression candidate selection ────────────────────────────────────────

#[test]
fn small_payload_stays_verbatim() {
    let qark = standard();
    let envelope = qark.encode(&Value::Int(42)).unwrap();
    assert_eq!(envelope[4], FLAG_NONE);
    assert_eq!(envelope.len(), ENVELOPE_OVERHEAD + raw_payload_len(&Value::Int(42)));
}

#[test]
fn compressible_payload_selects_deflate() {
    // Deflate is the zlib stream minus 6 bytes of container framing, so
    // whenever compression wins at all it beats the zlib candidate.
    let qark = standard();
    let value = compressible_object(40);
    let envelope = qark.encode(&value).unwrap();

    assert_eq!(envelope[4], FLAG_DEFLATE);
    assert!(envelope.len() < raw_payload_len(&value) + ENVELOPE_OVERHEAD);
    assert_eq!(qark.decode(&envelope).unwrap(), Some(value));
}

#[test]
fn envelope_never_expands_beyond_overhead() {
    let qark = standard();
    let samples = [
        Value::Int(0),
        Value::Bytes((0u16..256).map(|b| (b * 7 % 251) as u8).collect()),
        compressible_object(10),
        Value::Array((0..30).map(|_| Value::Boolean(true)).collect()),
    ];
    for value in samples {
        let envelope = qark.encode(&value).unwrap();
        assert!(
            envelope.len() <= raw_payload_len(&value) + ENVELOPE_OVERHEAD,
            "envelope grew past the raw payload for {value:?}"
        );
    }
}

#[test]
fn zlib_flagged_payload_still_decodes() {
    // The selector will never pick zlib over deflate, but the flag is
    // wire-stable and foreign producers may emit it.
    let value = compressible_object(20);
    let raw = {
        let mut w = ByteWriter::new();
        encode_value(&mut w, &value).unwrap();
        w.into_bytes()
    };
    let compressed = qark_codecs::ZlibCodec::default().compress(&raw).unwrap();

    let mut envelope = MAGIC.to_be_bytes().to_vec();
    envelope.push(FLAG_ZLIB);
    envelope.extend_from_slice(&compressed);

    assert_eq!(standard().decode(&envelope).unwrap(), Some(value));
}

// ── magic and framing ──────────────────────────────────────────────────────

#[test]
fn magic_mismatch_returns_none_never_errors() {
    let qark = standard();
    assert!(qark.decode(b"").unwrap().is_none());
    assert!(qark.decode(b"\x31").unwrap().is_none());
    assert!(qark.decode(b"not a qark payload").unwrap().is_none());
    // One bit off in the magic.
    assert!(qark.decode(&[0x31, 0x21, 0x32, 0x2a, 0x00]).unwrap().is_none());
}

#[test]
fn missing_flag_byte_underflows() {
    let err = standard().decode(&MAGIC.to_be_bytes()).unwrap_err();
    assert!(matches!(err, QarkError::Underflow { .. }));
}

#[test]
fn truncated_envelope_underflows() {
    let qark = standard();
    // Small value: stored verbatim, so truncation hits the value decoder.
    let envelope = qark.encode(&Value::String("hello world".into())).unwrap();
    assert_eq!(envelope[4], FLAG_NONE);

    let err = qark.decode(&envelope[..envelope.len() - 1]).unwrap_err();
    assert!(matches!(err, QarkError::Underflow { .. }));
}

#[test]
fn trailing_bytes_are_ignored() {
    let qark = standard();
    let mut envelope = qark.encode(&Value::Int(7)).unwrap();
    assert_eq!(envelope[4], FLAG_NONE);
    envelope.extend_from_slice(b"garbage past the value");
    assert_eq!(qark.decode(&envelope).unwrap(), Some(Value::Int(7)));
}

// ── decode failure modes ───────────────────────────────────────────────────

#[test]
fn unknown_tag_in_envelope_is_rejected() {
    let mut envelope = MAGIC.to_be_bytes().to_vec();
    envelope.push(FLAG_NONE);
    envelope.push(0x0a);
    let err = standard().decode(&envelope).unwrap_err();
    assert!(matches!(err, QarkError::UnknownTag(0x0a)));
}

#[test]
fn unsupported_flag_is_rejected() {
    let mut envelope = MAGIC.to_be_bytes().to_vec();
    envelope.push(0x07);
    envelope.extend_from_slice(&[0x03, 0x00, 0x00, 0x00, 0x2a]);
    let err = standard().decode(&envelope).unwrap_err();
    assert!(matches!(err, QarkError::InvalidFlag(0x07)));

    // A compressed flag is also unsupported on a codec with no candidates
    // registered.
    let bare = Qark::new();
    let err = bare.decode(&envelope).unwrap_err();
    assert!(matches!(err, QarkError::InvalidFlag(0x07)));
}

#[test]
fn corrupt_compressed_payload_is_rejected() {
    let mut envelope = MAGIC.to_be_bytes().to_vec();
    envelope.push(FLAG_ZLIB);
    envelope.extend_from_slice(b"\xde\xad\xbe\xef not a zlib stream");
    let err = standard().decode(&envelope).unwrap_err();
    assert!(matches!(err, QarkError::Decompression(_)));
}

#[test]
fn bitmap_decode_without_capability_fails() {
    let bitmap = MemoryBitmap::from_pixels(1, 1, vec![0xcafe_babe]);
    let envelope = standard().encode(&Value::Bitmap(Box::new(bitmap))).unwrap();

    // No bitmap capability injected: same bytes, explicit failure.
    let err = Qark::new().decode(&envelope).unwrap_err();
    assert!(matches!(err, QarkError::BitmapUnavailable));
}

#[test]
fn oversized_container_is_rejected_on_encode() {
    let err = standard()
        .encode(&Value::Bytes(vec![0u8; 100_000]))
        .unwrap_err();
    assert!(matches!(err, QarkError::Oversized { .. }));
}
