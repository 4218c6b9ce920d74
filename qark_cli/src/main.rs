use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use qark_codecs::codec_for_flag;
use qark_core::format::{ENVELOPE_OVERHEAD, FLAG_NONE, MAGIC};
use qark_core::{PixelBuffer, Tag, Value};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "qark",
    about = "Qark: encode, decode, and inspect self-describing binary envelopes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON document into a Qark envelope
    Encode {
        /// Source JSON file ("-" reads stdin)
        input: PathBuf,
        /// Destination envelope file
        output: PathBuf,
    },
    /// Decode a Qark envelope back to JSON
    Decode {
        /// Source envelope file
        input: PathBuf,
        /// Destination JSON file ("-" writes to stdout)
        output: PathBuf,
        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Print envelope metadata: flag, sizes, ratio, top-level tag
    Inspect {
        /// Envelope file to inspect
        file: PathBuf,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

fn flag_display(flag: u8) -> String {
    if flag == FLAG_NONE {
        return "none (stored verbatim)".to_string();
    }
    match codec_for_flag(flag) {
        Ok(codec) => format!("{} (flag {})", codec.name(), flag),
        Err(_) => format!("unknown (flag {})", flag),
    }
}

fn read_input(path: &PathBuf) -> anyhow::Result<Vec<u8>> {
    if path.to_str() == Some("-") {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(path).with_context(|| format!("reading {:?}", path))
    }
}

fn write_output(path: &PathBuf, bytes: &[u8]) -> anyhow::Result<()> {
    if path.to_str() == Some("-") {
        io::stdout().lock().write_all(bytes)?;
        Ok(())
    } else {
        fs::write(path, bytes).with_context(|| format!("writing {:?}", path))
    }
}

/// Map a JSON document onto the Qark value model.
///
/// Integers must fit 32 bits (signed first, then unsigned); other numbers
/// become 32-bit floats. `null` has no wire representation and is
/// rejected. Digit-only strings will land on the wire as unsigned
/// integers; that is the format's classification convention, not a CLI
/// choice.
fn json_to_value(json: &serde_json::Value) -> anyhow::Result<Value> {
    match json {
        serde_json::Value::Null => anyhow::bail!("null has no Qark wire representation"),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
        serde_json::Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                if let Some(v) = n.as_i64().and_then(|i| i32::try_from(i).ok()) {
                    return Ok(Value::Int(v));
                }
                if let Some(v) = n.as_u64().and_then(|u| u32::try_from(u).ok()) {
                    return Ok(Value::UInt(v));
                }
                anyhow::bail!("integer {} is outside the 32-bit wire range", n);
            }
            // Serde guarantees a finite f64 here.
            Ok(Value::Float(n.as_f64().unwrap_or_default() as f32))
        }
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Array(items) => {
            let converted = items
                .iter()
                .map(json_to_value)
                .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(Value::Array(converted))
        }
        serde_json::Value::Object(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, child) in map {
                entries.push((key.clone(), json_to_value(child)?));
            }
            Ok(Value::Object(entries))
        }
    }
}

/// Map a decoded value back to JSON. Byte blobs become arrays of numbers
/// and bitmaps become `{width, height, pixels}` objects, since JSON has
/// no native form for either.
fn value_to_json(value: &Value) -> anyhow::Result<serde_json::Value> {
    Ok(match value {
        Value::Object(entries) => {
            let mut map = serde_json::Map::with_capacity(entries.len());
            for (key, child) in entries {
                map.insert(key.clone(), value_to_json(child)?);
            }
            serde_json::Value::Object(map)
        }
        Value::Array(items) => serde_json::Value::Array(
            items
                .iter()
                .map(value_to_json)
                .collect::<anyhow::Result<Vec<_>>>()?,
        ),
        Value::Int(n) => (*n).into(),
        Value::UInt(n) => (*n).into(),
        Value::Float(x) => serde_json::Number::from_f64(*x as f64)
            .map(serde_json::Value::Number)
            .ok_or_else(|| anyhow::anyhow!("float {} is not representable in JSON", x))?,
        Value::String(s) => s.clone().into(),
        Value::Bytes(b) => serde_json::Value::Array(b.iter().map(|&v| v.into()).collect()),
        Value::Boolean(b) => (*b).into(),
        Value::Bitmap(bitmap) => bitmap_to_json(bitmap.as_ref()),
    })
}

fn bitmap_to_json(bitmap: &dyn PixelBuffer) -> serde_json::Value {
    let (width, height) = (bitmap.width(), bitmap.height());
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push(serde_json::Value::from(bitmap.pixel_at(x, y)));
        }
    }
    serde_json::json!({
        "width": width,
        "height": height,
        "pixels": pixels,
    })
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_encode(input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let json_bytes = read_input(&input)?;
    let json: serde_json::Value =
        serde_json::from_slice(&json_bytes).with_context(|| format!("parsing {:?}", input))?;
    let value = json_to_value(&json)?;

    let t0 = Instant::now();
    let envelope = qark_codecs::standard()
        .encode(&value)
        .context("encoding value")?;
    let elapsed = t0.elapsed();

    write_output(&output, &envelope)?;

    let flag = envelope[4];
    eprintln!("  json input  : {}", human_bytes(json_bytes.len() as u64));
    eprintln!("  envelope    : {}", human_bytes(envelope.len() as u64));
    eprintln!("  compression : {}", flag_display(flag));
    eprintln!("  elapsed     : {:.3}ms", elapsed.as_secs_f64() * 1000.0);
    Ok(())
}

fn run_decode(input: PathBuf, output: PathBuf, compact: bool) -> anyhow::Result<()> {
    let envelope = read_input(&input)?;

    let t0 = Instant::now();
    let value = qark_codecs::standard()
        .decode(&envelope)
        .context("decoding envelope")?
        .ok_or_else(|| anyhow::anyhow!("{:?} is not a Qark envelope (bad magic)", input))?;
    let elapsed = t0.elapsed();

    let json = value_to_json(&value)?;
    let mut rendered = if compact {
        serde_json::to_vec(&json)?
    } else {
        serde_json::to_vec_pretty(&json)?
    };
    rendered.push(b'\n');
    write_output(&output, &rendered)?;

    eprintln!("  envelope    : {}", human_bytes(envelope.len() as u64));
    eprintln!("  json output : {}", human_bytes(rendered.len() as u64));
    eprintln!("  elapsed     : {:.3}ms", elapsed.as_secs_f64() * 1000.0);
    Ok(())
}

fn run_inspect(file: PathBuf) -> anyhow::Result<()> {
    let envelope = fs::read(&file).with_context(|| format!("reading {:?}", file))?;

    if envelope.len() < ENVELOPE_OVERHEAD || envelope[..4] != MAGIC.to_be_bytes() {
        anyhow::bail!("{:?} is not a Qark envelope (bad magic)", file);
    }

    let flag = envelope[4];
    let payload = &envelope[ENVELOPE_OVERHEAD..];
    let unpacked = if flag == FLAG_NONE {
        payload.to_vec()
    } else {
        codec_for_flag(flag)?
            .decompress(payload)
            .context("decompressing payload")?
    };

    let top_tag = unpacked
        .first()
        .and_then(|&b| Tag::from_byte(b))
        .map_or("unknown", Tag::name);

    println!("=== Qark envelope: {:?} ===", file);
    println!();
    println!("  magic         : 0x{:08x}", MAGIC);
    println!("  compression   : {}", flag_display(flag));
    println!("  envelope size : {}", human_bytes(envelope.len() as u64));
    println!("  payload       : {}", human_bytes(payload.len() as u64));
    println!("  unpacked      : {}", human_bytes(unpacked.len() as u64));
    println!(
        "  ratio         : {:.2}x",
        if payload.is_empty() {
            1.0
        } else {
            unpacked.len() as f64 / payload.len() as f64
        }
    );
    println!("  top-level tag : {}", top_tag);

    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Encode { input, output } => run_encode(input, output),
        Commands::Decode {
            input,
            output,
            compact,
        } => run_decode(input, output, compact),
        Commands::Inspect { file } => run_inspect(file),
    }
}
