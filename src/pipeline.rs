//! File-level encode and decode.
//!
//! Reads the carrier image and the payload file, runs a [`Steganographer`]
//! and writes the results next to each other in an output directory:
//!
//! - encode writes `steg-<carrier stem>.png` (LSB) or `.jpg` (DCT)
//! - decode writes `steg-<recovered filename>`
//!
//! Only the file-name component of the payload path is embedded, and a
//! recovered filename is reduced to its last component before it touches
//! the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use crate::capacity::{capacity, max_payload_len};
use crate::carrier::{Carrier, SaveFormat};
use crate::config::{StegoConfig, TechniqueKind};
use crate::error::{DecodeError, EncodeError, Result};
use crate::stego::Steganographer;
use crate::OUTPUT_PREFIX;

/// Capacity of one carrier under one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    /// Addressable bits under the configured technique.
    pub capacity_bits: u64,
    /// Largest payload that fits next to the given filename length.
    pub max_payload_bytes: u64,
}

/// Save format used for a technique.
///
/// LSB needs a lossless format. DCT output is written as JPEG.
pub fn save_format(config: &StegoConfig) -> SaveFormat {
    match config.technique {
        TechniqueKind::Lsb => SaveFormat::Png,
        TechniqueKind::Dct => SaveFormat::Jpeg {
            quality: config.output.jpeg_quality,
        },
    }
}

/// Path of the image written by [`encode_file`].
pub fn output_image_path(carrier: &Path, output_dir: &Path, format: SaveFormat) -> PathBuf {
    let stem = carrier
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "carrier".to_string());
    output_dir.join(format!("{}{}.{}", OUTPUT_PREFIX, stem, format.extension()))
}

/// Reduces a recovered filename to its last path component.
///
/// Both `/` and `\` are treated as separators. Names with nothing usable
/// left, or that resolve to `.` or `..`, are rejected.
pub fn sanitize_filename(name: &str) -> std::result::Result<&str, DecodeError> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    if base.is_empty() || base == "." || base == ".." || base.contains('\0') {
        return Err(DecodeError::InvalidFilename);
    }
    Ok(base)
}

/// Hides the file at `payload` inside the image at `image`.
///
/// Returns the path of the written image.
pub fn encode_file(
    image: &Path,
    payload: &Path,
    output_dir: &Path,
    config: &StegoConfig,
) -> Result<PathBuf> {
    config.validate()?;

    let carrier = Carrier::open(image)?;
    if config.verbose {
        eprintln!(
            "Loaded carrier {} ({}x{}, {} channels)",
            image.display(),
            carrier.width(),
            carrier.height(),
            carrier.channels()
        );
    }

    let filename = payload
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or(EncodeError::EmptyFilename)?;
    let data = fs::read(payload)?;
    if config.verbose {
        eprintln!("Hiding {} ({} bytes) with {}", filename, data.len(), config.technique);
    }

    let mut stego = Steganographer::from_config(carrier, config)?;
    stego.encode(&filename, &data)?;

    let format = save_format(config);
    let output = output_image_path(image, output_dir, format);
    fs::create_dir_all(output_dir)?;
    stego.into_carrier().save(&output, format)?;

    if config.verbose {
        eprintln!("Wrote {}", output.display());
    }
    Ok(output)
}

/// Recovers the file hidden in the image at `image`.
///
/// Returns the path of the written payload.
pub fn decode_file(image: &Path, output_dir: &Path, config: &StegoConfig) -> Result<PathBuf> {
    config.validate()?;

    let carrier = Carrier::open(image)?;
    if config.verbose {
        eprintln!(
            "Loaded carrier {} ({}x{}, {} channels)",
            image.display(),
            carrier.width(),
            carrier.height(),
            carrier.channels()
        );
    }

    let stego = Steganographer::from_config(carrier, config)?;
    let recovered = stego.decode()?;
    let name = sanitize_filename(&recovered.filename)?;
    if config.verbose {
        eprintln!("Recovered {} ({} bytes)", recovered.filename, recovered.data.len());
    }

    let output = output_dir.join(format!("{}{}", OUTPUT_PREFIX, name));
    fs::create_dir_all(output_dir)?;
    fs::write(&output, &recovered.data)?;

    if config.verbose {
        eprintln!("Wrote {}", output.display());
    }
    Ok(output)
}

/// Reports how much the image at `image` can hold.
pub fn capacity_report(
    image: &Path,
    config: &StegoConfig,
    filename_len: usize,
) -> Result<CapacityReport> {
    config.validate()?;

    let carrier = Carrier::open(image)?;
    let capacity_bits = capacity(&carrier, &config.technique());

    Ok(CapacityReport {
        width: carrier.width(),
        height: carrier.height(),
        channels: carrier.channels(),
        capacity_bits,
        max_payload_bytes: max_payload_len(capacity_bits, filename_len),
    })
}
