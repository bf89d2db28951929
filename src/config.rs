//! Configuration for encode/decode operations.
//!
//! A [`StegoConfig`] can be built in code, loaded from a TOML file, or both
//! (the CLI loads a file and then applies flag overrides). The embedding
//! technique is resolved once into a [`Technique`] before an operation
//! starts.
//!
//! ```toml
//! technique = "dct"
//!
//! [dct]
//! swap_count = 2
//! persistence = 12
//!
//! [parallelism]
//! workers = 4
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default LSB bit depth (planes per channel).
pub const DEFAULT_DEPTH: u8 = 1;

/// Default number of coefficient pairs used per 8×8 block.
pub const DEFAULT_SWAP_COUNT: usize = 1;

/// Default DCT persistence margin.
pub const DEFAULT_PERSISTENCE: u32 = 10;

/// Default DCT channel (blue in RGB order).
pub const DEFAULT_DCT_CHANNEL: usize = 2;

/// Below this many payload bytes per worker, thread overhead dominates.
pub const DEFAULT_MIN_BYTES_PER_WORKER: usize = 3500;

/// Default quality for JPEG output.
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

/// Maximum number of coefficient pairs per block.
pub const MAX_SWAP_COUNT: usize = 4;

/// Color channels a DCT engine may use. Alpha is never a DCT channel.
pub const COLOR_CHANNELS: usize = 3;

/// Which embedding technique to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TechniqueKind {
    Lsb,
    #[default]
    Dct,
}

impl FromStr for TechniqueKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lsb" => Ok(Self::Lsb),
            "dct" => Ok(Self::Dct),
            other => Err(ConfigError::UnknownTechnique(other.to_string())),
        }
    }
}

impl fmt::Display for TechniqueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lsb => write!(f, "lsb"),
            Self::Dct => write!(f, "dct"),
        }
    }
}

/// Parameters of the LSB technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LsbParams {
    /// Number of low-order bit planes used per channel (1..=8).
    pub depth: u8,
}

impl Default for LsbParams {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
        }
    }
}

/// Parameters of the DCT technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DctParams {
    /// Coefficient pairs used per block (1..=4).
    pub swap_count: usize,
    /// Margin pushed between the two coefficients of a pair.
    pub persistence: u32,
    /// Carrier channel holding the blocks.
    pub channel: usize,
    /// Order pairs in units of the JPEG luminance quantization weights.
    pub quantize: bool,
}

impl Default for DctParams {
    fn default() -> Self {
        Self {
            swap_count: DEFAULT_SWAP_COUNT,
            persistence: DEFAULT_PERSISTENCE,
            channel: DEFAULT_DCT_CHANNEL,
            quantize: false,
        }
    }
}

/// Worker settings for partitioned chunk encode/decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parallelism {
    /// Upper bound on concurrent workers.
    pub workers: usize,
    /// A chunk is only split when every worker gets at least this many bytes.
    pub min_bytes_per_worker: usize,
}

impl Parallelism {
    /// Single worker, no thread pool.
    pub fn sequential() -> Self {
        Self {
            workers: 1,
            ..Self::default()
        }
    }

    /// Number of workers for a chunk of `len` bytes.
    pub fn workers_for(&self, len: usize) -> usize {
        let by_size = len / self.min_bytes_per_worker.max(1);
        by_size.clamp(1, self.workers.max(1))
    }
}

impl Default for Parallelism {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            min_bytes_per_worker: DEFAULT_MIN_BYTES_PER_WORKER,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// JPEG quality used when saving DCT carriers.
    pub jpeg_quality: u8,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Technique selected once per operation, with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Technique {
    Lsb(LsbParams),
    Dct(DctParams),
}

impl Technique {
    pub fn lsb(depth: u8) -> Self {
        Self::Lsb(LsbParams { depth })
    }

    pub fn dct(swap_count: usize, persistence: u32) -> Self {
        Self::Dct(DctParams {
            swap_count,
            persistence,
            ..DctParams::default()
        })
    }

    /// Checks parameter ranges that do not depend on the carrier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Lsb(p) => {
                if !(1..=8).contains(&p.depth) {
                    return Err(ConfigError::InvalidDepth(p.depth));
                }
            }
            Self::Dct(p) => {
                if !(1..=MAX_SWAP_COUNT).contains(&p.swap_count) {
                    return Err(ConfigError::InvalidSwapCount(p.swap_count));
                }
                if p.persistence == 0 {
                    return Err(ConfigError::InvalidPersistence(p.persistence));
                }
                if p.channel >= COLOR_CHANNELS {
                    return Err(ConfigError::InvalidChannel {
                        channel: p.channel,
                        channels: COLOR_CHANNELS,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Complete configuration for one encode or decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StegoConfig {
    pub technique: TechniqueKind,
    pub lsb: LsbParams,
    pub dct: DctParams,
    pub parallelism: Parallelism,
    pub output: OutputOptions,
    /// Write progress information to stderr.
    pub verbose: bool,
}

impl StegoConfig {
    /// Loads a configuration from a TOML file. Missing keys take defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: StegoConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// The technique selected by this configuration.
    pub fn technique(&self) -> Technique {
        match self.technique {
            TechniqueKind::Lsb => Technique::Lsb(self.lsb),
            TechniqueKind::Dct => Technique::Dct(self.dct),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.technique().validate()?;
        if self.parallelism.workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::InvalidQuality(self.output.jpeg_quality));
        }
        Ok(())
    }
}
