//! Encode and decode of a named payload.
//!
//! The [`Steganographer`] owns one carrier and one technique engine for the
//! length of an operation. Encode writes, in order:
//! 1. Filename length at bit 0
//! 2. Filename bytes (partitioned)
//! 3. Payload length right after the filename
//! 4. Payload bytes (partitioned)
//!
//! Decode reads the same fields back. Length fields are always handled on
//! the calling thread; only chunk bytes are spread across workers.

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::capacity::{payload_length_offset, required_bits};
use crate::carrier::Carrier;
use crate::config::{Parallelism, StegoConfig, Technique, TechniqueKind};
use crate::engine::{DctEngine, Embedder, LsbEngine};
use crate::error::{ConfigError, DecodeError, EncodeError, Result};
use crate::framing::{decode_length, encode_length};
use crate::partition::{decode_partitioned, encode_partitioned, plan, Partition};
use crate::LENGTH_BITS;

/// Technique engine selected once at construction.
#[derive(Debug)]
pub enum Engine {
    Lsb(LsbEngine),
    Dct(DctEngine),
}

impl Engine {
    pub fn new(carrier: Carrier, technique: &Technique) -> std::result::Result<Self, ConfigError> {
        match technique {
            Technique::Lsb(params) => Ok(Self::Lsb(LsbEngine::new(carrier, *params)?)),
            Technique::Dct(params) => Ok(Self::Dct(DctEngine::new(carrier, *params)?)),
        }
    }

    pub fn kind(&self) -> TechniqueKind {
        match self {
            Self::Lsb(_) => TechniqueKind::Lsb,
            Self::Dct(_) => TechniqueKind::Dct,
        }
    }

    pub fn capacity(&self) -> u64 {
        match self {
            Self::Lsb(engine) => engine.capacity(),
            Self::Dct(engine) => engine.capacity(),
        }
    }

    pub fn into_carrier(self) -> Carrier {
        match self {
            Self::Lsb(engine) => engine.into_carrier(),
            Self::Dct(engine) => engine.into_carrier(),
        }
    }
}

/// Filename and bytes recovered from a carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredPayload {
    /// Filename exactly as embedded.
    pub filename: String,
    pub data: Vec<u8>,
}

/// Worker settings shared by one encode or decode.
struct Workers<'a> {
    parallelism: Parallelism,
    pool: Option<&'a ThreadPool>,
    verbose: bool,
}

impl Workers<'_> {
    fn plan(&self, label: &str, offset: u64, len: usize, bits_per_cell: usize) -> Vec<Partition> {
        let workers = if self.pool.is_some() {
            self.parallelism.workers_for(len)
        } else {
            1
        };
        let parts = plan(offset, len, workers, bits_per_cell);
        if self.verbose {
            eprintln!(
                "{} chunk: {} bytes at bit {} across {} worker(s)",
                label,
                len,
                offset,
                parts.len()
            );
        }
        parts
    }
}

/// Hides and recovers one named payload in one carrier.
pub struct Steganographer {
    engine: Engine,
    parallelism: Parallelism,
    pool: Option<ThreadPool>,
    verbose: bool,
}

impl Steganographer {
    /// Validates `technique` against the carrier and builds the engine.
    ///
    /// A thread pool is created only when more than one worker is allowed.
    pub fn new(carrier: Carrier, technique: Technique, parallelism: Parallelism) -> Result<Self> {
        technique.validate()?;
        if parallelism.workers == 0 {
            return Err(ConfigError::InvalidWorkers.into());
        }

        let engine = Engine::new(carrier, &technique)?;
        let pool = if parallelism.workers > 1 {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(parallelism.workers)
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self {
            engine,
            parallelism,
            pool,
            verbose: false,
        })
    }

    /// Builds a steganographer from a validated configuration.
    pub fn from_config(carrier: Carrier, config: &StegoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(carrier, config.technique(), config.parallelism)?.with_verbose(config.verbose))
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn technique(&self) -> TechniqueKind {
        self.engine.kind()
    }

    /// Capacity of the carrier in bits under the active technique.
    pub fn capacity(&self) -> u64 {
        self.engine.capacity()
    }

    /// Embeds `filename` and `payload`.
    ///
    /// Every check runs before the carrier is touched, so a failed encode
    /// leaves it unmodified.
    pub fn encode(&mut self, filename: &str, payload: &[u8]) -> Result<()> {
        let workers = Workers {
            parallelism: self.parallelism,
            pool: self.pool.as_ref(),
            verbose: self.verbose,
        };
        match &mut self.engine {
            Engine::Lsb(engine) => embed(engine, filename.as_bytes(), payload, &workers)?,
            Engine::Dct(engine) => embed(engine, filename.as_bytes(), payload, &workers)?,
        }
        Ok(())
    }

    /// Recovers the filename and payload embedded in the carrier.
    pub fn decode(&self) -> Result<RecoveredPayload> {
        let workers = Workers {
            parallelism: self.parallelism,
            pool: self.pool.as_ref(),
            verbose: self.verbose,
        };
        let recovered = match &self.engine {
            Engine::Lsb(engine) => extract(engine, &workers)?,
            Engine::Dct(engine) => extract(engine, &workers)?,
        };
        Ok(recovered)
    }

    /// Releases the carrier, with any embedded data written back.
    pub fn into_carrier(self) -> Carrier {
        self.engine.into_carrier()
    }
}

fn chunk_length(bytes: &[u8]) -> std::result::Result<u32, EncodeError> {
    u32::try_from(bytes.len()).map_err(|_| EncodeError::ChunkTooLarge { len: bytes.len() })
}

fn embed<E: Embedder>(
    engine: &mut E,
    filename: &[u8],
    payload: &[u8],
    workers: &Workers<'_>,
) -> std::result::Result<(), EncodeError> {
    if filename.is_empty() {
        return Err(EncodeError::EmptyFilename);
    }
    if payload.is_empty() {
        return Err(EncodeError::EmptyPayload);
    }
    let filename_len = chunk_length(filename)?;
    let payload_len = chunk_length(payload)?;

    let capacity = engine.capacity();
    let required = required_bits(filename.len(), payload.len());
    if workers.verbose {
        eprintln!("Capacity: {} bits, required: {} bits", capacity, required);
    }
    if required > capacity {
        return Err(EncodeError::CarrierTooSmall { required, capacity });
    }

    let bits_per_cell = engine.cells().bits_per_cell();

    encode_length(&mut engine.cells_mut(), 0, filename_len)?;
    let parts = workers.plan("Filename", LENGTH_BITS, filename.len(), bits_per_cell);
    encode_partitioned(engine.cells_mut(), LENGTH_BITS, filename, &parts, workers.pool)?;

    let offset = payload_length_offset(filename.len());
    encode_length(&mut engine.cells_mut(), offset, payload_len)?;
    let start = offset + LENGTH_BITS;
    let parts = workers.plan("Payload", start, payload.len(), bits_per_cell);
    encode_partitioned(engine.cells_mut(), start, payload, &parts, workers.pool)?;

    Ok(())
}

fn extract<E: Embedder>(
    engine: &E,
    workers: &Workers<'_>,
) -> std::result::Result<RecoveredPayload, DecodeError> {
    let cells = engine.cells();
    let capacity = engine.capacity();
    let bits_per_cell = cells.bits_per_cell();

    let filename_len = decode_length(cells, 0, capacity)? as usize;
    let mut filename = vec![0u8; filename_len];
    let parts = workers.plan("Filename", LENGTH_BITS, filename_len, bits_per_cell);
    decode_partitioned(cells, LENGTH_BITS, &mut filename, &parts, workers.pool)?;
    let filename = String::from_utf8(filename).map_err(|_| DecodeError::InvalidFilename)?;

    let offset = payload_length_offset(filename_len);
    let payload_len = decode_length(cells, offset, capacity)? as usize;
    let start = offset + LENGTH_BITS;
    let mut data = vec![0u8; payload_len];
    let parts = workers.plan("Payload", start, payload_len, bits_per_cell);
    decode_partitioned(cells, start, &mut data, &parts, workers.pool)?;

    Ok(RecoveredPayload { filename, data })
}
