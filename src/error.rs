//! Error types for carrier loading, embedding and extraction.

use thiserror::Error;

/// Errors raised by the image codec collaborator.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image load error: {0}")]
    Load(String),

    #[error("Image save error: {0}")]
    Save(String),

    #[error("Unsupported carrier: {0}")]
    Unsupported(String),
}

/// Errors raised while embedding. All of them are raised before the
/// carrier is touched.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Carrier too small: need {required} bits, capacity is {capacity}")]
    CarrierTooSmall { required: u64, capacity: u64 },

    #[error("Payload filename is empty")]
    EmptyFilename,

    #[error("Payload is empty")]
    EmptyPayload,

    #[error("Chunk of {len} bytes does not fit a 32-bit length field")]
    ChunkTooLarge { len: usize },
}

/// Errors raised while extracting.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid chunk length {length} (capacity {capacity}); no hidden data or foreign image")]
    InvalidLength { length: u32, capacity: u64 },

    #[error("Hidden data truncated: need {needed} bits, capacity is {capacity}")]
    Truncated { needed: u64, capacity: u64 },

    #[error("Recovered filename is not usable")]
    InvalidFilename,
}

/// Errors raised while building or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Bit depth must be between 1 and 8, got {0}")]
    InvalidDepth(u8),

    #[error("Swap count must be between 1 and 4, got {0}")]
    InvalidSwapCount(usize),

    #[error("Persistence must be at least 1, got {0}")]
    InvalidPersistence(u32),

    #[error("Channel {channel} out of range for a {channels}-channel carrier")]
    InvalidChannel { channel: usize, channels: usize },

    #[error("Worker count must be at least 1")]
    InvalidWorkers,

    #[error("JPEG quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("Unknown technique '{0}', expected 'lsb' or 'dct'")]
    UnknownTechnique(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),
}

/// Top-level error for every steganography operation.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, StegoError>;
