//! # Pixhide - Hide a file inside an image
//!
//! Pixhide embeds a named payload file into the pixels of a carrier image
//! and recovers it later from the saved result.
//!
//! ## Overview
//!
//! Two techniques share one bit-addressed layout:
//! - **LSB**: bits replace the lowest `depth` bit planes of every channel sample
//! - **DCT**: bits are stored in the relative order of coefficient pairs in
//!   each 8×8 block of one channel, with a `persistence` margin so the order
//!   survives moderate JPEG recompression
//!
//! The embedded bitstream starting at bit 0 is:
//!
//! ```text
//! [filename length: 32][filename bytes][payload length: 32][payload bytes]
//! ```
//!
//! Length fields are written on the calling thread. Filename and payload
//! bytes are split across worker threads, each owning a disjoint run of
//! carrier cells.
//!
//! ## Example Usage
//!
//! ```rust
//! use pixhide::{Carrier, Parallelism, Steganographer, Technique};
//!
//! let carrier = Carrier::new(64, 64, 3, vec![255; 64 * 64 * 3]).unwrap();
//!
//! let mut stego = Steganographer::new(carrier, Technique::lsb(1), Parallelism::sequential()).unwrap();
//! stego.encode("hello_world.txt", b"Hello, World!\n").unwrap();
//! let carrier = stego.into_carrier();
//!
//! let stego = Steganographer::new(carrier, Technique::lsb(1), Parallelism::sequential()).unwrap();
//! let recovered = stego.decode().unwrap();
//! assert_eq!(recovered.filename, "hello_world.txt");
//! assert_eq!(recovered.data, b"Hello, World!\n");
//! ```
//!
//! ## Modules
//!
//! - [`bits`]: bit get/set on unsigned integers
//! - [`capacity`]: capacity per technique and required bits
//! - [`carrier`]: pixel buffer, image load/save
//! - [`engine`]: LSB and DCT embedding engines
//! - [`framing`]: length-prefixed chunk layout
//! - [`partition`]: multi-threaded chunk encode/decode
//! - [`stego`]: full encode/decode of a named payload
//! - [`pipeline`]: file-level encode/decode

/// Bits used by each chunk length field.
pub const LENGTH_BITS: u64 = 32;

/// Bits used by both length fields together.
pub const HEADER_BITS: u64 = 2 * LENGTH_BITS;

/// Prefix added to every file written by the pipeline.
pub const OUTPUT_PREFIX: &str = "steg-";

pub mod bits;
pub mod capacity;
pub mod carrier;
pub mod config;
pub mod engine;
pub mod error;
pub mod framing;
pub mod partition;
pub mod pipeline;
pub mod stego;
pub mod transform;

pub use carrier::{Carrier, SaveFormat};
pub use config::{DctParams, LsbParams, Parallelism, StegoConfig, Technique, TechniqueKind};
pub use error::{ConfigError, DecodeError, EncodeError, ImageError, Result, StegoError};
pub use pipeline::{capacity_report, decode_file, encode_file, CapacityReport};
pub use stego::{RecoveredPayload, Steganographer};
