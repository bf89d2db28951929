//! Pixhide - Hide a file inside an image
//!
//! A CLI tool for LSB and DCT image steganography.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{CapacityCommand, CommandExecutor, DecodeCommand, EncodeCommand};

/// Pixhide - Hide a file inside an image
///
/// Embeds a named file into the pixels of a carrier image using LSB bit-plane
/// substitution or DCT coefficient ordering, and recovers it later.
#[derive(Parser)]
#[command(name = "pixhide")]
#[command(version)]
#[command(about = "Hide a file inside an image with LSB or DCT steganography")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a file inside a carrier image
    #[command(alias = "en")]
    Encode(EncodeCommand),

    /// Recover a file hidden in an image
    #[command(alias = "de")]
    Decode(DecodeCommand),

    /// Show how much data an image can hold
    Capacity(CapacityCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode(cmd) => cmd.execute(),
        Commands::Decode(cmd) => cmd.execute(),
        Commands::Capacity(cmd) => cmd.execute(),
    }
}
