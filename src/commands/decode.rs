//! Decode command - recover a hidden file from an image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pixhide::decode_file;

use super::{CommandExecutor, TechniqueArgs};

/// Recover a file hidden in an image.
///
/// Technique flags must match the ones used to encode. The file is written
/// as `steg-<recovered name>` into the output directory.
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// Image holding hidden data
    pub image: PathBuf,

    /// Directory for the recovered file
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub technique: TechniqueArgs,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self) -> Result<()> {
        let config = self.technique.resolve()?;

        let output = decode_file(&self.image, &self.output_dir, &config)
            .with_context(|| format!("Failed to recover data from {}", self.image.display()))?;

        println!("{}", output.display());
        Ok(())
    }
}
