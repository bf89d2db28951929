//! Encode command - hide a file inside an image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pixhide::encode_file;

use super::{CommandExecutor, TechniqueArgs};

/// Hide a file inside a carrier image.
///
/// The output image is written as `steg-<carrier name>` into the output
/// directory, as PNG for LSB and JPEG for DCT.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Carrier image (PNG, JPEG or BMP)
    pub image: PathBuf,

    /// File to hide
    pub payload: PathBuf,

    /// Directory for the output image
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub technique: TechniqueArgs,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self) -> Result<()> {
        let config = self.technique.resolve()?;

        let output = encode_file(&self.image, &self.payload, &self.output_dir, &config)
            .with_context(|| {
                format!(
                    "Failed to hide {} in {}",
                    self.payload.display(),
                    self.image.display()
                )
            })?;

        println!("{}", output.display());
        Ok(())
    }
}
